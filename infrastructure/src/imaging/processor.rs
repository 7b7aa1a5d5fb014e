//! [`ImageProcessor`] backed by the `image` crate.
//!
//! Enhancements follow the usual "blend with a degenerate image" model:
//! `out = degenerate + factor * (pixel - degenerate)`, where the degenerate
//! image is black (brightness), mean grey (contrast), the greyscale version
//! (saturation) or a smoothed copy (sharpness). Alpha is left untouched.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage, imageops};
use refract_application::{ImageError, ImageInfo, ImageProcessor};
use refract_domain::edit::passes_size_check;
use refract_domain::{EditedImage, EnhancementPlan, ImageInput};
use std::io::Cursor;
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Height of both halves of a comparison image
pub const COMPARISON_HEIGHT: u32 = 800;
/// White gap between the halves
pub const COMPARISON_GAP: u32 = 10;
const COMPARISON_QUALITY: u8 = 90;

/// 3x3 smoothing kernel used as the sharpness baseline
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone)]
pub struct ImageCrateProcessor {
    jpeg_quality: u8,
}

impl Default for ImageCrateProcessor {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageCrateProcessor {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Whether this build can decode files with extension `ext`.
    pub fn decodes_extension(ext: &str) -> bool {
        ImageFormat::from_extension(ext).is_some_and(|f| f.reading_enabled())
    }

    /// Side-by-side JPEG of `original` and `edited`, both scaled to
    /// [`COMPARISON_HEIGHT`] with their aspect ratios kept.
    pub fn comparison(&self, original: &[u8], edited: &[u8]) -> Result<Vec<u8>, ImageError> {
        let (left, _) = self.decode(original, None)?;
        let (right, _) = self.decode(edited, None)?;
        let left = to_height(&left, COMPARISON_HEIGHT);
        let right = to_height(&right, COMPARISON_HEIGHT);

        let width = left.width() + COMPARISON_GAP + right.width();
        let mut canvas = RgbImage::from_pixel(width, COMPARISON_HEIGHT, Rgb([255, 255, 255]));
        imageops::replace(&mut canvas, &left, 0, 0);
        imageops::replace(&mut canvas, &right, (left.width() + COMPARISON_GAP) as i64, 0);

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, COMPARISON_QUALITY)
            .encode_image(&canvas)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Decode, preferring the sniffed format over the declared media type.
    fn decode(&self, bytes: &[u8], media_type: Option<&str>) -> Result<(DynamicImage, ImageFormat), ImageError> {
        let format = image::guess_format(bytes)
            .ok()
            .or_else(|| media_type.and_then(ImageFormat::from_mime_type))
            .ok_or(ImageError::UnknownFormat)?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        Ok((image, format))
    }

    /// Encode in `format`; formats without an encoder here become JPEG.
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<EditedImage, ImageError> {
        let mut bytes = Vec::new();
        let format = match format {
            ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif => {
                DynamicImage::ImageRgba8(image.to_rgba8())
                    .write_to(&mut Cursor::new(&mut bytes), format)
                    .map_err(|e| ImageError::Encode(e.to_string()))?;
                format
            }
            _ => {
                // JPEG has no alpha channel
                JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)
                    .encode_image(&image.to_rgb8())
                    .map_err(|e| ImageError::Encode(e.to_string()))?;
                ImageFormat::Jpeg
            }
        };
        Ok(EditedImage::new(bytes, format.to_mime_type()))
    }
}

impl ImageProcessor for ImageCrateProcessor {
    fn validate(&self, bytes: &[u8]) -> Result<ImageInfo, ImageError> {
        if !passes_size_check(bytes) {
            return Err(ImageError::TooSmall { len: bytes.len() });
        }
        let (image, format) = self.decode(bytes, None)?;
        Ok(ImageInfo {
            mime_type: format.to_mime_type().to_string(),
            width: image.width(),
            height: image.height(),
        })
    }

    fn enhance(&self, source: &ImageInput, plan: &EnhancementPlan) -> Result<EditedImage, ImageError> {
        let (image, format) = self.decode(&source.bytes, Some(&source.media_type))?;
        debug!(image = %source.name, ?plan, "Applying fallback enhancement");

        let mut pixels = image.to_rgba8();
        if let Some(f) = plan.brightness {
            adjust_brightness(&mut pixels, f as f32);
        }
        if let Some(f) = plan.contrast {
            adjust_contrast(&mut pixels, f as f32);
        }
        if let Some(f) = plan.saturation {
            adjust_saturation(&mut pixels, f as f32);
        }
        if let Some(f) = plan.sharpness {
            adjust_sharpness(&mut pixels, f as f32);
        }

        self.encode(&DynamicImage::ImageRgba8(pixels), format)
    }

    fn reencode(&self, source: &ImageInput) -> Result<EditedImage, ImageError> {
        let (image, format) = self.decode(&source.bytes, Some(&source.media_type))?;
        self.encode(&image, format)
    }
}

fn to_height(image: &DynamicImage, height: u32) -> RgbImage {
    let width = (height as f64 * image.width() as f64 / image.height().max(1) as f64) as u32;
    image
        .resize_exact(width.max(1), height, FilterType::Lanczos3)
        .to_rgb8()
}

fn luminance(p: &image::Rgba<u8>) -> f32 {
    0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
}

fn blend_channel(degenerate: f32, value: u8, factor: f32) -> u8 {
    (degenerate + factor * (value as f32 - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn adjust_brightness(img: &mut RgbaImage, factor: f32) {
    for p in img.pixels_mut() {
        for c in 0..3 {
            p[c] = blend_channel(0.0, p[c], factor);
        }
    }
}

fn adjust_contrast(img: &mut RgbaImage, factor: f32) {
    let count = (img.width() as f64 * img.height() as f64).max(1.0);
    let mean = (img.pixels().map(|p| luminance(p) as f64).sum::<f64>() / count).round() as f32;
    for p in img.pixels_mut() {
        for c in 0..3 {
            p[c] = blend_channel(mean, p[c], factor);
        }
    }
}

fn adjust_saturation(img: &mut RgbaImage, factor: f32) {
    for p in img.pixels_mut() {
        let grey = luminance(p);
        for c in 0..3 {
            p[c] = blend_channel(grey, p[c], factor);
        }
    }
}

fn adjust_sharpness(img: &mut RgbaImage, factor: f32) {
    let smooth = imageops::filter3x3(img, &SMOOTH_KERNEL);
    for (p, s) in img.pixels_mut().zip(smooth.pixels()) {
        for c in 0..3 {
            p[c] = blend_channel(s[c] as f32, p[c], factor);
        }
    }
}
