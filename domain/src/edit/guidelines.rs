//! Genre-specific retouching guidance appended to edit prompts.

/// Guidance for the given genre, generic guidance for anything unrecognized.
pub fn genre_guidelines(genre: Option<&str>) -> &'static str {
    match genre.map(|g| g.trim().to_lowercase()).as_deref() {
        Some("portrait") => PORTRAIT,
        Some("landscape") => LANDSCAPE,
        Some("street") => STREET,
        Some("wildlife") => WILDLIFE,
        Some("macro") => MACRO,
        Some("architecture") => ARCHITECTURE,
        Some("product") => PRODUCT,
        _ => GENERAL,
    }
}

const PORTRAIT: &str = "\
4. PORTRAIT-SPECIFIC:
   - Maintain natural skin tones, avoid orange or magenta shifts
   - Keep skin texture visible (no plastic or airbrushed look)
   - Eyes should be clear but not unnaturally bright
   - Hair detail should be preserved";

const LANDSCAPE: &str = "\
4. LANDSCAPE-SPECIFIC:
   - Maintain realistic sky colors, avoid over-saturated blues
   - Keep foreground-background tonal balance
   - Preserve natural atmospheric perspective
   - Detail should be crisp but not over-sharpened";

const STREET: &str = "\
4. STREET-SPECIFIC:
   - Embrace natural contrast and grain if present
   - Don't over-clean or sanitize the scene
   - Maintain the authentic urban atmosphere
   - Shadow detail is often intentionally dramatic";

const WILDLIFE: &str = "\
4. WILDLIFE-SPECIFIC:
   - Maintain natural fur and feather texture
   - Eye clarity is critical, should be sharp and alive
   - Background separation is important but keep it natural
   - Preserve environmental context";

const MACRO: &str = "\
4. MACRO-SPECIFIC:
   - Maximize sharpness in the focal plane
   - Background bokeh should remain smooth
   - Color accuracy is critical for natural subjects
   - Fine detail and texture are paramount";

const ARCHITECTURE: &str = "\
4. ARCHITECTURE-SPECIFIC:
   - Maintain straight verticals where appropriate
   - Balance interior and exterior exposure carefully
   - Preserve material textures (stone, glass, metal)
   - Keep lighting natural to the space";

const PRODUCT: &str = "\
4. PRODUCT-SPECIFIC:
   - Color accuracy is critical for commercial use
   - Clean highlights on reflective surfaces
   - Consistent lighting and shadow direction
   - Detail should be crisp and commercial-ready";

const GENERAL: &str = "\
4. GENERAL GUIDELINES:
   - Respect the photographic style and intent
   - Don't impose a different aesthetic
   - Enhance what's there rather than transform it";
