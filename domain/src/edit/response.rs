//! Generator response parts and image extraction.

/// One part of an image-generation response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedPart {
    /// Inline payload, if the part carried one
    pub data: Option<Vec<u8>>,
    pub mime_type: Option<String>,
    /// Intermediate "thinking" output rather than the final answer
    pub thought: bool,
    /// Text content (logged, never used as an image)
    pub text: Option<String>,
}

impl GeneratedPart {
    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            mime_type: Some(mime_type.into()),
            ..Default::default()
        }
    }

    pub fn thought_image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            thought: true,
            ..Self::image(data, mime_type)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// Pick the image payload of a response.
///
/// The last non-thought part with data wins; otherwise the last thought
/// part with data; otherwise nothing.
pub fn select_image_part(parts: &[GeneratedPart]) -> Option<&GeneratedPart> {
    parts
        .iter()
        .rev()
        .find(|p| p.has_data() && !p.thought)
        .or_else(|| parts.iter().rev().find(|p| p.has_data() && p.thought))
}
