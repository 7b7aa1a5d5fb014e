//! Photo editing rules: improvement parsing, prompt assembly, pass chunking,
//! response image selection and the fallback enhancement plan.

pub mod enhancement;
pub mod guidelines;
pub mod intensity;
pub mod passes;
pub mod policy;
pub mod prompt;
pub mod response;
pub mod result;

pub use enhancement::EnhancementPlan;
pub use guidelines::genre_guidelines;
pub use intensity::{EditAction, Intensity, NATURAL_POLISH_ACTION, parse_improvement, parse_improvements};
pub use passes::chunk_actions;
pub use policy::EditPolicy;
pub use prompt::{PassInfo, build_edit_prompt};
pub use response::{GeneratedPart, select_image_part};
pub use result::{
    EditRequest, EditResult, EditedImage, GenerationRequest, MIN_IMAGE_BYTES, passes_size_check,
};
