//! Batch pipeline value objects.

pub mod entry;
pub mod inbox;
pub mod run;

pub use entry::{EditInfo, EntryMetadata, ReReview};
pub use inbox::{HEIF_EXTENSIONS, IMAGE_EXTENSIONS, is_candidate_image};
pub use run::{BatchRun, BatchSummary, ImageOutcome, InvalidImage};
