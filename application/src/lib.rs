//! Application layer for refract
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BatchConfig, EditorConfig};
pub use ports::{
    critic_backend::{CriticBackend, CriticError},
    entry_store::{EntryStore, NewEntry, PersistenceError, SiteBuilder},
    image_generator::{GenerationError, ImageGenerator},
    image_processor::{ImageError, ImageInfo, ImageProcessor},
    inbox::{Inbox, InboxError},
    progress::{NoProgress, ProgressNotifier, Stage},
    run_journal::{JournalEvent, NoJournal, RunJournal},
};
pub use retry::RetryableError;
pub use use_cases::batch_coordinator::{BatchCoordinator, BatchError, ImageFailure};
pub use use_cases::consensus_critic::{ConsensusCritic, ConsensusError};
pub use use_cases::edit_orchestrator::EditOrchestrator;
