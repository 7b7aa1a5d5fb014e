//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod critic_backend;
pub mod entry_store;
pub mod image_generator;
pub mod image_processor;
pub mod inbox;
pub mod progress;
pub mod run_journal;
