//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod batch_coordinator;
pub mod consensus_critic;
pub mod edit_orchestrator;
