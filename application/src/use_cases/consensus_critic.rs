//! Consensus critic use case
//!
//! Asks every configured backend for a critique of the same image and merges
//! the answers into one [`ConsensusResult`].

use crate::ports::critic_backend::CriticBackend;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::retry;
use futures::future::join_all;
use refract_domain::{BackendCritique, ConsensusResult, ImageInput, RetryPolicy};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("No critic backends configured")]
    NoBackends,
}

/// Multi-backend critic
///
/// Backends run concurrently; results keep backend order. A failing backend
/// is recorded as an error entry and never aborts the others.
pub struct ConsensusCritic {
    backends: Vec<Arc<dyn CriticBackend>>,
    retry: RetryPolicy,
}

impl ConsensusCritic {
    pub fn new(
        backends: Vec<Arc<dyn CriticBackend>>,
        retry: RetryPolicy,
    ) -> Result<Self, ConsensusError> {
        if backends.is_empty() {
            return Err(ConsensusError::NoBackends);
        }
        Ok(Self { backends, retry })
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Analyze with default (no-op) progress
    pub async fn analyze(&self, image: &ImageInput) -> ConsensusResult {
        self.analyze_with_progress(image, &NoProgress).await
    }

    pub async fn analyze_with_progress(
        &self,
        image: &ImageInput,
        progress: &dyn ProgressNotifier,
    ) -> ConsensusResult {
        info!(
            "Analyzing {} with {} backend(s)",
            image.name,
            self.backends.len()
        );
        debug!(bytes = image.len(), media_type = %image.media_type, "Critique payload");

        let calls = self
            .backends
            .iter()
            .map(|backend| self.critique_one(backend.as_ref(), image, progress));
        let critiques = join_all(calls).await;

        let result = ConsensusResult::from_critiques(critiques);
        info!(
            "Consensus for {}: {:.1} ({}/{} backends)",
            image.name,
            result.consensus_score,
            result.successful_count(),
            result.critiques.len()
        );
        result
    }

    async fn critique_one(
        &self,
        backend: &dyn CriticBackend,
        image: &ImageInput,
        progress: &dyn ProgressNotifier,
    ) -> BackendCritique {
        let name = backend.name();
        progress.on_backend_start(&image.name, name);

        let operation = format!("{}.analyze", name);
        let outcome = retry::execute(&self.retry, &operation, || backend.analyze(image)).await;

        match outcome {
            Ok(critique) => {
                debug!("{} scored {} {:.1}", name, image.name, critique.score);
                progress.on_backend_complete(&image.name, name, true);
                BackendCritique::success(name, critique)
            }
            Err(e) => {
                warn!("{} critique of {} failed: {}", name, image.name, e);
                progress.on_backend_complete(&image.name, name, false);
                BackendCritique::failure(name, e.to_string())
            }
        }
    }
}
