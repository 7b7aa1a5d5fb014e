//! Batch coordinator use case
//!
//! Runs every valid inbox image through
//! analyze → edit → re-review → persist → archive with bounded parallelism.
//!
//! # Concurrency
//!
//! | Resource | Policy |
//! |----------|--------|
//! | Images | At most `min(max_workers, 3, valid)` in flight (semaphore permits) |
//! | Entry store | One `persist` at a time (shared mutex) |
//! | Inbox files | Each touched by exactly one worker |
//!
//! Cancellation stops scheduling; images already started run to completion.

use crate::config::BatchConfig;
use crate::ports::entry_store::{EntryStore, NewEntry, PersistenceError, SiteBuilder};
use crate::ports::image_processor::{ImageError, run_blocking};
use crate::ports::inbox::{Inbox, InboxError};
use crate::ports::progress::{ProgressNotifier, Stage};
use crate::ports::run_journal::{JournalEvent, NoJournal, RunJournal};
use crate::use_cases::consensus_critic::ConsensusCritic;
use crate::use_cases::edit_orchestrator::EditOrchestrator;
use futures::FutureExt;
use refract_domain::{
    BatchRun, BatchSummary, EditInfo, EditResult, EditedImage, EntryMetadata, ImageInput,
    ImageOutcome, InvalidImage, ReReview,
};
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Inbox error: {0}")]
    Inbox(#[from] InboxError),
}

/// Errors that fail a single image
#[derive(Error, Debug)]
pub enum ImageFailure {
    #[error(transparent)]
    Inbox(#[from] InboxError),

    #[error("Edit failed: no usable image from generation or fallback")]
    EditFailed,

    #[error("Image processing failed: {0}")]
    Image(#[from] ImageError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Per-image pipeline shared by all workers.
struct Pipeline {
    critic: Arc<ConsensusCritic>,
    editor: Arc<EditOrchestrator>,
    inbox: Arc<dyn Inbox>,
    store: Arc<dyn EntryStore>,
    journal: Arc<dyn RunJournal>,
    persist_lock: Mutex<()>,
    dry_run: bool,
}

pub struct BatchCoordinator {
    pipeline: Arc<Pipeline>,
    site: Arc<dyn SiteBuilder>,
    config: BatchConfig,
    cancellation: CancellationToken,
}

impl BatchCoordinator {
    pub fn new(
        critic: Arc<ConsensusCritic>,
        editor: Arc<EditOrchestrator>,
        inbox: Arc<dyn Inbox>,
        store: Arc<dyn EntryStore>,
        site: Arc<dyn SiteBuilder>,
        config: BatchConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                critic,
                editor,
                inbox,
                store,
                journal: Arc::new(NoJournal),
                persist_lock: Mutex::new(()),
                dry_run: config.dry_run,
            }),
            site,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_journal(mut self, journal: Arc<dyn RunJournal>) -> Self {
        if let Some(pipeline) = Arc::get_mut(&mut self.pipeline) {
            pipeline.journal = journal;
        }
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that stops scheduling new images when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub async fn run(
        &self,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Result<BatchSummary, BatchError> {
        self.run_detailed(progress).await.map(|(_, summary)| summary)
    }

    /// Run the batch, returning per-image outcomes alongside the summary.
    pub async fn run_detailed(
        &self,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Result<(BatchRun, BatchSummary), BatchError> {
        let mut run = BatchRun::new(self.config.dry_run);
        let journal = &self.pipeline.journal;

        let discovered = self.pipeline.inbox.discover().await?;
        info!("Found {} candidate image(s)", discovered.len());

        let mut valid = Vec::with_capacity(discovered.len());
        for path in discovered {
            match self.pipeline.inbox.validate(&path).await {
                Ok(()) => valid.push(path),
                Err(e) => {
                    warn!("Skipping invalid image {}: {}", path.display(), e);
                    progress.on_invalid_image(&path, &e.to_string());
                    run.invalid.push(InvalidImage {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let workers = self.config.workers_for(valid.len());
        info!(
            "Processing {} image(s) with {} worker(s){}",
            valid.len(),
            workers,
            if run.dry_run { " (dry run)" } else { "" }
        );
        progress.on_run_start(valid.len(), run.invalid.len(), workers);
        journal.record(JournalEvent::new(
            "run_started",
            json!({
                "valid": valid.len(),
                "invalid": run.invalid.len(),
                "workers": workers,
                "dry_run": run.dry_run,
            }),
        ));

        run.outcomes = self
            .process_all(valid, workers, &progress, &mut run.skipped)
            .await;

        if !run.dry_run {
            match self.site.rebuild().await {
                Ok(published) => {
                    info!("Site rebuilt with {} entries", published);
                    progress.on_site_rebuild(Ok(published));
                }
                Err(e) => {
                    warn!("Site rebuild failed: {}", e);
                    let message = e.to_string();
                    progress.on_site_rebuild(Err(&message));
                    run.site_error = Some(message);
                }
            }
        }

        let total_entries = match self.pipeline.store.count().await {
            Ok(n) => n,
            Err(e) => {
                warn!("Could not count stored entries: {}", e);
                0
            }
        };

        let summary = run.summarize(total_entries);
        journal.record(JournalEvent::new(
            "run_completed",
            serde_json::to_value(&summary).unwrap_or_default(),
        ));
        progress.on_run_complete(&summary);
        Ok((run, summary))
    }

    async fn process_all(
        &self,
        images: Vec<PathBuf>,
        workers: usize,
        progress: &Arc<dyn ProgressNotifier>,
        skipped: &mut usize,
    ) -> Vec<ImageOutcome> {
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut join_set: JoinSet<ImageOutcome> = JoinSet::new();
        let total = images.len();

        for (scheduled, path) in images.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                *skipped = total - scheduled;
                info!("Cancelled: {} image(s) not started", *skipped);
                break;
            };

            let pipeline = Arc::clone(&self.pipeline);
            let progress = Arc::clone(progress);
            join_set.spawn(async move {
                let _permit = permit;
                let outcome = AssertUnwindSafe(pipeline.process(&path, progress.as_ref()))
                    .catch_unwind()
                    .await;
                outcome.unwrap_or_else(|_| {
                    warn!("Worker panicked while processing {}", path.display());
                    progress.on_image_complete(&display_name(&path), false, Some("worker panicked"));
                    ImageOutcome::failure(path, "worker panicked")
                })
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("Worker task join error: {}", e),
            }
        }
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        outcomes
    }
}

impl Pipeline {
    async fn process(&self, path: &Path, progress: &dyn ProgressNotifier) -> ImageOutcome {
        let name = display_name(path);
        progress.on_image_start(&name);
        self.journal
            .record(JournalEvent::new("image_started", json!({ "image": name })));

        match self.process_inner(path, &name, progress).await {
            Ok(entry_id) => {
                info!("Processed {}", name);
                progress.on_image_complete(&name, true, entry_id.as_deref());
                ImageOutcome::success(path, entry_id)
            }
            Err(e) => {
                warn!("Failed to process {}: {}", name, e);
                let message = e.to_string();
                self.journal.record(JournalEvent::new(
                    "image_failed",
                    json!({ "image": name, "error": message }),
                ));
                progress.on_image_complete(&name, false, Some(&message));
                ImageOutcome::failure(path, message)
            }
        }
    }

    /// Returns the entry id, or `None` in dry-run mode.
    async fn process_inner(
        &self,
        path: &Path,
        name: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<Option<String>, ImageFailure> {
        let image = self.inbox.read(path).await?;

        progress.on_stage(name, Stage::Analyze);
        let consensus = self.critic.analyze_with_progress(&image, progress).await;
        progress.on_critique(name, &consensus);
        self.journal.record(JournalEvent::new(
            "critique",
            json!({
                "image": name,
                "consensus_score": consensus.consensus_score,
                "successful": consensus.successful_count(),
                "backends": consensus.critiques.len(),
                "improvements": consensus.editor_improvements(),
            }),
        ));
        if !consensus.has_any_success() {
            warn!("Every critic backend failed for {}, editing without suggestions", name);
        }

        if self.dry_run {
            return Ok(None);
        }

        progress.on_stage(name, Stage::Edit);
        let edit = self
            .editor
            .edit(
                &image,
                consensus.editor_improvements(),
                consensus.merged_context.as_ref(),
            )
            .await;
        progress.on_edit(name, &edit);
        self.journal.record(JournalEvent::new(
            "edit_completed",
            json!({
                "image": name,
                "success": edit.success,
                "used_fallback": edit.used_fallback,
                "passes": edit.passes_completed,
            }),
        ));
        let edited = self.usable_output(&image, edit.clone()).await?;

        progress.on_stage(name, Stage::ReReview);
        let review_input = ImageInput::new(name, edited.bytes.clone(), edited.mime_type.clone());
        let review = self.critic.analyze_with_progress(&review_input, progress).await;
        let re_review = if review.has_any_success() {
            Some(ReReview::new(&review, consensus.consensus_score))
        } else {
            warn!("Re-review failed for {}, continuing without it", name);
            None
        };
        self.journal.record(JournalEvent::new(
            "re_review",
            json!({
                "image": name,
                "available": re_review.is_some(),
                "score_delta": re_review.as_ref().map(|r| r.score_delta),
            }),
        ));

        let metadata = EntryMetadata::new(&consensus)
            .with_re_review(re_review)
            .with_edit(EditInfo {
                model: self.editor.model().to_string(),
                passes: edit.passes_completed,
                used_fallback: edit.used_fallback,
            });

        progress.on_stage(name, Stage::Persist);
        let staged = self.inbox.stage(path, &edited).await?;
        let persisted = {
            let _guard = self.persist_lock.lock().await;
            self.store
                .persist(NewEntry {
                    original: path,
                    edited: &staged,
                    metadata: &metadata,
                })
                .await
        };
        if let Err(e) = self.inbox.discard(&staged).await {
            warn!("Could not remove staged image {}: {}", staged.display(), e);
        }
        let entry_id = persisted?;
        self.journal.record(JournalEvent::new(
            "entry_persisted",
            json!({ "image": name, "entry_id": entry_id }),
        ));

        self.inbox.remove(path).await?;
        Ok(Some(entry_id))
    }

    /// The edited image to archive: the edit output when it validates,
    /// otherwise the original re-encoded.
    async fn usable_output(
        &self,
        original: &ImageInput,
        edit: EditResult,
    ) -> Result<EditedImage, ImageFailure> {
        if !edit.success {
            return Err(ImageFailure::EditFailed);
        }

        let processor = self.editor.processor();
        if let Some(image) = edit.image {
            let checked = run_blocking(processor, move |p| p.validate(&image.bytes).map(|_| image)).await;
            match checked {
                Ok(image) => return Ok(image),
                Err(e) => warn!(
                    "Edited output for {} failed validation ({}), using the original",
                    original.name, e
                ),
            }
        }
        let source = original.clone();
        Ok(run_blocking(processor, move |p| p.reencode(&source)).await?)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
