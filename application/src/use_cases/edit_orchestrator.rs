//! Edit orchestrator use case
//!
//! Turns a consensus critique into an edited image:
//!
//! 1. Parse improvements into intensity-tagged actions
//! 2. Split actions into sequential passes, each fed the previous output
//! 3. Pick and validate the image payload of every generation response
//! 4. Fall back to the deterministic enhancement when no pass succeeded

use crate::config::EditorConfig;
use crate::ports::image_generator::ImageGenerator;
use crate::ports::image_processor::{ImageProcessor, run_blocking};
use crate::retry;
use refract_domain::edit::{
    PassInfo, build_edit_prompt, chunk_actions, parse_improvements, passes_size_check,
    select_image_part,
};
use refract_domain::{
    CritiqueContext, EditRequest, EditResult, EditedImage, EnhancementPlan, GeneratedPart,
    GenerationRequest, ImageInput, RetryPolicy,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct EditOrchestrator {
    generator: Arc<dyn ImageGenerator>,
    processor: Arc<dyn ImageProcessor>,
    config: EditorConfig,
    retry: RetryPolicy,
}

impl EditOrchestrator {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        processor: Arc<dyn ImageProcessor>,
        config: EditorConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            processor,
            config,
            retry,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn processor(&self) -> &Arc<dyn ImageProcessor> {
        &self.processor
    }

    /// Model that edits will be sent to.
    pub fn model(&self) -> &str {
        self.config.select_model()
    }

    pub fn build_request<S: AsRef<str>>(
        &self,
        image: &ImageInput,
        improvements: &[S],
        context: Option<&CritiqueContext>,
    ) -> EditRequest {
        EditRequest {
            source: image.clone(),
            actions: parse_improvements(improvements),
            context: context.cloned(),
            model: self.model().to_string(),
            aspect_ratio: self.config.aspect_ratio.clone(),
            image_size: self.config.image_size.clone(),
            passes: self.config.passes.max(1),
        }
    }

    /// Edit `image` according to `improvements`.
    pub async fn edit<S: AsRef<str>>(
        &self,
        image: &ImageInput,
        improvements: &[S],
        context: Option<&CritiqueContext>,
    ) -> EditResult {
        let request = self.build_request(image, improvements, context);
        self.execute(&request).await
    }

    pub async fn execute(&self, request: &EditRequest) -> EditResult {
        let chunks = chunk_actions(&request.actions, request.passes);
        let total = chunks.len();
        info!(
            "Editing {} with {} ({} action(s), {} pass(es))",
            request.source.name,
            request.model,
            request.actions.len(),
            total
        );

        let mut current = request.source.clone();
        let mut last_valid: Option<EditedImage> = None;
        let mut completed = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            let pass = PassInfo {
                index: i + 1,
                total,
            };
            let generation = GenerationRequest {
                prompt: build_edit_prompt(chunk, request.context.as_ref(), pass),
                image: current.clone(),
                model: request.model.clone(),
                aspect_ratio: request.aspect_ratio.clone(),
                image_size: request.image_size.clone(),
            };
            debug!(pass = pass.index, prompt_len = generation.prompt.len(), "Generation request");

            let parts = match retry::execute(&self.retry, "image.generate", || {
                self.generator.generate(&generation)
            })
            .await
            {
                Ok(parts) => parts,
                Err(e) => {
                    warn!("Pass {}/{} failed for {}: {}", pass.index, total, request.source.name, e);
                    break;
                }
            };

            match self.extract_image(parts).await {
                Some(image) => {
                    completed += 1;
                    current = ImageInput::new(
                        request.source.name.clone(),
                        image.bytes.clone(),
                        image.mime_type.clone(),
                    );
                    last_valid = Some(image);
                }
                None => {
                    warn!(
                        "Pass {}/{} produced no usable image for {}, skipping remaining passes",
                        pass.index, total, request.source.name
                    );
                    break;
                }
            }
        }

        if let Some(image) = last_valid {
            info!("Edited {} ({}/{} passes)", request.source.name, completed, total);
            return EditResult::generated(image, completed);
        }

        self.fallback(request, completed).await
    }

    /// Selected response payload, if it survives size and decode checks.
    async fn extract_image(&self, parts: Vec<GeneratedPart>) -> Option<EditedImage> {
        let part = select_image_part(&parts)?;
        let thought = part.thought;
        let bytes = part.data.clone()?;

        if !passes_size_check(&bytes) {
            warn!("Generated image discarded: only {} bytes", bytes.len());
            return None;
        }

        let checked = run_blocking(&self.processor, move |p| {
            p.validate(&bytes).map(|info| (info, bytes))
        })
        .await;

        match checked {
            Ok((info, bytes)) => {
                debug!(
                    bytes = bytes.len(),
                    width = info.width,
                    height = info.height,
                    thought,
                    "Generated image validated"
                );
                Some(EditedImage::new(bytes, info.mime_type))
            }
            Err(e) => {
                warn!("Generated image failed validation: {}", e);
                None
            }
        }
    }

    async fn fallback(&self, request: &EditRequest, completed: usize) -> EditResult {
        warn!("Using fallback enhancement for {}", request.source.name);

        let texts: Vec<&str> = request.actions.iter().map(|a| a.action.as_str()).collect();
        let plan = EnhancementPlan::from_improvements(&texts);
        debug!(?plan, "Fallback enhancement plan");

        let source = request.source.clone();
        let enhanced = run_blocking(&self.processor, move |p| {
            let image = p.enhance(&source, &plan)?;
            p.validate(&image.bytes)?;
            Ok(image)
        })
        .await;

        match enhanced {
            Ok(image) => EditResult::fallback(image, completed),
            Err(e) => {
                warn!("Fallback enhancement failed for {}: {}", request.source.name, e);
                EditResult::failed(completed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_QUALITY_MODEL;
    use crate::ports::image_generator::GenerationError;
    use crate::ports::image_processor::{ImageError, ImageInfo};
    use async_trait::async_trait;
    use refract_domain::{EditPolicy, MIN_IMAGE_BYTES};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    type Reply = Result<Vec<GeneratedPart>, GenerationError>;

    /// Generator replaying scripted replies and recording every request.
    #[derive(Default)]
    struct MockGenerator {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl MockGenerator {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageGenerator for MockGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Reply {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(vec![GeneratedPart::text("no image")]))
        }
    }

    /// Treats payloads starting with 0xFF as decodable.
    struct MockProcessor {
        enhance_ok: bool,
    }

    impl ImageProcessor for MockProcessor {
        fn validate(&self, bytes: &[u8]) -> Result<ImageInfo, ImageError> {
            if bytes.len() <= MIN_IMAGE_BYTES {
                return Err(ImageError::TooSmall { len: bytes.len() });
            }
            if bytes[0] != 0xFF {
                return Err(ImageError::UnknownFormat);
            }
            Ok(ImageInfo {
                mime_type: "image/jpeg".into(),
                width: 10,
                height: 10,
            })
        }

        fn enhance(&self, source: &ImageInput, _plan: &EnhancementPlan) -> Result<EditedImage, ImageError> {
            if self.enhance_ok {
                let mut bytes = vec![0xFF; 200];
                bytes[1] = source.bytes[0];
                Ok(EditedImage::new(bytes, "image/jpeg"))
            } else {
                Err(ImageError::Decode("corrupt".into()))
            }
        }

        fn reencode(&self, source: &ImageInput) -> Result<EditedImage, ImageError> {
            Ok(EditedImage::new(source.bytes.clone(), source.media_type.clone()))
        }
    }

    fn valid_image(marker: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF; 300];
        bytes[1] = marker;
        bytes
    }

    fn source() -> ImageInput {
        ImageInput::new("photo.jpg", valid_image(0), "image/jpeg")
    }

    fn orchestrator(generator: Arc<MockGenerator>, config: EditorConfig) -> EditOrchestrator {
        EditOrchestrator::new(
            generator,
            Arc::new(MockProcessor { enhance_ok: true }),
            config,
            RetryPolicy::new(3, Duration::ZERO, 2.0),
        )
    }

    #[tokio::test]
    async fn test_generated_image_used() {
        let generator = MockGenerator::new(vec![Ok(vec![
            GeneratedPart::text("here you go"),
            GeneratedPart::image(valid_image(1), "image/png"),
        ])]);
        let editor = orchestrator(generator.clone(), EditorConfig::default());

        let result = editor.edit(&source(), &["Boost contrast"], None).await;
        assert!(result.success);
        assert!(!result.used_fallback);
        assert_eq!(result.passes_completed, 1);
        assert_eq!(result.image.unwrap().bytes, valid_image(1));

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, DEFAULT_QUALITY_MODEL);
        assert!(requests[0].prompt.contains("1. [MODERATE] Boost contrast"));
    }

    #[tokio::test]
    async fn test_all_passes_fail_uses_fallback() {
        let generator = MockGenerator::new(vec![Ok(vec![GeneratedPart::text("I cannot edit images")])]);
        let editor = orchestrator(generator, EditorConfig::default());

        let result = editor.edit(&source(), &["Increase brightness"], None).await;
        assert!(result.success);
        assert!(result.used_fallback);
        assert_eq!(result.passes_completed, 0);
        assert!(result.image.is_some());
    }

    #[tokio::test]
    async fn test_undersized_and_undecodable_images_discarded() {
        let generator = MockGenerator::new(vec![Ok(vec![GeneratedPart::image(
            vec![0xFF; MIN_IMAGE_BYTES],
            "image/png",
        )])]);
        let result = orchestrator(generator, EditorConfig::default())
            .edit(&source(), &["x"], None)
            .await;
        assert!(result.used_fallback);

        let generator = MockGenerator::new(vec![Ok(vec![GeneratedPart::image(
            vec![0x00; 500],
            "image/png",
        )])]);
        let result = orchestrator(generator, EditorConfig::default())
            .edit(&source(), &["x"], None)
            .await;
        assert!(result.used_fallback);
    }

    #[tokio::test]
    async fn test_multi_pass_chains_outputs() {
        let generator = MockGenerator::new(vec![
            Ok(vec![GeneratedPart::image(valid_image(1), "image/png")]),
            Ok(vec![GeneratedPart::image(valid_image(2), "image/png")]),
            Ok(vec![GeneratedPart::image(valid_image(3), "image/png")]),
        ]);
        let editor = orchestrator(generator.clone(), EditorConfig::default().with_passes(3));

        let result = editor
            .edit(&source(), &["[subtle] a", "[moderate] b", "[significant] c"], None)
            .await;
        assert!(result.success && !result.used_fallback);
        assert_eq!(result.passes_completed, 3);
        assert_eq!(result.image.unwrap().bytes, valid_image(3));

        let requests = generator.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].image.bytes, valid_image(0));
        assert_eq!(requests[1].image.bytes, valid_image(1));
        assert_eq!(requests[2].image.bytes, valid_image(2));
        assert!(requests[1].prompt.contains("PASS 2 OF 3"));
        assert!(requests[1].prompt.contains("1. [MODERATE] b"));
    }

    #[tokio::test]
    async fn test_pass_without_image_aborts_remaining() {
        let generator = MockGenerator::new(vec![
            Ok(vec![GeneratedPart::image(valid_image(1), "image/png")]),
            Ok(vec![GeneratedPart::text("nothing")]),
            Ok(vec![GeneratedPart::image(valid_image(3), "image/png")]),
        ]);
        let editor = orchestrator(generator.clone(), EditorConfig::default().with_passes(3));

        let result = editor.edit(&source(), &["a", "b", "c"], None).await;
        assert_eq!(generator.requests().len(), 2);
        assert!(result.success);
        assert!(!result.used_fallback);
        assert_eq!(result.passes_completed, 1);
        assert_eq!(result.image.unwrap().bytes, valid_image(1));
    }

    #[tokio::test]
    async fn test_transient_generation_error_retried() {
        let generator = MockGenerator::new(vec![
            Err(GenerationError::Transport("HTTP 503 Service Unavailable".into())),
            Ok(vec![GeneratedPart::image(valid_image(9), "image/png")]),
        ]);
        let editor = orchestrator(generator.clone(), EditorConfig::default());

        let result = editor.edit(&source(), &["a"], None).await;
        assert!(!result.used_fallback);
        assert_eq!(generator.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_generation_error_falls_back() {
        let generator = MockGenerator::new(vec![Err(GenerationError::Blocked("safety".into()))]);
        let editor = orchestrator(generator.clone(), EditorConfig::default());

        let result = editor.edit(&source(), &["a"], None).await;
        assert!(result.success && result.used_fallback);
        assert_eq!(generator.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_reports_failure() {
        let generator = MockGenerator::new(vec![]);
        let editor = EditOrchestrator::new(
            generator,
            Arc::new(MockProcessor { enhance_ok: false }),
            EditorConfig::default(),
            RetryPolicy::none(),
        );

        let result = editor.edit(&source(), &["a"], None).await;
        assert!(!result.success);
        assert!(result.image.is_none());
    }

    #[tokio::test]
    async fn test_empty_improvements_request_natural_polish() {
        let generator = MockGenerator::new(vec![]);
        let editor = orchestrator(generator.clone(), EditorConfig::default().with_policy(EditPolicy::Fast));

        editor.edit::<&str>(&source(), &[], None).await;
        let requests = generator.requests();
        assert!(requests[0].prompt.contains("1. [SUBTLE] Apply natural polish"));
        assert_eq!(requests[0].model, editor.config().fast_model);
    }

    #[tokio::test]
    async fn test_thought_image_accepted_when_alone() {
        let generator = MockGenerator::new(vec![Ok(vec![GeneratedPart::thought_image(
            valid_image(4),
            "image/png",
        )])]);
        let result = orchestrator(generator, EditorConfig::default())
            .edit(&source(), &["a"], None)
            .await;
        assert!(!result.used_fallback);
        assert_eq!(result.image.unwrap().bytes, valid_image(4));
    }

    /// Delegates to [`MockProcessor`], recording the calling thread.
    #[derive(Default)]
    struct ThreadRecordingProcessor {
        threads: Mutex<Vec<std::thread::ThreadId>>,
    }

    impl ThreadRecordingProcessor {
        fn record(&self) {
            self.threads.lock().unwrap().push(std::thread::current().id());
        }
    }

    impl ImageProcessor for ThreadRecordingProcessor {
        fn validate(&self, bytes: &[u8]) -> Result<ImageInfo, ImageError> {
            self.record();
            MockProcessor { enhance_ok: true }.validate(bytes)
        }

        fn enhance(&self, source: &ImageInput, plan: &EnhancementPlan) -> Result<EditedImage, ImageError> {
            self.record();
            MockProcessor { enhance_ok: true }.enhance(source, plan)
        }

        fn reencode(&self, source: &ImageInput) -> Result<EditedImage, ImageError> {
            self.record();
            MockProcessor { enhance_ok: true }.reencode(source)
        }
    }

    #[tokio::test]
    async fn test_image_work_runs_off_the_runtime_thread() {
        let runtime_thread = std::thread::current().id();
        let processor = Arc::new(ThreadRecordingProcessor::default());
        // first pass validates a generated image, second pass falls back
        let generator = MockGenerator::new(vec![
            Ok(vec![GeneratedPart::image(valid_image(1), "image/png")]),
            Ok(vec![GeneratedPart::text("no image")]),
        ]);
        let editor = EditOrchestrator::new(
            generator,
            processor.clone(),
            EditorConfig::default().with_passes(2),
            RetryPolicy::none(),
        );

        let result = editor.edit(&source(), &["Boost contrast", "Lift shadows"], None).await;
        assert!(result.success);

        let fallback = EditOrchestrator::new(
            MockGenerator::new(vec![]),
            processor.clone(),
            EditorConfig::default(),
            RetryPolicy::none(),
        );
        assert!(fallback.edit(&source(), &["a"], None).await.used_fallback);

        let threads = processor.threads.lock().unwrap().clone();
        assert!(threads.len() >= 3);
        assert!(threads.iter().all(|t| *t != runtime_thread));
    }
}
