//! Progress reporting for batch runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use refract_application::{ProgressNotifier, Stage};
use refract_domain::{BatchSummary, ConsensusResult, EditResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one spinner per in-flight image and an overall bar
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
    overall: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            overall: Mutex::new(None),
        }
    }

    fn overall_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, image: &str, f: impl FnOnce(&ProgressBar)) {
        if let Ok(bars) = self.bars.lock()
            && let Some(pb) = bars.get(image)
        {
            f(pb);
        }
    }

    fn println(&self, line: String) {
        // MultiProgress only fails when the terminal is gone
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_run_start(&self, valid: usize, _invalid: usize, workers: usize) {
        let pb = self.multi.add(ProgressBar::new(valid as u64));
        pb.set_style(Self::overall_style());
        pb.set_prefix("Images");
        pb.set_message(format!("{} worker(s)", workers));
        if let Ok(mut overall) = self.overall.lock() {
            *overall = Some(pb);
        }
    }

    fn on_invalid_image(&self, path: &Path, error: &str) {
        self.println(format!(
            "{} {} skipped: {}",
            "!".yellow(),
            path.display(),
            error
        ));
    }

    fn on_image_start(&self, image: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(image.to_string());
        pb.set_message("starting");
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(image.to_string(), pb);
        }
    }

    fn on_stage(&self, image: &str, stage: Stage) {
        self.with_bar(image, |pb| pb.set_message(stage.as_str()));
    }

    fn on_backend_complete(&self, image: &str, backend: &str, success: bool) {
        let mark = if success { "v".green() } else { "x".red() };
        self.with_bar(image, |pb| pb.set_message(format!("{} {}", mark, backend)));
    }

    fn on_critique(&self, image: &str, consensus: &ConsensusResult) {
        let line = format!(
            "  {} {}: consensus {:.1} from {}/{} backend(s)",
            "*".cyan(),
            image,
            consensus.consensus_score,
            consensus.successful_count(),
            consensus.critiques.len()
        );
        self.println(line);
    }

    fn on_edit(&self, image: &str, result: &EditResult) {
        if result.used_fallback {
            self.println(format!(
                "  {} {}: generation failed, used local enhancement",
                "!".yellow(),
                image
            ));
        }
    }

    fn on_image_complete(&self, image: &str, success: bool, detail: Option<&str>) {
        let bar = self.bars.lock().ok().and_then(|mut bars| bars.remove(image));
        if let Some(pb) = bar {
            let message = match (success, detail) {
                (true, Some(d)) => format!("{} {}", "done".green(), d),
                (true, None) => "done".green().to_string(),
                (false, d) => format!("{} {}", "failed".red(), d.unwrap_or("")),
            };
            pb.finish_with_message(message);
        }
        if let Ok(overall) = self.overall.lock()
            && let Some(pb) = overall.as_ref()
        {
            pb.inc(1);
        }
    }

    fn on_site_rebuild(&self, result: Result<usize, &str>) {
        match result {
            Ok(n) => self.println(format!("{} Site index rebuilt ({} entries)", "v".green(), n)),
            Err(e) => self.println(format!("{} Site rebuild failed: {}", "x".red(), e)),
        }
    }

    fn on_run_complete(&self, _summary: &BatchSummary) {
        if let Ok(mut overall) = self.overall.lock()
            && let Some(pb) = overall.take()
        {
            pb.finish_with_message("complete".green().to_string());
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_run_start(&self, valid: usize, invalid: usize, workers: usize) {
        println!(
            "{} {} image(s), {} invalid, {} worker(s)",
            "->".cyan(),
            valid.to_string().bold(),
            invalid,
            workers
        );
    }

    fn on_invalid_image(&self, path: &Path, error: &str) {
        println!("  {} {} ({})", "!".yellow(), path.display(), error);
    }

    fn on_image_start(&self, image: &str) {
        println!("  {} {}", "->".cyan(), image);
    }

    fn on_image_complete(&self, image: &str, success: bool, detail: Option<&str>) {
        if success {
            println!("  {} {}", "v".green(), image);
        } else {
            println!(
                "  {} {} ({})",
                "x".red(),
                image,
                detail.unwrap_or("failed")
            );
        }
    }

    fn on_site_rebuild(&self, result: Result<usize, &str>) {
        if let Err(e) = result {
            println!("  {} site rebuild failed: {}", "x".red(), e);
        }
    }
}
