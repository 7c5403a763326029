//! Pipeline orchestrator.
//!
//! Sequences the stages for one item behind checkpoint guards and fans a
//! batch of items out over a bounded worker pool. All cross-stage
//! coordination goes through the per-item directory tree; items own
//! disjoint subtrees, so no locking is needed as long as an id is
//! dispatched at most once per run, which `run_all` guarantees by
//! deduplicating its input.

use crate::audio::{AudioProcessor, SoxProcessor};
use crate::config::Settings;
use crate::diarization::{self, Diarizer, LiumDiarizer};
use crate::error::{Result, TalerError};
use crate::layout::{CheckpointStore, ItemLayout, Stage};
use crate::recognition::{GoogleRecognizer, RecognitionEngine, Recognizer};
use crate::storage::{GcsUploader, Uploader};
use crate::transcript;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// How an item is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Diarize into speaker turns, recognize each turn, assemble a
    /// transcript and annotation document.
    #[default]
    Diarized,
    /// Recognize the whole file, routed sync or async by duration.
    Whole,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diarized" | "diarize" => Ok(Mode::Diarized),
            "whole" | "auto" => Ok(Mode::Whole),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Diarized => write!(f, "diarized"),
            Mode::Whole => write!(f, "whole"),
        }
    }
}

/// Result of running one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pipeline ran to its terminal state in this invocation.
    Completed,
    /// Every checkpoint was already present; nothing ran.
    AlreadyComplete,
}

/// One item's result within a batch.
#[derive(Debug)]
pub struct ItemReport {
    pub id: String,
    pub outcome: Result<RunOutcome>,
}

/// Results of a batch run, in completion order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<ItemReport>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }
}

/// The main orchestrator for the Taler pipeline.
pub struct Orchestrator {
    settings: Settings,
    data_dir: PathBuf,
    processor: Arc<dyn AudioProcessor>,
    diarizer: Arc<dyn Diarizer>,
    engine: RecognitionEngine,
}

impl Orchestrator {
    /// Create an orchestrator with the production service clients.
    pub fn new(settings: Settings) -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            TalerError::Config(
                "GOOGLE_API_KEY not set. Set it with: export GOOGLE_API_KEY='...'".to_string(),
            )
        })?;

        let recognizer: Arc<dyn Recognizer> = Arc::new(GoogleRecognizer::new(
            api_key.clone(),
            settings.recognition.language_code.clone(),
            settings.recognition.sample_rate,
        ));
        let uploader: Arc<dyn Uploader> =
            Arc::new(GcsUploader::new(api_key, settings.storage.bucket.clone()));
        let diarizer: Arc<dyn Diarizer> = Arc::new(LiumDiarizer::new(
            settings.jar_path(),
            settings.diarization.java_memory_mb,
        ));

        Ok(Self::with_components(
            settings,
            Arc::new(SoxProcessor),
            diarizer,
            recognizer,
            uploader,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        processor: Arc<dyn AudioProcessor>,
        diarizer: Arc<dyn Diarizer>,
        recognizer: Arc<dyn Recognizer>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        let engine =
            RecognitionEngine::new(recognizer, uploader, settings.recognition.clone());
        let data_dir = settings.data_dir();
        Self {
            settings,
            data_dir,
            processor,
            diarizer,
            engine,
        }
    }

    /// Run the pipeline for one item, skipping stages whose checkpoint
    /// artifact already exists.
    #[instrument(skip(self), fields(mode = %mode))]
    pub async fn run_item(&self, id: &str, mode: Mode) -> Result<RunOutcome> {
        let item = ItemLayout::new(&self.data_dir, id);
        let checkpoints = CheckpointStore::new(&item);

        // Short-circuit fully processed items before touching anything.
        let terminal = match mode {
            Mode::Diarized => checkpoints.is_done(Stage::Assembled),
            Mode::Whole => {
                checkpoints.is_done(Stage::SyncRecognized)
                    || checkpoints.is_done(Stage::AsyncRecognized)
            }
        };
        if terminal {
            info!("Item {} already complete", id);
            return Ok(RunOutcome::AlreadyComplete);
        }

        let raw = item.raw_file()?;

        if !checkpoints.is_done(Stage::Converted) {
            self.processor
                .resample(&raw, &item.resampled_file())
                .await?;
            info!("Resampled {}", id);
        }

        match mode {
            Mode::Whole => {
                self.engine.recognize_whole(&item).await?;
            }
            Mode::Diarized => {
                if !checkpoints.is_done(Stage::Diarized) {
                    diarization::ensure_seg(&item, self.diarizer.as_ref(), self.processor.as_ref())
                        .await?;
                    info!("Diarized {}", id);
                }

                let turns = diarization::load_turns(&item)?;
                let clips =
                    diarization::split_turns(&item, &turns, self.processor.as_ref()).await?;
                let texts = self.engine.recognize_turns(&item, &turns, &clips).await?;
                transcript::assemble(&item, &turns, &texts)?;
            }
        }

        Ok(RunOutcome::Completed)
    }

    /// Run a batch of items over a bounded worker pool.
    ///
    /// Ids are deduplicated so no item is processed twice concurrently.
    /// Each item's failure is captured and logged in its report; it never
    /// aborts or blocks the others.
    pub async fn run_all(&self, ids: Vec<String>, mode: Mode) -> BatchSummary {
        let mut seen = HashSet::new();
        let unique: Vec<String> = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let workers = self.settings.batch.effective_workers();
        info!("Dispatching {} items over {} workers", unique.len(), workers);

        let pb = ProgressBar::new(unique.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Items     [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        let reports: Vec<ItemReport> = stream::iter(unique)
            .map(|id| {
                let pb = pb.clone();
                async move {
                    let outcome = self.run_item(&id, mode).await;
                    if let Err(e) = &outcome {
                        error!("Item {} failed: {}", id, e);
                    }
                    pb.inc(1);
                    ItemReport { id, outcome }
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        pb.finish_and_clear();
        BatchSummary { reports }
    }
}

/// List the item ids under a data directory, sorted.
///
/// Every subdirectory is an item by convention.
pub fn discover_items(data_dir: &Path) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(data_dir)?.flatten() {
        if entry.path().is_dir() {
            if let Ok(name) = entry.file_name().into_string() {
                ids.push(name);
            }
        }
    }
    ids.sort();
    Ok(ids)
}
