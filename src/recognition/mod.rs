//! Speech recognition stage.
//!
//! Three modes over one service contract:
//!
//! - whole-file synchronous, for items under the sync ceiling;
//! - whole-file asynchronous (upload, submit, long-poll), up to the async
//!   ceiling, beyond which the item is rejected;
//! - per-turn synchronous for diarized clips, with bounded retry/backoff
//!   and graceful degradation to an empty transcript.
//!
//! Per-turn results are checkpointed as they arrive, so a crash mid-item
//! never re-recognizes completed turns.

mod google;

pub use google::GoogleRecognizer;

use crate::config::RecognitionSettings;
use crate::diarization::DiarizationTurn;
use crate::error::{Result, TalerError};
use crate::fsutil::write_atomic;
use crate::layout::{CheckpointStore, ItemLayout, Stage};
use crate::retry::{retry, RetryPolicy};
use crate::storage::Uploader;
use crate::audio::wav;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// External speech recognition service.
///
/// All calls return the best transcript per recognized result; an empty
/// vector means the service heard nothing, which is not an error.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Blocking recognition of raw LINEAR16 audio bytes.
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<String>>;

    /// Submit an asynchronous job over an uploaded object; returns the
    /// operation id to poll.
    async fn start_async(&self, uri: &str) -> Result<String>;

    /// One status check. `None` while the job is still running.
    async fn poll(&self, operation_id: &str) -> Result<Option<Vec<String>>>;
}

/// Recognition policy layer: routing, retry, checkpointing.
pub struct RecognitionEngine {
    recognizer: Arc<dyn Recognizer>,
    uploader: Arc<dyn Uploader>,
    settings: RecognitionSettings,
}

impl RecognitionEngine {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        uploader: Arc<dyn Uploader>,
        settings: RecognitionSettings,
    ) -> Self {
        Self {
            recognizer,
            uploader,
            settings,
        }
    }

    /// Recognize every diarized turn, in ordinal order.
    ///
    /// Each turn gets up to the configured number of attempts with
    /// exponential backoff; a turn that keeps failing is recorded as an
    /// empty transcript and processing moves on. Results are written to the
    /// per-turn checkpoint files as they become available, and turns whose
    /// checkpoint already exists are not re-recognized.
    #[instrument(skip_all, fields(item = %item.id()))]
    pub async fn recognize_turns(
        &self,
        item: &ItemLayout,
        turns: &[DiarizationTurn],
        clips: &[PathBuf],
    ) -> Result<Vec<String>> {
        let checkpoints = CheckpointStore::new(item);
        let policy = RetryPolicy::exponential(self.settings.turn_max_attempts);
        let mut texts = Vec::with_capacity(turns.len());

        for (turn, clip) in turns.iter().zip(clips) {
            let result_file = item.turn_result_file(turn.ordinal);
            if checkpoints.is_done(Stage::TurnRecognized(turn.ordinal)) {
                texts.push(std::fs::read_to_string(&result_file)?);
                continue;
            }

            let text = self.recognize_clip(clip, &policy).await.unwrap_or_else(|e| {
                warn!(
                    "Turn {} of {} failed after {} attempts ({}), recording empty transcript",
                    turn.ordinal,
                    item.id(),
                    self.settings.turn_max_attempts,
                    e
                );
                String::new()
            });

            write_atomic(&result_file, text.as_bytes())?;
            texts.push(text);
        }

        Ok(texts)
    }

    /// One clip through the retry policy. Turn transcripts are joined with
    /// spaces, matching the flat-transcript line format.
    async fn recognize_clip(&self, clip: &Path, policy: &RetryPolicy) -> Result<String> {
        let bytes = tokio::fs::read(clip).await?;
        let audio: &[u8] = &bytes;
        let recognizer = self.recognizer.as_ref();
        let lines = retry(policy, |_| async move { recognizer.recognize(audio).await }).await?;
        Ok(lines.join(" "))
    }

    /// Whole-file recognition, routed by measured duration.
    ///
    /// Under the sync ceiling: one blocking call, no retry. Between the
    /// ceilings: upload, submit, then long-poll. At or beyond the async
    /// ceiling: rejected before any network call. Returns the transcript
    /// artifact path.
    #[instrument(skip_all, fields(item = %item.id()))]
    pub async fn recognize_whole(&self, item: &ItemLayout) -> Result<PathBuf> {
        let checkpoints = CheckpointStore::new(item);
        if checkpoints.is_done(Stage::SyncRecognized) {
            return Ok(item.transcript_sync_file());
        }
        if checkpoints.is_done(Stage::AsyncRecognized) {
            return Ok(item.transcript_async_file());
        }

        let duration = wav::duration_seconds(&item.resampled_file())?;
        if duration >= self.settings.async_limit_seconds as f64 {
            return Err(TalerError::TooLong {
                item: item.id().to_string(),
                seconds: duration,
                limit: self.settings.async_limit_seconds,
            });
        }

        if duration < self.settings.sync_limit_seconds as f64 {
            self.recognize_whole_sync(item).await
        } else {
            self.recognize_whole_async(item, duration).await
        }
    }

    async fn recognize_whole_sync(&self, item: &ItemLayout) -> Result<PathBuf> {
        info!("Recognizing {} synchronously", item.id());
        let bytes = tokio::fs::read(item.resampled_file()).await?;
        let lines = self.recognizer.recognize(&bytes).await?;

        let path = item.transcript_sync_file();
        write_atomic(&path, render_lines(&lines).as_bytes())?;
        Ok(path)
    }

    async fn recognize_whole_async(&self, item: &ItemLayout, duration: f64) -> Result<PathBuf> {
        info!(
            "Recognizing {} asynchronously ({:.0}s of audio)",
            item.id(),
            duration
        );
        let uri = self
            .uploader
            .upload(item.id(), &item.resampled_file())
            .await?;
        let operation_id = self.recognizer.start_async(&uri).await?;

        // Processing time roughly tracks audio duration, so wait that long
        // before the first status check.
        tokio::time::sleep(Duration::from_secs_f64(duration)).await;

        for _ in 0..self.settings.poll_attempts {
            if let Some(lines) = self.recognizer.poll(&operation_id).await? {
                let path = item.transcript_async_file();
                write_atomic(&path, render_lines(&lines).as_bytes())?;
                return Ok(path);
            }
            tokio::time::sleep(Duration::from_secs(self.settings.poll_interval_seconds)).await;
        }

        // No checkpoint is written, so a rerun retries this stage from
        // scratch.
        Err(TalerError::RecognitionTimedOut(item.id().to_string()))
    }
}

/// Whole-file transcripts carry one recognized result per line.
fn render_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
