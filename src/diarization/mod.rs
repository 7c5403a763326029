//! Diarization stage: speaker turns for one item.
//!
//! Invokes the external diarization binary, parses its segment description
//! into ordered turns, and cuts one clip per turn. If the binary writes no
//! output, the resampled artifact is assumed corrupt: it is rebuilt once and
//! diarization retried once, never more.

mod lium;
pub mod seg;

pub use lium::LiumDiarizer;

use crate::audio::AudioProcessor;
use crate::error::{Result, TalerError};
use crate::fsutil::write_atomic;
use crate::layout::{CheckpointStore, ItemLayout, Stage};
use crate::retry::{retry, RetryPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One speaker turn, in hundredths of a second as emitted by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiarizationTurn {
    /// 1-based position in start-offset order; names the turn's clip.
    pub ordinal: usize,
    /// Speaker label, `<gender>-<speaker id>`.
    pub speaker: String,
    /// Start offset in hundredths of a second.
    pub start_cs: u64,
    /// End offset in hundredths of a second. Always greater than the start.
    pub end_cs: u64,
}

impl DiarizationTurn {
    pub fn start_seconds(&self) -> f64 {
        self.start_cs as f64 / 100.0
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_cs as f64 / 100.0
    }
}

/// External diarization binary.
///
/// A successful return only means the process ran; whether it produced a
/// segment file is the caller's check.
#[async_trait]
pub trait Diarizer: Send + Sync {
    async fn run(&self, item_id: &str, audio: &Path, seg_out: &Path) -> Result<()>;
}

/// Ensure the segment-description artifact exists, self-healing once.
///
/// A run that leaves no output file is the known signature of a corrupted
/// resampled artifact, so the second (and last) attempt re-converts the raw
/// audio first. Two binary invocations total, then the failure is terminal.
#[instrument(skip_all, fields(item = %layout.id()))]
pub async fn ensure_seg(
    layout: &ItemLayout,
    diarizer: &dyn Diarizer,
    processor: &dyn AudioProcessor,
) -> Result<()> {
    let policy = RetryPolicy::immediate(2);
    retry(&policy, |attempt| async move {
        if attempt > 1 {
            info!("No diarization output, rebuilding resampled audio");
            let raw = layout.raw_file()?;
            processor.resample(&raw, &layout.resampled_file()).await?;
        }
        diarizer
            .run(layout.id(), &layout.resampled_file(), &layout.seg_file())
            .await?;
        if layout.seg_file().exists() {
            Ok(())
        } else {
            Err(TalerError::Diarization(format!(
                "no segment output for '{}'",
                layout.id()
            )))
        }
    })
    .await
}

/// Load the item's turn list, parsing the segment description on first use.
///
/// The parsed list is persisted to `temp/turns.json` so reruns skip the
/// parse and, more importantly, see identical ordinals.
pub fn load_turns(layout: &ItemLayout) -> Result<Vec<DiarizationTurn>> {
    let turns_file = layout.turns_file();
    if CheckpointStore::new(layout).is_done(Stage::TurnsParsed) {
        let contents = std::fs::read_to_string(&turns_file)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let contents = std::fs::read_to_string(layout.seg_file())?;
    let turns = seg::parse_seg(&contents, layout.id());
    write_atomic(&turns_file, serde_json::to_string_pretty(&turns)?.as_bytes())?;
    Ok(turns)
}

/// Cut one clip per turn from the resampled artifact.
///
/// Existing clips are kept, so a rerun only cuts what is missing. Returns
/// clip paths in ordinal order.
#[instrument(skip_all, fields(item = %layout.id()))]
pub async fn split_turns(
    layout: &ItemLayout,
    turns: &[DiarizationTurn],
    processor: &dyn AudioProcessor,
) -> Result<Vec<PathBuf>> {
    let resampled = layout.resampled_file();
    let mut clips = Vec::with_capacity(turns.len());

    for turn in turns {
        let clip = layout.turn_clip(turn.ordinal, &turn.speaker);
        if !clip.exists() {
            processor
                .extract(&resampled, &clip, turn.start_seconds(), turn.end_seconds())
                .await?;
        }
        clips.push(clip);
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Diarizer stub that writes output starting from a given invocation.
    struct FlakyDiarizer {
        calls: Arc<AtomicU32>,
        succeed_from: u32,
    }

    #[async_trait]
    impl Diarizer for FlakyDiarizer {
        async fn run(&self, item_id: &str, _audio: &Path, seg_out: &Path) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_from {
                std::fs::create_dir_all(seg_out.parent().unwrap())?;
                std::fs::write(seg_out, format!("{} 1 0 100 M S U S0\n", item_id))?;
            }
            Ok(())
        }
    }

    /// Processor stub that records invocations and copies bytes around.
    struct RecordingProcessor {
        resamples: Arc<AtomicU32>,
    }

    #[async_trait]
    impl AudioProcessor for RecordingProcessor {
        async fn resample(&self, _source: &Path, dest: &Path) -> Result<()> {
            self.resamples.fetch_add(1, Ordering::SeqCst);
            std::fs::create_dir_all(dest.parent().unwrap())?;
            std::fs::write(dest, b"resampled")?;
            Ok(())
        }

        async fn extract(&self, _source: &Path, dest: &Path, _start: f64, _end: f64) -> Result<()> {
            std::fs::create_dir_all(dest.parent().unwrap())?;
            std::fs::write(dest, b"clip")?;
            Ok(())
        }
    }

    fn fixture(dir: &Path) -> ItemLayout {
        let layout = ItemLayout::new(dir, "item");
        std::fs::create_dir_all(layout.raw_dir()).unwrap();
        std::fs::write(layout.raw_dir().join("item.wav"), b"raw").unwrap();
        let resampled = layout.resampled_file();
        std::fs::create_dir_all(resampled.parent().unwrap()).unwrap();
        std::fs::write(&resampled, b"resampled").unwrap();
        layout
    }

    #[tokio::test]
    async fn test_self_heal_reconverts_once_then_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let layout = fixture(dir.path());
        let calls = Arc::new(AtomicU32::new(0));
        let resamples = Arc::new(AtomicU32::new(0));

        let diarizer = FlakyDiarizer {
            calls: calls.clone(),
            succeed_from: 2,
        };
        let processor = RecordingProcessor {
            resamples: resamples.clone(),
        };

        ensure_seg(&layout, &diarizer, &processor).await.unwrap();

        assert!(layout.seg_file().exists());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resamples.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_self_heal_is_capped_at_one_retry() {
        let dir = tempfile::tempdir().unwrap();
        let layout = fixture(dir.path());
        let calls = Arc::new(AtomicU32::new(0));

        let diarizer = FlakyDiarizer {
            calls: calls.clone(),
            succeed_from: u32::MAX,
        };
        let processor = RecordingProcessor {
            resamples: Arc::new(AtomicU32::new(0)),
        };

        let result = ensure_seg(&layout, &diarizer, &processor).await;

        assert!(matches!(result, Err(TalerError::Diarization(_))));
        // Exactly two binary invocations: the original and the one retry.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_turns_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let layout = fixture(dir.path());
        std::fs::create_dir_all(layout.diarization_dir()).unwrap();
        std::fs::write(
            layout.seg_file(),
            "item 1 200 100 M S U S1\nitem 1 0 150 F S U S0\n",
        )
        .unwrap();

        let turns = load_turns(&layout).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, "F-S0");
        assert!(layout.turns_file().exists());

        // A rerun reads the persisted list, even if the seg file vanishes.
        std::fs::remove_file(layout.seg_file()).unwrap();
        let again = load_turns(&layout).unwrap();
        assert_eq!(again, turns);
    }

    #[tokio::test]
    async fn test_split_turns_skips_existing_clips() {
        let dir = tempfile::tempdir().unwrap();
        let layout = fixture(dir.path());
        let turns = vec![
            DiarizationTurn {
                ordinal: 1,
                speaker: "F-S0".into(),
                start_cs: 0,
                end_cs: 150,
            },
            DiarizationTurn {
                ordinal: 2,
                speaker: "M-S1".into(),
                start_cs: 200,
                end_cs: 300,
            },
        ];

        // Pre-cut the first clip; only the second should be produced.
        let first = layout.turn_clip(1, "F-S0");
        std::fs::create_dir_all(first.parent().unwrap()).unwrap();
        std::fs::write(&first, b"existing").unwrap();

        let processor = RecordingProcessor {
            resamples: Arc::new(AtomicU32::new(0)),
        };
        let clips = split_turns(&layout, &turns, &processor).await.unwrap();

        assert_eq!(clips, vec![first.clone(), layout.turn_clip(2, "M-S1")]);
        assert_eq!(std::fs::read(&first).unwrap(), b"existing");
        assert!(layout.turn_clip(2, "M-S1").exists());
    }
}
