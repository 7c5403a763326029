//! Per-item directory layout and checkpoint checks.
//!
//! Every stage derives its artifact paths from [`ItemLayout`] so that the
//! stages and the checkpoint checks can never disagree on a location. The
//! layout is a pure value; the only I/O it performs is existence checks.
//!
//! Per-item convention under the data directory:
//!
//! ```text
//! <data_dir>/<id>/
//!     raw/                      exactly one source file
//!     resampled/<id>.wav        16kHz mono 16-bit PCM
//!     diarization/<id>.seg      segment description
//!     diarization/<n>-<spk>.wav per-turn clips
//!     transcript/googleapi/     flat transcripts
//!     transcript/textgrid/      interval annotation document
//!     temp/                     sub-stage checkpoints
//! ```

use crate::error::{Result, TalerError};
use std::path::{Path, PathBuf};

/// Artifact paths for one item, derived from its id.
#[derive(Debug, Clone)]
pub struct ItemLayout {
    id: String,
    item_dir: PathBuf,
}

impl ItemLayout {
    /// Derive the layout for an item id under a data directory.
    pub fn new(data_dir: &Path, id: &str) -> Self {
        Self {
            id: id.to_string(),
            item_dir: data_dir.join(id),
        }
    }

    /// Item id this layout belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root directory for the item's artifacts.
    pub fn item_dir(&self) -> &Path {
        &self.item_dir
    }

    /// Directory holding the single raw source file.
    pub fn raw_dir(&self) -> PathBuf {
        self.item_dir.join("raw")
    }

    /// Locate the raw source file.
    ///
    /// The convention requires exactly one file under `raw/`; zero or more
    /// than one is reported as missing input.
    pub fn raw_file(&self) -> Result<PathBuf> {
        let raw_dir = self.raw_dir();
        let mut files: Vec<PathBuf> = Vec::new();
        let entries = std::fs::read_dir(&raw_dir)
            .map_err(|_| TalerError::MissingInput(self.id.clone()))?;
        for entry in entries.flatten() {
            if entry.path().is_file() {
                files.push(entry.path());
            }
        }
        match files.len() {
            1 => Ok(files.remove(0)),
            _ => Err(TalerError::MissingInput(self.id.clone())),
        }
    }

    /// The resampled 16kHz mono artifact.
    pub fn resampled_file(&self) -> PathBuf {
        self.item_dir
            .join("resampled")
            .join(format!("{}.wav", self.id))
    }

    /// Directory holding the segment description and per-turn clips.
    pub fn diarization_dir(&self) -> PathBuf {
        self.item_dir.join("diarization")
    }

    /// The diarization segment-description file.
    pub fn seg_file(&self) -> PathBuf {
        self.diarization_dir().join(format!("{}.seg", self.id))
    }

    /// Clip path for one diarized turn.
    pub fn turn_clip(&self, ordinal: usize, speaker: &str) -> PathBuf {
        self.diarization_dir()
            .join(format!("{}-{}.wav", ordinal, speaker))
    }

    /// Directory for flat transcripts.
    pub fn transcript_dir(&self) -> PathBuf {
        self.item_dir.join("transcript").join("googleapi")
    }

    /// Flat transcript for the diarized pipeline.
    pub fn transcript_file(&self) -> PathBuf {
        self.transcript_dir().join(format!("{}.txt", self.id))
    }

    /// Flat transcript for whole-file synchronous recognition.
    pub fn transcript_sync_file(&self) -> PathBuf {
        self.transcript_dir().join(format!("{}-sync.txt", self.id))
    }

    /// Flat transcript for whole-file asynchronous recognition.
    pub fn transcript_async_file(&self) -> PathBuf {
        self.transcript_dir().join(format!("{}-async.txt", self.id))
    }

    /// The interval-annotation document.
    pub fn textgrid_file(&self) -> PathBuf {
        self.item_dir
            .join("transcript")
            .join("textgrid")
            .join(format!("{}.TextGrid", self.id))
    }

    /// Directory for sub-stage checkpoints.
    pub fn temp_dir(&self) -> PathBuf {
        self.item_dir.join("temp")
    }

    /// Parsed turn list, persisted after the segment description is read.
    pub fn turns_file(&self) -> PathBuf {
        self.temp_dir().join("turns.json")
    }

    /// Per-turn recognition result, keyed by turn ordinal.
    ///
    /// Presence marks the turn as recognized; an empty file records
    /// "no speech detected".
    pub fn turn_result_file(&self, ordinal: usize) -> PathBuf {
        self.temp_dir().join("trans").join(format!("{}.txt", ordinal))
    }
}

/// Pipeline stages whose completion is visible on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resampled artifact written.
    Converted,
    /// Segment description written.
    Diarized,
    /// Turn list parsed and persisted.
    TurnsParsed,
    /// One turn's recognition result written.
    TurnRecognized(usize),
    /// Flat transcript and annotation document written.
    Assembled,
    /// Whole-file synchronous transcript written.
    SyncRecognized,
    /// Whole-file asynchronous transcript written.
    AsyncRecognized,
}

/// Answers "has stage X completed for this item" from artifact presence.
///
/// The store never inspects artifact content; corruption recovery is the
/// owning stage's concern.
pub struct CheckpointStore<'a> {
    layout: &'a ItemLayout,
}

impl<'a> CheckpointStore<'a> {
    pub fn new(layout: &'a ItemLayout) -> Self {
        Self { layout }
    }

    /// Whether the stage's output artifact exists.
    pub fn is_done(&self, stage: Stage) -> bool {
        match stage {
            Stage::Converted => self.layout.resampled_file().exists(),
            Stage::Diarized => self.layout.seg_file().exists(),
            Stage::TurnsParsed => self.layout.turns_file().exists(),
            Stage::TurnRecognized(ordinal) => self.layout.turn_result_file(ordinal).exists(),
            Stage::Assembled => {
                self.layout.transcript_file().exists() && self.layout.textgrid_file().exists()
            }
            Stage::SyncRecognized => self.layout.transcript_sync_file().exists(),
            Stage::AsyncRecognized => self.layout.transcript_async_file().exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced_by_id() {
        let layout = ItemLayout::new(Path::new("/data"), "interview-01");
        assert_eq!(
            layout.resampled_file(),
            PathBuf::from("/data/interview-01/resampled/interview-01.wav")
        );
        assert_eq!(
            layout.seg_file(),
            PathBuf::from("/data/interview-01/diarization/interview-01.seg")
        );
        assert_eq!(
            layout.turn_clip(3, "M-S0"),
            PathBuf::from("/data/interview-01/diarization/3-M-S0.wav")
        );
        assert_eq!(
            layout.textgrid_file(),
            PathBuf::from("/data/interview-01/transcript/textgrid/interview-01.TextGrid")
        );
        assert_eq!(
            layout.turn_result_file(2),
            PathBuf::from("/data/interview-01/temp/trans/2.txt")
        );
    }

    #[test]
    fn test_raw_file_requires_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ItemLayout::new(dir.path(), "item");

        // No raw directory at all.
        assert!(matches!(
            layout.raw_file(),
            Err(TalerError::MissingInput(_))
        ));

        // Empty raw directory.
        std::fs::create_dir_all(layout.raw_dir()).unwrap();
        assert!(matches!(
            layout.raw_file(),
            Err(TalerError::MissingInput(_))
        ));

        // Exactly one file.
        std::fs::write(layout.raw_dir().join("a.wav"), b"x").unwrap();
        assert_eq!(layout.raw_file().unwrap(), layout.raw_dir().join("a.wav"));

        // Two files break the convention.
        std::fs::write(layout.raw_dir().join("b.wav"), b"x").unwrap();
        assert!(matches!(
            layout.raw_file(),
            Err(TalerError::MissingInput(_))
        ));
    }

    #[test]
    fn test_checkpoints_track_artifact_presence() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ItemLayout::new(dir.path(), "item");
        let checkpoints = CheckpointStore::new(&layout);

        assert!(!checkpoints.is_done(Stage::Converted));
        assert!(!checkpoints.is_done(Stage::Assembled));

        let resampled = layout.resampled_file();
        std::fs::create_dir_all(resampled.parent().unwrap()).unwrap();
        std::fs::write(&resampled, b"wav").unwrap();
        assert!(checkpoints.is_done(Stage::Converted));

        // Assembled requires both artifacts.
        let transcript = layout.transcript_file();
        std::fs::create_dir_all(transcript.parent().unwrap()).unwrap();
        std::fs::write(&transcript, b"line").unwrap();
        assert!(!checkpoints.is_done(Stage::Assembled));

        let textgrid = layout.textgrid_file();
        std::fs::create_dir_all(textgrid.parent().unwrap()).unwrap();
        std::fs::write(&textgrid, b"grid").unwrap();
        assert!(checkpoints.is_done(Stage::Assembled));
    }

    #[test]
    fn test_turn_checkpoints_keyed_by_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ItemLayout::new(dir.path(), "item");
        let checkpoints = CheckpointStore::new(&layout);

        let result = layout.turn_result_file(1);
        std::fs::create_dir_all(result.parent().unwrap()).unwrap();
        std::fs::write(&result, b"").unwrap();

        assert!(checkpoints.is_done(Stage::TurnRecognized(1)));
        assert!(!checkpoints.is_done(Stage::TurnRecognized(2)));
    }
}
