//! WAV duration reading.
//!
//! The pipeline estimates every duration the same way: exact frame count
//! over sample rate, read from the resampled artifact's header. The value
//! feeds the sync/async routing thresholds, the async poll's initial wait,
//! and the annotation document's tier bounds.

use crate::error::Result;
use std::path::Path;

/// Duration of a WAV file in seconds.
pub fn duration_seconds(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    /// Write a silent 16kHz mono 16-bit WAV of the given duration.
    pub fn write_silence(path: &Path, seconds: f64) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * 16000.0) as usize;
        for _ in 0..frames {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_frame_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        test_support::write_silence(&path, 2.5);

        let duration = duration_seconds(&path).unwrap();
        assert!((duration - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(duration_seconds(Path::new("/nonexistent/never.wav")).is_err());
    }
}
