//! Transcript assembly stage.
//!
//! Merges per-turn recognition results, in ordinal order, into the flat
//! transcript and the TextGrid annotation document. Both files are written
//! atomically so a partial write can never pass as a completed checkpoint.

pub mod textgrid;

use crate::audio::wav;
use crate::diarization::DiarizationTurn;
use crate::error::{Result, TalerError};
use crate::fsutil::write_atomic;
use crate::layout::ItemLayout;
use textgrid::Interval;
use tracing::{info, instrument};

/// Write the flat transcript and annotation document for an item.
///
/// `texts` holds one recognized transcript per turn, in ordinal order. The
/// annotation tier spans `[0, duration]` with the duration measured from
/// the resampled artifact.
#[instrument(skip_all, fields(item = %item.id()))]
pub fn assemble(item: &ItemLayout, turns: &[DiarizationTurn], texts: &[String]) -> Result<()> {
    if turns.len() != texts.len() {
        return Err(TalerError::Recognition(format!(
            "{} turns but {} recognition results for '{}'",
            turns.len(),
            texts.len(),
            item.id()
        )));
    }

    let duration = wav::duration_seconds(&item.resampled_file())?;

    let mut transcript = String::new();
    for text in texts {
        transcript.push_str(text);
        transcript.push('\n');
    }
    write_atomic(&item.transcript_file(), transcript.as_bytes())?;

    let intervals: Vec<Interval> = turns
        .iter()
        .zip(texts)
        .map(|(turn, text)| Interval {
            xmin: turn.start_seconds(),
            xmax: turn.end_seconds(),
            text: text.clone(),
        })
        .collect();
    write_atomic(
        &item.textgrid_file(),
        textgrid::render(duration, &intervals).as_bytes(),
    )?;

    info!("Transcript and TextGrid written for {}", item.id());
    Ok(())
}
