//! Audio processing for Taler.
//!
//! Wraps the external `sox` transform for resampling and clip extraction,
//! and reads durations from resampled WAV artifacts.

mod processor;
pub mod wav;

pub use processor::{AudioProcessor, SoxProcessor};
