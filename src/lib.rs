//! Taler - Speaker-Diarized Transcription
//!
//! A resumable batch pipeline that turns raw audio recordings into
//! speaker-labeled transcripts.
//!
//! The name "Taler" comes from the Norwegian/Scandinavian word for "speaker."
//!
//! # Overview
//!
//! Each recording ("item") flows through a fixed stage sequence:
//! resample to 16kHz mono, diarize into speaker turns, recognize each turn
//! against a speech service, then assemble a flat transcript plus a
//! TextGrid annotation document. Every stage persists its output to a
//! well-known location under the item's directory and is skipped on rerun
//! when that artifact already exists, so interrupted batches resume where
//! they stopped.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `layout` - Per-item directory convention and checkpoint checks
//! - `audio` - Resampling, clip extraction, and duration reading
//! - `diarization` - Speaker-turn detection and segment parsing
//! - `recognition` - Speech-to-text with retry, routing, and long-polling
//! - `storage` - Blob upload for the asynchronous recognition path
//! - `transcript` - Transcript and annotation-document assembly
//! - `orchestrator` - Per-item state machine and batch dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use taler::config::Settings;
//! use taler::orchestrator::{Mode, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let summary = orchestrator
//!         .run_all(vec!["interview-01".to_string()], Mode::Diarized)
//!         .await;
//!     println!("{} item(s) succeeded", summary.succeeded());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod diarization;
pub mod error;
mod fsutil;
pub mod layout;
pub mod orchestrator;
pub mod recognition;
pub mod retry;
pub mod storage;
pub mod transcript;

pub use error::{Result, TalerError};
