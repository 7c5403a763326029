//! External audio transform invocation.
//!
//! Both pipeline uses of audio manipulation, resampling the raw source and
//! cutting per-turn clips, are transforms of the same external tool, so they
//! share one injectable trait.

use crate::error::{Result, TalerError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// External audio transform used by the conversion and segmentation stages.
#[async_trait]
pub trait AudioProcessor: Send + Sync {
    /// Resample `source` to 16kHz mono 16-bit PCM at `dest`.
    async fn resample(&self, source: &Path, dest: &Path) -> Result<()>;

    /// Extract `[start, end)` seconds of `source` into `dest`.
    async fn extract(&self, source: &Path, dest: &Path, start: f64, end: f64) -> Result<()>;
}

/// Production transform backed by the `sox` binary.
pub struct SoxProcessor;

impl SoxProcessor {
    async fn run_sox(args: Vec<String>) -> Result<()> {
        let result = Command::new("sox")
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TalerError::ToolNotFound("sox".into()));
            }
            Err(e) => {
                return Err(TalerError::Conversion(format!("sox execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TalerError::Conversion(format!("sox failed: {stderr}")));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioProcessor for SoxProcessor {
    async fn resample(&self, source: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Resampling {:?} to 16kHz mono", source);
        let args = vec![
            source.to_string_lossy().into_owned(),
            "-r".into(),
            "16000".into(),
            "-c".into(),
            "1".into(),
            "-b".into(),
            "16".into(),
            dest.to_string_lossy().into_owned(),
        ];
        Self::run_sox(args).await?;

        // sox can exit zero yet write nothing for some inputs.
        if !dest.exists() {
            return Err(TalerError::Conversion(format!(
                "no resampled output at {:?}",
                dest
            )));
        }
        Ok(())
    }

    async fn extract(&self, source: &Path, dest: &Path, start: f64, end: f64) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Extracting [{:.2}, {:.2}) from {:?}", start, end, source);
        let args = vec![
            source.to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
            "trim".into(),
            format!("{:.3}", start),
            format!("{:.3}", end - start),
        ];
        Self::run_sox(args).await
    }
}
