//! LIUM speaker diarization runner.

use super::Diarizer;
use crate::error::{Result, TalerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

/// Runs the LIUM speaker diarization jar under the JVM.
pub struct LiumDiarizer {
    jar_path: PathBuf,
    memory_mb: u32,
}

impl LiumDiarizer {
    pub fn new(jar_path: PathBuf, memory_mb: u32) -> Self {
        Self {
            jar_path,
            memory_mb,
        }
    }
}

#[async_trait]
impl Diarizer for LiumDiarizer {
    async fn run(&self, item_id: &str, audio: &Path, seg_out: &Path) -> Result<()> {
        if let Some(parent) = seg_out.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let result = Command::new("java")
            .arg(format!("-Xmx{}m", self.memory_mb))
            .arg("-jar")
            .arg(&self.jar_path)
            .arg(format!("--fInputMask={}", audio.display()))
            .arg(format!("--sOutputMask={}", seg_out.display()))
            .arg("--doCEClustering")
            .arg(item_id)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            // The jar's exit code is unreliable; the presence of the segment
            // file is what decides success, checked by the caller.
            Ok(status) => {
                if !status.success() {
                    warn!("Diarization binary exited with {} for {}", status, item_id);
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TalerError::ToolNotFound("java".into()))
            }
            Err(e) => Err(TalerError::Diarization(format!(
                "failed to launch diarization binary: {e}"
            ))),
        }
    }
}
