//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a run that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TalerError};
use crate::orchestrator::Mode;
use std::process::Command;

/// Run pre-flight checks for a pipeline run in the given mode.
pub fn check(settings: &Settings, mode: Mode) -> Result<()> {
    check_api_key()?;
    check_tool("sox")?;
    if mode == Mode::Diarized {
        check_tool("java")?;
        check_jar(settings)?;
    }
    Ok(())
}

/// Check if the Google API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("GOOGLE_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TalerError::Config(
            "GOOGLE_API_KEY is empty. Set it with: export GOOGLE_API_KEY='...'".to_string(),
        )),
        Err(_) => Err(TalerError::Config(
            "GOOGLE_API_KEY not set. Set it with: export GOOGLE_API_KEY='...'".to_string(),
        )),
    }
}

/// Check if an external tool is available in PATH.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(_) => Ok(()),
        Err(_) => Err(TalerError::ToolNotFound(name.to_string())),
    }
}

/// Check that the diarization jar exists.
fn check_jar(settings: &Settings) -> Result<()> {
    let jar = settings.jar_path();
    if jar.exists() {
        Ok(())
    } else {
        Err(TalerError::Config(format!(
            "Diarization jar not found at {}. Set diarization.jar_path in the config file.",
            jar.display()
        )))
    }
}
