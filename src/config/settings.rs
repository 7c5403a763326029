//! Configuration settings for Taler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub recognition: RecognitionSettings,
    pub diarization: DiarizationSettings,
    pub storage: StorageSettings,
    pub batch: BatchSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory holding one subdirectory per item.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.taler/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Language code sent with every recognition request.
    pub language_code: String,
    /// Sample rate of the resampled audio in Hz.
    pub sample_rate: u32,
    /// Items shorter than this are recognized with a single blocking call.
    pub sync_limit_seconds: u64,
    /// Items longer than this are rejected outright.
    pub async_limit_seconds: u64,
    /// Poll attempts for an asynchronous recognition job.
    pub poll_attempts: u32,
    /// Seconds between poll attempts.
    pub poll_interval_seconds: u64,
    /// Recognition attempts per diarized turn before giving up on it.
    pub turn_max_attempts: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            sample_rate: 16000,
            sync_limit_seconds: 60,
            async_limit_seconds: 4800, // 80 minutes
            poll_attempts: 10,
            poll_interval_seconds: 30,
            turn_max_attempts: 5,
        }
    }
}

/// Diarization binary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiarizationSettings {
    /// Path to the LIUM speaker diarization jar.
    pub jar_path: String,
    /// JVM heap ceiling in megabytes.
    pub java_memory_mb: u32,
}

impl Default for DiarizationSettings {
    fn default() -> Self {
        Self {
            jar_path: "~/.taler/lium/LIUM_SpkDiarization-8.4.1.jar".to_string(),
            java_memory_mb: 2048,
        }
    }
}

/// Blob storage settings for the asynchronous recognition path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Cloud Storage bucket that receives resampled audio.
    pub bucket: String,
}

/// Batch dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker pool size. 0 picks a small multiple of the CPU count.
    pub workers: usize,
}

impl BatchSettings {
    /// Effective worker count for a batch run.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        cpus * 2
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TalerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taler")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded diarization jar path.
    pub fn jar_path(&self) -> PathBuf {
        Self::expand_path(&self.diarization.jar_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let settings = Settings::default();
        assert_eq!(settings.recognition.sync_limit_seconds, 60);
        assert_eq!(settings.recognition.async_limit_seconds, 4800);
        assert_eq!(settings.recognition.poll_attempts, 10);
        assert_eq!(settings.recognition.turn_max_attempts, 5);
        assert_eq!(settings.recognition.sample_rate, 16000);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.recognition.language_code, "en-US");
        assert_eq!(back.batch.workers, 0);
    }

    #[test]
    fn test_effective_workers_floor() {
        let batch = BatchSettings { workers: 4 };
        assert_eq!(batch.effective_workers(), 4);
        let auto = BatchSettings { workers: 0 };
        assert!(auto.effective_workers() >= 2);
    }
}
