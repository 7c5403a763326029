//! Configuration management for Taler.

mod settings;

pub use settings::{
    BatchSettings, DiarizationSettings, GeneralSettings, RecognitionSettings, Settings,
    StorageSettings,
};
