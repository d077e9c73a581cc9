use std::collections::BTreeMap;
use std::path::PathBuf;

use config::{Config, File};
use serde::Deserialize;

use crate::application::services::EngineDefaults;
use crate::domain::EngineName;
use crate::infrastructure::audio::{BackendConfig, GigaAmRecognizerConfig};

use super::Environment;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid environment: {0}")]
    Environment(String),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub asr: AsrSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsrSettings {
    /// `auto`, `cpu` or `cuda`.
    pub device: String,
    pub whisper: WhisperSettings,
    pub gigaam: GigaAmSettings,
}

impl Default for AsrSettings {
    fn default() -> Self {
        Self {
            device: "auto".to_string(),
            whisper: WhisperSettings::default(),
            gigaam: GigaAmSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperSettings {
    pub default_model: String,
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            default_model: "base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GigaAmSettings {
    pub default_model: String,
    pub models_dir: PathBuf,
    pub num_threads: i32,
    pub feature_dim: i32,
}

impl Default for GigaAmSettings {
    fn default() -> Self {
        let recognizer = GigaAmRecognizerConfig::default();
        Self {
            default_model: "v2_ctc".to_string(),
            models_dir: PathBuf::from("models/gigaam"),
            num_threads: recognizer.num_threads,
            feature_dim: recognizer.feature_dim,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_file_size_mb: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("tmp"),
            max_file_size_mb: 200,
        }
    }
}

impl UploadSettings {
    pub fn max_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Settings {
    /// Layers `config/default.toml`, `config/<environment>.toml` and
    /// `APP__SECTION__KEY` environment variables, in that order.
    pub fn load() -> Result<(Self, Environment), SettingsError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env().map_err(SettingsError::Environment)?;

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment.as_str())).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok((settings, environment))
    }

    pub fn engine_defaults(&self) -> EngineDefaults {
        EngineDefaults {
            device: self.asr.device.clone(),
            models: BTreeMap::from([
                (EngineName::Whisper, self.asr.whisper.default_model.clone()),
                (EngineName::GigaAm, self.asr.gigaam.default_model.clone()),
            ]),
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            gigaam_models_dir: self.asr.gigaam.models_dir.clone(),
            gigaam: GigaAmRecognizerConfig {
                num_threads: self.asr.gigaam.num_threads,
                feature_dim: self.asr.gigaam.feature_dim,
            },
        }
    }
}
