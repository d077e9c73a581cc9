mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AsrSettings, GigaAmSettings, LoggingSettings, ServerSettings, Settings, SettingsError,
    UploadSettings, WhisperSettings,
};
