/// Database configuration and connection management
pub mod database;

/// Portal settings loaded from portal.toml
pub mod settings;

pub use settings::{
    AdvanceSettings, LeaveSettings, Settings, UploadSettings, load_settings,
    load_settings_or_default,
};
