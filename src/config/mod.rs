pub mod settings;

pub use settings::{
    data_root, load_settings, save_settings, settings_path, ConfigError, SurveySettings, Transport,
};
