use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory could not be determined")]
    ConfigDirNotFound,

    #[error(
        "settings file not found. Looked in:\n\
        - the current directory: resflow.local.yaml, resflow.yaml\n\
        - the ./.resflow/ directory\n\
        - ~/.config/resflow/resflow.yaml\n\
        Set RESFLOW_CONFIG_PATH to point at a file directly"
    )]
    SettingsFileNotFound,

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
