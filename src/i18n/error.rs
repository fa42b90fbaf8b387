use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading translation sources. Lookups never produce these.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid translation file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Translation file {0} must contain a JSON object")]
    NotAnObject(PathBuf),

    #[error("Module not registered: {0}")]
    ModuleNotFound(String),
}

pub type I18nResult<T> = Result<T, I18nError>;
