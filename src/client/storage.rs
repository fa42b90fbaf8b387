use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::error::ClientResult;

/// Key under which the chosen locale is persisted.
pub const LOCALE_STORAGE_KEY: &str = "locale";

/// Persistence for the user's chosen locale.
pub trait LocaleStorage: Send + Sync {
    fn load(&self) -> Option<String>;

    fn save(&self, locale: &str) -> ClientResult<()>;
}

/// Stores the locale as a one-line file, by default in the user config dir.
#[derive(Debug, Clone)]
pub struct FileLocaleStorage {
    path: PathBuf,
}

impl FileLocaleStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/locale_hub/locale`, when the platform has a config dir.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("locale_hub").join(LOCALE_STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocaleStorage for FileLocaleStorage {
    fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let locale = content.trim();
        (!locale.is_empty()).then(|| locale.to_string())
    }

    fn save(&self, locale: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, locale)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLocaleStorage {
    value: Mutex<Option<String>>,
}

impl MemoryLocaleStorage {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            value: Mutex::new(initial.map(str::to_string)),
        }
    }
}

impl LocaleStorage for MemoryLocaleStorage {
    fn load(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, locale: &str) -> ClientResult<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(locale.to_string());
        Ok(())
    }
}
