pub mod context;
pub mod error;
pub mod format;
pub mod interpolate;
pub mod locale;
pub mod plural;
pub mod registry;
pub mod service;
pub mod translator;
pub mod tree;

pub use context::LocaleContext;
pub use error::{I18nError, I18nResult};
pub use format::{DateStyle, FormatValue, ListStyle, LocaleFormatter, RelativeUnit};
pub use interpolate::{interpolate, ParamValue, Params};
pub use locale::{detect_locale, parse_accept_language, primary_subtag, resolve_locale, LocaleInfo};
pub use plural::{plural_category, PluralCategory};
pub use registry::TranslationRegistry;
pub use service::{Catalog, TranslationService};
pub use translator::{missing_marker, translate, translate_plural, TreeLookup};
pub use tree::{TranslationNode, TranslationTree};

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::I18nConfig;

/// Builds the translation service and registers every module found under
/// the configured translations directory.
pub fn init_i18n(config: &I18nConfig) -> Result<Arc<TranslationService>> {
    let service = TranslationService::from_config(config);

    if config.translations_dir.exists() {
        let modules = service
            .register_modules_in(&config.translations_dir)
            .with_context(|| {
                format!(
                    "Failed to load translations from {}",
                    config.translations_dir.display()
                )
            })?;
        tracing::info!(
            modules,
            locales = ?service.loaded_locales(),
            "Translation modules registered"
        );
    } else {
        tracing::warn!(
            dir = %config.translations_dir.display(),
            "Translations directory not found, starting with empty catalog"
        );
    }

    Ok(Arc::new(service))
}
