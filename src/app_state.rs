use std::sync::Arc;

use crate::config::I18nConfig;
use crate::i18n::TranslationService;

#[derive(Clone)]
pub struct AppState {
    pub i18n_config: I18nConfig,
    pub translations: Arc<TranslationService>,
}

impl AppState {
    pub fn new(i18n_config: I18nConfig, translations: Arc<TranslationService>) -> Self {
        Self {
            i18n_config,
            translations,
        }
    }
}
