use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    detect_locale, get_current_locale, get_locales, get_translations, health_check,
    translate_batch, translate_key,
};
use crate::app_state::AppState;

/// Create i18n routes
pub fn create_i18n_routes() -> Router<AppState> {
    Router::new()
        .route("/locales", get(get_locales))
        .route("/translations/{locale}", get(get_translations))
        .route("/detect", post(detect_locale))
        .route("/translate", post(translate_key))
        .route("/translate/batch", post(translate_batch))
        .route("/current-locale", get(get_current_locale))
        .route("/health", get(health_check))
}
