use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    response::Json,
};

use super::models::{
    CurrentLocaleResponse, DetectLocaleRequest, DetectLocaleResponse, HealthResponse,
    LocaleListResponse, TranslateBatchRequest, TranslateBatchResponse, TranslateRequest,
    TranslateResponse, TranslationsQuery, TranslationsResponse,
};
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::i18n::{interpolate::params_from_json, LocaleContext};
use crate::middleware::LocaleExtractor;

pub const SERVICE_NAME: &str = "locale_hub";

/// Body locale when given, otherwise the locale resolved from headers.
fn requested_locale(body_locale: Option<&str>, ctx: &LocaleContext) -> String {
    body_locale
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| ctx.locale().to_string())
}

/// List supported locales and the default
pub async fn get_locales(State(state): State<AppState>) -> Json<LocaleListResponse> {
    Json(LocaleListResponse {
        locales: state.translations.available_locales().to_vec(),
        default: state.translations.default_locale().to_string(),
    })
}

/// Full translation tree for a locale, optionally limited to one module
pub async fn get_translations(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(query): Query<TranslationsQuery>,
) -> Json<TranslationsResponse> {
    let locale = locale.trim().to_lowercase();
    let module = query.module.as_deref().filter(|m| !m.is_empty());
    let translations = state.translations.translations(&locale, module);

    Json(TranslationsResponse {
        locale,
        translations,
    })
}

/// Resolve an Accept-Language value against the supported locales
pub async fn detect_locale(
    State(state): State<AppState>,
    payload: Result<Json<DetectLocaleRequest>, JsonRejection>,
) -> AppResult<Json<DetectLocaleResponse>> {
    let Json(request) = payload?;
    let detected = state
        .translations
        .detect_locale(Some(&request.accept_language));
    let supported = state.translations.is_supported(&detected);

    Ok(Json(DetectLocaleResponse {
        detected,
        supported,
    }))
}

/// Translate a single key
pub async fn translate_key(
    ctx: LocaleContext,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> AppResult<Json<TranslateResponse>> {
    let Json(request) = payload?;
    if request.key.trim().is_empty() {
        return Err(AppError::Validation("key must not be empty".to_string()));
    }

    let locale = requested_locale(request.locale.as_deref(), &ctx);
    let params = request.params.map(params_from_json);
    let text = ctx
        .service
        .translate(&request.key, Some(&locale), params.as_ref(), None);

    Ok(Json(TranslateResponse {
        key: request.key,
        locale,
        text,
    }))
}

/// Translate several keys at once
pub async fn translate_batch(
    ctx: LocaleContext,
    payload: Result<Json<TranslateBatchRequest>, JsonRejection>,
) -> AppResult<Json<TranslateBatchResponse>> {
    let Json(request) = payload?;
    let locale = requested_locale(request.locale.as_deref(), &ctx);
    let translations = request
        .keys
        .into_iter()
        .map(|key| {
            let text = ctx.service.translate(&key, Some(&locale), None, None);
            (key, text)
        })
        .collect();

    Ok(Json(TranslateBatchResponse {
        locale,
        translations,
    }))
}

/// Locale resolved from the request headers
pub async fn get_current_locale(
    State(state): State<AppState>,
    req: Request,
) -> Json<CurrentLocaleResponse> {
    let locale = req
        .request_locale()
        .map(str::to_string)
        .unwrap_or_else(|| state.translations.default_locale().to_string());

    Json(CurrentLocaleResponse { locale })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        default_locale: state.translations.default_locale().to_string(),
        available_locales: state.translations.available_locales().len(),
        loaded_locales: state.translations.loaded_locales().len(),
    })
}
