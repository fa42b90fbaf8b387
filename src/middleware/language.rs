use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::i18n::{primary_subtag, TranslationService};

pub const X_LOCALE: &str = "x-locale";

/// Locale resolved for the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale(pub String);

/// Resolves the request locale once and stores it as a [`RequestLocale`] extension.
pub async fn language_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let locale = detect_locale_from_headers(request.headers(), &state.translations);
    request.extensions_mut().insert(RequestLocale(locale));
    next.run(request).await
}

/// Picks the request locale from headers.
///
/// Priority order:
/// 1. `X-Locale` header (explicit choice), when its primary subtag is supported
/// 2. `Accept-Language` header (browser preference)
/// 3. The service default
pub fn detect_locale_from_headers(headers: &HeaderMap, service: &TranslationService) -> String {
    if let Some(explicit) = headers.get(X_LOCALE).and_then(|v| v.to_str().ok()) {
        let code = primary_subtag(explicit);
        if service.is_supported(&code) {
            return code;
        }
        tracing::warn!(requested = %explicit, "Ignoring unsupported X-Locale header");
    }

    let accept_language = headers
        .get(axum::http::header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    service.detect_locale(accept_language)
}

/// Extension trait for extracting the resolved locale from a request
pub trait LocaleExtractor {
    fn request_locale(&self) -> Option<&str>;
}

impl LocaleExtractor for Request {
    fn request_locale(&self) -> Option<&str> {
        self.extensions()
            .get::<RequestLocale>()
            .map(|locale| locale.0.as_str())
    }
}
