use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::app_state::AppState;
use crate::i18n::format::{DateStyle, LocaleFormatter};
use crate::i18n::interpolate::Params;
use crate::i18n::service::TranslationService;
use crate::middleware::RequestLocale;

/// Extractor giving handlers translation and formatting bound to the request locale.
pub struct LocaleContext {
    pub service: Arc<TranslationService>,
    pub locale: String,
}

impl LocaleContext {
    pub fn new(service: Arc<TranslationService>, locale: impl Into<String>) -> Self {
        Self {
            service,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate a key
    pub fn t(&self, key: &str) -> String {
        self.service.translate(key, Some(&self.locale), None, None)
    }

    /// Translate a key with interpolation parameters
    pub fn t_with(&self, key: &str, params: &Params) -> String {
        self.service.translate(key, Some(&self.locale), Some(params), None)
    }

    /// Translate with pluralization
    pub fn tc(&self, key: &str, count: i64, params: Option<&Params>) -> String {
        self.service
            .translate_plural(key, count, Some(&self.locale), params)
    }

    pub fn formatter(&self) -> LocaleFormatter {
        self.service.formatter(&self.locale)
    }

    pub fn format_date(&self, value: DateTime<Utc>, style: DateStyle) -> String {
        self.formatter().date(value, style)
    }

    pub fn format_number(&self, value: f64, decimals: Option<usize>) -> String {
        self.formatter().number(value, decimals)
    }

    pub fn format_currency(&self, value: f64, currency: &str) -> String {
        self.formatter().currency(value, currency)
    }
}

impl FromRequestParts<AppState> for LocaleContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .extensions
            .get::<RequestLocale>()
            .map(|l| l.0.clone())
            .unwrap_or_else(|| state.translations.default_locale().to_string());

        Ok(LocaleContext::new(state.translations.clone(), locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::TranslationTree;
    use serde_json::json;

    #[test]
    fn test_context_binds_locale() {
        let service = TranslationService::new("en", &["en", "pt"]);
        let pt = TranslationTree::from_json(json!({
            "cart": {"title": "Carrinho de {name}", "items": {"one": "{count} item", "other": "{count} itens"}}
        }))
        .unwrap();
        service.register_translations("shop", "pt", &pt);

        let ctx = LocaleContext::new(Arc::new(service), "pt");
        assert_eq!(ctx.t_with("cart.title", &crate::params! { "name" => "Ana" }), "Carrinho de Ana");
        assert_eq!(ctx.tc("cart.items", 3, None), "3 itens");
        assert_eq!(ctx.t("cart.missing"), "[cart.missing]");
        assert_eq!(ctx.format_number(1234.5, Some(2)), "1.234,50");
    }
}
