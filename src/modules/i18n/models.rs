use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::i18n::{LocaleInfo, TranslationTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleListResponse {
    pub locales: Vec<LocaleInfo>,
    pub default: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsQuery {
    pub module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationsResponse {
    pub locale: String,
    pub translations: TranslationTree,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectLocaleRequest {
    pub accept_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectLocaleResponse {
    pub detected: String,
    pub supported: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub key: String,
    pub locale: Option<String>,
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub key: String,
    pub locale: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateBatchRequest {
    pub keys: Vec<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateBatchResponse {
    pub locale: String,
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentLocaleResponse {
    pub locale: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub default_locale: String,
    pub available_locales: usize,
    pub loaded_locales: usize,
}
