use serde::de::DeserializeOwned;
use std::future::Future;

use super::error::{ClientError, ClientResult};
use crate::i18n::TranslationTree;
use crate::modules::i18n::models::{LocaleListResponse, TranslationsResponse};

/// Where the client store fetches locales and translation trees from.
pub trait TranslationSource: Send + Sync {
    fn fetch_locales(&self) -> impl Future<Output = ClientResult<LocaleListResponse>> + Send;

    fn fetch_translations(
        &self,
        locale: &str,
        module: Option<&str>,
    ) -> impl Future<Output = ClientResult<TranslationTree>> + Send;
}

/// Fetches from the i18n REST routes, e.g. `http://localhost:3000/api/i18n`.
#[derive(Debug, Clone)]
pub struct HttpTranslationSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranslationSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl TranslationSource for HttpTranslationSource {
    async fn fetch_locales(&self) -> ClientResult<LocaleListResponse> {
        self.get_json(format!("{}/locales", self.base_url), &[]).await
    }

    async fn fetch_translations(
        &self,
        locale: &str,
        module: Option<&str>,
    ) -> ClientResult<TranslationTree> {
        let url = format!("{}/translations/{}", self.base_url, locale);
        let query: Vec<(&str, &str)> = module.map(|m| ("module", m)).into_iter().collect();

        tracing::debug!(%url, ?module, "Fetching translations");
        let response: TranslationsResponse = self.get_json(url, &query).await?;
        Ok(response.translations)
    }
}
