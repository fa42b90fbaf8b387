use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::cache::{CacheState, Clock, SystemClock, TranslationCache, TranslationCacheEntry};
use super::error::ClientResult;
use super::source::TranslationSource;
use super::storage::{FileLocaleStorage, LocaleStorage, MemoryLocaleStorage};
use crate::config::DEFAULT_LOCALE;
use crate::i18n::{
    primary_subtag, resolve_locale, translate, translate_plural, LocaleFormatter, LocaleInfo,
    Params,
};

/// Observable snapshot of the store, published on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub locale: String,
    pub default_locale: String,
    pub available_locales: Vec<LocaleInfo>,
    pub is_loading: bool,
    pub error: Option<String>,
}

struct Inner {
    cache: TranslationCache,
    locale: String,
    default_locale: String,
    available: Vec<LocaleInfo>,
    error: Option<String>,
}

impl Inner {
    fn is_supported(&self, code: &str) -> bool {
        self.available.iter().any(|info| info.code == code)
    }

    fn supported_codes(&self) -> Vec<String> {
        self.available.iter().map(|info| info.code.clone()).collect()
    }

    fn snapshot(&self) -> StoreState {
        StoreState {
            locale: self.locale.clone(),
            default_locale: self.default_locale.clone(),
            available_locales: self.available.clone(),
            is_loading: self.cache.is_loading(),
            error: self.error.clone(),
        }
    }
}

/// Client-side translation state: current locale, per-locale tree cache and
/// the lookups that read from it.
///
/// The lock is never held across a fetch. Concurrent loads of the same locale
/// each fetch, and the last one to finish wins.
pub struct TranslationStore<S> {
    source: S,
    storage: Arc<dyn LocaleStorage>,
    clock: Arc<dyn Clock>,
    module: Option<String>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<StoreState>,
}

impl<S: TranslationSource> TranslationStore<S> {
    pub fn new(source: S) -> Self {
        let inner = Inner {
            cache: TranslationCache::default(),
            locale: DEFAULT_LOCALE.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            available: Vec::new(),
            error: None,
        };
        let (state_tx, _) = watch::channel(inner.snapshot());

        Self {
            source,
            storage: Arc::new(MemoryLocaleStorage::default()),
            clock: Arc::new(SystemClock),
            module: None,
            inner: Mutex::new(inner),
            state_tx,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn LocaleStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Persists the locale under the user config dir. Platforms without one
    /// keep the current storage.
    pub fn with_default_storage(self) -> Self {
        match FileLocaleStorage::default_location() {
            Some(storage) => self.with_storage(Arc::new(storage)),
            None => self,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cache = TranslationCache::new(ttl);
        self
    }

    /// Restricts every fetch to one translation module.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.snapshot());
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> StoreState {
        self.state_tx.borrow().clone()
    }

    pub fn locale(&self) -> String {
        self.lock().locale.clone()
    }

    pub fn available_locales(&self) -> Vec<LocaleInfo> {
        self.lock().available.clone()
    }

    /// Initializes from the platform's preferred languages.
    pub async fn init(&self) -> ClientResult<()> {
        let preferences: Vec<String> = sys_locale::get_locales().collect();
        self.init_with_preferences(&preferences).await
    }

    /// Fetches the locale list, picks the starting locale and loads it.
    ///
    /// The persisted locale wins when still supported, then the first
    /// supported preference, then the server default. The default locale's
    /// tree is loaded too so lookups can fall back to it. Any failure leaves
    /// the error flag set once init returns.
    pub async fn init_with_preferences<P: AsRef<str>>(&self, preferences: &[P]) -> ClientResult<()> {
        let locales = self.source.fetch_locales().await;

        let (locale, default_locale) = {
            let mut inner = self.lock();
            if let Ok(list) = &locales {
                inner.available = list.locales.clone();
                inner.default_locale = list.default.clone();
            }

            let supported = inner.supported_codes();
            let persisted = self
                .storage
                .load()
                .map(|code| primary_subtag(&code))
                .filter(|code| inner.is_supported(code));
            let locale = match persisted {
                Some(code) => code,
                None => resolve_locale(preferences, &supported[..], &inner.default_locale),
            };
            inner.locale = locale;

            self.publish(&inner);
            (inner.locale.clone(), inner.default_locale.clone())
        };
        debug!(%locale, %default_locale, "Translation store initialized");
        if let Err(e) = &locales {
            warn!(error = %e, "Failed to fetch available locales");
        }

        let loaded = self.load_translations(&locale).await;
        let fallback_loaded = if locale != default_locale {
            self.load_translations(&default_locale).await
        } else {
            Ok(())
        };

        let result = locales.map(|_| ()).and(loaded).and(fallback_loaded);
        if let Err(e) = &result {
            let mut inner = self.lock();
            inner.error = Some(e.to_string());
            self.publish(&inner);
        }
        result
    }

    /// Switches to `code` when supported, loading and persisting it.
    ///
    /// Unsupported codes are ignored with a warning and return `false`. A
    /// failed load still switches; lookups then fall back to the default.
    pub async fn set_locale(&self, code: &str) -> bool {
        let code = primary_subtag(code);
        if !self.lock().is_supported(&code) {
            warn!(locale = %code, "Ignoring unsupported locale");
            return false;
        }

        // the error flag already carries a failed load
        let _ = self.load_translations(&code).await;

        {
            let mut inner = self.lock();
            inner.locale = code.clone();
            self.publish(&inner);
        }

        if let Err(e) = self.storage.save(&code) {
            warn!(locale = %code, error = %e, "Failed to persist locale");
        }
        true
    }

    /// Fetches `locale` unless a fresh cache entry exists.
    ///
    /// Failures set the error flag and keep whatever entry was cached. A
    /// successful fetch clears the flag.
    pub async fn load_translations(&self, locale: &str) -> ClientResult<()> {
        {
            let mut inner = self.lock();
            if !inner.cache.needs_fetch(locale, self.clock.now()) {
                return Ok(());
            }
            inner.cache.begin_fetch(locale);
            self.publish(&inner);
        }

        let fetched = self
            .source
            .fetch_translations(locale, self.module.as_deref())
            .await;

        let mut inner = self.lock();
        inner.cache.finish_fetch(locale);
        let result = match fetched {
            Ok(translations) => {
                let entry = TranslationCacheEntry {
                    translations,
                    timestamp: self.clock.now(),
                    module: self.module.clone(),
                };
                inner.cache.insert(locale, entry);
                inner.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(%locale, error = %e, "Failed to load translations");
                inner.error = Some(e.to_string());
                Err(e)
            }
        };
        self.publish(&inner);
        result
    }

    pub fn t(&self, key: &str, params: Option<&Params>, fallback: Option<&str>) -> String {
        let inner = self.lock();
        let view = inner.cache.view(&inner.default_locale);
        translate(&view, key, &inner.locale, params, fallback)
    }

    pub fn tc(&self, key: &str, count: i64, params: Option<&Params>) -> String {
        let inner = self.lock();
        let view = inner.cache.view(&inner.default_locale);
        translate_plural(&view, key, count, &inner.locale, params)
    }

    pub fn clear_cache(&self, locale: Option<&str>) {
        let mut inner = self.lock();
        inner.cache.clear(locale);
        self.publish(&inner);
    }

    pub fn cache_state(&self, locale: &str) -> CacheState {
        self.lock().cache.state(locale, self.clock.now())
    }

    pub fn formatter(&self) -> LocaleFormatter {
        LocaleFormatter::new(self.locale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::i18n::TranslationTree;
    use crate::modules::i18n::models::LocaleListResponse;
    use crate::params;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockSource {
        trees: HashMap<String, TranslationTree>,
        fetches: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        fail_locale: Option<String>,
    }

    impl MockSource {
        fn new() -> Self {
            let en = TranslationTree::from_json(json!({
                "common": {"save": "Save", "hello": "Hello, {name}!", "only_en": "English only"},
                "items": {"zero": "No items", "one": "{count} item", "other": "{count} items"}
            }))
            .unwrap();
            let pt = TranslationTree::from_json(json!({
                "common": {"save": "Salvar", "hello": "Olá, {name}!"},
                "items": {"one": "{count} item", "other": "{count} itens"}
            }))
            .unwrap();

            Self {
                trees: HashMap::from([("en".to_string(), en), ("pt".to_string(), pt)]),
                fetches: Arc::new(AtomicUsize::new(0)),
                fail: Arc::new(AtomicBool::new(false)),
                fail_locale: None,
            }
        }

        fn failing_for(locale: &str) -> Self {
            Self {
                fail_locale: Some(locale.to_string()),
                ..Self::new()
            }
        }

        fn status_error(&self, path: &str) -> ClientError {
            ClientError::Status {
                status: 503,
                url: path.to_string(),
            }
        }
    }

    impl TranslationSource for MockSource {
        async fn fetch_locales(&self) -> ClientResult<LocaleListResponse> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(self.status_error("/locales"));
            }
            Ok(LocaleListResponse {
                locales: ["en", "pt", "es"].iter().map(|c| LocaleInfo::for_code(c)).collect(),
                default: "en".to_string(),
            })
        }

        async fn fetch_translations(
            &self,
            locale: &str,
            _module: Option<&str>,
        ) -> ClientResult<TranslationTree> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) || self.fail_locale.as_deref() == Some(locale) {
                return Err(self.status_error("/translations"));
            }
            Ok(self.trees.get(locale).cloned().unwrap_or_default())
        }
    }

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            })
        }

        fn advance(&self, minutes: i64) {
            *self.now.lock().unwrap() += chrono::Duration::minutes(minutes);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    struct Harness {
        store: TranslationStore<MockSource>,
        fetches: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        clock: Arc<ManualClock>,
        storage: Arc<MemoryLocaleStorage>,
    }

    fn harness(persisted: Option<&str>) -> Harness {
        harness_with(MockSource::new(), persisted)
    }

    fn harness_with(source: MockSource, persisted: Option<&str>) -> Harness {
        let fetches = source.fetches.clone();
        let fail = source.fail.clone();
        let clock = ManualClock::new();
        let storage = Arc::new(MemoryLocaleStorage::new(persisted));
        let store = TranslationStore::new(source)
            .with_clock(clock.clone())
            .with_storage(storage.clone());

        Harness {
            store,
            fetches,
            fail,
            clock,
            storage,
        }
    }

    #[tokio::test]
    async fn test_init_prefers_persisted_locale() {
        let h = harness(Some("pt"));
        h.store.init_with_preferences(&["es-ES"]).await.unwrap();

        assert_eq!(h.store.locale(), "pt");
        assert_eq!(h.store.t("common.save", None, None), "Salvar");
        // pt and the en fallback
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_init_resolves_platform_preferences() {
        let h = harness(None);
        h.store
            .init_with_preferences(&["ja-JP", "pt-BR", "en-US"])
            .await
            .unwrap();
        assert_eq!(h.store.locale(), "pt");
    }

    #[tokio::test]
    async fn test_init_ignores_unsupported_persisted_locale() {
        let h = harness(Some("ja"));
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();

        assert_eq!(h.store.locale(), "en");
        assert_eq!(h.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fresh_entries_are_reused_within_ttl() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();
        assert_eq!(h.fetches.load(Ordering::SeqCst), 1);

        h.clock.advance(4);
        h.store.load_translations("en").await.unwrap();
        assert_eq!(h.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.cache_state("en"), CacheState::Fresh);

        h.clock.advance(2);
        assert_eq!(h.store.cache_state("en"), CacheState::Stale);
        h.store.load_translations("en").await.unwrap();
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(h.store.cache_state("en"), CacheState::Fresh);
    }

    #[tokio::test]
    async fn test_set_locale_switches_and_persists() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();

        assert!(h.store.set_locale("pt-BR").await);
        assert_eq!(h.store.locale(), "pt");
        assert_eq!(h.storage.load().as_deref(), Some("pt"));
        assert_eq!(
            h.store.t("common.hello", Some(&params!("name" => "Ana")), None),
            "Olá, Ana!"
        );
        // falls back to the default locale's cached tree
        assert_eq!(h.store.t("common.only_en", None, None), "English only");
        assert_eq!(h.store.t("common.nope", None, None), "[common.nope]");
    }

    #[tokio::test]
    async fn test_set_locale_rejects_unsupported() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();

        assert!(!h.store.set_locale("ja").await);
        assert_eq!(h.store.locale(), "en");
        assert_eq!(h.storage.load(), None);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error_and_keeps_cache() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();
        h.clock.advance(6);
        h.fail.store(true, Ordering::SeqCst);

        assert!(h.store.load_translations("en").await.is_err());

        let state = h.store.state();
        assert!(state.error.is_some());
        assert!(!state.is_loading);
        assert_eq!(h.store.cache_state("en"), CacheState::Stale);
        assert_eq!(h.store.t("common.save", None, None), "Save");
    }

    #[tokio::test]
    async fn test_init_survives_unreachable_server() {
        let h = harness(None);
        h.fail.store(true, Ordering::SeqCst);

        assert!(h.store.init_with_preferences(&["pt"]).await.is_err());
        assert_eq!(h.store.locale(), "en");
        assert!(h.store.state().error.is_some());
        assert_eq!(h.store.t("common.save", None, Some("Save")), "Save");
    }

    #[tokio::test]
    async fn test_init_keeps_error_when_only_fallback_succeeds() {
        let h = harness_with(MockSource::failing_for("pt"), Some("pt"));

        assert!(h.store.init_with_preferences::<&str>(&[]).await.is_err());

        let state = h.store.state();
        assert_eq!(state.locale, "pt");
        assert!(state.error.is_some());
        assert!(!state.is_loading);
        assert_eq!(h.store.cache_state("pt"), CacheState::Absent);
        assert_eq!(h.store.cache_state("en"), CacheState::Fresh);
        assert_eq!(h.store.t("common.save", None, None), "Save");
    }

    #[tokio::test]
    async fn test_successful_load_clears_error() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();
        h.fail.store(true, Ordering::SeqCst);
        assert!(h.store.load_translations("pt").await.is_err());
        assert!(h.store.state().error.is_some());

        h.fail.store(false, Ordering::SeqCst);
        h.store.load_translations("pt").await.unwrap();
        assert_eq!(h.store.state().error, None);
    }

    /// Hands out a new revision per fetch and yields before answering.
    struct RevisionSource {
        fetches: AtomicUsize,
    }

    impl TranslationSource for RevisionSource {
        async fn fetch_locales(&self) -> ClientResult<LocaleListResponse> {
            Ok(LocaleListResponse {
                locales: vec![LocaleInfo::for_code("en")],
                default: "en".to_string(),
            })
        }

        async fn fetch_translations(
            &self,
            _locale: &str,
            _module: Option<&str>,
        ) -> ClientResult<TranslationTree> {
            let revision = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            Ok(TranslationTree::from_json(json!({"revision": revision.to_string()})).unwrap())
        }
    }

    #[tokio::test]
    async fn test_overlapping_loads_both_fetch_and_last_write_wins() {
        let store = TranslationStore::new(RevisionSource {
            fetches: AtomicUsize::new(0),
        });

        let (first, second) = tokio::join!(
            store.load_translations("en"),
            store.load_translations("en")
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(store.source.fetches.load(Ordering::SeqCst), 2);
        let state = store.state();
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(store.cache_state("en"), CacheState::Fresh);
        assert_eq!(store.t("revision", None, None), "2");
    }

    #[test]
    fn test_default_storage_keeps_working_store() {
        let store = TranslationStore::new(MockSource::new()).with_default_storage();
        assert_eq!(store.locale(), DEFAULT_LOCALE);
        if let Some(expected) = FileLocaleStorage::default_location() {
            assert_eq!(store.storage.load(), expected.load());
        }
    }

    #[tokio::test]
    async fn test_plural_lookup() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();

        assert_eq!(h.store.tc("items", 0, None), "No items");
        assert_eq!(h.store.tc("items", 1, None), "1 item");
        assert_eq!(h.store.tc("items", 5, None), "5 items");
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();

        h.store.clear_cache(Some("en"));
        assert_eq!(h.store.cache_state("en"), CacheState::Absent);
        assert_eq!(h.store.t("common.save", None, None), "[common.save]");

        h.store.load_translations("en").await.unwrap();
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribers_observe_locale_changes() {
        let h = harness(None);
        h.store.init_with_preferences::<&str>(&[]).await.unwrap();
        let mut rx = h.store.subscribe();
        rx.borrow_and_update();

        h.store.set_locale("pt").await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.locale, "pt");
        assert_eq!(state.available_locales.len(), 3);
        assert!(!state.is_loading);
    }
}
