use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::i18n::{TranslationTree, TreeLookup};

/// How long a fetched translation tree is served without refetching.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of the current time for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationCacheEntry {
    pub translations: TranslationTree,
    pub timestamp: DateTime<Utc>,
    pub module: Option<String>,
}

impl TranslationCacheEntry {
    /// Fresh while `now - timestamp < ttl`. Timestamps in the future count as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.timestamp).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Loading,
    Fresh,
    Stale,
}

/// Per-locale translation cache with lazy TTL expiry.
///
/// Stale entries stay readable until replaced or cleared. Fetches are not
/// deduplicated: every started fetch is counted until it finishes.
#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<String, TranslationCacheEntry>,
    in_flight: HashMap<String, usize>,
    ttl: Duration,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl TranslationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, locale: &str) -> Option<&TranslationCacheEntry> {
        self.entries.get(locale)
    }

    pub fn state(&self, locale: &str, now: DateTime<Utc>) -> CacheState {
        if self.in_flight.get(locale).copied().unwrap_or(0) > 0 {
            return CacheState::Loading;
        }
        match self.entries.get(locale) {
            Some(entry) if entry.is_fresh(now, self.ttl) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
            None => CacheState::Absent,
        }
    }

    /// Whether a read at `now` must fetch: no entry, or only a stale one.
    pub fn needs_fetch(&self, locale: &str, now: DateTime<Utc>) -> bool {
        !self
            .entries
            .get(locale)
            .is_some_and(|entry| entry.is_fresh(now, self.ttl))
    }

    pub fn begin_fetch(&mut self, locale: &str) {
        *self.in_flight.entry(locale.to_string()).or_insert(0) += 1;
    }

    pub fn finish_fetch(&mut self, locale: &str) {
        if let Some(count) = self.in_flight.get_mut(locale) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(locale);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn insert(&mut self, locale: &str, entry: TranslationCacheEntry) {
        self.entries.insert(locale.to_string(), entry);
    }

    /// Drops one locale's entry, or every entry when `locale` is `None`.
    pub fn clear(&mut self, locale: Option<&str>) {
        match locale {
            Some(locale) => {
                self.entries.remove(locale);
            }
            None => self.entries.clear(),
        }
    }

    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.entries.keys().cloned().collect();
        locales.sort();
        locales
    }

    /// Lookup view that falls back to `default_locale`'s cached tree.
    pub fn view<'a>(&'a self, default_locale: &'a str) -> CacheView<'a> {
        CacheView {
            cache: self,
            default_locale,
        }
    }
}

pub struct CacheView<'a> {
    cache: &'a TranslationCache,
    default_locale: &'a str,
}

impl TreeLookup for CacheView<'_> {
    fn tree(&self, locale: &str) -> Option<&TranslationTree> {
        self.cache.get(locale).map(|entry| &entry.translations)
    }

    fn default_locale(&self) -> &str {
        self.default_locale
    }
}
