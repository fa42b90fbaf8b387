//! Client side of the i18n API: a cached, observable translation store
//! backed by the REST routes.

pub mod cache;
pub mod error;
pub mod source;
pub mod storage;
pub mod store;

pub use cache::{CacheState, Clock, SystemClock, TranslationCache, TranslationCacheEntry, DEFAULT_CACHE_TTL};
pub use error::{ClientError, ClientResult};
pub use source::{HttpTranslationSource, TranslationSource};
pub use storage::{FileLocaleStorage, LocaleStorage, MemoryLocaleStorage};
pub use store::{StoreState, TranslationStore};
