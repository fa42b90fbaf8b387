pub mod language;
pub mod tracing;

pub use self::language::{language_middleware, LocaleExtractor, RequestLocale};
pub use self::tracing::observability_middleware;
