use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::config::I18nConfig;
use crate::i18n::error::{I18nError, I18nResult};
use crate::i18n::format::LocaleFormatter;
use crate::i18n::interpolate::Params;
use crate::i18n::locale::{detect_locale, primary_subtag, LocaleInfo};
use crate::i18n::registry::TranslationRegistry;
use crate::i18n::translator::{self, TreeLookup};
use crate::i18n::tree::TranslationTree;

/// Immutable merged view of every registered module, one tree per locale.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    trees: HashMap<String, TranslationTree>,
    default_locale: String,
}

impl Catalog {
    pub fn new(trees: HashMap<String, TranslationTree>, default_locale: impl Into<String>) -> Self {
        Self {
            trees,
            default_locale: default_locale.into(),
        }
    }

    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.trees.keys().cloned().collect();
        locales.sort();
        locales
    }
}

impl TreeLookup for Catalog {
    fn tree(&self, locale: &str) -> Option<&TranslationTree> {
        self.trees.get(locale)
    }

    fn default_locale(&self) -> &str {
        &self.default_locale
    }
}

/// Server-side translation service.
///
/// Registrations go through the registry under a mutex; every mutation
/// publishes a freshly merged [`Catalog`]. Readers clone the current `Arc`
/// and never observe a half-merged state.
pub struct TranslationService {
    default_locale: String,
    locales: Vec<LocaleInfo>,
    registry: Mutex<TranslationRegistry>,
    catalog: RwLock<Arc<Catalog>>,
}

impl TranslationService {
    /// Creates an empty service. The default locale is always supported.
    pub fn new<S: AsRef<str>>(default_locale: &str, supported: &[S]) -> Self {
        let default_locale = primary_subtag(default_locale);

        let mut locales: Vec<LocaleInfo> = Vec::new();
        for code in supported {
            let info = LocaleInfo::for_code(&primary_subtag(code.as_ref()));
            if !info.code.is_empty() && !locales.iter().any(|l| l.code == info.code) {
                locales.push(info);
            }
        }
        if !locales.iter().any(|l| l.code == default_locale) {
            locales.insert(0, LocaleInfo::for_code(&default_locale));
        }

        Self {
            catalog: RwLock::new(Arc::new(Catalog::new(HashMap::new(), default_locale.clone()))),
            default_locale,
            locales,
            registry: Mutex::new(TranslationRegistry::new()),
        }
    }

    pub fn from_config(config: &I18nConfig) -> Self {
        Self::new(&config.default_locale, &config.supported_locales)
    }

    fn registry(&self) -> MutexGuard<'_, TranslationRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, registry: &TranslationRegistry) {
        let catalog = Arc::new(Catalog::new(registry.merged(), self.default_locale.clone()));
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }

    /// The current merged catalog.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn available_locales(&self) -> &[LocaleInfo] {
        &self.locales
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.locales.iter().any(|l| l.code == code)
    }

    pub fn supported_codes(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.code.as_str()).collect()
    }

    /// Picks a supported locale from an `Accept-Language` value.
    pub fn detect_locale(&self, accept_language: Option<&str>) -> String {
        detect_locale(accept_language, &self.supported_codes(), &self.default_locale)
    }

    /// Reads all `{locale}.json` files under `path` as `module_name`'s translations.
    pub fn register_module_translations(&self, module_name: &str, path: &Path) -> I18nResult<usize> {
        let mut registry = self.registry();
        let loaded = registry.register_module(module_name, path)?;
        self.publish(&registry);
        Ok(loaded)
    }

    /// Registers every subdirectory of `root` as a module named after it.
    ///
    /// Returns the number of modules registered. Modules that fail to load
    /// are logged and skipped.
    pub fn register_modules_in(&self, root: &Path) -> I18nResult<usize> {
        let entries = fs::read_dir(root).map_err(|source| I18nError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut dirs: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut registry = self.registry();
        let mut registered = 0;
        for dir in dirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            match registry.register_module(&name, &dir) {
                Ok(_) => registered += 1,
                Err(e) => tracing::warn!(module = %name, error = %e, "Failed to register module"),
            }
        }
        self.publish(&registry);
        Ok(registered)
    }

    /// Merges an in-memory tree into `module_name`'s translations for `locale`.
    pub fn register_translations(&self, module_name: &str, locale: &str, tree: &TranslationTree) {
        let mut registry = self.registry();
        registry.register_translations(module_name, locale, tree);
        self.publish(&registry);
    }

    pub fn reload_module(&self, module_name: &str) -> I18nResult<usize> {
        let mut registry = self.registry();
        let loaded = registry.reload_module(module_name)?;
        self.publish(&registry);
        Ok(loaded)
    }

    pub fn reload_all(&self) -> usize {
        let mut registry = self.registry();
        let reloaded = registry.reload_all();
        self.publish(&registry);
        reloaded
    }

    pub fn unregister_module(&self, module_name: &str) -> bool {
        let mut registry = self.registry();
        let removed = registry.unregister_module(module_name);
        if removed {
            self.publish(&registry);
        }
        removed
    }

    pub fn registered_modules(&self) -> Vec<String> {
        self.registry().registered_modules()
    }

    /// Locales with at least one registered tree.
    pub fn loaded_locales(&self) -> Vec<String> {
        self.snapshot().locales()
    }

    fn locale_or_default<'a>(&'a self, locale: Option<&'a str>) -> &'a str {
        locale.filter(|l| !l.is_empty()).unwrap_or(self.default_locale.as_str())
    }

    pub fn translate(
        &self,
        key: &str,
        locale: Option<&str>,
        params: Option<&Params>,
        fallback: Option<&str>,
    ) -> String {
        let locale = self.locale_or_default(locale);
        translator::translate(&*self.snapshot(), key, locale, params, fallback)
    }

    pub fn translate_plural(
        &self,
        key: &str,
        count: i64,
        locale: Option<&str>,
        params: Option<&Params>,
    ) -> String {
        let locale = self.locale_or_default(locale);
        translator::translate_plural(&*self.snapshot(), key, count, locale, params)
    }

    /// Whether `key` resolves in `locale` itself, without default-locale fallback.
    pub fn has_translation(&self, key: &str, locale: Option<&str>) -> bool {
        let locale = self.locale_or_default(locale);
        self.snapshot()
            .tree(locale)
            .and_then(|tree| tree.lookup(key))
            .is_some()
    }

    /// The merged tree for `locale`, or one module's contribution to it.
    ///
    /// Unknown locales and modules yield an empty tree.
    pub fn translations(&self, locale: &str, module: Option<&str>) -> TranslationTree {
        match module {
            Some(module) => self
                .registry()
                .module(module)
                .and_then(|m| m.tree(locale))
                .unwrap_or_default(),
            None => self.snapshot().tree(locale).cloned().unwrap_or_default(),
        }
    }

    pub fn formatter(&self, locale: &str) -> LocaleFormatter {
        LocaleFormatter::new(locale)
    }
}
