use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::i18n::error::{I18nError, I18nResult};
use crate::i18n::tree::TranslationTree;

/// Translations contributed by one module, per locale.
#[derive(Debug, Clone, Default)]
pub struct ModuleTranslations {
    pub name: String,
    pub path: Option<PathBuf>,
    /// Trees read from `{locale}.json` files under `path`.
    file_trees: BTreeMap<String, TranslationTree>,
    /// Trees registered in memory; dropped on reload.
    direct_trees: BTreeMap<String, TranslationTree>,
}

impl ModuleTranslations {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// This module's merged tree for `locale` (file trees first, then direct ones).
    pub fn tree(&self, locale: &str) -> Option<TranslationTree> {
        let files = self.file_trees.get(locale);
        let direct = self.direct_trees.get(locale);
        if files.is_none() && direct.is_none() {
            return None;
        }

        let mut tree = TranslationTree::new();
        for part in [files, direct].into_iter().flatten() {
            tree.merge(part);
        }
        Some(tree)
    }
}

/// Per-module translation sources, merged into one tree per locale.
///
/// Modules merge in registration order and later modules win on conflicting
/// leaves. Re-registering or reloading a module keeps its position.
#[derive(Debug, Default)]
pub struct TranslationRegistry {
    modules: Vec<ModuleTranslations>,
}

impl TranslationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, module_name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == module_name)
    }

    fn entry(&mut self, module_name: &str) -> &mut ModuleTranslations {
        let index = match self.position(module_name) {
            Some(index) => index,
            None => {
                self.modules.push(ModuleTranslations::new(module_name));
                self.modules.len() - 1
            }
        };
        &mut self.modules[index]
    }

    /// Reads every `{locale}.json` under `path` as this module's file contribution.
    ///
    /// The module's previous file trees are replaced wholesale. Files that fail
    /// to parse are skipped with a warning. Returns the number of files loaded.
    pub fn register_module(&mut self, module_name: &str, path: &Path) -> I18nResult<usize> {
        let trees = load_locale_files(path)?;
        let loaded = trees.len();

        let module = self.entry(module_name);
        module.path = Some(path.to_path_buf());
        module.file_trees = trees;

        tracing::info!(
            module = module_name,
            files = loaded,
            path = %path.display(),
            "Registered module translations"
        );
        Ok(loaded)
    }

    /// Merges an in-memory tree into the module's contribution for `locale`.
    pub fn register_translations(&mut self, module_name: &str, locale: &str, tree: &TranslationTree) {
        let module = self.entry(module_name);
        module
            .direct_trees
            .entry(locale.to_lowercase())
            .or_default()
            .merge(tree);
    }

    pub fn unregister_module(&mut self, module_name: &str) -> bool {
        match self.position(module_name) {
            Some(index) => {
                self.modules.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the module's whole contribution with a fresh read of its directory.
    ///
    /// In-memory registrations are dropped. A module without a directory, or
    /// whose directory is gone, ends up empty. A read error leaves the module
    /// untouched.
    pub fn reload_module(&mut self, module_name: &str) -> I18nResult<usize> {
        let index = self
            .position(module_name)
            .ok_or_else(|| I18nError::ModuleNotFound(module_name.to_string()))?;

        let trees = match self.modules[index].path.clone().filter(|p| p.exists()) {
            Some(path) => load_locale_files(&path)?,
            None => BTreeMap::new(),
        };
        let loaded = trees.len();

        let module = &mut self.modules[index];
        module.file_trees = trees;
        module.direct_trees.clear();

        tracing::info!(module = module_name, files = loaded, "Reloaded module translations");
        Ok(loaded)
    }

    /// Reloads every module; read failures are logged and leave that module as it was.
    pub fn reload_all(&mut self) -> usize {
        let names: Vec<String> = self.modules.iter().map(|m| m.name.clone()).collect();
        let mut reloaded = 0;
        for name in names {
            match self.reload_module(&name) {
                Ok(_) => reloaded += 1,
                Err(e) => tracing::warn!(module = %name, error = %e, "Failed to reload module"),
            }
        }
        reloaded
    }

    pub fn module(&self, module_name: &str) -> Option<&ModuleTranslations> {
        self.modules.iter().find(|m| m.name == module_name)
    }

    pub fn registered_modules(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name.clone()).collect()
    }

    /// One merged tree per locale across all modules.
    pub fn merged(&self) -> HashMap<String, TranslationTree> {
        let mut merged: HashMap<String, TranslationTree> = HashMap::new();
        for module in &self.modules {
            for (locale, tree) in module.file_trees.iter().chain(module.direct_trees.iter()) {
                merged.entry(locale.clone()).or_default().merge(tree);
            }
        }
        merged
    }
}

/// Loads `{locale}.json` files from `dir`, keyed by lower-cased file stem.
fn load_locale_files(dir: &Path) -> I18nResult<BTreeMap<String, TranslationTree>> {
    let entries = fs::read_dir(dir).map_err(|source| I18nError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut trees = BTreeMap::new();
    for path in paths {
        let Some(locale) = path.file_stem().and_then(|s| s.to_str()).map(str::to_lowercase) else {
            continue;
        };
        match load_tree_file(&path) {
            Ok(tree) => {
                trees.insert(locale, tree);
            }
            Err(e) => tracing::warn!(error = %e, "Skipping translation file"),
        }
    }
    Ok(trees)
}

fn load_tree_file(path: &Path) -> I18nResult<TranslationTree> {
    let content = fs::read_to_string(path).map_err(|source| I18nError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|source| I18nError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    TranslationTree::from_json(value).ok_or_else(|| I18nError::NotAnObject(path.to_path_buf()))
}
