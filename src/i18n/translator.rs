//! Lookup, fallback and pluralization shared by the server service and the
//! client store. Both sides only differ in where their trees come from.

use crate::i18n::interpolate::{interpolate, ParamValue, Params};
use crate::i18n::plural::{plural_category, PluralCategory};
use crate::i18n::tree::TranslationTree;

/// Read access to the translation trees of each locale.
pub trait TreeLookup {
    fn tree(&self, locale: &str) -> Option<&TranslationTree>;

    fn default_locale(&self) -> &str;
}

/// Marker returned for keys that resolve nowhere.
pub fn missing_marker(key: &str) -> String {
    format!("[{}]", key)
}

/// Resolves `key` in `locale`, then in the default locale. No interpolation.
pub fn resolve<'a, L: TreeLookup + ?Sized>(lookup: &'a L, key: &str, locale: &str) -> Option<&'a str> {
    if let Some(text) = lookup.tree(locale).and_then(|tree| tree.lookup(key)) {
        return Some(text);
    }

    let default = lookup.default_locale();
    if locale != default {
        return lookup.tree(default).and_then(|tree| tree.lookup(key));
    }
    None
}

/// Translates `key` for `locale`.
///
/// Missing keys yield `fallback` when given, otherwise `[key]`. Parameters
/// are only applied to resolved strings.
pub fn translate<L: TreeLookup + ?Sized>(
    lookup: &L,
    key: &str,
    locale: &str,
    params: Option<&Params>,
    fallback: Option<&str>,
) -> String {
    match resolve(lookup, key, locale) {
        Some(text) => match params {
            Some(params) if !params.is_empty() => interpolate(text, params),
            _ => text.to_string(),
        },
        None => fallback
            .map(str::to_string)
            .unwrap_or_else(|| missing_marker(key)),
    }
}

/// Translates `<key>.<category>` for `count`, injecting `count` into the params.
///
/// When the category form is missing, `<key>.other` is tried before giving up.
pub fn translate_plural<L: TreeLookup + ?Sized>(
    lookup: &L,
    key: &str,
    count: i64,
    locale: &str,
    params: Option<&Params>,
) -> String {
    let category = plural_category(count, locale);

    let mut all_params = params.cloned().unwrap_or_default();
    all_params
        .entry("count".to_string())
        .or_insert(ParamValue::Integer(count));

    let plural_key = format!("{}.{}", key, category);
    let result = translate(lookup, &plural_key, locale, Some(&all_params), None);

    if result == missing_marker(&plural_key) && category != PluralCategory::Other {
        return translate(
            lookup,
            &format!("{}.other", key),
            locale,
            Some(&all_params),
            None,
        );
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    pub(crate) struct Fixture {
        pub trees: HashMap<String, TranslationTree>,
        pub default: String,
    }

    impl TreeLookup for Fixture {
        fn tree(&self, locale: &str) -> Option<&TranslationTree> {
            self.trees.get(locale)
        }

        fn default_locale(&self) -> &str {
            &self.default
        }
    }

    pub(crate) fn fixture() -> Fixture {
        let en = TranslationTree::from_json(json!({
            "common": {"save": "Save", "only_en": "English only"},
            "validation": {"min": "Must be at least {min} characters"},
            "items": {
                "zero": "No items",
                "one": "{count} item",
                "other": "{count} items"
            },
            "files": {"one": "{count} file", "other": "{count} files"}
        }))
        .unwrap();
        let ru = TranslationTree::from_json(json!({
            "common": {"save": "Сохранить"},
            "items": {
                "one": "{count} предмет",
                "few": "{count} предмета",
                "many": "{count} предметов"
            }
        }))
        .unwrap();
        let fr = TranslationTree::from_json(json!({
            "items": {"one": "{count} élément", "other": "{count} éléments"}
        }))
        .unwrap();

        Fixture {
            trees: HashMap::from([
                ("en".to_string(), en),
                ("ru".to_string(), ru),
                ("fr".to_string(), fr),
            ]),
            default: "en".to_string(),
        }
    }

    #[test]
    fn test_translate_exact_string() {
        let f = fixture();
        assert_eq!(translate(&f, "common.save", "en", None, None), "Save");
        assert_eq!(translate(&f, "common.save", "ru", None, None), "Сохранить");
    }

    #[test]
    fn test_missing_key_marker_and_fallback() {
        let f = fixture();
        assert_eq!(translate(&f, "missing.key", "en", None, None), "[missing.key]");
        assert_eq!(
            translate(&f, "missing.key", "en", None, Some("Default")),
            "Default"
        );
    }

    #[test]
    fn test_falls_back_to_default_locale() {
        let f = fixture();
        assert_eq!(translate(&f, "common.only_en", "xx", None, None), "English only");
        assert_eq!(translate(&f, "common.only_en", "ru", None, None), "English only");
    }

    #[test]
    fn test_params_are_interpolated() {
        let f = fixture();
        let params = crate::params! { "min" => 3 };
        assert_eq!(
            translate(&f, "validation.min", "en", Some(&params), None),
            "Must be at least 3 characters"
        );
    }

    #[test]
    fn test_plural_forms_english() {
        let f = fixture();
        assert_eq!(translate_plural(&f, "items", 0, "en", None), "No items");
        assert_eq!(translate_plural(&f, "items", 1, "en", None), "1 item");
        assert_eq!(translate_plural(&f, "items", 5, "en", None), "5 items");
    }

    #[test]
    fn test_plural_forms_russian() {
        let f = fixture();
        assert_eq!(translate_plural(&f, "items", 21, "ru", None), "21 предмет");
        assert_eq!(translate_plural(&f, "items", 22, "ru", None), "22 предмета");
        assert_eq!(translate_plural(&f, "items", 25, "ru", None), "25 предметов");
    }

    #[test]
    fn test_plural_zero_uses_zero_form_even_for_french() {
        let f = fixture();
        // "fr" has no zero form, so the default locale's zero form is used
        assert_eq!(translate_plural(&f, "items", 0, "fr", None), "No items");
    }

    #[test]
    fn test_plural_missing_category_retries_other() {
        let f = fixture();
        assert_eq!(translate_plural(&f, "files", 0, "en", None), "0 files");
    }

    #[test]
    fn test_plural_missing_everywhere_marks_category_key() {
        let f = fixture();
        assert_eq!(translate_plural(&f, "ghosts", 5, "en", None), "[ghosts.other]");
        assert_eq!(translate_plural(&f, "ghosts", 1, "en", None), "[ghosts.other]");
    }

    #[test]
    fn test_plural_keeps_extra_params() {
        let mut f = fixture();
        f.trees.get_mut("en").unwrap().insert_path("cart.other", "{count} items for {name}");
        let params = crate::params! { "name" => "Ana" };
        assert_eq!(
            translate_plural(&f, "cart", 3, "en", Some(&params)),
            "3 items for Ana"
        );
    }
}
