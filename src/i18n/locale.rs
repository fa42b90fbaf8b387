use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use unic_langid::LanguageIdentifier;

/// A locale the service can answer for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleInfo {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

/// English and native display names for the locales shipped by default.
const KNOWN_LOCALES: &[(&str, &str, &str)] = &[
    ("en", "English", "English"),
    ("pt", "Portuguese", "Português"),
    ("es", "Spanish", "Español"),
    ("fr", "French", "Français"),
    ("de", "German", "Deutsch"),
    ("it", "Italian", "Italiano"),
    ("ru", "Russian", "Русский"),
    ("ar", "Arabic", "العربية"),
    ("tr", "Turkish", "Türkçe"),
    ("nl", "Dutch", "Nederlands"),
    ("pl", "Polish", "Polski"),
    ("ja", "Japanese", "日本語"),
    ("zh", "Chinese", "中文"),
];

impl LocaleInfo {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        native_name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            native_name: native_name.into(),
        }
    }

    /// Builds the info for `code`, using the built-in names when known.
    ///
    /// Unknown codes use the code itself as both display names.
    pub fn for_code(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        match KNOWN_LOCALES.iter().find(|(known, _, _)| *known == code) {
            Some((known, name, native)) => LocaleInfo::new(*known, *name, *native),
            None => LocaleInfo::new(code.clone(), code.clone(), code),
        }
    }
}

impl Display for LocaleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// The language subtag of a BCP 47 tag, lower-cased (`"pt-BR"` -> `"pt"`).
///
/// Tags that don't parse, such as POSIX `en_US.UTF-8`, fall back to the text
/// before the first separator.
pub fn primary_subtag(tag: &str) -> String {
    let tag = tag.trim();
    match tag.parse::<LanguageIdentifier>() {
        Ok(lang_id) if !tag.is_empty() => lang_id.language.as_str().to_string(),
        _ => tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase(),
    }
}

/// Splits an `Accept-Language` value into tags, in header order.
///
/// Quality parameters are stripped, not used for reordering.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    header
        .split(',')
        .filter_map(|part| {
            let tag = part.split(';').next().unwrap_or_default().trim();
            (!tag.is_empty()).then(|| tag.to_string())
        })
        .collect()
}

/// Returns the first preference whose primary subtag is supported, else `default`.
pub fn resolve_locale<I, S>(preferences: I, supported: &[S], default: &str) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    S: AsRef<str>,
{
    for candidate in preferences {
        let subtag = primary_subtag(candidate.as_ref());
        if subtag.is_empty() {
            continue;
        }
        if supported.iter().any(|code| code.as_ref() == subtag) {
            return subtag;
        }
    }
    default.to_string()
}

/// Resolves an `Accept-Language` header against the supported codes.
pub fn detect_locale<S: AsRef<str>>(
    accept_language: Option<&str>,
    supported: &[S],
    default: &str,
) -> String {
    match accept_language {
        Some(header) => resolve_locale(parse_accept_language(header), supported, default),
        None => default.to_string(),
    }
}
