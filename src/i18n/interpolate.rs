use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Interpolation parameters keyed by placeholder name.
pub type Params = BTreeMap<String, ParamValue>;

/// A value that can be substituted into a `{name}` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Never substituted; the placeholder is left as written.
    Null,
}

impl ParamValue {
    fn render(&self) -> Option<String> {
        match self {
            ParamValue::Text(text) => Some(text.clone()),
            ParamValue::Integer(n) => Some(n.to_string()),
            ParamValue::Float(n) => Some(n.to_string()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::Null => None,
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                None => ParamValue::Text(n.to_string()),
            },
            Value::String(s) => ParamValue::Text(s),
            other => ParamValue::Text(other.to_string()),
        }
    }
}

/// Converts a JSON object of request parameters into [`Params`].
pub fn params_from_json(map: serde_json::Map<String, Value>) -> Params {
    map.into_iter()
        .map(|(key, value)| (key, ParamValue::from(value)))
        .collect()
}

/// Replaces every `{name}` with the matching parameter.
///
/// Placeholders without a parameter (or with a null one) stay verbatim.
pub fn interpolate(template: &str, params: &Params) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            params
                .get(&caps[1])
                .and_then(ParamValue::render)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Builds a [`Params`] map from `name => value` pairs.
#[macro_export]
macro_rules! params {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut params = $crate::i18n::Params::new();
        $(
            params.insert($key.to_string(), $crate::i18n::ParamValue::from($value));
        )*
        params
    }};
}
