use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub i18n: I18nConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct I18nConfig {
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub translations_dir: PathBuf,
    /// Prefix under which the REST routes are mounted.
    pub base_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_SUPPORTED_LOCALES: &str = "en,pt,es,fr,de";
pub const DEFAULT_BASE_PATH: &str = "/api/i18n";

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            supported_locales: split_locales(DEFAULT_SUPPORTED_LOCALES),
            translations_dir: PathBuf::from("translations"),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

fn split_locales(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Ensures a leading `/` and no trailing one; `""` and `"/"` mean the root.
fn normalize_base_path(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Server configuration
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        // Translation configuration
        let default_locale = env::var("I18N_DEFAULT_LOCALE")
            .map(|v| v.trim().to_lowercase())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let mut supported_locales = split_locales(
            &env::var("I18N_SUPPORTED_LOCALES").unwrap_or_else(|_| DEFAULT_SUPPORTED_LOCALES.to_string()),
        );
        if !supported_locales.contains(&default_locale) {
            supported_locales.insert(0, default_locale.clone());
        }

        let translations_dir = env::var("I18N_TRANSLATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("translations"));

        let base_path = normalize_base_path(
            &env::var("I18N_BASE_PATH").unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
        );

        // App configuration
        let environment = env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|v| v.parse::<Environment>().ok())
            .unwrap_or_default();

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Locale Hub".to_string());

        Ok(Config {
            server: ServerConfig { host, port },
            i18n: I18nConfig {
                default_locale,
                supported_locales,
                translations_dir,
                base_path,
            },
            app: AppConfig {
                name: app_name,
                environment,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}
