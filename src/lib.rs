pub mod app;
pub mod app_state;
pub mod client;
pub mod config;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod modules;
pub mod telemetry;
