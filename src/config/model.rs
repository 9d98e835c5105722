//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the panel lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Timing of toasts, page transitions and the redraw tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_toast_lifetime")]
    pub toast_lifetime_ms: u64,
    /// Length of each half of a page fade. Zero disables fading.
    #[serde(default = "default_fade")]
    pub fade_ms: u64,
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_lifetime_ms: default_toast_lifetime(),
            fade_ms: default_fade(),
            tick_ms: default_tick(),
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: default_log_dir(),
            level: default_level(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_toast_lifetime() -> u64 {
    5000
}
fn default_fade() -> u64 {
    300
}
fn default_tick() -> u64 {
    50
}
fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "~/.local/share/qubert-tui/logs".to_string()
}
fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.url, "http://127.0.0.1:8080");
        assert_eq!(config.ui.toast_lifetime_ms, 5000);
        assert_eq!(config.ui.fade_ms, 300);
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            url = "https://nas.lan:9443"

            [ui]
            fade_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.server.url, "https://nas.lan:9443");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.ui.fade_ms, 0);
        assert_eq!(config.ui.tick_ms, 50);
    }
}
