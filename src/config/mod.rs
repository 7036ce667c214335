//! Configuration management for Tributary.
//!
//! Configuration is read from `~/.config/tributary/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{de, Deserialize, Deserializer};

use crate::fetcher::proxy::DEFAULT_PROXY_URL;
use crate::fetcher::Proxy;
use crate::i18n::Locale;
use crate::poller::{self, PollerConfig};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: Locale,
    pub proxy: ProxyConfig,
    pub http: HttpConfig,
    pub poller: PollerSettings,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Relay used to reach feeds that do not send CORS headers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

impl ProxyConfig {
    /// The relay to fetch through, or `None` for direct requests.
    pub fn build(&self) -> crate::app::Result<Option<Proxy>> {
        if !self.enabled {
            return Ok(None);
        }
        Proxy::new(&self.url).map(Some)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("tributary/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    #[serde(deserialize_with = "deserialize_interval")]
    pub interval: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: poller::DEFAULT_INTERVAL,
        }
    }
}

impl From<PollerSettings> for PollerConfig {
    fn from(settings: PollerSettings) -> Self {
        PollerConfig {
            interval: settings.interval,
        }
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    poller::parse_interval(&s).map_err(de::Error::custom)
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/tributary/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tributary").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.proxy.enabled {
            if let Err(e) = Proxy::new(&self.proxy.url) {
                return Err(ConfigError::Invalid(format!("proxy.url: {}", e)));
            }
        }

        let invalid = self.keybindings.invalid_bindings();
        if !invalid.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "unrecognized keybindings: {}",
                invalid.join(", ")
            )));
        }

        Ok(())
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// The default config file content, with comments.
    pub fn default_config_content() -> String {
        r##"# Tributary Configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

# Interface language: "en" or "ru"
locale = "en"

[proxy]
# Fetch feeds through an allorigins-style relay that wraps the body in
# {"contents": ..., "status": {"http_code": ...}}
enabled = true
url = "https://allorigins.hexlet.app/get"

[http]
timeout_secs = 10
user_agent = "tributary/0.1.0"

[poller]
# Pause between refresh cycles: "500ms", "5s", "2m", "1h"
interval = "5s"

[colors]
# Border colors
active_border = "Cyan"
inactive_border = "DarkGray"

# Selection highlight
selection_bg = "Cyan"
selection_fg = "Black"

# Post list
read_post = "DarkGray"
unread_post = "White"

# Feedback line under the input
feedback_error = "LightRed"
feedback_success = "LightGreen"
feedback_pending = "Yellow"

# Links in preview
link = "Blue"

# Status bar
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
# Navigation
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]

# Actions
select = ["Enter"]
mark_read = ["r"]
open_in_browser = ["o"]
focus_input = ["a", "/"]
toggle_maximize = ["m"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.locale, Locale::En);
        assert!(config.proxy.enabled);
        assert_eq!(config.proxy.url, DEFAULT_PROXY_URL);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.poller.interval, Duration::from_secs(5));
        assert_eq!(config.colors.active_border, Color::Cyan);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
locale = "ru"

[poller]
interval = "30s"

[colors]
active_border = "#FF0000"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.locale, Locale::Ru);
        assert_eq!(config.poller.interval, Duration::from_secs(30));
        assert_eq!(config.colors.active_border, Color::Rgb(255, 0, 0));
        assert_eq!(config.colors.inactive_border, Color::DarkGray);
        assert!(config.proxy.enabled);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.poller.interval, poller::DEFAULT_INTERVAL);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
    }

    #[test]
    fn test_bad_interval_rejected() {
        let result: Result<Config, _> = toml::from_str("[poller]\ninterval = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_proxy_disabled_builds_none() {
        let proxy = ProxyConfig {
            enabled: false,
            url: String::new(),
        };
        assert!(proxy.build().unwrap().is_none());
        assert!(ProxyConfig::default().build().unwrap().is_some());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[http]\ntimeout_secs = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.http.timeout_secs, 3);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[http]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "[keybindings]\nquit = [\"Hyper+q\"]\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "[proxy]\nurl = \"not a url\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
