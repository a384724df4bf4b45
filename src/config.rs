use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Where the archive is published.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/keepdying/itu-web-archive/main/public/";

/// Path of an optional JSON config file.
pub const CONFIG_ENV: &str = "ITU_ARCHIVE_CONFIG";
/// Overrides `base_url`.
pub const BASE_URL_ENV: &str = "ITU_ARCHIVE_BASE_URL";
/// Overrides `request_timeout_secs`.
pub const TIMEOUT_ENV: &str = "ITU_ARCHIVE_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Static locations and network settings.
///
/// Resolved once at startup: built-in defaults, then the JSON file named by
/// `ITU_ARCHIVE_CONFIG` (missing keys keep their defaults), then per-field
/// environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the archive; snapshots live at `<base_url><date>/`.
    pub base_url: String,
    /// Dates index, relative to `base_url`.
    pub dates_path: String,
    /// Course-code index, relative to `base_url`.
    pub course_codes_path: String,
    /// Education level whose CSV files carry no level prefix.
    pub default_level: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dates_path: "dates.json".to_string(),
            course_codes_path: "course_codes.json".to_string(),
            default_level: "LS".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Resolve from the process environment.
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` as the variable lookup.
    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match env(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(url) = env(BASE_URL_ENV) {
            config.base_url = url;
        }
        if let Some(secs) = env(TIMEOUT_ENV) {
            config.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV}={secs:?} is not a whole number of seconds"))?;
        }

        if !config.base_url.ends_with('/') {
            config.base_url.push('/');
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn dates_url(&self) -> String {
        format!("{}{}", self.base_url, self.dates_path)
    }

    pub fn course_codes_url(&self) -> String {
        format!("{}{}", self.base_url, self.course_codes_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
