use std::fmt;

use eframe::egui::ThemePreference;

/// Storage key of the persisted theme preference.
pub const THEME_KEY: &str = "themeSetting";

// ---------------------------------------------------------------------------
// Theme preference
// ---------------------------------------------------------------------------

/// User-selected colour scheme. `Auto` follows the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeSetting {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeSetting {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeSetting::Light => "light",
            ThemeSetting::Dark => "dark",
            ThemeSetting::Auto => "auto",
        }
    }

    /// Parse a stored value; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeSetting::Light),
            "dark" => Some(ThemeSetting::Dark),
            "auto" => Some(ThemeSetting::Auto),
            _ => None,
        }
    }

    /// Toggle order: light → dark → auto → light.
    pub fn next(self) -> Self {
        match self {
            ThemeSetting::Light => ThemeSetting::Dark,
            ThemeSetting::Dark => ThemeSetting::Auto,
            ThemeSetting::Auto => ThemeSetting::Light,
        }
    }

    /// Tooltip for the toggle button, naming the mode a click switches to.
    pub fn toggle_hint(self) -> &'static str {
        match self.next() {
            ThemeSetting::Light => "Switch to Light Mode",
            ThemeSetting::Dark => "Switch to Dark Mode",
            ThemeSetting::Auto => "Switch to Auto Mode",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ThemeSetting::Light => "☀",
            ThemeSetting::Dark => "🌙",
            ThemeSetting::Auto => "🌓",
        }
    }

    pub fn preference(self) -> ThemePreference {
        match self {
            ThemeSetting::Light => ThemePreference::Light,
            ThemeSetting::Dark => ThemePreference::Dark,
            ThemeSetting::Auto => ThemePreference::System,
        }
    }
}

impl fmt::Display for ThemeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Application context
// ---------------------------------------------------------------------------

/// Process-wide settings shared by all views. Read once at startup and
/// written back on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppContext {
    pub theme: ThemeSetting,
}

impl AppContext {
    /// Read persisted settings. Missing storage, a missing key or an unknown
    /// value all fall back to `auto`.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let stored = storage.and_then(|s| s.get_string(THEME_KEY));
        let theme = match stored.as_deref().map(|v| (v, ThemeSetting::parse(v))) {
            Some((_, Some(theme))) => theme,
            Some((raw, None)) => {
                log::warn!("Ignoring unknown theme setting {raw:?}");
                ThemeSetting::default()
            }
            None => ThemeSetting::default(),
        };
        log::debug!("Theme setting: {theme}");
        Self { theme }
    }

    /// Persist settings immediately.
    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        storage.set_string(THEME_KEY, self.theme.as_str().to_string());
        storage.flush();
    }

    /// Advance the theme toggle and return the new setting.
    pub fn cycle_theme(&mut self) -> ThemeSetting {
        self.theme = self.theme.next();
        self.theme
    }
}
