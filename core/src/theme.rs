//! Persisted light/dark theme preference.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown theme {0:?}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to access theme file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Key-value slot holding the single theme preference.
pub trait ThemeStore {
    /// The stored value, or `None` when nothing valid is stored.
    fn load(&self) -> Result<Option<Theme>, ThemeError>;
    fn save(&self, theme: Theme) -> Result<(), ThemeError>;
}

/// Stores the preference as the literal `light` or `dark` in one file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ThemeError {
        ThemeError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(raw.trim().parse().ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, theme.as_str()).map_err(|e| self.io_error(e))
    }
}

/// A valid stored preference wins; otherwise follow the system preference.
pub fn initial_theme(store: &dyn ThemeStore, prefers_dark: bool) -> Result<Theme, ThemeError> {
    Ok(store.load()?.unwrap_or(if prefers_dark {
        Theme::Dark
    } else {
        Theme::Light
    }))
}

/// Flip the current theme and persist the result.
pub fn toggle_theme(store: &dyn ThemeStore, prefers_dark: bool) -> Result<Theme, ThemeError> {
    let next = initial_theme(store, prefers_dark)?.toggled();
    store.save(next)?;
    tracing::debug!(theme = %next, "theme toggled");
    Ok(next)
}
