use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Preference key the theme is stored under.
pub const THEME_KEY: &str = "appTheme";

/// Display mode of the page. Dark is the default look.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
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

    /// Label of the theme toggle button.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☀️",
            Theme::Dark => "🌙",
        }
    }

    /// Class to put on `<body>`; dark mode uses the unclassed default styles.
    pub fn body_class(self) -> Option<&'static str> {
        match self {
            Theme::Light => Some("light-mode"),
            Theme::Dark => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("preferences I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// Theme preference persisted in a small JSON key-value file, shared with any
/// other preferences the host keeps there.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved theme. Only an explicit `"light"` selects light mode; a missing
    /// file or any other value means dark.
    pub fn load(&self) -> Result<Theme, ThemeError> {
        let prefs = self.read()?;
        let theme = match prefs.get(THEME_KEY).and_then(Value::as_str) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        };
        Ok(theme)
    }

    pub fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        let mut prefs = self.read()?;
        prefs.insert(THEME_KEY.to_string(), Value::from(theme.as_str()));

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &prefs)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("saved theme {} to {}", theme.as_str(), self.path.display());
        Ok(())
    }

    /// Flip `current`, persist the result and return it.
    pub fn toggle(&self, current: Theme) -> Result<Theme, ThemeError> {
        let next = current.toggled();
        self.save(next)?;
        Ok(next)
    }

    fn read(&self) -> Result<Map<String, Value>, ThemeError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}
