use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contra::detection::DEFAULT_GUIDELINE_DIGIT_LIMIT;
use crate::contra::MessageLocale;

/// Application-level constants
pub const APP_NAME: &str = "Contraguard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable selecting the message locale (`en` or `zh`).
pub const ENV_LOCALE: &str = "CONTRAGUARD_LOCALE";
/// Environment variable with extra overdose keywords, comma separated.
pub const ENV_OVERDOSE_KEYWORDS: &str = "CONTRAGUARD_OVERDOSE_KEYWORDS";

/// Database file name inside the application data directory.
const DATABASE_FILE: &str = "contraguard.db";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "contraguard=debug,warn"
    } else {
        "contraguard=info,warn"
    }
}

/// Get the application data directory (`~/Contraguard/`).
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("guidelineDigitLimit must be at least 1")]
    InvalidDigitLimit,
}

/// Tunables of the contraindication engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    pub locale: MessageLocale,
    /// Extra keywords, added to the built-in `overdose` / `超剂量`.
    pub overdose_keywords: Vec<String>,
    /// Longest digit run accepted as the guideline's maximum.
    pub guideline_digit_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: MessageLocale::default(),
            overdose_keywords: Vec::new(),
            guideline_digit_limit: DEFAULT_GUIDELINE_DIGIT_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields take their defaults, unknown
    /// keys are rejected.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `CONTRAGUARD_LOCALE` and
    /// `CONTRAGUARD_OVERDOSE_KEYWORDS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            config.locale =
                MessageLocale::parse(&raw).ok_or_else(|| ConfigError::UnknownLocale(raw.clone()))?;
        }

        if let Some(raw) = lookup(ENV_OVERDOSE_KEYWORDS) {
            config.overdose_keywords = raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.guideline_digit_limit == 0 {
            return Err(ConfigError::InvalidDigitLimit);
        }
        Ok(())
    }
}
