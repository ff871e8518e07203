//! Language configuration (`language.toml`).
//!
//! Required keys: `name`, `scope`, `grammar`. The grammar path resolves
//! relative to the config file's directory. Unknown keys are preserved but
//! ignored.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;


#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("grammar file not found: {}", .0.display())]
    GrammarNotFound(PathBuf),
}

impl ConfigError {
    /// Whether the failure is an I/O problem rather than a bad config.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::GrammarNotFound(_))
    }
}

#[derive(Debug, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub scope: String,
    pub grammar: PathBuf,
    #[serde(default)]
    pub snippets: Vec<String>,
    #[serde(default)]
    pub repository: IndexMap<String, String>,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,

    /// Unknown keys, preserved but ignored.
    #[serde(flatten)]
    pub extra: IndexMap<String, toml::Value>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl LanguageConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let config = Self::parse(&text, base_dir)?;
        let grammar = config.grammar_path();
        if !grammar.exists() {
            return Err(ConfigError::GrammarNotFound(grammar));
        }
        Ok(config)
    }

    /// Parse and validate without touching the filesystem.
    pub(crate) fn parse(text: &str, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.base_dir = base_dir;

        if config.name.trim().is_empty() {
            return Err(ConfigError::EmptyField("name"));
        }
        if config.scope.trim().is_empty() {
            return Err(ConfigError::EmptyField("scope"));
        }
        if config.grammar.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("grammar"));
        }
        Ok(config)
    }

    /// The grammar path, resolved against the config directory.
    pub fn grammar_path(&self) -> PathBuf {
        if self.grammar.is_absolute() {
            self.grammar.clone()
        } else {
            self.base_dir.join(&self.grammar)
        }
    }
}
