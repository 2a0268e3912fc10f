use reqblocks_engine::{BlockStyle, Category, Dictionary, EngineError, StyleMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown block category '{name}' in styles of {config_path}")]
    UnknownStyleCategory { config_path: PathBuf, name: String },

    #[error("Failed to read dictionary file at {dictionary_path}: {source}")]
    DictionaryReadError {
        dictionary_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse dictionary file at {dictionary_path}: {source}")]
    DictionaryParseError {
        dictionary_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid dictionary at {dictionary_path}: {source}")]
    InvalidDictionary {
        dictionary_path: PathBuf,
        source: EngineError,
    },
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dictionary file; the built-in EARS dictionary when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Style overrides keyed by category name (`object`, `keyword`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, BlockStyle>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Some(name) = config
            .styles
            .keys()
            .find(|name| name.parse::<Category>().is_err())
        {
            return Err(ConfigError::UnknownStyleCategory {
                config_path: config_path.to_path_buf(),
                name: name.clone(),
            });
        }

        // Expand shell variables and tilde in the loaded paths
        config.dictionary_path = config
            .dictionary_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));
        config.log_file = config
            .log_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/reqblocks");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The EARS palette with this config's overrides on top.
    pub fn style_map(&self) -> StyleMap {
        let mut styles = StyleMap::ears();
        for (name, style) in &self.styles {
            if let Ok(category) = name.parse::<Category>() {
                styles.insert(category, style.clone());
            }
        }
        styles
    }

    /// The configured dictionary, or the built-in one when none is set.
    pub fn load_dictionary(&self) -> Result<Dictionary, ConfigError> {
        match &self.dictionary_path {
            Some(path) => load_dictionary_from_path(path),
            None => Ok(Dictionary::ears()),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

/// Read and validate a TOML dictionary file.
pub fn load_dictionary_from_path<P: AsRef<Path>>(
    dictionary_path: P,
) -> Result<Dictionary, ConfigError> {
    let dictionary_path = dictionary_path.as_ref();
    let content = std::fs::read_to_string(dictionary_path).map_err(|source| {
        ConfigError::DictionaryReadError {
            dictionary_path: dictionary_path.to_path_buf(),
            source,
        }
    })?;

    let dictionary: Dictionary =
        toml::from_str(&content).map_err(|source| ConfigError::DictionaryParseError {
            dictionary_path: dictionary_path.to_path_buf(),
            source,
        })?;

    dictionary
        .validate()
        .map_err(|source| ConfigError::InvalidDictionary {
            dictionary_path: dictionary_path.to_path_buf(),
            source,
        })?;

    Ok(dictionary)
}
