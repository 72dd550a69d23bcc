//! Configuration loading and parsing for jresolve
//!
//! Provides functionality to load and parse `jresolve.toml` configuration files.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "jresolve.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["hierarchy", "resolution"];
const KNOWN_HIERARCHY_KEYS: &[&str] = &["implicit_supertypes"];
const KNOWN_RESOLUTION_KEYS: &[&str] = &["implicit_imports", "parallel"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub hierarchy: HierarchyConfig,
    pub resolution: ResolutionConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HierarchyConfig {
    pub implicit_supertypes: ImplicitSupertypes,
}

/// What a type without an explicit `extends` clause inherits from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ImplicitSupertypes {
    /// No implicit supertypes: the superclass stays unset.
    #[default]
    Absent,
    /// `java.lang.Object`, `java.lang.Enum`, `java.lang.Record` and
    /// `java.lang.annotation.Annotation`, when declared in the analysed units.
    LanguageDefaults,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Packages imported on demand into every compilation unit.
    pub implicit_imports: Vec<String>,
    /// Resolve compilation units on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            implicit_imports: vec!["java.lang".to_string()],
            parallel: true,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok((config, content))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    read_config(path).map(|(config, _)| config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let (config, content) = read_config(path)?;
    let warnings = detect_unknown_keys(&content);

    for warning in &warnings {
        tracing::warn!(path = %path.display(), "{}", warning);
    }

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    for (section, known) in [
        ("hierarchy", KNOWN_HIERARCHY_KEYS),
        ("resolution", KNOWN_RESOLUTION_KEYS),
    ] {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            for key in entries.keys() {
                if !known.contains(&key.as_str()) {
                    warnings.push(format!(
                        "Unknown config option in [{}]: '{}'",
                        section, key
                    ));
                }
            }
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_default(),
        None => ConfigResult::default(),
    }
}
