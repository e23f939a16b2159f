use serde_json::Value;
use thiserror::Error;

use crate::sync::aliases::PathAliases;

pub const ENV_BASE_URL: &str = "IMMICH_BASE_URL";
pub const ENV_API_KEY: &str = "IMMICH_API_KEY";
pub const ENV_LIBRARY_NAME: &str = "IMMICH_LIBRARY_NAME";
pub const ENV_FILE_EXTENSIONS: &str = "IMMICH_FILE_EXTENSIONS";
pub const ENV_PATH_ALIASES: &str = "IMMICH_LIBRARY_PATH_ALIASES";

pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &[
    ".JPG", ".MOV", ".MP4", ".PNG", ".jpg", ".mov", ".mp4", ".png",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub base_url: String,
    pub api_key: String,
    pub library_name: String,
    pub file_extensions: Vec<String>,
    pub aliases: PathAliases,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = read_required(&lookup, ENV_BASE_URL)?;
        let api_key = read_required(&lookup, ENV_API_KEY)?;
        let library_name = read_required(&lookup, ENV_LIBRARY_NAME)?;
        let file_extensions = match lookup(ENV_FILE_EXTENSIONS) {
            Some(raw) if !raw.trim().is_empty() => parse_extensions(&raw)?,
            _ => DEFAULT_FILE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        };
        let aliases = match lookup(ENV_PATH_ALIASES) {
            Some(raw) if !raw.trim().is_empty() => parse_aliases(&raw)?,
            _ => PathAliases::default(),
        };

        Ok(Self {
            base_url,
            api_key,
            library_name,
            file_extensions,
            aliases,
        })
    }
}

fn read_required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_extensions(raw: &str) -> Result<Vec<String>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: ENV_FILE_EXTENSIONS,
        reason,
    };
    let extensions: Vec<String> = serde_json::from_str(raw)
        .map_err(|err| invalid(format!("expected a JSON array of strings: {err}")))?;
    if extensions.is_empty() {
        return Err(invalid("extension list is empty".into()));
    }
    Ok(extensions)
}

fn parse_aliases(raw: &str) -> Result<PathAliases, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: ENV_PATH_ALIASES,
        reason,
    };
    let value: Value = serde_json::from_str(raw).map_err(|err| invalid(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(invalid("expected a JSON object".into()));
    };
    // serde_json keeps declaration order (preserve_order), which decides first-match.
    let mut pairs = Vec::with_capacity(map.len());
    for (alias, resolved) in map {
        let Value::String(resolved) = resolved else {
            return Err(invalid(format!("alias {alias} must map to a string")));
        };
        pairs.push((alias, resolved));
    }
    Ok(PathAliases::new(pairs))
}
