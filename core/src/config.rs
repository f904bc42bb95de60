//! Client configuration from the environment.
//!
//! - `TODO_API_BASE_URL`: base URL or path prefix for every API call.
//!   Defaults to `/api`, which suits a same-origin gateway or a dev proxy.
//! - `TODO_API_ORIGIN`: origin that relative base URLs are resolved against.
//! - `TODO_CLIENT_DATA_DIR`: where `FileStorage` keeps the token. Defaults to
//!   the platform data directory.

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;
use url::Url;

use crate::storage::FileStorage;

pub const BASE_URL_ENV: &str = "TODO_API_BASE_URL";
pub const ORIGIN_ENV: &str = "TODO_API_ORIGIN";
pub const DATA_DIR_ENV: &str = "TODO_CLIENT_DATA_DIR";

/// Base URL used when `TODO_API_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("could not determine a data directory; set TODO_CLIENT_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub origin: Option<Url>,
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = var(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let origin = var(ORIGIN_ENV)
            .map(|raw| Url::parse(&raw))
            .transpose()
            .map_err(|source| ConfigError::InvalidUrl {
                var: ORIGIN_ENV,
                source,
            })?;
        let storage_dir = match var(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            base_url,
            origin,
            storage_dir,
        })
    }

    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir)
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("dev", "todo-client", "todo-client").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_relative_api_prefix() {
        let config = ClientConfig::from_lookup(lookup(&[(DATA_DIR_ENV, "/tmp/todo")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.origin, None);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/todo"));
    }

    #[test]
    fn environment_overrides_base_url_and_origin() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://gw.example.com/api"),
            (ORIGIN_ENV, "http://localhost:8080"),
            (DATA_DIR_ENV, "/tmp/todo"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://gw.example.com/api");
        assert_eq!(config.origin.unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn empty_base_url_counts_as_unset() {
        let config =
            ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, ""), (DATA_DIR_ENV, "/tmp/todo")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ORIGIN_ENV, "not a url"), (DATA_DIR_ENV, "/tmp/todo")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: ORIGIN_ENV, .. }));
    }
}
