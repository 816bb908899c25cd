//! Configuration loading for showcopy.
//!
//! Configuration is read from a TOML file and can be overridden per value with
//! environment variables (`SHOWCOPY_` prefix, `__` between table and key):
//!
//! ```toml
//! [general]
//! base_path = "/media/droppie/libraries/shows"
//! target_path = "/media/usb"
//! # Optional, defaults to the platform cache directory.
//! cache_file = "~/.cache/showcopy/compatibility.json"
//! ```
//!
//! ```sh
//! SHOWCOPY_GENERAL__TARGET_PATH=/media/other-usb showcopy ...
//! ```

pub mod error;
mod paths;

pub use crate::paths::{CONFIG_ENV, default_cache_path, default_config_path, expand_home};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "SHOWCOPY_";

#[derive(Debug, Deserialize)]
struct RawConfig {
    general: RawGeneral,
}

#[derive(Debug, Deserialize)]
struct RawGeneral {
    base_path: PathBuf,
    target_path: PathBuf,
    #[serde(default)]
    cache_file: Option<PathBuf>,
}

/// Resolved configuration, with every path expanded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Library root containing one directory per show.
    pub library: PathBuf,
    /// Root of the target device library episodes are copied into.
    pub target: PathBuf,
    /// File the compatibility cache is persisted to.
    pub cache_file: PathBuf,
}
impl Config {
    /// Load the configuration from `path`, or from [`default_config_path`] if
    /// no path is given, applying environment overrides on top.
    #[instrument(level = "debug", skip_all)]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => expand_home(path.to_path_buf())?,
            None => default_config_path()?,
        };
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path));
        }
        let figment = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));
        let config = Self::extract(figment)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    fn extract(figment: Figment) -> Result<Self> {
        let raw: RawConfig = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        let cache_file = match raw.general.cache_file {
            Some(path) => expand_home(path)?,
            None => default_cache_path()?,
        };
        Ok(Self {
            library: expand_home(raw.general.base_path)?,
            target: expand_home(raw.general.target_path)?,
            cache_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FULL: &str = r#"
        [general]
        base_path = "/media/droppie/libraries/shows"
        target_path = "/media/usb"
        cache_file = "/var/cache/showcopy.json"
    "#;

    #[test]
    fn test_extract_full() {
        let config = Config::extract(Figment::from(Toml::string(FULL))).unwrap();
        assert_eq!(
            config,
            Config {
                library: PathBuf::from("/media/droppie/libraries/shows"),
                target: PathBuf::from("/media/usb"),
                cache_file: PathBuf::from("/var/cache/showcopy.json"),
            }
        );
    }

    #[test]
    fn test_extract_defaults_cache_file() {
        let toml = "[general]\nbase_path = \"/shows\"\ntarget_path = \"/usb\"\n";
        let config = Config::extract(Figment::from(Toml::string(toml))).unwrap();
        assert_eq!(config.cache_file, default_cache_path().unwrap());
    }

    #[test]
    fn test_extract_expands_home() {
        let toml = "[general]\nbase_path = \"~/shows\"\ntarget_path = \"/usb\"\ncache_file = \"~/compat.json\"\n";
        let config = Config::extract(Figment::from(Toml::string(toml))).unwrap();
        assert!(config.library.is_absolute());
        assert!(config.library.ends_with("shows"));
        assert!(config.cache_file.ends_with("compat.json"));
        assert!(!config.cache_file.starts_with("~"));
    }

    #[test]
    fn test_extract_later_sources_win() {
        let figment = Figment::from(Toml::string(FULL)).merge(Toml::string("[general]\ntarget_path = \"/media/other\""));
        let config = Config::extract(figment).unwrap();
        assert_eq!(config.target, PathBuf::from("/media/other"));
        assert_eq!(config.library, PathBuf::from("/media/droppie/libraries/shows"));
    }

    #[test]
    fn test_extract_missing_required() {
        let err = Config::extract(Figment::from(Toml::string("[general]\nbase_path = \"/shows\""))).unwrap_err();
        assert_eq!(&*err, &ErrorKind::Invalid);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, FULL).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.library, PathBuf::from("/media/droppie/libraries/shows"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound(path));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is [not toml").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(&*err, &ErrorKind::Invalid);
    }
}
