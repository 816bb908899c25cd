//! Default locations and home directory expansion.

use crate::error::{ErrorKind, Result};
use directories::{BaseDirs, ProjectDirs};
use exn::OptionExt;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable pointing at the configuration file to use.
pub const CONFIG_ENV: &str = "SHOWCOPY_CONFIG";
const APPLICATION: &str = "showcopy";
const CONFIG_FILE: &str = "config.toml";
const CACHE_FILE: &str = "compatibility.json";

/// Location of the configuration file when none is given explicitly.
///
/// Uses [`CONFIG_ENV`] if it is set and not empty, otherwise `config.toml` in
/// the platform configuration directory (e.g. `~/.config/showcopy/` on Linux).
pub fn default_config_path() -> Result<PathBuf> {
    config_path_from(std::env::var_os(CONFIG_ENV))
}

fn config_path_from(env: Option<OsString>) -> Result<PathBuf> {
    match env.filter(|value| !value.is_empty()) {
        Some(path) => expand_home(PathBuf::from(path)),
        None => Ok(project_dirs()?.config_dir().join(CONFIG_FILE)),
    }
}

/// Location of the compatibility cache when the configuration doesn't set one.
pub fn default_cache_path() -> Result<PathBuf> {
    Ok(project_dirs()?.cache_dir().join(CACHE_FILE))
}

/// Replace a leading `~` component with the current user's home directory.
///
/// Only a bare `~` is expanded; `~other/...` is left untouched.
pub fn expand_home(path: PathBuf) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path);
    };
    let dirs = BaseDirs::new().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
    Ok(match rest.as_os_str().is_empty() {
        true => dirs.home_dir().to_path_buf(),
        false => dirs.home_dir().join(rest),
    })
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION).ok_or_raise(|| ErrorKind::NoHomeDirectory)
}
