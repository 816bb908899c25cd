//! Choosing which episode files are candidates for copying.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const SEASON_MARKER: &str = "Season ";

/// A whole show, or a single season of a show.
///
/// Parsed from `"Show"` or `"Show/Season 01"`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    pub show: String,
    pub season: Option<String>,
}
impl Selection {
    /// Path of the selection, relative to the library root.
    pub fn path(&self) -> PathBuf {
        let show = PathBuf::from(&self.show);
        match &self.season {
            Some(season) => show.join(season),
            None => show,
        }
    }
}
impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_matches('/');
        let (show, season) = match trimmed.split_once('/') {
            Some((show, season)) => (show, Some(season)),
            None => (trimmed, None),
        };
        if show.is_empty() || season.is_some_and(|season| season.is_empty() || season.contains('/')) {
            exn::bail!(ErrorKind::InvalidSelection(s.to_string()));
        }
        Ok(Self { show: show.to_string(), season: season.map(String::from) })
    }
}
impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.season {
            Some(season) => write!(f, "{}/{}", self.show, season),
            None => f.write_str(&self.show),
        }
    }
}

/// List the candidate episode files of a selection, sorted by path.
///
/// - For a whole show: every file directly inside a directory whose name
///   contains `"Season "`, at any depth below the show directory.
/// - For a single season: every file below the season directory, including
///   files in nested directories (these will not resolve to a cache key later
///   on and get skipped then).
pub fn candidates(root: &Path, selection: &Selection) -> Result<Vec<PathBuf>> {
    let base = root.join(selection.path());
    if !base.is_dir() {
        exn::bail!(ErrorKind::SelectionNotFound(base));
    }
    let mut files = Vec::new();
    match selection.season {
        Some(_) => walk(&base, &mut files, &|_| true)?,
        None => walk(&base, &mut files, &in_season_directory)?,
    }
    files.sort();
    tracing::debug!(%selection, count = files.len(), "Listed candidate episodes");
    Ok(files)
}

fn in_season_directory(file: &Path) -> bool {
    file.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(SEASON_MARKER))
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>, keep: &dyn Fn(&Path) -> bool) -> Result<()> {
    let io = || ErrorKind::Io(dir.to_path_buf());
    for entry in fs::read_dir(dir).or_raise(io)? {
        let path = entry.or_raise(io)?.path();
        // Follows symlinks, same as a copy would.
        if path.is_dir() {
            walk(&path, files, keep)?;
        } else if path.is_file() && keep(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Merge lists round-robin: the first of each list, then the second of each
/// list, and so on. Shorter lists simply drop out once exhausted.
pub fn interleave<T>(lists: Vec<Vec<T>>) -> Vec<T> {
    let total = lists.iter().map(Vec::len).sum();
    let mut iterators: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(total);
    while merged.len() < total {
        merged.extend(iterators.iter_mut().filter_map(|iterator| iterator.next()));
    }
    merged
}
