//! Resolving episode file paths into cache keys.

use crate::error::{ErrorKind, Result};
use crate::registry::ShowRegistry;
use exn::OptionExt;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Identifies a single compatibility verdict: `show/season/episode`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CacheKey {
    pub show: String,
    pub season: String,
    pub episode: String,
}
impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.show, self.season, self.episode)
    }
}

/// Turns episode file paths into [`CacheKey`]s for one library root.
///
/// Paths may be given either absolute (somewhere under the library root) or
/// already relative to the library root; both forms of the same file resolve
/// to the same key.
#[derive(Clone, Debug)]
pub struct KeyResolver {
    root: PathBuf,
    registry: Rc<ShowRegistry>,
}
impl KeyResolver {
    pub fn new(root: impl Into<PathBuf>, registry: Rc<ShowRegistry>) -> Self {
        Self { root: root.into(), registry }
    }

    /// The library root paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &ShowRegistry {
        &self.registry
    }

    /// Resolve a path into its cache key.
    ///
    /// # Errors
    /// - [`MalformedKey`](ErrorKind::MalformedKey) if the path (after being made
    ///   relative to the library root) is not exactly `show/season/episode`.
    ///   Absolute paths outside the library root always end up here.
    /// - [`UnknownShow`](ErrorKind::UnknownShow) if the show is not an entry of
    ///   the library root.
    /// - [`Io`](ErrorKind::Io) if the library root could not be scanned.
    ///
    /// Season and episode names are not checked against the filesystem.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<CacheKey> {
        let path = path.as_ref();
        let [show, season, episode] =
            segments(self.relativize(path)).ok_or_raise(|| ErrorKind::MalformedKey(path.to_path_buf()))?;
        if !self.registry.contains(&self.root, &show)? {
            exn::bail!(ErrorKind::UnknownShow(show));
        }
        Ok(CacheKey { show, season, episode })
    }

    fn relativize<'p>(&self, path: &'p Path) -> &'p Path {
        match path.strip_prefix(&self.root) {
            Ok(relative) if path.is_absolute() => relative,
            _ => path,
        }
    }
}

/// Split a relative path into exactly three UTF-8 segments.
fn segments(path: &Path) -> Option<[String; 3]> {
    let mut parts = Vec::with_capacity(3);
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {},
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }
    parts.try_into().ok()
}
