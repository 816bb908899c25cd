//! Known shows of a library root.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::instrument;

/// The set of show names found directly inside a library root.
pub type Shows = BTreeSet<String>;

/// Registry of valid show names, per library root.
///
/// A show is any immediate entry of the library root. Every entry counts,
/// including plain files, so a stray `notes.txt` in the root is a "show" too.
///
/// Each root is scanned once, on first use, and the result is kept for as long
/// as the registry lives. Shows added to or removed from the root afterwards are
/// not observed; create a new registry to pick up changes.
#[derive(Debug, Default)]
pub struct ShowRegistry {
    scanned: RefCell<HashMap<PathBuf, Rc<Shows>>>,
}
impl ShowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the shows of the given library root, scanning it if this is the
    /// first time the root has been asked for.
    pub fn get(&self, root: impl AsRef<Path>) -> Result<Rc<Shows>> {
        let root = root.as_ref();
        if let Some(shows) = self.scanned.borrow().get(root) {
            return Ok(Rc::clone(shows));
        }
        let shows = Rc::new(Self::scan(root)?);
        self.scanned.borrow_mut().insert(root.to_path_buf(), Rc::clone(&shows));
        Ok(shows)
    }

    /// Whether `show` is a known show of the given library root.
    pub fn contains(&self, root: impl AsRef<Path>, show: &str) -> Result<bool> {
        Ok(self.get(root)?.contains(show))
    }

    /// Whether the given root has already been scanned.
    pub fn is_scanned(&self, root: impl AsRef<Path>) -> bool {
        self.scanned.borrow().contains_key(root.as_ref())
    }

    #[instrument(level = "debug", skip_all, fields(root = %root.display()))]
    fn scan(root: &Path) -> Result<Shows> {
        let io = || ErrorKind::Io(root.to_path_buf());
        let mut shows = Shows::new();
        for entry in fs::read_dir(root).or_raise(io)? {
            let entry = entry.or_raise(io)?;
            match entry.file_name().into_string() {
                Ok(name) => {
                    shows.insert(name);
                },
                Err(name) => tracing::warn!(?name, "Ignoring library entry with a non-UTF-8 name"),
            }
        }
        tracing::debug!(count = shows.len(), "Scanned library root for shows");
        Ok(shows)
    }
}
