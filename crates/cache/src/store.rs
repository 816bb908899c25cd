//! The container interface shared by compatibility stores.

use crate::error::{ErrorKind, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Verdicts for the episodes of one season, keyed by episode file name.
pub type Episodes = BTreeMap<String, bool>;
/// Seasons of one show, keyed by season directory name.
pub type Seasons = BTreeMap<String, Episodes>;
/// Every stored verdict, keyed by show name.
pub type Entries = BTreeMap<String, Seasons>;

/// A keyed store of compatibility verdicts for episode files.
///
/// Every method taking a path resolves it to a `show/season/episode` key first,
/// so the store can only ever contain keys whose show is known. Iteration,
/// [`len`](Self::len) and membership work on the show level only.
///
/// Mutations are in-memory until [`persist`](Self::persist) is called.
pub trait CompatibilityStore {
    /// Get the stored verdict for an episode.
    ///
    /// Fails with [`NotFound`](ErrorKind::NotFound) when nothing is stored, which
    /// is distinct from the path failing to resolve at all.
    fn get(&self, path: impl AsRef<Path>) -> Result<bool>;

    /// Store a verdict, creating the show and season levels as required.
    fn set(&mut self, path: impl AsRef<Path>, compatible: bool) -> Result<()>;

    /// Remove a stored verdict. Fails with [`NotFound`](ErrorKind::NotFound)
    /// rather than doing nothing if no verdict is stored.
    fn delete(&mut self, path: impl AsRef<Path>) -> Result<()>;

    /// Write every entry to durable storage.
    fn persist(&self) -> Result<()>;

    /// The full nested contents.
    fn entries(&self) -> &Entries;

    fn set_compatible(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.set(path, true)
    }

    fn set_incompatible(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.set(path, false)
    }

    /// Whether a verdict is stored for the episode. Resolution errors are
    /// still returned as errors.
    fn contains(&self, path: impl AsRef<Path>) -> Result<bool> {
        match self.get(path) {
            Ok(_) => Ok(true),
            Err(err) if matches!(&*err, ErrorKind::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Names of the shows with at least one stored verdict, in sorted order.
    fn shows(&self) -> impl Iterator<Item = &str> {
        self.entries().keys().map(String::as_str)
    }

    fn contains_show(&self, show: &str) -> bool {
        self.entries().contains_key(show)
    }

    /// Number of shows with at least one stored verdict.
    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
