//! Copying compatible episodes to the target library.

use crate::error::{ErrorKind, Result};
use crate::select::{Selection, candidates, interleave};
use exn::{OptionExt, ResultExt};
use rand::Rng;
use rand::seq::SliceRandom;
use showcopy_cache::CompatibilityStore;
use showcopy_cache::error::ErrorKind as CacheErrorKind;
use showcopy_probe::CompatibilityOracle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Where a compatibility verdict came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Effort {
    /// The verdict was already in the cache.
    Cached,
    /// The file had to be probed; the verdict has been added to the cache.
    Probed,
}

/// What happened to a single candidate file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The episode is compatible and was copied to the contained path.
    Copied(PathBuf, Effort),
    /// The episode is not playable on the target hardware.
    Incompatible(Effort),
    /// The file isn't an episode of a known show (wrong depth, unknown show),
    /// or its compatibility could not be determined.
    Skipped,
}

/// Summary of a copy run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// Destination paths of every copied episode, in copy order.
    pub copied: Vec<PathBuf>,
    pub incompatible: usize,
    pub skipped: usize,
    /// Verdicts served from the cache.
    pub cached: usize,
    /// Verdicts that required probing.
    pub probed: usize,
}
impl Report {
    fn record(&mut self, outcome: Outcome) {
        let effort = match outcome {
            Outcome::Copied(path, effort) => {
                self.copied.push(path);
                effort
            },
            Outcome::Incompatible(effort) => {
                self.incompatible += 1;
                effort
            },
            Outcome::Skipped => {
                self.skipped += 1;
                return;
            },
        };
        match effort {
            Effort::Cached => self.cached += 1,
            Effort::Probed => self.probed += 1,
        }
    }
}

/// Copies compatible episodes from a library into a target library.
///
/// Episodes of a show are copied flat into `<target>/<show>/`, regardless of
/// which season they came from.
#[derive(Clone, Debug)]
pub struct Copier {
    library: PathBuf,
    target: PathBuf,
    shuffle: bool,
}
impl Copier {
    /// Shuffling is enabled by default.
    pub fn new(library: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self { library: library.into(), target: target.into(), shuffle: true }
    }

    /// Whether each selection's episodes are shuffled before being interleaved.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Copy up to `count` compatible episodes, taking episodes from each
    /// selection in turn.
    ///
    /// Each candidate's verdict is looked up in `store`; files without one are
    /// probed with `oracle`, and the new verdict is persisted straight away so
    /// that an interrupted run doesn't lose work. Files that can't be keyed or
    /// probed are logged and skipped. Every candidate is visited at most once,
    /// so the run ends early if the selections run out of compatible episodes.
    #[instrument(skip_all, fields(count = count, selections = selections.len()))]
    pub fn run<S, O, R>(
        &self,
        store: &mut S,
        oracle: &O,
        selections: &[Selection],
        count: usize,
        rng: &mut R,
    ) -> Result<Report>
    where
        S: CompatibilityStore,
        O: CompatibilityOracle,
        R: Rng + ?Sized,
    {
        let mut lists = Vec::with_capacity(selections.len());
        for selection in selections {
            let mut files = candidates(&self.library, selection)?;
            if self.shuffle {
                files.shuffle(rng);
            }
            lists.push(files);
        }
        let mut report = Report::default();
        for file in interleave(lists) {
            if report.copied.len() >= count {
                break;
            }
            let outcome = self.copy_episode(store, oracle, &file)?;
            report.record(outcome);
        }
        tracing::info!(
            copied = report.copied.len(),
            incompatible = report.incompatible,
            skipped = report.skipped,
            cached = report.cached,
            probed = report.probed,
            "Finished copying episodes"
        );
        Ok(report)
    }

    /// Check a single episode file (below the library root) and copy it if it
    /// is compatible.
    pub fn copy_episode<S, O>(&self, store: &mut S, oracle: &O, file: &Path) -> Result<Outcome>
    where
        S: CompatibilityStore,
        O: CompatibilityOracle,
    {
        let relative = file.strip_prefix(&self.library).unwrap_or(file);
        let (compatible, effort) = match store.get(relative) {
            Ok(compatible) => (compatible, Effort::Cached),
            Err(err) if matches!(&*err, CacheErrorKind::NotFound(_)) => match oracle.is_compatible(file) {
                Ok(compatible) => (compatible, Effort::Probed),
                Err(err) => {
                    tracing::warn!(episode = %relative.display(), error = ?err, "Could not determine compatibility; skipping");
                    return Ok(Outcome::Skipped);
                },
            },
            Err(err) if err.is_unresolvable() => {
                tracing::warn!(episode = %relative.display(), reason = %*err, "Not an episode of a known show; skipping");
                return Ok(Outcome::Skipped);
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Cache),
        };
        if effort == Effort::Probed {
            store.set(relative, compatible).or_raise(|| ErrorKind::Cache)?;
            store.persist().or_raise(|| ErrorKind::Cache)?;
        }
        tracing::info!(episode = %relative.display(), compatible, cached = effort == Effort::Cached, "Checked episode");
        if !compatible {
            return Ok(Outcome::Incompatible(effort));
        }
        let destination = self.copy(file, relative)?;
        tracing::info!(episode = %relative.display(), to = %destination.display(), "Copied episode");
        Ok(Outcome::Copied(destination, effort))
    }

    fn copy(&self, file: &Path, relative: &Path) -> Result<PathBuf> {
        // A resolved key means `relative` is exactly show/season/episode.
        let show = relative.components().next().ok_or_raise(|| ErrorKind::Copy(file.to_path_buf()))?;
        let directory = self.target.join(show);
        fs::create_dir_all(&directory).or_raise(|| ErrorKind::Copy(directory.clone()))?;
        let destination = match file.file_name() {
            Some(name) => directory.join(name),
            None => exn::bail!(ErrorKind::Copy(file.to_path_buf())),
        };
        fs::copy(file, &destination).or_raise(|| ErrorKind::Copy(file.to_path_buf()))?;
        Ok(destination)
    }
}
