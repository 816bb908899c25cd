//! File-backed compatibility cache.

use crate::error::{ErrorKind, Result};
use crate::key::KeyResolver;
use crate::store::{CompatibilityStore, Entries, Seasons};
use exn::{OptionExt, ResultExt};
use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use std::collections::btree_map;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::iter::Map;
use std::path::{Path, PathBuf};
use tracing::instrument;

const INDENT: &[u8] = b"    ";

/// Compatibility verdicts backed by a JSON file.
///
/// The file holds a single object nested three levels deep:
///
/// ```json
/// {
///     "South Park": {
///         "Season 02": {
///             "S02E02.avi": false
///         }
///     }
/// }
/// ```
///
/// Keys are written in sorted order with four-space indentation so that the
/// file diffs cleanly under version control.
///
/// The file is read once when the cache is opened and only written again by
/// [`persist`](CompatibilityStore::persist); in between, the in-memory entries
/// and the file are allowed to diverge. No locking is done: two processes
/// persisting the same file will overwrite each other.
#[derive(Clone, Debug)]
pub struct CompatibilityCache {
    file: PathBuf,
    resolver: KeyResolver,
    entries: Entries,
}
impl CompatibilityCache {
    /// Open the cache stored at `file`.
    ///
    /// A missing file is created empty (along with its parent directories). An
    /// existing file is loaded immediately; an empty file counts as an empty
    /// cache, anything else that is not a valid three-level object is
    /// [`MalformedCacheFile`](ErrorKind::MalformedCacheFile).
    #[instrument(level = "debug", skip_all, fields(file = %file.as_ref().display()))]
    pub fn open(file: impl AsRef<Path>, resolver: KeyResolver) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        let entries = match file.exists() {
            true => Self::load(&file)?,
            false => {
                Self::create(&file)?;
                Entries::new()
            },
        };
        Ok(Self { file, resolver, entries })
    }

    /// The backing file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Forget every in-memory entry. The backing file is left alone until the
    /// next [`persist`](CompatibilityStore::persist).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the in-memory entries with the contents of the backing file,
    /// discarding anything that was not persisted.
    #[instrument(level = "debug", skip_all, fields(file = %self.file.display()))]
    pub fn reload(&mut self) -> Result<()> {
        self.entries = Self::load(&self.file)?;
        Ok(())
    }

    fn create(file: &Path) -> Result<()> {
        let io = || ErrorKind::Io(file.to_path_buf());
        if let Some(parent) = file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).or_raise(io)?;
        }
        File::create(file).or_raise(io)?;
        tracing::debug!("Created empty cache file");
        Ok(())
    }

    fn load(file: &Path) -> Result<Entries> {
        let io = || ErrorKind::Io(file.to_path_buf());
        let mut contents = String::new();
        File::open(file).or_raise(io)?.read_to_string(&mut contents).or_raise(io)?;
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        let entries: Entries =
            serde_json::from_str(&contents).or_raise(|| ErrorKind::MalformedCacheFile(file.to_path_buf()))?;
        tracing::debug!(shows = entries.len(), "Loaded cache file");
        Ok(entries)
    }
}

impl CompatibilityStore for CompatibilityCache {
    fn get(&self, path: impl AsRef<Path>) -> Result<bool> {
        let key = self.resolver.resolve(path)?;
        self.entries
            .get(&key.show)
            .and_then(|seasons| seasons.get(&key.season))
            .and_then(|episodes| episodes.get(&key.episode))
            .copied()
            .ok_or_raise(|| ErrorKind::NotFound(key.to_string()))
    }

    fn set(&mut self, path: impl AsRef<Path>, compatible: bool) -> Result<()> {
        let key = self.resolver.resolve(path)?;
        self.entries.entry(key.show).or_default().entry(key.season).or_default().insert(key.episode, compatible);
        Ok(())
    }

    fn delete(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let key = self.resolver.resolve(path)?;
        let not_found = || ErrorKind::NotFound(key.to_string());
        let seasons = self.entries.get_mut(&key.show).ok_or_raise(not_found)?;
        let episodes = seasons.get_mut(&key.season).ok_or_raise(not_found)?;
        episodes.remove(&key.episode).ok_or_raise(not_found)?;
        // Don't leave empty levels behind, they'd still count as shows.
        if episodes.is_empty() {
            seasons.remove(&key.season);
        }
        if seasons.is_empty() {
            self.entries.remove(&key.show);
        }
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(file = %self.file.display()))]
    fn persist(&self) -> Result<()> {
        let io = || ErrorKind::Io(self.file.clone());
        let mut writer = BufWriter::new(File::create(&self.file).or_raise(io)?);
        let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
        self.entries.serialize(&mut serializer).or_raise(io)?;
        writer.write_all(b"\n").or_raise(io)?;
        writer.flush().or_raise(io)?;
        tracing::debug!(shows = self.entries.len(), "Persisted cache file");
        Ok(())
    }

    fn entries(&self) -> &Entries {
        &self.entries
    }
}

impl PartialEq for CompatibilityCache {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
impl PartialEq<Entries> for CompatibilityCache {
    fn eq(&self, other: &Entries) -> bool {
        &self.entries == other
    }
}

impl<'a> IntoIterator for &'a CompatibilityCache {
    type Item = &'a str;
    type IntoIter = Map<btree_map::Keys<'a, String, Seasons>, fn(&'a String) -> &'a str>;

    /// Iterates over show names, not individual verdicts.
    fn into_iter(self) -> Self::IntoIter {
        self.entries.keys().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ShowRegistry;
    use rstest::{fixture, rstest};
    use std::rc::Rc;
    use tempfile::TempDir;

    const FIRST: &str = "South Park/Season 01/S01E01 - Cartman Gets an Anal Probe.avi";
    const SECOND: &str = "South Park/Season 02/S02E02 - Cartman's Mom Is Still a Dirty Slut.avi";
    const ROCKO: &str = "Rocko's Modern Life/Season 01/S01E01 - No Pain, No Gain.avi";

    struct Library {
        dir: TempDir,
        registry: Rc<ShowRegistry>,
    }
    impl Library {
        fn root(&self) -> PathBuf {
            self.dir.path().join("shows")
        }

        fn absolute(&self, relative: &str) -> PathBuf {
            self.root().join(relative)
        }

        fn cache_file(&self) -> PathBuf {
            self.dir.path().join("state").join("compatibility.json")
        }

        fn open(&self) -> CompatibilityCache {
            let resolver = KeyResolver::new(self.root(), Rc::clone(&self.registry));
            CompatibilityCache::open(self.cache_file(), resolver).unwrap()
        }
    }

    #[fixture]
    fn library() -> Library {
        let dir = tempfile::tempdir().unwrap();
        for show in ["South Park", "Rocko's Modern Life"] {
            fs::create_dir_all(dir.path().join("shows").join(show)).unwrap();
        }
        Library { dir, registry: Rc::new(ShowRegistry::new()) }
    }

    #[rstest]
    fn test_open_missing_file(library: Library) {
        assert!(!library.cache_file().exists());
        let cache = library.open();
        assert!(library.cache_file().is_file());
        assert_eq!(cache, Entries::new());
        assert!(cache.is_empty());
        // Opening the now-existing but empty file again is still empty.
        assert_eq!(library.open(), Entries::new());
    }

    #[rstest]
    fn test_open_existing_file(library: Library) {
        fs::create_dir_all(library.cache_file().parent().unwrap()).unwrap();
        fs::write(library.cache_file(), r#"{"South Park": {"Season 01": {"S01E01.avi": true}}}"#).unwrap();
        let cache = library.open();
        assert!(cache.get("South Park/Season 01/S01E01.avi").unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[case("not json at all")]
    #[case(r#"{"South Park": true}"#)]
    #[case(r#"{"South Park": {"Season 01": {"S01E01.avi": 1}}}"#)]
    #[case("[]")]
    fn test_open_malformed_file(library: Library, #[case] contents: &str) {
        fs::create_dir_all(library.cache_file().parent().unwrap()).unwrap();
        fs::write(library.cache_file(), contents).unwrap();
        let resolver = KeyResolver::new(library.root(), Rc::clone(&library.registry));
        let err = CompatibilityCache::open(library.cache_file(), resolver).unwrap_err();
        assert_eq!(&*err, &ErrorKind::MalformedCacheFile(library.cache_file()));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_absolute_then_relative(library: Library, #[case] compatible: bool) {
        let mut cache = library.open();
        cache.set(library.absolute(FIRST), compatible).unwrap();
        assert_eq!(cache.get(FIRST).unwrap(), compatible);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_relative_then_absolute(library: Library, #[case] compatible: bool) {
        let mut cache = library.open();
        cache.set(FIRST, compatible).unwrap();
        assert_eq!(cache.get(library.absolute(FIRST)).unwrap(), compatible);
    }

    #[rstest]
    fn test_set_compatible_and_incompatible(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(library.absolute(FIRST)).unwrap();
        cache.set_incompatible(SECOND).unwrap();
        assert!(cache.get(FIRST).unwrap());
        assert!(!cache.get(SECOND).unwrap());
        // Overwriting a verdict replaces it.
        cache.set_compatible(SECOND).unwrap();
        assert!(cache.get(SECOND).unwrap());
    }

    #[rstest]
    fn test_unknown_show(library: Library) {
        let mut cache = library.open();
        let err = cache.set_incompatible("Ssouth Park/Season 02/S02E02.avi").unwrap_err();
        assert_eq!(&*err, &ErrorKind::UnknownShow("Ssouth Park".to_string()));
        let err = cache.get("Ssouth Park/Season 02/S02E02.avi").unwrap_err();
        assert_eq!(&*err, &ErrorKind::UnknownShow("Ssouth Park".to_string()));
        assert!(cache.is_empty());
    }

    #[rstest]
    fn test_get_missing(library: Library) {
        let mut cache = library.open();
        let err = cache.get(FIRST).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        // Same show and season, different episode.
        cache.set_compatible(FIRST).unwrap();
        let err = cache.get("South Park/Season 01/S01E02.avi").unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound("South Park/Season 01/S01E02.avi".to_string()));
        assert!(cache.contains(FIRST).unwrap());
        assert!(!cache.contains(SECOND).unwrap());
    }

    #[rstest]
    fn test_delete(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        cache.set_compatible("South Park/Season 01/S01E02.avi").unwrap();
        cache.delete(library.absolute(FIRST)).unwrap();
        assert!(matches!(&*cache.get(FIRST).unwrap_err(), ErrorKind::NotFound(_)));
        assert!(cache.get("South Park/Season 01/S01E02.avi").unwrap());
        // Deleting again is an error, not a no-op.
        assert!(matches!(&*cache.delete(FIRST).unwrap_err(), ErrorKind::NotFound(_)));
    }

    #[rstest]
    fn test_delete_prunes_empty_levels(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        cache.delete(FIRST).unwrap();
        assert_eq!(cache, Entries::new());
        assert!(!cache.contains_show("South Park"));
    }

    #[rstest]
    fn test_clear(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        cache.persist().unwrap();
        assert_ne!(cache, Entries::new());
        cache.clear();
        assert_eq!(cache, Entries::new());
        assert_eq!(cache.len(), 0);
        // The file is untouched until persisted.
        cache.reload().unwrap();
        assert!(cache.get(FIRST).unwrap());
    }

    #[rstest]
    fn test_persist_round_trip(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(library.absolute(FIRST)).unwrap();
        cache.set_incompatible(SECOND).unwrap();
        cache.set_compatible(ROCKO).unwrap();
        cache.persist().unwrap();

        let reopened = library.open();
        assert_eq!(reopened, cache);
        let mut reloaded = cache.clone();
        reloaded.clear();
        reloaded.reload().unwrap();
        assert_eq!(reloaded, cache);
    }

    #[rstest]
    fn test_reload_discards_unpersisted(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        cache.persist().unwrap();
        cache.set_incompatible(SECOND).unwrap();
        cache.reload().unwrap();
        assert!(matches!(&*cache.get(SECOND).unwrap_err(), ErrorKind::NotFound(_)));
        assert!(cache.get(FIRST).unwrap());
    }

    #[rstest]
    fn test_persisted_format(library: Library) {
        let mut cache = library.open();
        cache.set_incompatible("South Park/Season 02/S02E02.avi").unwrap();
        cache.persist().unwrap();
        let contents = fs::read_to_string(library.cache_file()).unwrap();
        let expected = concat!(
            "{\n",
            "    \"South Park\": {\n",
            "        \"Season 02\": {\n",
            "            \"S02E02.avi\": false\n",
            "        }\n",
            "    }\n",
            "}\n",
        );
        assert_eq!(contents, expected);
    }

    #[rstest]
    fn test_persisted_keys_are_sorted(library: Library) {
        let mut cache = library.open();
        cache.set_compatible("South Park/Season 02/S02E02.avi").unwrap();
        cache.set_compatible("South Park/Season 01/S01E02.avi").unwrap();
        cache.set_compatible("South Park/Season 01/S01E01.avi").unwrap();
        cache.set_compatible(ROCKO).unwrap();
        cache.persist().unwrap();
        let contents = fs::read_to_string(library.cache_file()).unwrap();
        let position = |needle: &str| contents.find(needle).unwrap();
        assert!(position("Rocko's Modern Life") < position("South Park"));
        assert!(position("Season 01") < position("Season 02"));
        assert!(position("S01E01.avi") < position("S01E02.avi"));
    }

    #[rstest]
    fn test_iterates_over_shows(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        cache.set_compatible(SECOND).unwrap();
        cache.set_incompatible(ROCKO).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.shows().collect::<Vec<_>>(), vec!["Rocko's Modern Life", "South Park"]);
        assert_eq!((&cache).into_iter().collect::<Vec<_>>(), vec!["Rocko's Modern Life", "South Park"]);
        assert!(cache.contains_show("South Park"));
        assert!(!cache.contains_show("Daria"));
    }

    #[rstest]
    fn test_equality_ignores_file(library: Library) {
        let mut cache = library.open();
        cache.set_compatible(FIRST).unwrap();
        let other_file = library.dir.path().join("elsewhere.json");
        let resolver = KeyResolver::new(library.root(), Rc::clone(&library.registry));
        let mut other = CompatibilityCache::open(other_file, resolver).unwrap();
        assert_ne!(cache, other);
        other.set_compatible(library.absolute(FIRST)).unwrap();
        assert_eq!(cache, other);

        let mut expected = Entries::new();
        expected
            .entry("South Park".to_string())
            .or_default()
            .entry("Season 01".to_string())
            .or_default()
            .insert("S01E01 - Cartman Gets an Anal Probe.avi".to_string(), true);
        assert_eq!(cache, expected);
    }
}
