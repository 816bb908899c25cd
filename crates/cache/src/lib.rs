//! Persistent cache of episode compatibility verdicts.
//!
//! Probing a video file to decide whether the target hardware can play it is
//! slow, so verdicts are remembered in a small JSON file between runs. The
//! file is meant to be kept around (and diffed) indefinitely; it is the only
//! record of which episodes were already checked.
//!
//! # Architecture
//! - [`ShowRegistry`]: the set of valid show names, found by listing the
//!   library root once per root.
//! - [`KeyResolver`]: maps an episode path, absolute or relative to the library
//!   root, to a `show/season/episode` [`CacheKey`], rejecting unknown shows and
//!   paths of the wrong depth.
//! - [`CompatibilityCache`]: the nested `show -> season -> episode -> bool`
//!   mapping and its backing file, accessed through [`CompatibilityStore`].

mod cache;
pub mod error;
mod key;
mod registry;
mod store;

pub use crate::cache::CompatibilityCache;
pub use crate::key::{CacheKey, KeyResolver};
pub use crate::registry::{ShowRegistry, Shows};
pub use crate::store::{CompatibilityStore, Entries, Episodes, Seasons};
