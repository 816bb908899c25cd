//! Playback compatibility checks for video files.
//!
//! The [`CompatibilityOracle`] trait answers a single question: can the target
//! hardware play this file? [`MediaInfo`] answers it by inspecting the file's
//! tracks with the external `mediainfo` tool and checking them against a
//! [`Profile`]. Any `Fn(&Path) -> Result<bool>` closure is an oracle too.

pub mod error;
mod mediainfo;
mod profile;

pub use crate::mediainfo::{MediaInfo, parse_tracks};
pub use crate::profile::{Profile, Track, TrackKind};

use crate::error::Result;
use std::path::Path;

/// Decides whether a video file is playable by the target hardware.
pub trait CompatibilityOracle {
    fn is_compatible(&self, path: &Path) -> Result<bool>;
}

impl<F> CompatibilityOracle for F
where
    F: Fn(&Path) -> Result<bool>,
{
    fn is_compatible(&self, path: &Path) -> Result<bool> {
        self(path)
    }
}
