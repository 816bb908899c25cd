//! Probing files with the `mediainfo` command-line tool.

use crate::CompatibilityOracle;
use crate::error::{ErrorKind, Result};
use crate::profile::{Profile, Track};
use exn::ResultExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::instrument;

const EXECUTABLE: &str = "mediainfo";

#[derive(Deserialize)]
struct Report {
    #[serde(default)]
    media: Option<Media>,
}

#[derive(Deserialize)]
struct Media {
    #[serde(default)]
    track: Vec<Track>,
}

/// Parse the tracks out of `mediainfo --Output=JSON` output.
///
/// Files mediainfo doesn't recognise come back without a `media` object; they
/// have no tracks.
pub fn parse_tracks(json: &[u8]) -> Result<Vec<Track>> {
    let report: Report = serde_json::from_slice(json).or_raise(|| ErrorKind::InvalidOutput)?;
    Ok(report.media.map(|media| media.track).unwrap_or_default())
}

/// Compatibility oracle backed by the `mediainfo` executable.
#[derive(Clone, Debug)]
pub struct MediaInfo {
    executable: PathBuf,
    profile: Profile,
}
impl MediaInfo {
    /// Find `mediainfo` in `PATH`.
    pub fn discover(profile: Profile) -> Result<Self> {
        let executable = which::which(EXECUTABLE).or_raise(|| ErrorKind::MissingTool(EXECUTABLE))?;
        tracing::debug!(executable = %executable.display(), "Discovered mediainfo");
        Ok(Self::new(executable, profile))
    }

    pub fn new(executable: impl Into<PathBuf>, profile: Profile) -> Self {
        Self { executable: executable.into(), profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Run mediainfo against `path` and return every track it reports.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn tracks(&self, path: &Path) -> Result<Vec<Track>> {
        let output = Command::new(&self.executable)
            .arg("--Output=JSON")
            .arg(path)
            .output()
            .or_raise(|| ErrorKind::Probe(path.to_path_buf()))?;
        if !output.status.success() {
            tracing::debug!(status = ?output.status, stderr = %String::from_utf8_lossy(&output.stderr), "mediainfo failed");
            exn::bail!(ErrorKind::Probe(path.to_path_buf()));
        }
        parse_tracks(&output.stdout)
    }
}
impl CompatibilityOracle for MediaInfo {
    fn is_compatible(&self, path: &Path) -> Result<bool> {
        let tracks = self.tracks(path)?;
        let compatible = self.profile.evaluate(&tracks);
        tracing::debug!(path = %path.display(), tracks = tracks.len(), compatible, "Evaluated media tracks");
        Ok(compatible)
    }
}
