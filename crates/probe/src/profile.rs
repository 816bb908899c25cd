//! Hardware playback constraints and the media tracks they're checked against.

use serde::Deserialize;
use std::ops::Range;

/// Kind of a media track, as reported by the probe.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub enum TrackKind {
    General,
    Video,
    Audio,
    Text,
    Menu,
    #[default]
    #[serde(other)]
    Other,
}

/// The parts of a media track that matter for playback compatibility.
///
/// All values are kept as reported; unknown or unparseable values simply fail
/// to match rather than being errors.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Track {
    #[serde(rename = "@type", default)]
    pub kind: TrackKind,
    #[serde(rename = "CodecID", default)]
    pub codec_id: Option<String>,
    #[serde(rename = "CodecID_Hint", default)]
    pub codec_id_hint: Option<String>,
    #[serde(rename = "DisplayAspectRatio", default)]
    pub display_aspect_ratio: Option<String>,
}
impl Track {
    /// Whether the codec id or the codec id hint is one of `codecs`, ignoring case.
    fn has_codec(&self, codecs: &[String]) -> bool {
        [&self.codec_id, &self.codec_id_hint]
            .into_iter()
            .flatten()
            .any(|id| codecs.iter().any(|codec| codec.eq_ignore_ascii_case(id.trim())))
    }

    fn aspect_ratio(&self) -> Option<f64> {
        self.display_aspect_ratio.as_deref()?.trim().parse().ok()
    }
}

/// What a playback device accepts.
///
/// A file is compatible when it has at least one video track with an accepted
/// codec *and* display aspect ratio, and at least one audio track with an
/// accepted codec.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub video_codecs: Vec<String>,
    pub audio_codecs: Vec<String>,
    /// Accepted display aspect ratios (width / height), end exclusive.
    pub aspect_ratio: Range<f64>,
}
impl Profile {
    /// Philips DVP3850: Xvid/DivX video at 4:3, AC-3 or MP3 audio.
    pub fn dvp3850() -> Self {
        Self {
            video_codecs: vec!["xvid".to_string(), "divx".to_string()],
            audio_codecs: vec!["a_ac3".to_string(), "mp3".to_string()],
            aspect_ratio: 1.3..1.34,
        }
    }

    pub fn evaluate(&self, tracks: &[Track]) -> bool {
        let video = tracks.iter().filter(|track| track.kind == TrackKind::Video).any(|track| {
            track.has_codec(&self.video_codecs) && track.aspect_ratio().is_some_and(|r| self.aspect_ratio.contains(&r))
        });
        let audio = tracks
            .iter()
            .filter(|track| track.kind == TrackKind::Audio)
            .any(|track| track.has_codec(&self.audio_codecs));
        video && audio
    }
}
impl Default for Profile {
    fn default() -> Self {
        Self::dvp3850()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn video(codec_id: Option<&str>, hint: Option<&str>, ratio: Option<&str>) -> Track {
        Track {
            kind: TrackKind::Video,
            codec_id: codec_id.map(String::from),
            codec_id_hint: hint.map(String::from),
            display_aspect_ratio: ratio.map(String::from),
        }
    }

    fn audio(codec_id: Option<&str>, hint: Option<&str>) -> Track {
        Track {
            kind: TrackKind::Audio,
            codec_id: codec_id.map(String::from),
            codec_id_hint: hint.map(String::from),
            display_aspect_ratio: None,
        }
    }

    #[rstest]
    #[case(video(Some("XVID"), None, Some("1.333")), audio(Some("55"), Some("MP3")), true)]
    #[case(video(Some("DX50"), Some("DivX"), Some("1.333")), audio(Some("A_AC3"), None), true)]
    #[case(video(Some("xvid"), None, Some("1.300")), audio(Some("mp3"), None), true)]
    // Widescreen
    #[case(video(Some("XVID"), None, Some("1.778")), audio(Some("55"), Some("MP3")), false)]
    // Upper bound is exclusive
    #[case(video(Some("XVID"), None, Some("1.34")), audio(Some("55"), Some("MP3")), false)]
    #[case(video(Some("V_MPEG4/ISO/AVC"), None, Some("1.333")), audio(Some("55"), Some("MP3")), false)]
    #[case(video(Some("XVID"), None, Some("1.333")), audio(Some("A_AAC-2"), None), false)]
    #[case(video(Some("XVID"), None, None), audio(Some("55"), Some("MP3")), false)]
    #[case(video(Some("XVID"), None, Some("4:3")), audio(Some("55"), Some("MP3")), false)]
    fn test_evaluate(#[case] video: Track, #[case] audio: Track, #[case] expected: bool) {
        assert_eq!(Profile::dvp3850().evaluate(&[video, audio]), expected);
    }

    #[test]
    fn test_evaluate_requires_both_tracks() {
        let profile = Profile::default();
        assert!(!profile.evaluate(&[video(Some("XVID"), None, Some("1.333"))]));
        assert!(!profile.evaluate(&[audio(Some("MP3"), None)]));
        assert!(!profile.evaluate(&[]));
    }

    #[test]
    fn test_evaluate_any_matching_track() {
        let tracks = [
            video(Some("V_MPEG4/ISO/AVC"), None, Some("1.778")),
            video(Some("XVID"), None, Some("1.333")),
            audio(Some("A_AAC-2"), None),
            audio(Some("A_AC3"), None),
        ];
        assert!(Profile::default().evaluate(&tracks));
    }

    #[test]
    fn test_codec_must_be_on_matching_track_kind() {
        // An "mp3" video track doesn't satisfy the audio requirement.
        let tracks = [video(Some("XVID"), Some("MP3"), Some("1.333")), audio(Some("XVID"), None)];
        assert!(!Profile::default().evaluate(&tracks));
    }
}
