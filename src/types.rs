use bytes::Bytes;

/// Which playlist a fragment was loaded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Main (video or muxed audio/video) rendition
    Main,
    /// Alternate audio rendition
    Audio,
    /// WebVTT subtitle rendition
    Subtitle,
}

/// Metadata of a loaded media fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Media sequence number
    pub sn: u64,
    /// Rendition (level) index the fragment belongs to
    pub level: usize,
    /// Subtitle track index for subtitle fragments
    pub track_id: usize,
    pub kind: FragmentKind,
    /// Start time in seconds on the playlist timeline
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl Fragment {
    pub fn main(sn: u64, start: f64, duration: f64) -> Self {
        Self {
            sn,
            level: 0,
            track_id: 0,
            kind: FragmentKind::Main,
            start,
            duration,
        }
    }

    pub fn subtitle(sn: u64, track_id: usize, start: f64, duration: f64) -> Self {
        Self {
            sn,
            level: 0,
            track_id,
            kind: FragmentKind::Subtitle,
            start,
            duration,
        }
    }
}

/// A timed text cue in playback-timeline seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    /// Caption row (0..=14) for positioned captions
    pub line: Option<u8>,
    /// Horizontal position as a percentage of the video width
    pub position: Option<f64>,
}

impl Cue {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
            line: None,
            position: None,
        }
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// One auxiliary (SEI user data) caption sample from the demuxer
#[derive(Debug, Clone)]
pub struct UserDataSample {
    /// Presentation time of the carrying video sample, in seconds
    pub pts: f64,
    /// `cc_data` payload starting at the `cc_count` byte
    pub bytes: Bytes,
}

/// A subtitle rendition declared by the manifest (`EXT-X-MEDIA:TYPE=SUBTITLES`)
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrackInfo {
    pub name: String,
    pub lang: Option<String>,
    pub default: bool,
}

impl SubtitleTrackInfo {
    pub fn new(name: impl Into<String>, lang: Option<&str>) -> Self {
        Self {
            name: name.into(),
            lang: lang.map(|l| l.to_string()),
            default: false,
        }
    }
}

/// Closed-caption capability of the active rendition (`CLOSED-CAPTIONS` attribute)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClosedCaptions {
    /// No attribute present; captions may still be embedded
    #[default]
    Unspecified,
    /// `CLOSED-CAPTIONS=NONE`
    None,
    /// `CLOSED-CAPTIONS="<group-id>"`
    Group(String),
}

impl ClosedCaptions {
    pub fn is_none(&self) -> bool {
        matches!(self, ClosedCaptions::None)
    }
}
