//! Caption controller configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Which built-in routine turns a decoded caption screen into cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CueHandlerKind {
    /// One cue per non-empty caption row
    #[default]
    Rows,
    /// A single cue holding the whole screen
    Screen,
}

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Decode CEA-608 captions carried in video user data
    pub enable_cea708_captions: bool,

    /// Integrate WebVTT subtitle fragments declared in the manifest
    pub enable_webvtt: bool,

    /// Label of the caption track for CEA-608 channel 1
    pub captions_text_track1_label: String,

    /// Language code of the caption track for CEA-608 channel 1
    pub captions_text_track1_language_code: String,

    /// Label of the caption track for CEA-608 channel 2
    pub captions_text_track2_label: String,

    /// Language code of the caption track for CEA-608 channel 2
    pub captions_text_track2_language_code: String,

    /// Cue materialization strategy
    pub cue_handler: CueHandlerKind,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enable_cea708_captions: true,
            enable_webvtt: true,
            captions_text_track1_label: "English".to_string(),
            captions_text_track1_language_code: "en".to_string(),
            captions_text_track2_label: "Spanish".to_string(),
            captions_text_track2_language_code: "es".to_string(),
            cue_handler: CueHandlerKind::default(),
        }
    }
}

impl CaptionConfig {
    /// Label and language code for a caption channel (1 or 2)
    pub fn channel_track(&self, channel: u8) -> (&str, &str) {
        if channel == 1 {
            (
                &self.captions_text_track1_label,
                &self.captions_text_track1_language_code,
            )
        } else {
            (
                &self.captions_text_track2_label,
                &self.captions_text_track2_language_code,
            )
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
