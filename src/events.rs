//! Player events consumed and produced by the caption controller

use bytes::Bytes;
use std::fmt;
use tokio::sync::mpsc;

use crate::surface::SurfaceHandle;
use crate::types::{ClosedCaptions, Fragment, SubtitleTrackInfo, UserDataSample};

/// Lifecycle and data events delivered by the host player
#[derive(Clone)]
pub enum PlayerEvent {
    /// A media element is being attached
    MediaAttaching { surface: SurfaceHandle },
    /// The media element is being detached
    MediaDetaching,
    /// A manifest load started
    ManifestLoading,
    /// The manifest was parsed
    ManifestLoaded { subtitles: Vec<SubtitleTrackInfo> },
    /// The active rendition changed
    LevelSwitch { closed_captions: ClosedCaptions },
    /// The demuxer found the initial PTS (90 kHz ticks)
    InitPtsFound { initial_pts: i64 },
    /// A fragment finished loading
    FragLoaded { fragment: Fragment, payload: Bytes },
    /// The demuxer extracted caption user data samples
    FragParsingUserdata { samples: Vec<UserDataSample> },
}

impl PlayerEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::MediaAttaching { .. } => "media_attaching",
            PlayerEvent::MediaDetaching => "media_detaching",
            PlayerEvent::ManifestLoading => "manifest_loading",
            PlayerEvent::ManifestLoaded { .. } => "manifest_loaded",
            PlayerEvent::LevelSwitch { .. } => "level_switch",
            PlayerEvent::InitPtsFound { .. } => "init_pts_found",
            PlayerEvent::FragLoaded { .. } => "frag_loaded",
            PlayerEvent::FragParsingUserdata { .. } => "frag_parsing_userdata",
        }
    }
}

impl fmt::Debug for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerEvent::FragLoaded { fragment, payload } => f
                .debug_struct("FragLoaded")
                .field("fragment", fragment)
                .field("payload_len", &payload.len())
                .finish(),
            PlayerEvent::InitPtsFound { initial_pts } => f
                .debug_struct("InitPtsFound")
                .field("initial_pts", initial_pts)
                .finish(),
            other => f.write_str(other.event_type()),
        }
    }
}

/// Events emitted by the caption controller
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionEvent {
    /// A subtitle fragment went through the text-cue parser
    SubtitleFragProcessed { success: bool, fragment: Fragment },
}

impl CaptionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CaptionEvent::SubtitleFragProcessed { .. } => "subtitle_frag_processed",
        }
    }
}

/// Sending half of the outbound event bus
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<CaptionEvent>,
}

impl EventSender {
    /// Whether the receiving half has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn emit(&self, event: CaptionEvent) {
        let kind = event.event_type();
        if self.tx.send(event).is_err() {
            tracing::debug!("Event receiver dropped, discarding {}", kind);
        }
    }
}

/// Create the outbound event bus
pub fn event_channel() -> (EventSender, mpsc::UnboundedReceiver<CaptionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}
