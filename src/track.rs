//! Text tracks exposed to the rendering surface
//!
//! A [`TextTrack`] is a cheap, cloneable handle. The controller and the
//! caption sinks write cues through it; the renderer reads snapshots.

use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CaptionError, Result};
use crate::types::Cue;

/// Minimum cue length; zero-length cues are stretched to this
const MIN_CUE_DURATION: f64 = 0.0001;

/// Text track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Captions,
    Subtitles,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Captions => "captions",
            TrackKind::Subtitles => "subtitles",
        }
    }
}

/// Visibility of a text track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Disabled,
    Hidden,
    Showing,
}

#[derive(Debug)]
struct TrackState {
    mode: TrackMode,
    /// Sorted by start time, insertion order among equal starts
    cues: Vec<Cue>,
}

/// Handle to a caption or subtitle track
#[derive(Debug, Clone)]
pub struct TextTrack {
    id: String,
    kind: TrackKind,
    label: String,
    language: String,
    state: Arc<RwLock<TrackState>>,
}

impl TextTrack {
    /// Create a new, empty track
    pub fn new(kind: TrackKind, label: &str, language: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.to_string(),
            language: language.to_string(),
            state: Arc::new(RwLock::new(TrackState {
                mode: TrackMode::Showing,
                cues: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn mode(&self) -> TrackMode {
        self.state.read().mode
    }

    pub fn set_mode(&self, mode: TrackMode) {
        self.state.write().mode = mode;
    }

    /// Whether this track was created for the given kind, label and language
    pub fn matches(&self, kind: TrackKind, label: &str, language: &str) -> bool {
        self.kind == kind && self.label == label && self.language == language
    }

    /// Whether both handles refer to the same track
    pub fn same_track(&self, other: &TextTrack) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Add a cue, keeping the cue list ordered by start time.
    ///
    /// A cue ending at its start time is stretched by [`MIN_CUE_DURATION`];
    /// a cue ending before its start, or with a NaN time, is rejected.
    pub fn add_cue(&self, mut cue: Cue) -> Result<()> {
        if cue.start_time.is_nan() || cue.end_time.is_nan() || cue.end_time < cue.start_time {
            tracing::warn!(
                "Rejecting cue on track {} ({}): invalid range {}..{}",
                self.label,
                self.kind.as_str(),
                cue.start_time,
                cue.end_time
            );
            return Err(CaptionError::InvalidCue {
                start: cue.start_time,
                end: cue.end_time,
            });
        }
        if cue.end_time == cue.start_time {
            cue.end_time += MIN_CUE_DURATION;
        }

        let mut state = self.state.write();
        let at = state
            .cues
            .partition_point(|c| c.start_time <= cue.start_time);
        state.cues.insert(at, cue);
        Ok(())
    }

    /// Remove every cue, returning how many were removed
    pub fn clear_cues(&self) -> usize {
        let mut state = self.state.write();
        let removed = state.cues.len();
        state.cues.clear();
        removed
    }

    /// Snapshot of the current cues
    pub fn cues(&self) -> Vec<Cue> {
        self.state.read().cues.clone()
    }

    pub fn cue_count(&self) -> usize {
        self.state.read().cues.len()
    }

    /// Cues active at `time` (start <= time < end)
    pub fn active_cues(&self, time: f64) -> Vec<Cue> {
        self.state
            .read()
            .cues
            .iter()
            .take_while(|c| c.start_time <= time)
            .filter(|c| time < c.end_time)
            .cloned()
            .collect()
    }
}
