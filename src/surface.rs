//! Rendering surface abstraction
//!
//! The surface is whatever presents text tracks to the viewer. The
//! controller only needs to create tracks on it and look up existing ones.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::track::{TextTrack, TrackKind};

/// A media element that owns text tracks
pub trait MediaSurface: Send + Sync {
    /// Create a new text track attached to this surface
    fn add_text_track(&self, kind: TrackKind, label: &str, language: &str) -> TextTrack;

    /// All text tracks currently attached
    fn text_tracks(&self) -> Vec<TextTrack>;

    /// First attached track with the given kind, label and language
    fn find_text_track(&self, kind: TrackKind, label: &str, language: &str) -> Option<TextTrack> {
        self.text_tracks()
            .into_iter()
            .find(|t| t.matches(kind, label, language))
    }
}

/// Shared handle to the attached surface
pub type SurfaceHandle = Arc<dyn MediaSurface>;

/// Surface that keeps its tracks in memory for snapshot-based renderers
#[derive(Debug, Default)]
pub struct InMemorySurface {
    tracks: RwLock<Vec<TextTrack>>,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning a [`SurfaceHandle`]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.read().len()
    }
}

impl MediaSurface for InMemorySurface {
    fn add_text_track(&self, kind: TrackKind, label: &str, language: &str) -> TextTrack {
        let track = TextTrack::new(kind, label, language);
        tracing::debug!(
            "Adding {} track \"{}\" ({}) to surface",
            kind.as_str(),
            label,
            language
        );
        self.tracks.write().push(track.clone());
        track
    }

    fn text_tracks(&self) -> Vec<TextTrack> {
        self.tracks.read().clone()
    }
}
