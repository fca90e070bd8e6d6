//! Caption channel cue sinks

use parking_lot::Mutex;
use std::sync::Arc;

use crate::cues::{CaptionScreen, CueMaterializer};
use crate::surface::SurfaceHandle;
use crate::track::{TextTrack, TrackKind};

/// Receiver of finished captions from a [`super::CaptionDecoder`]
pub trait CueSink: Send {
    /// A caption `screen` shown from `start_time` to `end_time` (seconds)
    fn new_cue(&mut self, start_time: f64, end_time: f64, screen: &CaptionScreen);
}

#[derive(Default)]
struct ChannelState {
    surface: Option<SurfaceHandle>,
    track: Option<TextTrack>,
}

/// Cue sink for one CEA-608 channel.
///
/// Clones share state: the controller keeps one clone to attach surfaces and
/// purge cues while the decoder owns another.
#[derive(Clone)]
pub struct CaptionChannel {
    channel: u8,
    label: String,
    language: String,
    materializer: Arc<dyn CueMaterializer>,
    state: Arc<Mutex<ChannelState>>,
}

impl CaptionChannel {
    pub fn new(
        channel: u8,
        label: &str,
        language: &str,
        materializer: Arc<dyn CueMaterializer>,
    ) -> Self {
        Self {
            channel,
            label: label.to_string(),
            language: language.to_string(),
            materializer,
            state: Arc::new(Mutex::new(ChannelState::default())),
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The caption track, if it has been created
    pub fn track(&self) -> Option<TextTrack> {
        self.state.lock().track.clone()
    }

    /// Bind the surface new tracks are created on
    pub fn attach(&self, surface: SurfaceHandle) {
        self.state.lock().surface = Some(surface);
    }

    /// Unbind the surface and forget the track created on it
    pub fn detach(&self) {
        let mut state = self.state.lock();
        state.surface = None;
        state.track = None;
    }

    /// Remove all cues from the track, returning how many were removed
    pub fn clear(&self) -> usize {
        self.state
            .lock()
            .track
            .as_ref()
            .map(TextTrack::clear_cues)
            .unwrap_or(0)
    }

    /// Clear and forget the track so the next cue re-acquires one
    pub fn release_track(&self) {
        if let Some(track) = self.state.lock().track.take() {
            track.clear_cues();
        }
    }

    fn ensure_track(&self) -> Option<TextTrack> {
        let mut state = self.state.lock();
        if let Some(track) = &state.track {
            return Some(track.clone());
        }
        let surface = state.surface.clone()?;
        let track = match surface.find_text_track(TrackKind::Captions, &self.label, &self.language)
        {
            Some(existing) => {
                tracing::debug!(
                    "Reusing caption track \"{}\" for channel {}",
                    self.label,
                    self.channel
                );
                existing
            }
            None => {
                tracing::debug!(
                    "Creating caption track \"{}\" ({}) for channel {}",
                    self.label,
                    self.language,
                    self.channel
                );
                surface.add_text_track(TrackKind::Captions, &self.label, &self.language)
            }
        };
        state.track = Some(track.clone());
        Some(track)
    }
}

impl CueSink for CaptionChannel {
    fn new_cue(&mut self, start_time: f64, end_time: f64, screen: &CaptionScreen) {
        let Some(track) = self.ensure_track() else {
            tracing::debug!(
                "No media attached, dropping channel {} caption at {:.3}s",
                self.channel,
                start_time
            );
            return;
        };
        self.materializer
            .new_cue(&track, start_time, end_time, screen);
    }
}
