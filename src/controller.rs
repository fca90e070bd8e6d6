//! Timeline controller
//!
//! Consumes player events and keeps caption and subtitle tracks in step with
//! the playback timeline:
//! - CEA-608 user data is extracted and fed to the caption decoder
//! - Subtitle fragments wait for the initial PTS, then go to the parser
//! - Backward jumps on the main timeline purge caption cues
//! - Manifest loads start a new session with fresh tracks

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cea608::{extract_cea608_data, CaptionChannel, CaptionDecoder, DecoderFactory};
use crate::config::CaptionConfig;
use crate::cues::{materializer_for, CueMaterializer};
use crate::discontinuity::MainTimelineWatermark;
use crate::events::{event_channel, CaptionEvent, PlayerEvent};
use crate::subtitle::{ParseOutcome, SubtitleIntegrator, TextCueParser};
use crate::surface::SurfaceHandle;
use crate::timeline::{Admission, SessionToken, TimelineSync};
use crate::track::{TextTrack, TrackKind, TrackMode};
use crate::types::{ClosedCaptions, Fragment, FragmentKind, SubtitleTrackInfo, UserDataSample};

/// Everything that is thrown away on a manifest load
#[derive(Debug, Default)]
struct SessionState {
    token: SessionToken,
    timeline: TimelineSync,
    watermark: MainTimelineWatermark,
    declared_subtitles: Vec<SubtitleTrackInfo>,
    subtitle_tracks: Vec<TextTrack>,
}

fn same_surface(a: &SurfaceHandle, b: &SurfaceHandle) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Builder for [`TimelineController`]
pub struct TimelineControllerBuilder {
    config: CaptionConfig,
    materializer: Option<Arc<dyn CueMaterializer>>,
    decoder_factory: Option<DecoderFactory>,
    parser: Option<Box<dyn TextCueParser>>,
}

impl TimelineControllerBuilder {
    /// Override the configured cue materialization strategy
    pub fn cue_materializer(mut self, materializer: Arc<dyn CueMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    /// CEA-608 decoder, built around the two channel sinks
    pub fn caption_decoder<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(
                Box<dyn crate::cea608::CueSink>,
                Box<dyn crate::cea608::CueSink>,
            ) -> Box<dyn CaptionDecoder>
            + Send
            + 'static,
    {
        self.decoder_factory = Some(Box::new(factory));
        self
    }

    /// WebVTT text-cue parser
    pub fn text_cue_parser(mut self, parser: Box<dyn TextCueParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Build the controller and the receiving end of its event bus
    pub fn build(self) -> (TimelineController, mpsc::UnboundedReceiver<CaptionEvent>) {
        let materializer = self
            .materializer
            .unwrap_or_else(|| materializer_for(self.config.cue_handler));

        let channels = [1u8, 2].map(|n| {
            let (label, language) = self.config.channel_track(n);
            CaptionChannel::new(n, label, language, materializer.clone())
        });

        let decoder = match self.decoder_factory {
            Some(factory) if self.config.enable_cea708_captions => Some(factory(
                Box::new(channels[0].clone()),
                Box::new(channels[1].clone()),
            )),
            _ => None,
        };

        let (events, rx) = event_channel();
        let controller = TimelineController {
            config: self.config,
            surface: None,
            channels,
            decoder,
            integrator: SubtitleIntegrator::new(self.parser, events),
            session: SessionState::default(),
            captions_enabled: true,
        };
        (controller, rx)
    }
}

/// Caption and subtitle timeline controller
pub struct TimelineController {
    config: CaptionConfig,
    surface: Option<SurfaceHandle>,
    channels: [CaptionChannel; 2],
    decoder: Option<Box<dyn CaptionDecoder>>,
    integrator: SubtitleIntegrator,
    session: SessionState,
    captions_enabled: bool,
}

impl TimelineController {
    pub fn builder(config: CaptionConfig) -> TimelineControllerBuilder {
        TimelineControllerBuilder {
            config,
            materializer: None,
            decoder_factory: None,
            parser: None,
        }
    }

    /// Dispatch one player event
    pub fn handle_event(&mut self, event: PlayerEvent) {
        tracing::trace!("Caption controller event: {:?}", event);
        match event {
            PlayerEvent::MediaAttaching { surface } => self.on_media_attaching(surface),
            PlayerEvent::MediaDetaching => self.on_media_detaching(),
            PlayerEvent::ManifestLoading => self.on_manifest_loading(),
            PlayerEvent::ManifestLoaded { subtitles } => self.on_manifest_loaded(subtitles),
            PlayerEvent::LevelSwitch { closed_captions } => self.on_level_switch(&closed_captions),
            PlayerEvent::InitPtsFound { initial_pts } => self.on_init_pts_found(initial_pts),
            PlayerEvent::FragLoaded { fragment, payload } => self.on_frag_loaded(fragment, payload),
            PlayerEvent::FragParsingUserdata { samples } => {
                self.on_frag_parsing_userdata(&samples)
            }
        }
    }

    pub fn on_media_attaching(&mut self, surface: SurfaceHandle) {
        let replaced = self
            .surface
            .as_ref()
            .is_some_and(|current| !same_surface(current, &surface));
        if replaced {
            tracing::debug!("Media surface replaced without detach, dropping old tracks");
            self.on_media_detaching();
        }
        for channel in &self.channels {
            channel.attach(surface.clone());
        }
        self.surface = Some(surface);
        if self.session.subtitle_tracks.is_empty() {
            self.build_subtitle_tracks();
        }
    }

    pub fn on_media_detaching(&mut self) {
        for channel in &self.channels {
            channel.detach();
        }
        self.session.subtitle_tracks.clear();
        self.surface = None;
    }

    pub fn on_manifest_loading(&mut self) {
        self.session.watermark.reset();
    }

    pub fn on_manifest_loaded(&mut self, subtitles: Vec<SubtitleTrackInfo>) {
        let dropped = self.session.timeline.reset();
        if dropped > 0 {
            tracing::debug!("Discarding {} deferred subtitle fragment(s)", dropped);
        }

        for channel in &self.channels {
            channel.release_track();
        }
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reset();
        }

        self.session = SessionState::default();
        if self.config.enable_webvtt {
            self.session.declared_subtitles = subtitles;
            self.build_subtitle_tracks();
        }
        tracing::info!(
            "Manifest loaded: {} subtitle track(s), {} created",
            self.session.declared_subtitles.len(),
            self.session.subtitle_tracks.len()
        );
    }

    pub fn on_level_switch(&mut self, closed_captions: &ClosedCaptions) {
        let enabled = !closed_captions.is_none();
        if enabled != self.captions_enabled {
            tracing::debug!(
                "Closed captions {} for active rendition",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.captions_enabled = enabled;
    }

    pub fn on_init_pts_found(&mut self, initial_pts: i64) {
        let replay = self.session.timeline.on_initial_pts_discovered(initial_pts);
        let Some(initial_pts) = self.session.timeline.initial_pts() else {
            return;
        };
        for pending in replay {
            self.integrate(&pending.fragment, &pending.payload, initial_pts);
        }
    }

    pub fn on_frag_loaded(&mut self, fragment: Fragment, payload: Bytes) {
        match fragment.kind {
            FragmentKind::Main => {
                if self.session.watermark.observe(fragment.start) {
                    self.purge_captions(fragment.start);
                }
            }
            FragmentKind::Subtitle => {
                if payload.is_empty() {
                    return;
                }
                match self
                    .session
                    .timeline
                    .on_subtitle_fragment_arrived(fragment, payload)
                {
                    Admission::Integrate {
                        pending,
                        initial_pts,
                    } => self.integrate(&pending.fragment, &pending.payload, initial_pts),
                    Admission::Deferred => {}
                }
            }
            FragmentKind::Audio => {}
        }
    }

    pub fn on_frag_parsing_userdata(&mut self, samples: &[UserDataSample]) {
        if !self.config.enable_cea708_captions || !self.captions_enabled {
            return;
        }
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };
        for sample in samples {
            let pairs = extract_cea608_data(&sample.bytes);
            decoder.add_data(sample.pts, &pairs);
        }
    }

    /// Apply a parse outcome produced for this controller.
    ///
    /// Outcomes issued before the latest manifest load are dropped. Returns
    /// whether the outcome was applied.
    pub fn apply_parse_outcome(&mut self, outcome: ParseOutcome) -> bool {
        self.integrator
            .complete(outcome, self.session.token, &self.session.subtitle_tracks)
    }

    fn integrate(&mut self, fragment: &Fragment, payload: &[u8], initial_pts: i64) {
        if let Some(outcome) =
            self.integrator
                .parse(self.session.token, fragment, payload, initial_pts)
        {
            self.apply_parse_outcome(outcome);
        }
    }

    fn purge_captions(&mut self, start: f64) {
        let removed: usize = self.channels.iter().map(CaptionChannel::clear).sum();
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reset();
        }
        tracing::debug!(
            "Main timeline jumped back to {:.3}s, cleared {} caption cue(s)",
            start,
            removed
        );
    }

    fn build_subtitle_tracks(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        self.session.subtitle_tracks = self
            .session
            .declared_subtitles
            .iter()
            .map(|info| {
                let language = info.lang.as_deref().unwrap_or("");
                let track = match surface.find_text_track(TrackKind::Subtitles, &info.name, language)
                {
                    Some(existing) => {
                        existing.clear_cues();
                        existing
                    }
                    None => surface.add_text_track(TrackKind::Subtitles, &info.name, language),
                };
                track.set_mode(TrackMode::Disabled);
                track
            })
            .collect();
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    /// Current session token
    pub fn session(&self) -> SessionToken {
        self.session.token
    }

    pub fn initial_pts(&self) -> Option<i64> {
        self.session.timeline.initial_pts()
    }

    pub fn pending_fragments(&self) -> usize {
        self.session.timeline.pending_len()
    }

    pub fn last_main_pts(&self) -> f64 {
        self.session.watermark.last_pts()
    }

    pub fn captions_enabled(&self) -> bool {
        self.captions_enabled
    }

    /// Caption track for CEA-608 channel 1 or 2, once created
    pub fn caption_track(&self, channel: u8) -> Option<TextTrack> {
        self.channels
            .iter()
            .find(|c| c.channel() == channel)
            .and_then(CaptionChannel::track)
    }

    pub fn subtitle_tracks(&self) -> &[TextTrack] {
        &self.session.subtitle_tracks
    }
}
