//! Caption and subtitle timeline synchronization for HLS playback.
//!
//! Merges CEA-608 closed captions carried in video user data and WebVTT
//! subtitle fragments onto the player's presentation timeline. The host
//! player feeds [`PlayerEvent`]s into a [`TimelineController`]; cues appear
//! on [`TextTrack`]s created on the attached [`MediaSurface`], and
//! [`CaptionEvent`]s report subtitle fragment outcomes.

pub mod cea608;
pub(crate) mod config;
pub(crate) mod controller;
pub(crate) mod cues;
pub(crate) mod discontinuity;
pub(crate) mod error;
pub(crate) mod events;
pub(crate) mod subtitle;
pub(crate) mod surface;
pub(crate) mod timeline;
pub(crate) mod track;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use cea608::{extract_cea608_data, CaptionDecoder, CcBytePair, CueSink};
pub use config::{CaptionConfig, CueHandlerKind};
pub use controller::{TimelineController, TimelineControllerBuilder};
pub use cues::{
    materializer_for, CaptionRow, CaptionScreen, CueMaterializer, RowCueMaterializer,
    ScreenCueMaterializer,
};
pub use discontinuity::MainTimelineWatermark;
pub use error::{CaptionError, Result};
pub use events::{event_channel, CaptionEvent, EventSender, PlayerEvent};
pub use subtitle::{ParseOutcome, SubtitleIntegrator, TextCueParser};
pub use surface::{InMemorySurface, MediaSurface, SurfaceHandle};
pub use timeline::{Admission, PendingFragment, SessionToken, SyncState, TimelineSync};
pub use track::{TextTrack, TrackKind, TrackMode};
pub use types::{ClosedCaptions, Cue, Fragment, FragmentKind, SubtitleTrackInfo, UserDataSample};
