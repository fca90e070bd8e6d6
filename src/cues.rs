//! Cue materialization
//!
//! Turns a decoded caption screen into cues on a text track. The strategy is
//! pluggable; two built-in handlers are provided.

use std::sync::Arc;

use crate::config::CueHandlerKind;
use crate::track::TextTrack;
use crate::types::Cue;

/// Number of rows on a CEA-608 caption screen
pub const SCREEN_ROWS: usize = 15;

/// One row of a decoded caption screen
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptionRow {
    /// Column indent in character cells
    pub indent: u8,
    pub text: String,
}

impl CaptionRow {
    pub fn new(indent: u8, text: impl Into<String>) -> Self {
        Self {
            indent,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Snapshot of the caption screen handed over by the decoder
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptionScreen {
    pub rows: Vec<CaptionRow>,
}

impl CaptionScreen {
    pub fn from_rows(rows: Vec<CaptionRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(CaptionRow::is_empty)
    }

    /// Non-empty rows with their row index
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &CaptionRow)> {
        self.rows.iter().enumerate().filter(|(_, r)| !r.is_empty())
    }
}

/// Strategy that adds cues for a decoded screen to a track
pub trait CueMaterializer: Send + Sync {
    /// Add cues for `screen` displayed from `start_time` to `end_time`.
    /// Returns the number of cues added.
    fn new_cue(
        &self,
        track: &TextTrack,
        start_time: f64,
        end_time: f64,
        screen: &CaptionScreen,
    ) -> usize;
}

/// One cue per non-empty row, positioned by row and indent
#[derive(Debug, Default, Clone, Copy)]
pub struct RowCueMaterializer;

impl RowCueMaterializer {
    fn position(indent: u8) -> f64 {
        (10.0 + f64::from(indent) * 2.5).min(100.0)
    }
}

impl CueMaterializer for RowCueMaterializer {
    fn new_cue(
        &self,
        track: &TextTrack,
        start_time: f64,
        end_time: f64,
        screen: &CaptionScreen,
    ) -> usize {
        let mut added = 0;
        for (index, row) in screen.visible_rows() {
            let mut cue = Cue::new(start_time, end_time, row.text.trim());
            cue.line = Some(index.min(SCREEN_ROWS - 1) as u8);
            cue.position = Some(Self::position(row.indent));
            if track.add_cue(cue).is_ok() {
                added += 1;
            }
        }
        added
    }
}

/// A single cue holding every non-empty row
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenCueMaterializer;

impl CueMaterializer for ScreenCueMaterializer {
    fn new_cue(
        &self,
        track: &TextTrack,
        start_time: f64,
        end_time: f64,
        screen: &CaptionScreen,
    ) -> usize {
        let text = screen
            .visible_rows()
            .map(|(_, row)| row.text.trim())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            return 0;
        }
        match track.add_cue(Cue::new(start_time, end_time, text)) {
            Ok(()) => 1,
            Err(_) => 0,
        }
    }
}

/// Built-in materializer for a configured handler kind
pub fn materializer_for(kind: CueHandlerKind) -> Arc<dyn CueMaterializer> {
    match kind {
        CueHandlerKind::Rows => Arc::new(RowCueMaterializer),
        CueHandlerKind::Screen => Arc::new(ScreenCueMaterializer),
    }
}
