//! Main timeline discontinuity detection

/// High-water mark of main fragment start times.
///
/// A fragment starting at or before the previous one means the player
/// seeked, looped or the stream relocated.
#[derive(Debug, Clone, Copy)]
pub struct MainTimelineWatermark {
    last_pts: f64,
}

impl Default for MainTimelineWatermark {
    fn default() -> Self {
        Self {
            last_pts: f64::NEG_INFINITY,
        }
    }
}

impl MainTimelineWatermark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start time of the last observed main fragment
    pub fn last_pts(&self) -> f64 {
        self.last_pts
    }

    /// Record a main fragment start. Returns true when it jumped backwards.
    pub fn observe(&mut self, start: f64) -> bool {
        if start.is_nan() {
            tracing::debug!("Ignoring main fragment without a start time");
            return false;
        }
        let jumped = start <= self.last_pts;
        self.last_pts = start;
        jumped
    }

    pub fn reset(&mut self) {
        self.last_pts = f64::NEG_INFINITY;
    }
}
