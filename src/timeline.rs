//! Initial PTS discovery and deferred subtitle work
//!
//! Subtitle fragments are parsed as a whole against the timeline origin, so
//! any that arrive before the initial PTS is known wait here. Caption samples
//! carry their own PTS and never pass through this queue.

use bytes::Bytes;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::types::Fragment;

/// Identifies one manifest load; results from older sessions are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A subtitle fragment waiting for the initial PTS
#[derive(Debug, Clone)]
pub struct PendingFragment {
    pub fragment: Fragment,
    pub payload: Bytes,
}

/// Synchronization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Initial PTS unknown
    Unsynced,
    /// Initial PTS known
    Synced,
}

/// What to do with an arriving subtitle fragment
#[derive(Debug)]
pub enum Admission {
    /// Integrate now against `initial_pts`
    Integrate {
        pending: PendingFragment,
        initial_pts: i64,
    },
    /// Queued until the initial PTS is found
    Deferred,
}

/// Owner of the initial PTS and the pending subtitle queue
#[derive(Debug, Default)]
pub struct TimelineSync {
    initial_pts: Option<i64>,
    pending: VecDeque<PendingFragment>,
}

impl TimelineSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        match self.initial_pts {
            Some(_) => SyncState::Synced,
            None => SyncState::Unsynced,
        }
    }

    /// Initial PTS in 90 kHz ticks, once discovered
    pub fn initial_pts(&self) -> Option<i64> {
        self.initial_pts
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record the initial PTS. Only the first discovery is kept.
    ///
    /// Returns the queued fragments in arrival order; the queue is left empty.
    pub fn on_initial_pts_discovered(&mut self, pts: i64) -> Vec<PendingFragment> {
        match self.initial_pts {
            None => {
                tracing::info!("Initial PTS found: {}", pts);
                self.initial_pts = Some(pts);
            }
            Some(known) if known != pts => {
                tracing::debug!("Ignoring initial PTS {}, keeping {}", pts, known);
            }
            Some(_) => {}
        }

        if !self.pending.is_empty() {
            tracing::debug!(
                "Replaying {} deferred subtitle fragment(s)",
                self.pending.len()
            );
        }
        self.pending.drain(..).collect()
    }

    /// Admit a subtitle fragment, deferring it while the timeline is unsynced
    pub fn on_subtitle_fragment_arrived(&mut self, fragment: Fragment, payload: Bytes) -> Admission {
        let pending = PendingFragment { fragment, payload };
        match self.initial_pts {
            Some(initial_pts) => Admission::Integrate {
                pending,
                initial_pts,
            },
            None => {
                tracing::debug!(
                    "Initial PTS unknown, deferring subtitle fragment sn={}",
                    pending.fragment.sn
                );
                self.pending.push_back(pending);
                Admission::Deferred
            }
        }
    }

    /// Forget the initial PTS and any deferred work. Returns how many
    /// fragments were discarded.
    pub fn reset(&mut self) -> usize {
        self.initial_pts = None;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}
