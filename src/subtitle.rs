//! Subtitle fragment integration
//!
//! Hands WebVTT fragment payloads to the text-cue parser and reports the
//! outcome on the event bus. Parsing and completion are separate steps so a
//! completion can be checked against the session that issued it.

use crate::error::{CaptionError, Result};
use crate::events::{CaptionEvent, EventSender};
use crate::timeline::SessionToken;
use crate::track::TextTrack;
use crate::types::{Cue, Fragment};

/// Parser turning a subtitle fragment payload into timeline cues
pub trait TextCueParser: Send {
    /// Parse `payload`, offsetting cue times by `initial_pts` (90 kHz ticks)
    /// so they land on the playback timeline
    fn parse(&mut self, payload: &[u8], initial_pts: i64) -> Result<Vec<Cue>>;
}

/// Result of parsing one fragment, tagged with the issuing session
#[derive(Debug)]
pub struct ParseOutcome {
    session: SessionToken,
    fragment: Fragment,
    result: Result<Vec<Cue>>,
}

impl ParseOutcome {
    pub fn new(session: SessionToken, fragment: Fragment, result: Result<Vec<Cue>>) -> Self {
        Self {
            session,
            fragment,
            result,
        }
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the text-cue parser and publishes its results
pub struct SubtitleIntegrator {
    parser: Option<Box<dyn TextCueParser>>,
    events: EventSender,
}

impl SubtitleIntegrator {
    pub fn new(parser: Option<Box<dyn TextCueParser>>, events: EventSender) -> Self {
        Self { parser, events }
    }

    /// Parse a fragment payload. Empty payloads are skipped entirely.
    pub fn parse(
        &mut self,
        session: SessionToken,
        fragment: &Fragment,
        payload: &[u8],
        initial_pts: i64,
    ) -> Option<ParseOutcome> {
        if payload.is_empty() {
            return None;
        }
        let result = match self.parser.as_mut() {
            Some(parser) => parser.parse(payload, initial_pts),
            None => Err(CaptionError::Parse(
                "no text cue parser configured".to_string(),
            )),
        };
        Some(ParseOutcome::new(session, fragment.clone(), result))
    }

    /// Apply a parse outcome: add cues to the first subtitle track and emit
    /// `SubtitleFragProcessed`. Outcomes from another session are dropped.
    ///
    /// Returns whether the outcome was applied.
    pub fn complete(
        &self,
        outcome: ParseOutcome,
        current: SessionToken,
        tracks: &[TextTrack],
    ) -> bool {
        let ParseOutcome {
            session,
            fragment,
            result,
        } = outcome;

        if session != current {
            tracing::debug!(
                "Dropping stale subtitle result for fragment sn={}",
                fragment.sn
            );
            return false;
        }

        match result {
            Ok(cues) => {
                match tracks.first() {
                    Some(track) => {
                        // Rejected cues are logged by the track
                        let count = cues
                            .into_iter()
                            .map(|cue| track.add_cue(cue))
                            .filter(Result::is_ok)
                            .count();
                        tracing::debug!(
                            "Added {} cue(s) from subtitle fragment sn={} to \"{}\"",
                            count,
                            fragment.sn,
                            track.label()
                        );
                    }
                    None => tracing::warn!(
                        "No subtitle track for fragment sn={}, discarding {} cue(s)",
                        fragment.sn,
                        cues.len()
                    ),
                }
                self.events.emit(CaptionEvent::SubtitleFragProcessed {
                    success: true,
                    fragment,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to parse subtitle fragment sn={}: {}", fragment.sn, e);
                self.events.emit(CaptionEvent::SubtitleFragProcessed {
                    success: false,
                    fragment,
                });
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;
    use crate::track::TrackKind;

    struct FixedParser(Vec<Cue>);

    impl TextCueParser for FixedParser {
        fn parse(&mut self, _payload: &[u8], initial_pts: i64) -> Result<Vec<Cue>> {
            let offset = initial_pts as f64 / 90000.0;
            Ok(self
                .0
                .iter()
                .map(|c| Cue::new(c.start_time + offset, c.end_time + offset, c.text.clone()))
                .collect())
        }
    }

    struct FailingParser;

    impl TextCueParser for FailingParser {
        fn parse(&mut self, _payload: &[u8], _initial_pts: i64) -> Result<Vec<Cue>> {
            Err(CaptionError::Parse("missing WEBVTT header".to_string()))
        }
    }

    fn fragment() -> Fragment {
        Fragment::subtitle(9, 0, 36.0, 4.0)
    }

    #[test]
    fn test_success_adds_cues_to_first_track() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(
            Some(Box::new(FixedParser(vec![Cue::new(1.0, 2.0, "hi")]))),
            events,
        );
        let session = SessionToken::new();
        let tracks = vec![
            TextTrack::new(TrackKind::Subtitles, "English", "en"),
            TextTrack::new(TrackKind::Subtitles, "French", "fr"),
        ];

        let outcome = integrator
            .parse(session, &fragment(), b"WEBVTT", 90000)
            .unwrap();
        assert!(outcome.is_ok());
        assert!(integrator.complete(outcome, session, &tracks));

        assert_eq!(tracks[0].cues()[0].start_time, 2.0);
        assert_eq!(tracks[1].cue_count(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            CaptionEvent::SubtitleFragProcessed {
                success: true,
                fragment: fragment()
            }
        );
    }

    #[test]
    fn test_rejected_cues_not_added() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(
            Some(Box::new(FixedParser(vec![
                Cue::new(1.0, 2.0, "kept"),
                Cue::new(f64::NAN, 2.0, "broken"),
                Cue::new(5.0, 3.0, "backwards"),
            ]))),
            events,
        );
        let session = SessionToken::new();
        let tracks = vec![TextTrack::new(TrackKind::Subtitles, "English", "en")];

        let outcome = integrator.parse(session, &fragment(), b"WEBVTT", 0).unwrap();
        assert!(integrator.complete(outcome, session, &tracks));

        assert_eq!(tracks[0].cue_count(), 1);
        assert_eq!(tracks[0].cues()[0].text, "kept");
        assert!(matches!(
            rx.try_recv().unwrap(),
            CaptionEvent::SubtitleFragProcessed { success: true, .. }
        ));
    }

    #[test]
    fn test_failure_emits_failure_event() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(Some(Box::new(FailingParser)), events);
        let session = SessionToken::new();
        let tracks = vec![TextTrack::new(TrackKind::Subtitles, "English", "en")];

        let outcome = integrator.parse(session, &fragment(), b"garbage", 0).unwrap();
        integrator.complete(outcome, session, &tracks);

        assert_eq!(tracks[0].cue_count(), 0);
        assert!(matches!(
            rx.try_recv().unwrap(),
            CaptionEvent::SubtitleFragProcessed { success: false, .. }
        ));
    }

    #[test]
    fn test_empty_payload_skipped() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(Some(Box::new(FailingParser)), events);
        assert!(integrator
            .parse(SessionToken::new(), &fragment(), b"", 0)
            .is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stale_session_dropped() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(
            Some(Box::new(FixedParser(vec![Cue::new(1.0, 2.0, "late")]))),
            events,
        );
        let tracks = vec![TextTrack::new(TrackKind::Subtitles, "English", "en")];

        let outcome = integrator
            .parse(SessionToken::new(), &fragment(), b"WEBVTT", 0)
            .unwrap();
        assert!(!integrator.complete(outcome, SessionToken::new(), &tracks));
        assert_eq!(tracks[0].cue_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_parser_reports_failure() {
        let (events, mut rx) = event_channel();
        let mut integrator = SubtitleIntegrator::new(None, events);
        let session = SessionToken::new();
        let outcome = integrator.parse(session, &fragment(), b"WEBVTT", 0).unwrap();
        integrator.complete(outcome, session, &[]);
        assert!(matches!(
            rx.try_recv().unwrap(),
            CaptionEvent::SubtitleFragProcessed { success: false, .. }
        ));
    }
}
