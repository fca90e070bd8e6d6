//! Test fixtures
//!
//! Scripted stand-ins for the external CEA-608 decoder and WebVTT parser.

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::cea608::{CaptionDecoder, CcBytePair, CueSink};
use crate::config::CaptionConfig;
use crate::controller::TimelineController;
use crate::cues::{CaptionRow, CaptionScreen};
use crate::error::{CaptionError, Result};
use crate::events::{CaptionEvent, PlayerEvent};
use crate::subtitle::TextCueParser;
use crate::surface::InMemorySurface;
use crate::types::{Cue, Fragment, SubtitleTrackInfo, UserDataSample};

/// Route tracing output to the test harness when `RUST_LOG` is set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One call into [`ScriptParser`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParseCall {
    pub text: String,
    pub initial_pts: i64,
}

/// Parser for a minimal cue script:
///
/// ```text
/// WEBVTT
/// <start> <end> <text>
/// ```
///
/// Times are seconds relative to the fragment; the initial PTS (90 kHz) is
/// added as an offset.
pub struct ScriptParser {
    calls: Arc<Mutex<Vec<ParseCall>>>,
}

impl ScriptParser {
    pub fn new() -> (Self, Arc<Mutex<Vec<ParseCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl TextCueParser for ScriptParser {
    fn parse(&mut self, payload: &[u8], initial_pts: i64) -> Result<Vec<Cue>> {
        let text = String::from_utf8_lossy(payload).to_string();
        self.calls.lock().push(ParseCall {
            text: text.clone(),
            initial_pts,
        });

        let mut lines = text.lines();
        if lines.next() != Some("WEBVTT") {
            return Err(CaptionError::Parse("missing WEBVTT header".to_string()));
        }

        let offset = initial_pts as f64 / 90000.0;
        lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut parts = line.splitn(3, ' ');
                let mut time = || -> Result<f64> {
                    parts
                        .next()
                        .and_then(|t| t.parse::<f64>().ok())
                        .ok_or_else(|| CaptionError::Parse(format!("bad cue line: {}", line)))
                };
                let start = time()?;
                let end = time()?;
                let body = parts.next().unwrap_or("");
                Ok(Cue::new(start + offset, end + offset, body))
            })
            .collect()
    }
}

/// What the scripted decoder saw
#[derive(Debug, Default)]
pub struct DecoderLog {
    pub feeds: Vec<(f64, Vec<CcBytePair>)>,
    pub resets: usize,
}

/// Decoder that turns printable pairs of each sample into a one-second cue.
///
/// A control pair with first byte 0x10..=0x17 selects channel 1 and
/// 0x18..=0x1F selects channel 2.
pub struct ScriptedDecoder {
    channel1: Box<dyn CueSink>,
    channel2: Box<dyn CueSink>,
    current: u8,
    log: Arc<Mutex<DecoderLog>>,
}

impl ScriptedDecoder {
    pub fn new(
        channel1: Box<dyn CueSink>,
        channel2: Box<dyn CueSink>,
        log: Arc<Mutex<DecoderLog>>,
    ) -> Self {
        Self {
            channel1,
            channel2,
            current: 1,
            log,
        }
    }
}

impl CaptionDecoder for ScriptedDecoder {
    fn add_data(&mut self, pts: f64, pairs: &[CcBytePair]) {
        self.log.lock().feeds.push((pts, pairs.to_vec()));

        let mut text = String::new();
        for pair in pairs {
            match pair.data1 {
                0x10..=0x17 => self.current = 1,
                0x18..=0x1F => self.current = 2,
                _ => {
                    for byte in [pair.data1, pair.data2] {
                        if (0x20..0x7F).contains(&byte) {
                            text.push(byte as char);
                        }
                    }
                }
            }
        }
        if text.is_empty() {
            return;
        }

        let screen = CaptionScreen::from_rows(vec![CaptionRow::new(0, text)]);
        let sink = if self.current == 1 {
            &mut self.channel1
        } else {
            &mut self.channel2
        };
        sink.new_cue(pts, pts + 1.0, &screen);
    }

    fn reset(&mut self) {
        self.log.lock().resets += 1;
        self.current = 1;
    }
}

/// Controller wired to the scripted collaborators
pub struct Harness {
    pub controller: TimelineController,
    pub events: tokio::sync::mpsc::UnboundedReceiver<CaptionEvent>,
    pub surface: Arc<InMemorySurface>,
    pub parse_calls: Arc<Mutex<Vec<ParseCall>>>,
    pub decoder_log: Arc<Mutex<DecoderLog>>,
}

impl Harness {
    pub fn new(config: CaptionConfig) -> Self {
        init_tracing();
        let (parser, parse_calls) = ScriptParser::new();
        let decoder_log = Arc::new(Mutex::new(DecoderLog::default()));
        let log = decoder_log.clone();

        let (controller, events) = TimelineController::builder(config)
            .text_cue_parser(Box::new(parser))
            .caption_decoder(move |channel1, channel2| {
                Box::new(ScriptedDecoder::new(channel1, channel2, log)) as Box<dyn CaptionDecoder>
            })
            .build();

        Self {
            controller,
            events,
            surface: InMemorySurface::shared(),
            parse_calls,
            decoder_log,
        }
    }

    pub fn attach(&mut self) {
        let surface = self.surface.clone();
        self.controller
            .handle_event(PlayerEvent::MediaAttaching { surface });
    }

    pub fn load_manifest(&mut self, subtitles: Vec<SubtitleTrackInfo>) {
        self.controller.handle_event(PlayerEvent::ManifestLoading);
        self.controller
            .handle_event(PlayerEvent::ManifestLoaded { subtitles });
    }

    pub fn subtitle_fragment(&mut self, sn: u64, payload: &'static str) {
        self.controller.handle_event(PlayerEvent::FragLoaded {
            fragment: Fragment::subtitle(sn, 0, sn as f64 * 4.0, 4.0),
            payload: Bytes::from_static(payload.as_bytes()),
        });
    }

    pub fn main_fragment(&mut self, sn: u64, start: f64) {
        self.controller.handle_event(PlayerEvent::FragLoaded {
            fragment: Fragment::main(sn, start, 4.0),
            payload: Bytes::from_static(b"\x47"),
        });
    }

    /// Feed one user data sample carrying the given (cc_data_1, cc_data_2)
    /// pairs as valid field-1 triplets
    pub fn captions(&mut self, pts: f64, pairs: &[(u8, u8)]) {
        let mut bytes = vec![0x40 | pairs.len() as u8, 0xFF];
        for &(b1, b2) in pairs {
            bytes.extend_from_slice(&[0xFC, b1, b2]);
        }
        self.controller
            .handle_event(PlayerEvent::FragParsingUserdata {
                samples: vec![UserDataSample {
                    pts,
                    bytes: Bytes::from(bytes),
                }],
            });
    }

    pub fn drain_events(&mut self) -> Vec<CaptionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub fn english() -> SubtitleTrackInfo {
    SubtitleTrackInfo::new("English", Some("en"))
}
