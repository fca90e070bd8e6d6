//! CEA-608 closed captions carried in video user data
//!
//! - Byte pair extraction from `cc_data()` samples
//! - Per-channel cue sinks feeding lazily created caption tracks
//! - The decoder seam: the character-cell state machine lives outside this
//!   crate and is plugged in through [`CaptionDecoder`]

pub mod extract;
pub mod sink;

pub use extract::extract_cea608_data;
pub use sink::{CaptionChannel, CueSink};

/// A CEA-608 byte pair with parity bits stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcBytePair {
    pub data1: u8,
    pub data2: u8,
}

impl CcBytePair {
    pub fn new(data1: u8, data2: u8) -> Self {
        Self { data1, data2 }
    }

    /// Null padding pair
    pub fn is_padding(&self) -> bool {
        self.data1 == 0 && self.data2 == 0
    }
}

/// CEA-608 state machine turning byte pairs into caption screens.
///
/// Implementations report finished captions through the two [`CueSink`]s
/// they were built with.
pub trait CaptionDecoder: Send {
    /// Feed the byte pairs of one sample presented at `pts` seconds
    fn add_data(&mut self, pts: f64, pairs: &[CcBytePair]);

    /// Drop any partially built caption
    fn reset(&mut self) {}
}

/// Builds a decoder around the channel 1 and channel 2 sinks
pub type DecoderFactory =
    Box<dyn FnOnce(Box<dyn CueSink>, Box<dyn CueSink>) -> Box<dyn CaptionDecoder> + Send>;
