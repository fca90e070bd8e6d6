use thiserror::Error;

/// Main error type for caption and subtitle synchronization
#[derive(Error, Debug)]
pub enum CaptionError {
    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Configuration serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The text-cue parser rejected a subtitle payload
    #[error("Subtitle parse error: {0}")]
    Parse(String),

    /// A cue with an end time before its start time was offered to a track
    #[error("Invalid cue timing: start={start}, end={end}")]
    InvalidCue { start: f64, end: f64 },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CaptionError>;
