//! Error types for input validation and layout.

use thiserror::Error;

/// Errors raised while validating notation input or running layout.
///
/// These are the fatal cases; a missing glyph metric is not an error
/// (the width falls back to zero with a logged warning).
#[derive(Debug, Error)]
pub enum Error {
    /// Time signature string that does not parse as `N/D`.
    #[error("invalid time signature '{0}'")]
    InvalidTimeSignature(String),

    /// Beat-type denominator outside 1/2/4/8/16 or not dividing the
    /// cursor subdivision.
    #[error("unsupported beat type {0}")]
    UnsupportedBeatType(u32),

    /// Pitch name not present in the configured language table.
    #[error("unknown pitch name '{name}' for language '{language}'")]
    UnknownPitchName { name: String, language: &'static str },

    /// Clef string other than treble/bass/alto.
    #[error("unknown clef '{0}'")]
    UnknownClef(String),

    /// Key string that does not parse as `<root> <mode>`.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// Note base length outside 1/2/4/8/16.
    #[error("unsupported note length {0}")]
    UnsupportedLength(u32),

    /// Render was invoked with a non-finite reference coordinate.
    #[error("render reference coordinates are not set")]
    MissingRenderOrigin,

    /// Input JSON did not deserialize into the notation model.
    #[error("bad notation input: {0}")]
    BadInput(String),
}
