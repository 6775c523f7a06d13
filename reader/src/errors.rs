use std::io;

use thiserror::Error;

/// Why a buffer can't be read as a NAL unit stream.
///
/// Every variant is terminal for the reader that produced it: there is no resynchronization on
/// the next plausible unit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStream {
    #[error("no start code found in the byte stream")]
    StartCodeNotFound,

    #[error(
        "unit at offset {offset} needs a {length_size}-byte length field but only {remaining} bytes remain"
    )]
    TruncatedLengthField {
        offset: usize,
        length_size: usize,
        remaining: usize,
    },

    #[error("unit at offset {offset} declares {declared} bytes but only {remaining} remain")]
    LengthExceedsRemaining {
        offset: usize,
        declared: u64,
        remaining: usize,
    },

    #[error("unit at offset {offset} is too short to hold a NAL header byte")]
    MissingHeader { offset: usize },

    #[error("forbidden_zero_bit set in NAL header of unit at offset {offset}")]
    ForbiddenZeroBit { offset: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Not a failure: every unit in the buffer has been handed out.
    #[error("end of stream")]
    EndOfStream,

    #[error("invalid stream: {0}")]
    InvalidStream(#[from] InvalidStream),
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("An error occurred when opening the file")]
    FileError(#[from] io::Error),

    #[error("An error occurred reading from the nal unit stream")]
    InvalidStream(#[from] InvalidStream),
}
