use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("invalid NAL length field size: {0} (expected 1 to 4)")]
    InvalidLengthSize(u8),

    #[error("unrecognized framing `{0}` (expected annexb, avcc, or len1 to len4)")]
    UnrecognizedFraming(String),
}

/// Width in bytes of the big-endian length field in front of each length-prefixed NAL unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthSize(u8);

impl LengthSize {
    /// The width MP4 `avcC` records almost always carry (`lengthSizeMinusOne == 3`).
    pub const AVCC: LengthSize = LengthSize(4);

    pub fn new(size: u8) -> Result<Self, FramingError> {
        match size {
            1..=4 => Ok(Self(size)),
            _ => Err(FramingError::InvalidLengthSize(size)),
        }
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

/// How NAL units are delimited inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Units are separated by `00 00 01` or `00 00 00 01` start codes.
    AnnexB,

    /// Each unit is preceded by a big-endian length field of the given width.
    LengthPrefixed(LengthSize),
}

impl Framing {
    /// The selector value demuxers use for Annex-B streams; any other value is a length width.
    pub const ANNEX_B_SELECTOR: u8 = 0;

    /// Builds a `Framing` from the single-integer convention demuxers hand around: `0` means
    /// Annex-B, `1` to `4` mean length-prefixed with that many length bytes.
    pub fn from_selector(selector: u8) -> Result<Self, FramingError> {
        match selector {
            Self::ANNEX_B_SELECTOR => Ok(Framing::AnnexB),
            size => Self::length_prefixed(size),
        }
    }

    pub fn length_prefixed(size: u8) -> Result<Self, FramingError> {
        LengthSize::new(size).map(Framing::LengthPrefixed)
    }
}

impl FromStr for Framing {
    type Err = FramingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "annexb" | "annex-b" => Ok(Framing::AnnexB),
            "avcc" => Ok(Framing::LengthPrefixed(LengthSize::AVCC)),
            "len1" => Framing::length_prefixed(1),
            "len2" => Framing::length_prefixed(2),
            "len3" => Framing::length_prefixed(3),
            "len4" => Framing::length_prefixed(4),
            _ => Err(FramingError::UnrecognizedFraming(s.to_string())),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::AnnexB => f.write_str("annexb"),
            Framing::LengthPrefixed(size) => write!(f, "len{}", size.get()),
        }
    }
}
