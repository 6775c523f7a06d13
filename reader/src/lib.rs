//! Locates NAL units in an H.264 elementary stream, framed either by Annex-B start codes or by
//! fixed-width big-endian length fields.
//!
//! Units are handed out as [`Nalu`] views borrowing from the caller's buffer; nothing is copied
//! and payloads keep their emulation prevention bytes.

mod byte_stream;
mod errors;
mod nalu;
mod nalu_file;
mod reader;
mod summary;

pub use byte_stream::{find_start_code, StartCode};
pub use errors::{InvalidStream, ReadError, StreamError};
pub use nalu::Nalu;
pub use nalu_common::{Framing, FramingError, LengthSize, NalHeader, NalUnitType};
pub use nalu_file::NaluFile;
pub use reader::NaluReader;
pub use summary::StreamSummary;
