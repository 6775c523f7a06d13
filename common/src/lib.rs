mod framing;
mod nal_unit;
mod nal_unit_type;

pub use framing::{Framing, FramingError, LengthSize};
pub use nal_unit::{HeaderError, NalHeader, NAL_HEADER_SIZE, START_CODE_PREFIX, ZERO_BYTE};
pub use nal_unit_type::NalUnitType;
