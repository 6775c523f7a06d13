use thiserror::Error;

use crate::nal_unit_type::NalUnitType;

/// A unique sequence of three bytes equal to `0x000001` embedded in the byte stream as a prefix
/// to each NAL unit. The location of a `START_CODE_PREFIX` can be used to identify the beginning
/// of a new NAL unit and the end of a previous one. Emulation of start code prefixes is prevented
/// within NAL units by emulation prevention bytes, which this crate leaves untouched.
pub const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

/// A `zero_byte` directly before a `START_CODE_PREFIX` forms the four-byte start code `0x00000001`.
pub const ZERO_BYTE: u8 = 0x00;

/// Every H.264 NAL unit opens with exactly one header byte.
pub const NAL_HEADER_SIZE: usize = 1;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    #[error("forbidden_zero_bit is set in NAL header byte {0:#04x}")]
    ForbiddenZeroBit(u8),
}

/// The decoded NAL unit header byte:
///
/// ```text
/// +---+-----+---------+
/// | F | NRI |  Type   |
/// +---+-----+---------+
///   7  6   5 4       0
/// ```
///
/// `F` is the `forbidden_zero_bit`. It is checked on decode and not kept, so a `NalHeader` value
/// always describes a header whose forbidden bit was 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NalHeader {
    /// `nal_ref_idc` not equal to 0 specifies that the content of the NAL unit contains a
    /// parameter set, a slice of a reference picture, or a slice data partition of a reference
    /// picture. `nal_ref_idc` equal to 0 for a slice indicates that it is part of a non-reference
    /// picture.
    ///
    /// `nal_ref_idc` shall be equal to 0 for all NAL units having `nal_unit_type` equal to 6, 9,
    /// 10, 11, or 12.
    nal_ref_idc: u8,

    /// `nal_unit_type` specifies the type of RBSP data structure contained in the NAL unit.
    nal_unit_type: u8,
}

impl NalHeader {
    const FORBIDDEN_ZERO_BIT: u8 = 0b1000_0000;
    const NAL_REF_IDC_MASK: u8 = 0b11;
    const NAL_UNIT_TYPE_MASK: u8 = 0b0001_1111;

    /// Decodes the forbidden bit, `nal_ref_idc` and `nal_unit_type` from a header byte.
    pub fn from_byte(byte: u8) -> Result<Self, HeaderError> {
        if byte & Self::FORBIDDEN_ZERO_BIT != 0 {
            return Err(HeaderError::ForbiddenZeroBit(byte));
        }

        Ok(Self {
            nal_ref_idc: (byte >> 5) & Self::NAL_REF_IDC_MASK,
            nal_unit_type: byte & Self::NAL_UNIT_TYPE_MASK,
        })
    }

    pub fn nal_ref_idc(&self) -> u8 {
        self.nal_ref_idc
    }

    pub fn nal_unit_type(&self) -> u8 {
        self.nal_unit_type
    }

    pub fn unit_type(&self) -> NalUnitType {
        NalUnitType::from_nal_unit_type(self.nal_unit_type)
    }
}
