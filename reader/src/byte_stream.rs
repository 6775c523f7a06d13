use memchr::memmem;
use nalu_common::{START_CODE_PREFIX, ZERO_BYTE};

/// A start code located inside a searched byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCode {
    /// Offset of the first byte of the start code, counting the `zero_byte` of the four-byte form.
    pub offset: usize,

    /// 3 for `0x000001`, 4 for `0x00000001`.
    pub size: usize,
}

impl StartCode {
    /// Offset of the first byte after the start code.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Finds the first start code in `data`.
///
/// The search is for the three-byte `START_CODE_PREFIX`. When the byte right before it is a
/// `zero_byte` that still lies inside `data`, the start code is reported in its four-byte form.
/// Bytes in front of the start code are not inspected otherwise, so any leading data that is not
/// part of a NAL unit is skipped over.
pub fn find_start_code(data: &[u8]) -> Option<StartCode> {
    let prefix_offset = memmem::find(data, &START_CODE_PREFIX)?;

    /*
    [...0xAB, 0x00, 0x00, 0x00, 0x01, ...]
                    |<-- prefix_offset
              |<-- a zero_byte here widens the start code to four bytes
     */
    let start_code = match prefix_offset.checked_sub(1) {
        Some(zero_offset) if data[zero_offset] == ZERO_BYTE => StartCode {
            offset: zero_offset,
            size: START_CODE_PREFIX.len() + 1,
        },
        _ => StartCode {
            offset: prefix_offset,
            size: START_CODE_PREFIX.len(),
        },
    };

    Some(start_code)
}
