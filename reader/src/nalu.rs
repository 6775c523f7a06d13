use nalu_common::{NalHeader, NalUnitType, NAL_HEADER_SIZE};

/// One located NAL unit, borrowed from the buffer it was read from.
///
/// The span returned by [`Nalu::data`] begins at the framing bytes (the start code or the length
/// field), not at the header byte, so the exact on-wire form can be recovered. `header_size`
/// counts those framing bytes plus the header byte, and the payload is everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nalu<'a> {
    data: &'a [u8],
    offset: usize,
    header_size: usize,
    header: NalHeader,
}

impl<'a> Nalu<'a> {
    pub(crate) fn new(
        data: &'a [u8],
        offset: usize,
        header_size: usize,
        header: NalHeader,
    ) -> Self {
        debug_assert!(
            header_size > NAL_HEADER_SIZE && header_size <= data.len(),
            "header_size {header_size} out of range for a {}-byte unit",
            data.len()
        );

        Self {
            data,
            offset,
            header_size,
            header,
        }
    }

    /// The full span of the unit, framing bytes included.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Position of the first byte of [`Nalu::data`] within the source buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Bytes taken by the start code or length field.
    pub fn framing_size(&self) -> usize {
        self.header_size - NAL_HEADER_SIZE
    }

    /// Position of the NAL header byte within the source buffer.
    pub fn header_byte_offset(&self) -> usize {
        self.offset + self.framing_size()
    }

    pub fn payload_size(&self) -> usize {
        self.data.len() - self.header_size
    }

    /// The payload, still escaped with any emulation prevention bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.header_size..]
    }

    pub fn header(&self) -> NalHeader {
        self.header
    }

    pub fn ref_idc(&self) -> u8 {
        self.header.nal_ref_idc()
    }

    pub fn unit_type(&self) -> u8 {
        self.header.nal_unit_type()
    }

    pub fn nal_unit_type(&self) -> NalUnitType {
        self.header.unit_type()
    }
}
