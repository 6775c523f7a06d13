use std::iter::FusedIterator;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};
use nalu_common::{Framing, LengthSize, NalHeader, NAL_HEADER_SIZE, START_CODE_PREFIX, ZERO_BYTE};

use crate::byte_stream::find_start_code;
use crate::errors::{InvalidStream, ReadError};
use crate::nalu::Nalu;

/// Byte range of one unit, before its header byte has been validated.
#[derive(Debug, Clone, Copy)]
struct UnitBounds {
    start: usize,
    framing_size: usize,
    end: usize,
}

/// `NaluReader` is a cursor over a buffer holding a sequence of NAL units in one framing.
///
/// Each call to [`NaluReader::advance`] locates the next unit and moves the cursor past it. The
/// buffer is never copied or modified, so every [`Nalu`] handed out stays valid for as long as
/// the buffer is borrowed.
///
/// Once `advance` reports [`ReadError::InvalidStream`] the stream should be considered
/// unrecoverable; the cursor is left at the start of the offending unit.
#[derive(Debug, Clone)]
pub struct NaluReader<'a> {
    cursor: usize,
    data: &'a [u8],
    framing: Framing,
    faulted: bool,
}

impl<'a> NaluReader<'a> {
    pub fn new(data: &'a [u8], framing: Framing) -> Self {
        Self {
            cursor: 0,
            data,
            framing,
            faulted: false,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.data.len()
    }

    /// Whether the unread part of the buffer opens with a three- or four-byte start code.
    pub fn starts_with_start_code(&self) -> bool {
        let rest = &self.data[self.cursor.min(self.data.len())..];
        rest.starts_with(&START_CODE_PREFIX)
            || rest
                .strip_prefix(&[ZERO_BYTE])
                .is_some_and(|rest| rest.starts_with(&START_CODE_PREFIX))
    }

    /// Locates the next NAL unit and moves the cursor past it.
    pub fn advance(&mut self) -> Result<Nalu<'a>, ReadError> {
        if self.is_exhausted() {
            return Err(ReadError::EndOfStream);
        }

        let located = match self.framing {
            Framing::AnnexB => self.locate_by_start_code(),
            Framing::LengthPrefixed(length_size) => self.locate_by_length(length_size),
        };
        let bounds = match located {
            Ok(bounds) => bounds,
            Err(reason) => {
                debug!("invalid stream at position {}: {reason}", self.cursor);
                return Err(reason.into());
            }
        };

        // Annex-B leader bytes are dropped even if the unit after them turns out to be invalid.
        self.cursor = bounds.start;

        let header_byte = self.data[bounds.start + bounds.framing_size];
        let header = match NalHeader::from_byte(header_byte) {
            Ok(header) => header,
            Err(err) => {
                debug!("invalid stream at position {}: {err}", self.cursor);
                return Err(InvalidStream::ForbiddenZeroBit {
                    offset: bounds.start,
                }
                .into());
            }
        };

        let nalu = Nalu::new(
            &self.data[bounds.start..bounds.end],
            bounds.start,
            bounds.framing_size + NAL_HEADER_SIZE,
            header,
        );
        trace!(
            "nal unit at {}: type={} ref_idc={} header_size={} payload_size={}",
            nalu.offset(),
            nalu.unit_type(),
            nalu.ref_idc(),
            nalu.header_size(),
            nalu.payload_size()
        );

        self.cursor = bounds.end;
        Ok(nalu)
    }

    /// The unit runs from its start code up to the next start code, or to the end of the buffer.
    fn locate_by_start_code(&self) -> Result<UnitBounds, InvalidStream> {
        let rest = &self.data[self.cursor..];
        let current = find_start_code(rest).ok_or(InvalidStream::StartCodeNotFound)?;
        if current.offset > 0 {
            debug!(
                "discarding {} bytes before the start code at {}",
                current.offset,
                self.cursor + current.offset
            );
        }

        let start = self.cursor + current.offset;
        let unit = &rest[current.end()..];
        let unit_len = match find_start_code(unit) {
            Some(next) => next.offset,
            None => unit.len(),
        };
        if unit_len < NAL_HEADER_SIZE {
            return Err(InvalidStream::MissingHeader { offset: start });
        }

        Ok(UnitBounds {
            start,
            framing_size: current.size,
            end: start + current.size + unit_len,
        })
    }

    /// The unit is the length field plus the number of bytes it declares.
    fn locate_by_length(&self, length_size: LengthSize) -> Result<UnitBounds, InvalidStream> {
        let start = self.cursor;
        let field_size = length_size.get();
        let remaining = self.data.len() - start;
        if remaining < field_size {
            return Err(InvalidStream::TruncatedLengthField {
                offset: start,
                length_size: field_size,
                remaining,
            });
        }

        let declared = BigEndian::read_uint(&self.data[start..start + field_size], field_size);
        let available = remaining - field_size;
        if declared > available as u64 {
            return Err(InvalidStream::LengthExceedsRemaining {
                offset: start,
                declared,
                remaining: available,
            });
        }

        let unit_len = declared as usize;
        if unit_len < NAL_HEADER_SIZE {
            return Err(InvalidStream::MissingHeader { offset: start });
        }

        Ok(UnitBounds {
            start,
            framing_size: field_size,
            end: start + field_size + unit_len,
        })
    }
}

/// Yields units until the end of the buffer. The first invalid unit is yielded as an error, after
/// which the iterator is done.
impl<'a> Iterator for NaluReader<'a> {
    type Item = Result<Nalu<'a>, InvalidStream>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.faulted {
            return None;
        }

        match self.advance() {
            Ok(nalu) => Some(Ok(nalu)),
            Err(ReadError::EndOfStream) => None,
            Err(ReadError::InvalidStream(reason)) => {
                self.faulted = true;
                Some(Err(reason))
            }
        }
    }
}

impl FusedIterator for NaluReader<'_> {}

#[cfg(test)]
mod tests {
    use nalu_common::FramingError;

    use super::*;

    fn length_prefixed(size: u8) -> Result<Framing, FramingError> {
        Framing::length_prefixed(size)
    }

    fn assert_unit(
        nalu: &Nalu,
        payload_size: usize,
        header_size: usize,
        ref_idc: u8,
        unit_type: u8,
    ) {
        assert_eq!(nalu.payload_size(), payload_size, "payload_size");
        assert_eq!(nalu.header_size(), header_size, "header_size");
        assert_eq!(nalu.ref_idc(), ref_idc, "ref_idc");
        assert_eq!(nalu.unit_type(), unit_type, "unit_type");
        assert_eq!(nalu.header_size() + nalu.payload_size(), nalu.data().len());
    }

    #[test]
    fn test_start_code_search() -> Result<(), ReadError> {
        let data = [
            0x01, 0x00, 0x00, 0x04, 0x23, 0x56, //
            0x00, 0x00, 0x01, 0x12, 0x34, 0x56, 0x78, //
            0x00, 0x00, 0x00, 0x01, 0x67, 0xbb, 0xcc, 0xdd,
        ];

        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        assert_eq!(reader.framing(), Framing::AnnexB);

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 6);
        assert_eq!(nalu.framing_size(), 3);
        assert_eq!(nalu.header_byte_offset(), 9);
        assert!(std::ptr::eq(nalu.data().as_ptr(), data[6..].as_ptr()));
        assert_unit(&nalu, 3, 4, 0, 0x12);
        assert_eq!(nalu.payload(), &[0x34, 0x56, 0x78]);
        assert_eq!(reader.position(), 13);

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 13);
        assert_eq!(nalu.framing_size(), 4);
        assert_eq!(nalu.header_byte_offset(), 17);
        assert_unit(&nalu, 3, 5, 3, 7);
        assert_eq!(nalu.payload(), &[0xbb, 0xcc, 0xdd]);
        assert!(reader.is_exhausted());

        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_one_byte_nalu_length() -> Result<(), Box<dyn std::error::Error>> {
        let data = [
            0x05, 0x08, 0x01, 0x02, 0x03, 0x04, //
            0x06, 0x67, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        ];

        let mut reader = NaluReader::new(&data, length_prefixed(1)?);

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 0);
        assert_unit(&nalu, 4, 2, 0, 8);

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 6);
        assert_unit(&nalu, 5, 2, 3, 7);
        assert_eq!(nalu.payload(), &[0x0a, 0x0b, 0x0c, 0x0d, 0x0e]);

        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_three_byte_nalu_length() -> Result<(), Box<dyn std::error::Error>> {
        let data = [
            0x00, 0x00, 0x07, 0x08, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, //
            0x00, 0x00, 0x03, 0x67, 0x0a, 0x0b,
        ];

        let mut reader = NaluReader::new(&data, length_prefixed(3)?);
        assert_eq!(reader.framing().to_string(), "len3");

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 0);
        assert_eq!(nalu.framing_size(), 3);
        assert_eq!(nalu.header_byte_offset(), 3);
        assert_unit(&nalu, 6, 4, 0, 8);

        let nalu = reader.advance()?;
        assert_eq!(nalu.offset(), 10);
        assert_unit(&nalu, 2, 4, 3, 7);

        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_two_and_four_byte_nalu_length() -> Result<(), Box<dyn std::error::Error>> {
        let data = [0x00, 0x03, 0x65, 0x88, 0x84];
        let mut reader = NaluReader::new(&data, length_prefixed(2)?);
        assert_unit(&reader.advance()?, 2, 3, 3, 5);
        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));

        let data = [0x00, 0x00, 0x00, 0x02, 0x68, 0xce, 0x00, 0x00, 0x00, 0x01, 0x09];
        let mut reader = NaluReader::new(&data, Framing::from_selector(4)?);
        assert_unit(&reader.advance()?, 1, 5, 3, 8);
        assert_unit(&reader.advance()?, 0, 5, 0, 9);
        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_error_for_not_enough_for_nalu_length() -> Result<(), FramingError> {
        let data = [0x00];

        let mut reader = NaluReader::new(&data, length_prefixed(3)?);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::TruncatedLengthField {
                offset: 0,
                length_size: 3,
                remaining: 1,
            }))
        );
        Ok(())
    }

    #[test]
    fn test_error_for_nalu_length_exceeds_remaining_data() -> Result<(), FramingError> {
        let data = [0xff, 0x08, 0x00];
        let mut reader = NaluReader::new(&data, length_prefixed(1)?);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::LengthExceedsRemaining {
                offset: 0,
                declared: 255,
                remaining: 2,
            }))
        );

        // Off by one.
        let data = [0x04, 0x08, 0x00, 0x00];
        let mut reader = NaluReader::new(&data, length_prefixed(1)?);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::LengthExceedsRemaining {
                offset: 0,
                declared: 4,
                remaining: 3,
            }))
        );
        Ok(())
    }

    #[test]
    fn test_declared_length_exactly_remaining() -> Result<(), Box<dyn std::error::Error>> {
        let data = [0x03, 0x08, 0x00, 0x00];
        let mut reader = NaluReader::new(&data, length_prefixed(1)?);
        assert_unit(&reader.advance()?, 2, 2, 0, 8);
        assert!(reader.is_exhausted());
        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_huge_declared_length() -> Result<(), FramingError> {
        let data = [0xff, 0xff, 0xff, 0xff, 0x67];
        let mut reader = NaluReader::new(&data, length_prefixed(4)?);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::LengthExceedsRemaining {
                offset: 0,
                declared: 0xffff_ffff,
                remaining: 1,
            }))
        );
        Ok(())
    }

    #[test]
    fn test_zero_declared_length() -> Result<(), FramingError> {
        let data = [0x02, 0x67, 0x42, 0x00, 0x01, 0x68];
        let mut reader = NaluReader::new(&data, length_prefixed(1)?);
        assert!(reader.advance().is_ok());
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::MissingHeader {
                offset: 3
            }))
        );
        assert_eq!(reader.position(), 3);
        Ok(())
    }

    #[test]
    fn test_error_for_forbidden_bit_set() -> Result<(), FramingError> {
        let data = [0x03, 0x80, 0x00, 0x00];

        let mut reader = NaluReader::new(&data, length_prefixed(1)?);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::ForbiddenZeroBit {
                offset: 0
            }))
        );
        assert_eq!(reader.position(), 0);
        Ok(())
    }

    #[test]
    fn test_forbidden_bit_in_annex_b_keeps_position_at_unit() -> Result<(), ReadError> {
        let data = [
            0x00, 0x00, 0x01, 0x67, 0x42, //
            0x00, 0x00, 0x01, 0xe5, 0x11, 0x22,
        ];

        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        reader.advance()?;
        assert_eq!(reader.position(), 5);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::ForbiddenZeroBit {
                offset: 5
            }))
        );
        assert_eq!(reader.position(), 5);
        Ok(())
    }

    #[test]
    fn test_forbidden_bit_any_framing() -> Result<(), FramingError> {
        for header in [0x80u8, 0x9f, 0xe7, 0xff] {
            let annex_b = [0x00, 0x00, 0x00, 0x01, header, 0x00];
            assert!(matches!(
                NaluReader::new(&annex_b, Framing::AnnexB).advance(),
                Err(ReadError::InvalidStream(InvalidStream::ForbiddenZeroBit { .. }))
            ));

            for size in 1..=4u8 {
                let mut data = vec![0x00; usize::from(size) - 1];
                data.push(0x01);
                data.push(header);
                assert!(matches!(
                    NaluReader::new(&data, length_prefixed(size)?).advance(),
                    Err(ReadError::InvalidStream(InvalidStream::ForbiddenZeroBit { .. }))
                ));
            }
        }
        Ok(())
    }

    #[test]
    fn test_annex_b_without_start_code() {
        let data = [0x01, 0x02, 0x03, 0x00, 0x00, 0x02];
        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::StartCodeNotFound))
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_annex_b_start_code_without_header() {
        let data = [0x00, 0x00, 0x00, 0x01];
        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::MissingHeader {
                offset: 0
            }))
        );
    }

    #[test]
    fn test_annex_b_trailing_start_code() -> Result<(), ReadError> {
        let data = [0x00, 0x00, 0x01, 0x09, 0xf0, 0x00, 0x00, 0x01];
        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        let nalu = reader.advance()?;
        assert_eq!(nalu.data(), &[0x00, 0x00, 0x01, 0x09, 0xf0]);
        assert_eq!(
            reader.advance(),
            Err(ReadError::InvalidStream(InvalidStream::MissingHeader {
                offset: 5
            }))
        );
        Ok(())
    }

    #[test]
    fn test_annex_b_mixed_start_codes() -> Result<(), ReadError> {
        let data = [
            0x00, 0x00, 0x00, 0x01, 0x67, 0xaa, //
            0x00, 0x00, 0x01, 0x68, 0xbb, //
            0x00, 0x00, 0x00, 0x01, 0x65, 0xcc, 0xdd,
        ];

        let reader = NaluReader::new(&data, Framing::AnnexB);
        let units = reader.collect::<Result<Vec<_>, _>>()?;

        let summary: Vec<_> = units
            .iter()
            .map(|nalu| (nalu.offset(), nalu.header_size(), nalu.payload_size(), nalu.unit_type()))
            .collect();
        assert_eq!(summary, vec![(0, 5, 1, 7), (6, 4, 1, 8), (11, 5, 2, 5)]);
        Ok(())
    }

    #[test]
    fn test_annex_b_payload_keeps_emulation_prevention() -> Result<(), ReadError> {
        let data = [0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x00, 0x03, 0x01, 0xaa];
        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        let nalu = reader.advance()?;
        assert_eq!(nalu.payload(), &[0x42, 0x00, 0x00, 0x03, 0x01, 0xaa]);
        assert_eq!(reader.advance(), Err(ReadError::EndOfStream));
        Ok(())
    }

    #[test]
    fn test_empty_buffer_is_end_of_stream() -> Result<(), FramingError> {
        assert_eq!(
            NaluReader::new(&[], Framing::AnnexB).advance(),
            Err(ReadError::EndOfStream)
        );
        assert_eq!(
            NaluReader::new(&[], length_prefixed(4)?).advance(),
            Err(ReadError::EndOfStream)
        );
        Ok(())
    }

    #[test]
    fn test_starts_with_start_code() -> Result<(), ReadError> {
        let data = [0x00, 0x00, 0x01, 0x09, 0x00, 0x00, 0x00, 0x01, 0x67];
        let mut reader = NaluReader::new(&data, Framing::AnnexB);
        assert!(reader.starts_with_start_code());
        reader.advance()?;
        assert!(reader.starts_with_start_code());
        reader.advance()?;
        assert!(!reader.starts_with_start_code());

        let leader = [0x01, 0x00, 0x00, 0x01, 0x09];
        assert!(!NaluReader::new(&leader, Framing::AnnexB).starts_with_start_code());
        Ok(())
    }

    #[test]
    fn test_iterator_stops_after_first_error() -> Result<(), FramingError> {
        let data = [0x01, 0x09, 0x01, 0x80, 0x01, 0x09];
        let mut reader = NaluReader::new(&data, length_prefixed(1)?);

        assert!(matches!(reader.next(), Some(Ok(_))));
        assert_eq!(
            reader.next(),
            Some(Err(InvalidStream::ForbiddenZeroBit { offset: 2 }))
        );
        assert_eq!(reader.next(), None);
        assert_eq!(reader.next(), None);
        Ok(())
    }

    #[test]
    fn test_descriptors_outlive_reader() -> Result<(), ReadError> {
        let data = [0x00, 0x00, 0x01, 0x67, 0x01, 0x00, 0x00, 0x01, 0x68, 0x02];

        let (first, second) = {
            let mut reader = NaluReader::new(&data, Framing::AnnexB);
            (reader.advance()?, reader.advance()?)
        };

        assert_eq!(first.data(), &data[..5]);
        assert_eq!(second.data(), &data[5..]);
        Ok(())
    }
}
