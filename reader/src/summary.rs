use nalu_common::NalUnitType;

use crate::errors::InvalidStream;
use crate::nalu::Nalu;
use crate::reader::NaluReader;

/// Unit counts gathered by walking a whole stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    unit_count: usize,
    payload_bytes: usize,
    framing_bytes: usize,
    type_counts: [usize; 32],
}

impl StreamSummary {
    /// Reads every unit from `reader`, stopping at the first invalid one.
    pub fn from_reader(reader: NaluReader<'_>) -> Result<Self, InvalidStream> {
        let mut summary = Self::default();
        for nalu in reader {
            summary.record(&nalu?);
        }
        Ok(summary)
    }

    pub fn record(&mut self, nalu: &Nalu) {
        self.unit_count += 1;
        self.payload_bytes += nalu.payload_size();
        self.framing_bytes += nalu.header_size();
        self.type_counts[usize::from(nalu.unit_type())] += 1;
    }

    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    pub fn payload_bytes(&self) -> usize {
        self.payload_bytes
    }

    /// Start codes or length fields, plus header bytes.
    pub fn framing_bytes(&self) -> usize {
        self.framing_bytes
    }

    pub fn count_of(&self, unit_type: u8) -> usize {
        self.type_counts
            .get(usize::from(unit_type))
            .copied()
            .unwrap_or(0)
    }

    /// Unit types seen at least once, in ascending `nal_unit_type` order.
    pub fn type_counts(&self) -> impl Iterator<Item = (NalUnitType, usize)> + '_ {
        (0u8..)
            .zip(self.type_counts.iter())
            .filter(|(_, count)| **count > 0)
            .map(|(id, &count)| (NalUnitType::from_nal_unit_type(id), count))
    }
}
