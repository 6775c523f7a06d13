use std::fmt;

/// Categories of `nal_unit_type` pulled from Table 7-1.
///
/// Only the header byte is consulted; nothing here looks at the RBSP that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NalUnitType {
    Unspecified(u8),
    CodedSliceNonIDRPicture,
    CodedSliceDataPartitionA,
    CodedSliceDataPartitionB,
    CodedSliceDataPartitionC,
    CodedSliceIDRPicture,
    SupplementalEnhancementInformation,
    SequenceParameterSet,
    PictureParameterSet,
    AccessUnitDelimiter,
    SequenceEnd,
    StreamEnd,
    FillerData,
    SequenceParameterSetExtension,
    PrefixNALUnit,
    SubsetSequenceParameterSet,
    DepthParameterSet,
    Reserved(u8),
    CodedSliceAuxiliaryCodedPictureNonPartitioning,
    CodedSliceExtension,
    CodedSliceExtensionDepthViewComponent,
}

impl NalUnitType {
    /// Only the low five bits of `nal_unit_type` are considered.
    pub fn from_nal_unit_type(nal_unit_type: u8) -> Self {
        match nal_unit_type & 0b0001_1111 {
            1 => NalUnitType::CodedSliceNonIDRPicture,
            2 => NalUnitType::CodedSliceDataPartitionA,
            3 => NalUnitType::CodedSliceDataPartitionB,
            4 => NalUnitType::CodedSliceDataPartitionC,
            5 => NalUnitType::CodedSliceIDRPicture,
            6 => NalUnitType::SupplementalEnhancementInformation,
            7 => NalUnitType::SequenceParameterSet,
            8 => NalUnitType::PictureParameterSet,
            9 => NalUnitType::AccessUnitDelimiter,
            10 => NalUnitType::SequenceEnd,
            11 => NalUnitType::StreamEnd,
            12 => NalUnitType::FillerData,
            13 => NalUnitType::SequenceParameterSetExtension,
            14 => NalUnitType::PrefixNALUnit,
            15 => NalUnitType::SubsetSequenceParameterSet,
            16 => NalUnitType::DepthParameterSet,
            19 => NalUnitType::CodedSliceAuxiliaryCodedPictureNonPartitioning,
            20 => NalUnitType::CodedSliceExtension,
            21 => NalUnitType::CodedSliceExtensionDepthViewComponent,
            id @ (17 | 18 | 22 | 23) => NalUnitType::Reserved(id),
            id => NalUnitType::Unspecified(id),
        }
    }

    pub fn nal_unit_type(&self) -> u8 {
        match self {
            NalUnitType::Unspecified(id) | NalUnitType::Reserved(id) => *id,
            NalUnitType::CodedSliceNonIDRPicture => 1,
            NalUnitType::CodedSliceDataPartitionA => 2,
            NalUnitType::CodedSliceDataPartitionB => 3,
            NalUnitType::CodedSliceDataPartitionC => 4,
            NalUnitType::CodedSliceIDRPicture => 5,
            NalUnitType::SupplementalEnhancementInformation => 6,
            NalUnitType::SequenceParameterSet => 7,
            NalUnitType::PictureParameterSet => 8,
            NalUnitType::AccessUnitDelimiter => 9,
            NalUnitType::SequenceEnd => 10,
            NalUnitType::StreamEnd => 11,
            NalUnitType::FillerData => 12,
            NalUnitType::SequenceParameterSetExtension => 13,
            NalUnitType::PrefixNALUnit => 14,
            NalUnitType::SubsetSequenceParameterSet => 15,
            NalUnitType::DepthParameterSet => 16,
            NalUnitType::CodedSliceAuxiliaryCodedPictureNonPartitioning => 19,
            NalUnitType::CodedSliceExtension => 20,
            NalUnitType::CodedSliceExtensionDepthViewComponent => 21,
        }
    }

    /// VCL NAL units per the Annex A type class.
    pub fn is_vcl(&self) -> bool {
        matches!(self.nal_unit_type(), 1..=5)
    }

    pub fn is_idr(&self) -> bool {
        matches!(self, NalUnitType::CodedSliceIDRPicture)
    }

    pub fn is_parameter_set(&self) -> bool {
        matches!(
            self,
            NalUnitType::SequenceParameterSet
                | NalUnitType::PictureParameterSet
                | NalUnitType::SequenceParameterSetExtension
                | NalUnitType::SubsetSequenceParameterSet
                | NalUnitType::DepthParameterSet
        )
    }
}

impl fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NalUnitType::Unspecified(id) => write!(f, "Unspecified({id})"),
            NalUnitType::Reserved(id) => write!(f, "Reserved({id})"),
            NalUnitType::CodedSliceNonIDRPicture => f.write_str("Slice"),
            NalUnitType::CodedSliceDataPartitionA => f.write_str("SliceDPA"),
            NalUnitType::CodedSliceDataPartitionB => f.write_str("SliceDPB"),
            NalUnitType::CodedSliceDataPartitionC => f.write_str("SliceDPC"),
            NalUnitType::CodedSliceIDRPicture => f.write_str("IDR"),
            NalUnitType::SupplementalEnhancementInformation => f.write_str("SEI"),
            NalUnitType::SequenceParameterSet => f.write_str("SPS"),
            NalUnitType::PictureParameterSet => f.write_str("PPS"),
            NalUnitType::AccessUnitDelimiter => f.write_str("AUD"),
            NalUnitType::SequenceEnd => f.write_str("EndOfSeq"),
            NalUnitType::StreamEnd => f.write_str("EndOfStream"),
            NalUnitType::FillerData => f.write_str("Filler"),
            NalUnitType::SequenceParameterSetExtension => f.write_str("SPSExt"),
            NalUnitType::PrefixNALUnit => f.write_str("Prefix"),
            NalUnitType::SubsetSequenceParameterSet => f.write_str("SubsetSPS"),
            NalUnitType::DepthParameterSet => f.write_str("DPS"),
            NalUnitType::CodedSliceAuxiliaryCodedPictureNonPartitioning => {
                f.write_str("AuxSlice")
            }
            NalUnitType::CodedSliceExtension => f.write_str("SliceExt"),
            NalUnitType::CodedSliceExtensionDepthViewComponent => f.write_str("SliceExtDepth"),
        }
    }
}
