use std::fs::File;
use std::path::Path;

use log::debug;
use memmap::Mmap;
use nalu_common::Framing;

use crate::errors::StreamError;
use crate::reader::NaluReader;
use crate::summary::StreamSummary;

/// An elementary stream file, memory-mapped so readers can borrow from it without copying.
#[derive(Debug)]
pub struct NaluFile {
    // `None` for an empty file, which can't be mapped.
    data: Option<Mmap>,
    framing: Framing,
}

impl NaluFile {
    pub fn from_file(file: File, framing: Framing) -> Result<Self, StreamError> {
        if file.metadata()?.len() == 0 {
            return Ok(Self {
                data: None,
                framing,
            });
        }

        // SAFETY: the mapping is read-only; the file must not be truncated while it is mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!("mapped {} bytes as {framing}", mmap.len());
        Ok(Self {
            data: Some(mmap),
            framing,
        })
    }

    pub fn from_file_path<P: AsRef<Path>>(
        file_path: P,
        framing: Framing,
    ) -> Result<Self, StreamError> {
        let file = File::open(file_path)?;
        NaluFile::from_file(file, framing)
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// A fresh reader positioned at the start of the file.
    pub fn reader(&self) -> NaluReader<'_> {
        NaluReader::new(self.data(), self.framing)
    }

    pub fn summarize(&self) -> Result<StreamSummary, StreamError> {
        Ok(StreamSummary::from_reader(self.reader())?)
    }
}
