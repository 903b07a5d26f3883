//! Prosumer HDR (PHDR) wrapping: a JP2K picture track where every edit
//! unit pairs the picture triplet with a metadata triplet, and a master
//! metadata document trails the essence.

use crate::jp2k::open_write_impl;
use crate::Options;
use asdcp_core::{Error, FrameBuffer, Result};
use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
use asdcp_essence::jp2k::PictureDescriptor;
use asdcp_mxf::writer::{MxfFileWriter, Profile};
use asdcp_mxf::{labels, MxfFileReader, WriterInfo};
use std::path::Path;

/// Writes a PHDR picture track into an OP-Atom file.
#[must_use]
pub struct PhdrWriter {
    inner: MxfFileWriter,
}

impl PhdrWriter {
    pub fn open_write(
        path: &Path,
        info: WriterInfo,
        descriptor: &PictureDescriptor,
        options: &Options,
    ) -> Result<Self> {
        Ok(PhdrWriter {
            inner: open_write_impl(Profile::OpAtom, path, info, descriptor, options)?,
        })
    }

    /// Write one edit unit: the picture triplet (optionally encrypted)
    /// followed by its metadata triplet, which stays in the clear.
    pub fn write_frame(
        &mut self,
        picture: &FrameBuffer,
        metadata: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.inner.write_frame(picture, encryptor, hmac)?;
        self.inner.write_companion_frame(
            metadata,
            None,
            None,
            Some(labels::ESSENCE_ELEMENT_PHDR_METADATA),
        )
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    /// Append the master metadata document and finalize the file.
    pub fn finalize(&mut self, master_metadata: &str) -> Result<()> {
        if !master_metadata.is_empty() {
            let mut document = FrameBuffer::with_capacity(master_metadata.len());
            document.set_data(master_metadata.as_bytes())?;
            self.inner.write_companion_frame(
                &document,
                None,
                None,
                Some(labels::ESSENCE_ELEMENT_PHDR_MASTER),
            )?;
        }
        self.inner.finalize()
    }
}

/// Reads a PHDR picture track.
#[must_use]
pub struct PhdrReader {
    inner: MxfFileReader,
}

impl PhdrReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut inner = MxfFileReader::open_read(path)?;
        inner.set_essence_element(labels::ESSENCE_ELEMENT_JP2K);
        inner.add_essence_element(labels::ESSENCE_ELEMENT_PHDR_METADATA);
        inner.add_essence_element(labels::ESSENCE_ELEMENT_PHDR_MASTER);
        Ok(PhdrReader { inner })
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    pub fn writer_info(&self) -> WriterInfo {
        self.inner.writer_info()
    }

    /// Read the picture triplet of edit unit `n`.
    pub fn read_frame(
        &mut self,
        n: u64,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.inner.read_frame(n, frame, decryptor, hmac)
    }

    /// Read the metadata triplet of edit unit `n`.
    pub fn read_metadata(&mut self, n: u64, frame: &mut FrameBuffer) -> Result<()> {
        self.inner.read_frame_skip(n, 1, frame, None, None)
    }

    /// Read the trailing master metadata document.
    pub fn read_master_metadata(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        let duration = self.inner.duration();
        if duration == 0 {
            return Err(Error::EndOfFile);
        }
        self.inner.read_frame_skip(duration - 1, 2, frame, None, None)
    }
}
