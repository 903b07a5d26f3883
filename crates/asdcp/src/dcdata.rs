//! D-Cinema auxiliary data wrapping (generic byte-stream essence, one
//! blob per edit unit), including the Dolby Atmos flavor.

use crate::{track_number_of, Options};
use asdcp_core::{Error, FrameBuffer, Rational, Result, Ul};
use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
use asdcp_mxf::writer::{MxfFileWriter, Profile, WriteConfig};
use asdcp_mxf::{
    labels, DataEssenceDescriptor as DataDescriptorSet, EssenceDescriptor, EssenceTrackInfo,
    MxfFileReader, WriterInfo,
};
use std::path::Path;

/// Parameters of an auxiliary data track.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct DCDataDescriptor {
    pub edit_rate: Rational,
    pub container_duration: u32,
    pub data_essence_coding: Ul,
}

impl DCDataDescriptor {
    pub fn new(edit_rate: Rational) -> Self {
        DCDataDescriptor {
            edit_rate,
            container_duration: 0,
            data_essence_coding: labels::DCDATA_CODING_GENERIC,
        }
    }

    /// An Atmos bitstream track.
    pub fn atmos(edit_rate: Rational) -> Self {
        DCDataDescriptor {
            edit_rate,
            container_duration: 0,
            data_essence_coding: labels::DCDATA_CODING_ATMOS,
        }
    }
}

fn build_track_info(descriptor: &DCDataDescriptor) -> Result<EssenceTrackInfo> {
    let mxf_descriptor = EssenceDescriptor::Data(DataDescriptorSet {
        file: asdcp_mxf::FileDescriptor {
            instance_uid: asdcp_crypto::make_uuid()?,
            linked_track_id: 0,
            sample_rate: descriptor.edit_rate,
            container_duration: 0,
            essence_container: labels::ESSENCE_CONTAINER_DCDATA,
            codec: None,
            sub_descriptors: Vec::new(),
        },
        data_essence_coding: descriptor.data_essence_coding,
    });

    Ok(EssenceTrackInfo {
        descriptor: mxf_descriptor,
        sub_descriptors: Vec::new(),
        data_definition: labels::DATA_DEF_DATA,
        edit_rate: descriptor.edit_rate,
        track_number: track_number_of(&labels::ESSENCE_ELEMENT_DCDATA),
    })
}

/// Writes one auxiliary data track into an OP-Atom file.
#[must_use]
pub struct MxfWriter {
    inner: MxfFileWriter,
}

impl MxfWriter {
    pub fn open_write(
        path: &Path,
        mut info: WriterInfo,
        descriptor: &DCDataDescriptor,
        options: &Options,
    ) -> Result<Self> {
        info.label_set = options.label_set;
        let edit_rate = options.edit_rate.unwrap_or(descriptor.edit_rate);
        let mut descriptor = *descriptor;
        descriptor.edit_rate = edit_rate;

        let essence = build_track_info(&descriptor)?;
        let config = WriteConfig {
            profile: Profile::OpAtom,
            essence_element: labels::ESSENCE_ELEMENT_DCDATA,
            essence_container: labels::ESSENCE_CONTAINER_DCDATA,
            edit_rate,
            header_reserve: options.header_reserve,
            cbr: false,
        };
        Ok(MxfWriter {
            inner: MxfFileWriter::open_write(path, info, essence, config)?,
        })
    }

    pub fn write_frame(
        &mut self,
        frame: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.inner.write_frame(frame, encryptor, hmac)
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    pub fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()
    }
}

/// Reads one auxiliary data track.
#[must_use]
pub struct MxfReader {
    inner: MxfFileReader,
}

impl MxfReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut inner = MxfFileReader::open_read(path)?;
        match inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::Data(_) => {}
            other => {
                return Err(Error::Format(format!(
                    "expected a data essence descriptor, found {other:?}"
                )))
            }
        }
        inner.set_essence_element(labels::ESSENCE_ELEMENT_DCDATA);
        Ok(MxfReader { inner })
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    pub fn writer_info(&self) -> WriterInfo {
        self.inner.writer_info()
    }

    pub fn dcdata_descriptor(&self) -> Result<DCDataDescriptor> {
        let descriptor = match self.inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::Data(d) => d,
            _ => return Err(Error::Format("missing data essence descriptor".into())),
        };
        Ok(DCDataDescriptor {
            edit_rate: self.inner.header_metadata().edit_rate()?,
            container_duration: descriptor.file.container_duration as u32,
            data_essence_coding: descriptor.data_essence_coding,
        })
    }

    pub fn read_frame(
        &mut self,
        n: u64,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.inner.read_frame(n, frame, decryptor, hmac)
    }
}
