//! D-Cinema timed-text wrapping.
//!
//! A timed-text track carries exactly one timed-text document (the XML
//! subtitle body) followed by any number of ancillary resources (fonts,
//! subpicture PNGs). The document must be written first; writing an
//! ancillary resource before it, or a second document, is a `State`
//! error.

use crate::{track_number_of, Options};
use asdcp_core::{Error, FrameBuffer, Rational, Result, Uuid};
use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
use asdcp_mxf::writer::{MxfFileWriter, Profile, WriteConfig};
use asdcp_mxf::{
    labels, EssenceDescriptor, EssenceTrackInfo, MxfFileReader, SubDescriptor,
    TimedTextEssenceDescriptor, TimedTextResourceSubDescriptor, WriterInfo,
};
use std::path::Path;

pub use asdcp_mxf::descriptor::TimedTextEssenceDescriptor as EssenceDescriptorSet;

/// One ancillary resource declared by the timed-text document.
#[derive(Clone, Debug)]
#[must_use]
pub struct TimedTextResource {
    pub asset_id: Uuid,
    pub mime_media_type: String,
}

/// Parameters of a timed-text track.
#[derive(Clone, Debug)]
#[must_use]
pub struct TimedTextDescriptor {
    pub edit_rate: Rational,
    pub container_duration: u32,
    pub namespace_name: String,
    pub encoding_name: String,
    pub resource_list: Vec<TimedTextResource>,
}

impl Default for TimedTextDescriptor {
    fn default() -> Self {
        TimedTextDescriptor {
            edit_rate: asdcp_core::rational::EDIT_RATE_24,
            container_duration: 0,
            namespace_name: String::new(),
            encoding_name: "UTF-8".to_string(),
            resource_list: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TtState {
    NoEssence,
    DocumentWritten,
}

fn build_track_info(descriptor: &TimedTextDescriptor) -> Result<EssenceTrackInfo> {
    let mut sub_descriptors = Vec::with_capacity(descriptor.resource_list.len());
    for (i, resource) in descriptor.resource_list.iter().enumerate() {
        sub_descriptors.push(SubDescriptor::TimedTextResource(
            TimedTextResourceSubDescriptor {
                instance_uid: asdcp_crypto::make_uuid()?,
                ancillary_resource_id: resource.asset_id,
                mime_media_type: resource.mime_media_type.clone(),
                essence_stream_id: i as u32 + 1,
            },
        ));
    }

    let mxf_descriptor = EssenceDescriptor::TimedText(TimedTextEssenceDescriptor {
        file: asdcp_mxf::FileDescriptor {
            instance_uid: asdcp_crypto::make_uuid()?,
            linked_track_id: 0,
            sample_rate: descriptor.edit_rate,
            container_duration: 0,
            essence_container: labels::ESSENCE_CONTAINER_TIMED_TEXT,
            codec: None,
            sub_descriptors: Vec::new(),
        },
        resource_id: asdcp_crypto::make_uuid()?,
        namespace_uri: descriptor.namespace_name.clone(),
        ucs_encoding: descriptor.encoding_name.clone(),
    });

    Ok(EssenceTrackInfo {
        descriptor: mxf_descriptor,
        sub_descriptors,
        data_definition: labels::DATA_DEF_DATA,
        edit_rate: descriptor.edit_rate,
        track_number: track_number_of(&labels::ESSENCE_ELEMENT_TIMED_TEXT),
    })
}

/// Writes one timed-text track into an OP-Atom file.
#[must_use]
pub struct MxfWriter {
    inner: MxfFileWriter,
    state: TtState,
}

impl MxfWriter {
    /// An explicit edit rate is required: timed text has no intrinsic
    /// rate to parse.
    pub fn open_write(
        path: &Path,
        mut info: WriterInfo,
        descriptor: &TimedTextDescriptor,
        options: &Options,
    ) -> Result<Self> {
        info.label_set = options.label_set;
        let edit_rate = options
            .edit_rate
            .ok_or(Error::Param("timed text requires an explicit edit rate"))?;
        let mut descriptor = descriptor.clone();
        descriptor.edit_rate = edit_rate;

        let essence = build_track_info(&descriptor)?;
        let config = WriteConfig {
            profile: Profile::OpAtom,
            essence_element: labels::ESSENCE_ELEMENT_TIMED_TEXT,
            essence_container: labels::ESSENCE_CONTAINER_TIMED_TEXT,
            edit_rate,
            header_reserve: options.header_reserve,
            cbr: false,
        };
        Ok(MxfWriter {
            inner: MxfFileWriter::open_write(path, info, essence, config)?,
            state: TtState::NoEssence,
        })
    }

    /// Write the timed-text document. Must be the first resource written,
    /// exactly once.
    pub fn write_timed_text_resource(
        &mut self,
        document: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        if self.state != TtState::NoEssence {
            return Err(Error::State("timed-text document already written"));
        }
        self.inner.write_frame(document, encryptor, hmac)?;
        self.state = TtState::DocumentWritten;
        Ok(())
    }

    /// Write one ancillary resource. `State` before the document.
    pub fn write_ancillary_resource(
        &mut self,
        resource: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        if self.state != TtState::DocumentWritten {
            return Err(Error::State(
                "ancillary resource before the timed-text document",
            ));
        }
        self.inner.write_frame(resource, encryptor, hmac)
    }

    pub fn finalize(&mut self) -> Result<()> {
        if self.state != TtState::DocumentWritten {
            return Err(Error::State("finalize before the timed-text document"));
        }
        self.inner.finalize()
    }
}

/// Reads one timed-text track.
#[must_use]
pub struct MxfReader {
    inner: MxfFileReader,
}

impl MxfReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut inner = MxfFileReader::open_read(path)?;
        match inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::TimedText(_) => {}
            other => {
                return Err(Error::Format(format!(
                    "expected a timed-text descriptor, found {other:?}"
                )))
            }
        }
        inner.set_essence_element(labels::ESSENCE_ELEMENT_TIMED_TEXT);
        Ok(MxfReader { inner })
    }

    pub fn writer_info(&self) -> WriterInfo {
        self.inner.writer_info()
    }

    /// The track parameters and resource list recovered from the header.
    pub fn timed_text_descriptor(&self) -> Result<TimedTextDescriptor> {
        let descriptor = match self.inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::TimedText(d) => d,
            _ => return Err(Error::Format("missing timed-text descriptor".into())),
        };

        let resource_list = self
            .inner
            .header_metadata()
            .sub_descriptors()
            .filter_map(|sub| match sub {
                SubDescriptor::TimedTextResource(r) => Some(TimedTextResource {
                    asset_id: r.ancillary_resource_id,
                    mime_media_type: r.mime_media_type.clone(),
                }),
                _ => None,
            })
            .collect();

        Ok(TimedTextDescriptor {
            edit_rate: self.inner.header_metadata().edit_rate()?,
            container_duration: descriptor.file.container_duration as u32,
            namespace_name: descriptor.namespace_uri.clone(),
            encoding_name: descriptor.ucs_encoding.clone(),
            resource_list,
        })
    }

    /// Read the timed-text document (resource 0).
    pub fn read_timed_text_resource(
        &mut self,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.inner.read_frame(0, frame, decryptor, hmac)
    }

    /// Read ancillary resource `n` (1-based, following the document).
    pub fn read_ancillary_resource(
        &mut self,
        n: u64,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        if n == 0 {
            return Err(Error::Param("ancillary resources are numbered from 1"));
        }
        self.inner.read_frame(n, frame, decryptor, hmac)
    }
}
