//! AS-02 (IMF, OP-1a) variants of the essence facades. The body lives in
//! its own partition and the index rides the header partition's reserve
//! when it fits.

pub mod jp2k {
    //! AS-02 JPEG 2000 picture wrapping.

    use crate::Options;
    use asdcp_core::{FrameBuffer, Result};
    use asdcp_crypto::{CbcEncryptor, HmacContext};
    use asdcp_essence::jp2k::PictureDescriptor;
    use asdcp_mxf::writer::{MxfFileWriter, Profile};
    use asdcp_mxf::WriterInfo;
    use std::path::Path;

    // reading is geometry-agnostic
    pub use crate::jp2k::MxfReader;

    /// Writes one JP2K picture track into an AS-02 file.
    #[must_use]
    pub struct MxfWriter {
        inner: MxfFileWriter,
    }

    impl MxfWriter {
        pub fn open_write(
            path: &Path,
            info: WriterInfo,
            descriptor: &PictureDescriptor,
            options: &Options,
        ) -> Result<Self> {
            Ok(MxfWriter {
                inner: crate::jp2k::open_write_impl(
                    Profile::As02,
                    path,
                    info,
                    descriptor,
                    options,
                )?,
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
}

pub mod pcm {
    //! AS-02 PCM audio wrapping.

    use crate::Options;
    use asdcp_core::{Error, FrameBuffer, Result};
    use asdcp_crypto::{CbcEncryptor, HmacContext};
    use asdcp_essence::wav::{self, AudioDescriptor};
    use asdcp_mxf::writer::{MxfFileWriter, Profile};
    use asdcp_mxf::WriterInfo;
    use std::path::Path;

    pub use crate::pcm::MxfReader;

    /// Writes one PCM audio track into an AS-02 file.
    #[must_use]
    pub struct MxfWriter {
        inner: MxfFileWriter,
        frame_size: u32,
    }

    impl MxfWriter {
        pub fn open_write(
            path: &Path,
            info: WriterInfo,
            descriptor: &AudioDescriptor,
            options: &Options,
        ) -> Result<Self> {
            let edit_rate = options.edit_rate.unwrap_or(descriptor.edit_rate);
            let mut sized = *descriptor;
            sized.edit_rate = edit_rate;
            let frame_size = wav::calc_frame_buffer_size(&sized);
            if frame_size == 0 {
                return Err(Error::Param("audio frame size of zero"));
            }
            Ok(MxfWriter {
                inner: crate::pcm::open_write_impl(
                    Profile::As02,
                    path,
                    info,
                    descriptor,
                    options,
                )?,
                frame_size,
            })
        }

        pub fn write_frame(
            &mut self,
            frame: &FrameBuffer,
            encryptor: Option<&mut CbcEncryptor>,
            hmac: Option<&mut HmacContext>,
        ) -> Result<()> {
            if frame.len() != self.frame_size as usize {
                return Err(Error::Param("PCM frame length does not match edit rate"));
            }
            self.inner.write_frame(frame, encryptor, hmac)
        }

        pub fn duration(&self) -> u64 {
            self.inner.duration()
        }

        pub fn finalize(&mut self) -> Result<()> {
            self.inner.finalize()
        }
    }
}

pub mod jxs {
    //! AS-02 JPEG XS picture wrapping.

    use crate::{track_number_of, Options};
    use asdcp_core::{Error, FrameBuffer, Result};
    use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
    use asdcp_essence::jxs::PictureDescriptor;
    use asdcp_mxf::writer::{MxfFileWriter, Profile, WriteConfig};
    use asdcp_mxf::{
        labels, EssenceDescriptor, EssenceTrackInfo, JxsSubDescriptor, MxfFileReader,
        PictureEssenceDescriptor, PictureKind, SubDescriptor, WriterInfo,
    };
    use std::path::Path;

    pub use asdcp_essence::jxs::{CodestreamParser, SequenceParser};

    fn build_track_info(
        descriptor: &PictureDescriptor,
        edit_rate: asdcp_core::Rational,
    ) -> Result<EssenceTrackInfo> {
        let sub = JxsSubDescriptor {
            instance_uid: asdcp_crypto::make_uuid()?,
            ppih: descriptor.ppih,
            plev: descriptor.plev,
            wf: descriptor.wf,
            hf: descriptor.hf,
            cw: descriptor.cw,
            hsl: descriptor.hsl,
            nc: descriptor.nc,
            component_table: descriptor.component_table.clone(),
        };

        let mxf_descriptor = EssenceDescriptor::Picture(PictureEssenceDescriptor {
            file: asdcp_mxf::FileDescriptor {
                instance_uid: asdcp_crypto::make_uuid()?,
                linked_track_id: 0,
                sample_rate: edit_rate,
                container_duration: 0,
                essence_container: labels::ESSENCE_CONTAINER_JXS,
                codec: None,
                sub_descriptors: Vec::new(),
            },
            kind: PictureKind::Cdci,
            frame_layout: 0,
            stored_width: descriptor.stored_width,
            stored_height: descriptor.stored_height,
            aspect_ratio: descriptor.aspect_ratio,
            picture_essence_coding: labels::JPEGXS_ESSENCE_COMPRESSION,
            component_depth: descriptor
                .component_table
                .get(4)
                .map(|&bc| u32::from(bc)),
            horizontal_subsampling: None,
            vertical_subsampling: None,
        });

        Ok(EssenceTrackInfo {
            descriptor: mxf_descriptor,
            sub_descriptors: vec![SubDescriptor::Jxs(sub)],
            data_definition: labels::DATA_DEF_PICTURE,
            edit_rate,
            track_number: track_number_of(&labels::ESSENCE_ELEMENT_JXS),
        })
    }

    /// Writes one JPEG XS picture track into an AS-02 file.
    #[must_use]
    pub struct MxfWriter {
        inner: MxfFileWriter,
    }

    impl MxfWriter {
        pub fn open_write(
            path: &Path,
            mut info: WriterInfo,
            descriptor: &PictureDescriptor,
            options: &Options,
        ) -> Result<Self> {
            info.label_set = options.label_set;
            let edit_rate = options.edit_rate.unwrap_or(descriptor.edit_rate);
            let essence = build_track_info(descriptor, edit_rate)?;
            let config = WriteConfig {
                profile: Profile::As02,
                essence_element: labels::ESSENCE_ELEMENT_JXS,
                essence_container: labels::ESSENCE_CONTAINER_JXS,
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

    /// Reads one JPEG XS picture track.
    #[must_use]
    pub struct MxfReader {
        inner: MxfFileReader,
    }

    impl MxfReader {
        pub fn open_read(path: &Path) -> Result<Self> {
            let mut inner = MxfFileReader::open_read(path)?;
            match inner.header_metadata().primary_descriptor()? {
                EssenceDescriptor::Picture(_) => {}
                other => {
                    return Err(Error::Format(format!(
                        "expected a picture descriptor, found {other:?}"
                    )))
                }
            }
            inner.set_essence_element(labels::ESSENCE_ELEMENT_JXS);
            Ok(MxfReader { inner })
        }

        pub fn duration(&self) -> u64 {
            self.inner.duration()
        }

        pub fn writer_info(&self) -> WriterInfo {
            self.inner.writer_info()
        }

        /// The picture parameters recovered from the header metadata.
        pub fn picture_descriptor(&self) -> Result<PictureDescriptor> {
            let descriptor = match self.inner.header_metadata().primary_descriptor()? {
                EssenceDescriptor::Picture(d) => d,
                _ => return Err(Error::Format("missing picture descriptor".into())),
            };

            let mut out = PictureDescriptor {
                edit_rate: self.inner.header_metadata().edit_rate()?,
                sample_rate: descriptor.file.sample_rate,
                container_duration: descriptor.file.container_duration as u32,
                stored_width: descriptor.stored_width,
                stored_height: descriptor.stored_height,
                aspect_ratio: descriptor.aspect_ratio,
                ..PictureDescriptor::default()
            };

            for sub in self.inner.header_metadata().sub_descriptors() {
                if let SubDescriptor::Jxs(jxs) = sub {
                    out.ppih = jxs.ppih;
                    out.plev = jxs.plev;
                    out.wf = jxs.wf;
                    out.hf = jxs.hf;
                    out.cw = jxs.cw;
                    out.hsl = jxs.hsl;
                    out.nc = jxs.nc;
                    out.component_table = jxs.component_table.clone();
                }
            }
            Ok(out)
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
}
