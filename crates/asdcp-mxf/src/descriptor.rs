//! Essence descriptors and sub-descriptors.
//!
//! The descriptor family is a tagged variant over a common
//! [`FileDescriptor`] base (sample rate, container duration, essence
//! container, codec). The writer accepts the base; serialization
//! dispatches on the variant.

use crate::labels::{self, props, tags};
use crate::primer::Primer;
use crate::types::{required, SetProperties, SetWriter};
use asdcp_core::{Rational, Result, Ul, Uuid};

/// Properties shared by every essence descriptor.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct FileDescriptor {
    pub instance_uid: Uuid,
    pub linked_track_id: u32,
    pub sample_rate: Rational,
    pub container_duration: u64,
    pub essence_container: Ul,
    pub codec: Option<Ul>,
    pub sub_descriptors: Vec<Uuid>,
}

impl FileDescriptor {
    fn write_common(&self, w: &mut SetWriter<'_>) -> Result<()> {
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.u32(
            tags::LINKED_TRACK_ID,
            &props::LINKED_TRACK_ID,
            self.linked_track_id,
        )?;
        w.rational(tags::SAMPLE_RATE, &props::SAMPLE_RATE, self.sample_rate)?;
        w.u64(
            tags::CONTAINER_DURATION,
            &props::CONTAINER_DURATION,
            self.container_duration,
        )?;
        w.ul(
            tags::ESSENCE_CONTAINER_REF,
            &props::ESSENCE_CONTAINER_REF,
            &self.essence_container,
        )?;
        if let Some(codec) = &self.codec {
            w.ul(tags::CODEC, &props::CODEC, codec)?;
        }
        if !self.sub_descriptors.is_empty() {
            w.uuid_batch(tags::DYNAMIC, &props::SUB_DESCRIPTORS, &self.sub_descriptors)?;
        }
        Ok(())
    }

    fn read_common(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(FileDescriptor {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            linked_track_id: set.get_u32(primer, &props::LINKED_TRACK_ID).unwrap_or(0),
            sample_rate: required(set.get_rational(primer, &props::SAMPLE_RATE), "SampleRate")?,
            container_duration: set.get_u64(primer, &props::CONTAINER_DURATION).unwrap_or(0),
            essence_container: required(
                set.get_ul(primer, &props::ESSENCE_CONTAINER_REF),
                "EssenceContainer",
            )?,
            codec: set.get_ul(primer, &props::CODEC),
            sub_descriptors: set
                .get_uuid_batch(primer, &props::SUB_DESCRIPTORS)
                .unwrap_or_default(),
        })
    }
}

/// Which picture descriptor set the file carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PictureKind {
    Cdci,
    Rgba,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct PictureEssenceDescriptor {
    pub file: FileDescriptor,
    pub kind: PictureKind,
    /// 0 = full frame.
    pub frame_layout: u8,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    pub picture_essence_coding: Ul,
    pub component_depth: Option<u32>,
    pub horizontal_subsampling: Option<u32>,
    pub vertical_subsampling: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct WaveAudioDescriptor {
    pub file: FileDescriptor,
    pub audio_sampling_rate: Rational,
    pub locked: u8,
    pub channel_count: u32,
    pub quantization_bits: u32,
    pub block_align: u16,
    pub avg_bps: u32,
    pub sound_essence_compression: Option<Ul>,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct DataEssenceDescriptor {
    pub file: FileDescriptor,
    pub data_essence_coding: Ul,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct TimedTextEssenceDescriptor {
    pub file: FileDescriptor,
    pub resource_id: Uuid,
    pub namespace_uri: String,
    pub ucs_encoding: String,
}

/// The tagged descriptor variant stored in the header metadata.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub enum EssenceDescriptor {
    Picture(PictureEssenceDescriptor),
    WaveAudio(WaveAudioDescriptor),
    Data(DataEssenceDescriptor),
    TimedText(TimedTextEssenceDescriptor),
}

impl EssenceDescriptor {
    pub fn file(&self) -> &FileDescriptor {
        match self {
            EssenceDescriptor::Picture(d) => &d.file,
            EssenceDescriptor::WaveAudio(d) => &d.file,
            EssenceDescriptor::Data(d) => &d.file,
            EssenceDescriptor::TimedText(d) => &d.file,
        }
    }

    pub fn file_mut(&mut self) -> &mut FileDescriptor {
        match self {
            EssenceDescriptor::Picture(d) => &mut d.file,
            EssenceDescriptor::WaveAudio(d) => &mut d.file,
            EssenceDescriptor::Data(d) => &mut d.file,
            EssenceDescriptor::TimedText(d) => &mut d.file,
        }
    }

    pub fn instance_uid(&self) -> Uuid {
        self.file().instance_uid
    }

    pub fn set_key(&self) -> Ul {
        match self {
            EssenceDescriptor::Picture(d) => match d.kind {
                PictureKind::Cdci => labels::CDCI_DESCRIPTOR,
                PictureKind::Rgba => labels::RGBA_DESCRIPTOR,
            },
            EssenceDescriptor::WaveAudio(_) => labels::WAVE_AUDIO_DESCRIPTOR,
            EssenceDescriptor::Data(_) => labels::DC_DATA_DESCRIPTOR,
            EssenceDescriptor::TimedText(_) => labels::TIMED_TEXT_DESCRIPTOR,
        }
    }

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        match self {
            EssenceDescriptor::Picture(d) => {
                d.file.write_common(&mut w)?;
                w.u8(tags::FRAME_LAYOUT, &props::FRAME_LAYOUT, d.frame_layout)?;
                w.u32(tags::STORED_WIDTH, &props::STORED_WIDTH, d.stored_width)?;
                w.u32(tags::STORED_HEIGHT, &props::STORED_HEIGHT, d.stored_height)?;
                w.rational(tags::ASPECT_RATIO, &props::ASPECT_RATIO, d.aspect_ratio)?;
                w.ul(
                    tags::PICTURE_ESSENCE_CODING,
                    &props::PICTURE_ESSENCE_CODING,
                    &d.picture_essence_coding,
                )?;
                if let Some(depth) = d.component_depth {
                    w.u32(tags::COMPONENT_DEPTH, &props::COMPONENT_DEPTH, depth)?;
                }
                if let Some(h) = d.horizontal_subsampling {
                    w.u32(
                        tags::HORIZONTAL_SUBSAMPLING,
                        &props::HORIZONTAL_SUBSAMPLING,
                        h,
                    )?;
                }
                if let Some(v) = d.vertical_subsampling {
                    w.u32(tags::VERTICAL_SUBSAMPLING, &props::VERTICAL_SUBSAMPLING, v)?;
                }
            }
            EssenceDescriptor::WaveAudio(d) => {
                d.file.write_common(&mut w)?;
                w.rational(
                    tags::AUDIO_SAMPLING_RATE,
                    &props::AUDIO_SAMPLING_RATE,
                    d.audio_sampling_rate,
                )?;
                w.u8(tags::LOCKED, &props::LOCKED, d.locked)?;
                w.u32(tags::CHANNEL_COUNT, &props::CHANNEL_COUNT, d.channel_count)?;
                w.u32(
                    tags::QUANTIZATION_BITS,
                    &props::QUANTIZATION_BITS,
                    d.quantization_bits,
                )?;
                w.u16(tags::BLOCK_ALIGN, &props::BLOCK_ALIGN, d.block_align)?;
                w.u32(tags::AVG_BPS, &props::AVG_BPS, d.avg_bps)?;
                if let Some(compression) = &d.sound_essence_compression {
                    w.ul(
                        tags::SOUND_ESSENCE_COMPRESSION,
                        &props::SOUND_ESSENCE_COMPRESSION,
                        compression,
                    )?;
                }
            }
            EssenceDescriptor::Data(d) => {
                d.file.write_common(&mut w)?;
                w.ul(
                    tags::DATA_ESSENCE_CODING,
                    &props::DATA_ESSENCE_CODING,
                    &d.data_essence_coding,
                )?;
            }
            EssenceDescriptor::TimedText(d) => {
                d.file.write_common(&mut w)?;
                w.uuid(tags::DYNAMIC, &props::TT_RESOURCE_ID, &d.resource_id)?;
                w.string(tags::DYNAMIC, &props::TT_NAMESPACE_URI, &d.namespace_uri)?;
                w.string(tags::DYNAMIC, &props::TT_UCS_ENCODING, &d.ucs_encoding)?;
            }
        }
        w.finish(&self.set_key())
    }

    /// Decode a descriptor set; `None` when `key` is not a descriptor key.
    pub fn parse(key: &Ul, set: &SetProperties, primer: &Primer) -> Result<Option<Self>> {
        let descriptor = if *key == labels::CDCI_DESCRIPTOR || *key == labels::RGBA_DESCRIPTOR {
            let kind = if *key == labels::CDCI_DESCRIPTOR {
                PictureKind::Cdci
            } else {
                PictureKind::Rgba
            };
            EssenceDescriptor::Picture(PictureEssenceDescriptor {
                file: FileDescriptor::read_common(set, primer)?,
                kind,
                frame_layout: set.get_u8(primer, &props::FRAME_LAYOUT).unwrap_or(0),
                stored_width: required(
                    set.get_u32(primer, &props::STORED_WIDTH),
                    "StoredWidth",
                )?,
                stored_height: required(
                    set.get_u32(primer, &props::STORED_HEIGHT),
                    "StoredHeight",
                )?,
                aspect_ratio: required(
                    set.get_rational(primer, &props::ASPECT_RATIO),
                    "AspectRatio",
                )?,
                picture_essence_coding: required(
                    set.get_ul(primer, &props::PICTURE_ESSENCE_CODING),
                    "PictureEssenceCoding",
                )?,
                component_depth: set.get_u32(primer, &props::COMPONENT_DEPTH),
                horizontal_subsampling: set.get_u32(primer, &props::HORIZONTAL_SUBSAMPLING),
                vertical_subsampling: set.get_u32(primer, &props::VERTICAL_SUBSAMPLING),
            })
        } else if *key == labels::WAVE_AUDIO_DESCRIPTOR {
            EssenceDescriptor::WaveAudio(WaveAudioDescriptor {
                file: FileDescriptor::read_common(set, primer)?,
                audio_sampling_rate: required(
                    set.get_rational(primer, &props::AUDIO_SAMPLING_RATE),
                    "AudioSamplingRate",
                )?,
                locked: set.get_u8(primer, &props::LOCKED).unwrap_or(0),
                channel_count: required(
                    set.get_u32(primer, &props::CHANNEL_COUNT),
                    "ChannelCount",
                )?,
                quantization_bits: required(
                    set.get_u32(primer, &props::QUANTIZATION_BITS),
                    "QuantizationBits",
                )?,
                block_align: required(set.get_u16(primer, &props::BLOCK_ALIGN), "BlockAlign")?,
                avg_bps: set.get_u32(primer, &props::AVG_BPS).unwrap_or(0),
                sound_essence_compression: set
                    .get_ul(primer, &props::SOUND_ESSENCE_COMPRESSION),
            })
        } else if *key == labels::DC_DATA_DESCRIPTOR {
            EssenceDescriptor::Data(DataEssenceDescriptor {
                file: FileDescriptor::read_common(set, primer)?,
                data_essence_coding: required(
                    set.get_ul(primer, &props::DATA_ESSENCE_CODING),
                    "DataEssenceCoding",
                )?,
            })
        } else if *key == labels::TIMED_TEXT_DESCRIPTOR {
            EssenceDescriptor::TimedText(TimedTextEssenceDescriptor {
                file: FileDescriptor::read_common(set, primer)?,
                resource_id: required(
                    set.get_uuid(primer, &props::TT_RESOURCE_ID),
                    "ResourceID",
                )?,
                namespace_uri: set
                    .get_string(primer, &props::TT_NAMESPACE_URI)
                    .unwrap_or_default(),
                ucs_encoding: set
                    .get_string(primer, &props::TT_UCS_ENCODING)
                    .unwrap_or_default(),
            })
        } else {
            return Ok(None);
        };
        Ok(Some(descriptor))
    }
}

/// JPEG 2000 coding parameters carried beside the picture descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Jp2kSubDescriptor {
    pub instance_uid: Uuid,
    pub rsize: u16,
    pub xsize: u32,
    pub ysize: u32,
    pub xo_size: u32,
    pub yo_size: u32,
    pub xt_size: u32,
    pub yt_size: u32,
    pub xto_size: u32,
    pub yto_size: u32,
    pub csize: u16,
    /// Batch of 3-byte (Ssiz, XRsiz, YRsiz) entries.
    pub picture_component_sizing: Vec<u8>,
    pub coding_style_default: Vec<u8>,
    pub quantization_default: Vec<u8>,
}

/// JPEG XS coding parameters carried beside the picture descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct JxsSubDescriptor {
    pub instance_uid: Uuid,
    pub ppih: u16,
    pub plev: u16,
    pub wf: u16,
    pub hf: u16,
    pub cw: u16,
    pub hsl: u16,
    pub nc: u8,
    pub component_table: Vec<u8>,
}

/// One ancillary resource (font, image) of a timed-text track.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct TimedTextResourceSubDescriptor {
    pub instance_uid: Uuid,
    pub ancillary_resource_id: Uuid,
    pub mime_media_type: String,
    pub essence_stream_id: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub enum SubDescriptor {
    Jp2k(Jp2kSubDescriptor),
    Jxs(JxsSubDescriptor),
    TimedTextResource(TimedTextResourceSubDescriptor),
}

impl SubDescriptor {
    pub fn instance_uid(&self) -> Uuid {
        match self {
            SubDescriptor::Jp2k(d) => d.instance_uid,
            SubDescriptor::Jxs(d) => d.instance_uid,
            SubDescriptor::TimedTextResource(d) => d.instance_uid,
        }
    }

    pub fn set_key(&self) -> Ul {
        match self {
            SubDescriptor::Jp2k(_) => labels::JPEG2000_SUBDESCRIPTOR,
            SubDescriptor::Jxs(_) => labels::JPEGXS_SUBDESCRIPTOR,
            SubDescriptor::TimedTextResource(_) => labels::TIMED_TEXT_RESOURCE_SUBDESCRIPTOR,
        }
    }

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        match self {
            SubDescriptor::Jp2k(d) => {
                w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &d.instance_uid)?;
                w.u16(tags::DYNAMIC, &props::J2K_RSIZE, d.rsize)?;
                w.u32(tags::DYNAMIC, &props::J2K_XSIZE, d.xsize)?;
                w.u32(tags::DYNAMIC, &props::J2K_YSIZE, d.ysize)?;
                w.u32(tags::DYNAMIC, &props::J2K_XO_SIZE, d.xo_size)?;
                w.u32(tags::DYNAMIC, &props::J2K_YO_SIZE, d.yo_size)?;
                w.u32(tags::DYNAMIC, &props::J2K_XT_SIZE, d.xt_size)?;
                w.u32(tags::DYNAMIC, &props::J2K_YT_SIZE, d.yt_size)?;
                w.u32(tags::DYNAMIC, &props::J2K_XTO_SIZE, d.xto_size)?;
                w.u32(tags::DYNAMIC, &props::J2K_YTO_SIZE, d.yto_size)?;
                w.u16(tags::DYNAMIC, &props::J2K_CSIZE, d.csize)?;
                w.raw(
                    tags::DYNAMIC,
                    &props::J2K_PICTURE_COMPONENT_SIZING,
                    &d.picture_component_sizing,
                )?;
                w.raw(
                    tags::DYNAMIC,
                    &props::J2K_CODING_STYLE_DEFAULT,
                    &d.coding_style_default,
                )?;
                w.raw(
                    tags::DYNAMIC,
                    &props::J2K_QUANTIZATION_DEFAULT,
                    &d.quantization_default,
                )?;
            }
            SubDescriptor::Jxs(d) => {
                w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &d.instance_uid)?;
                w.u16(tags::DYNAMIC, &props::JXS_PPIH, d.ppih)?;
                w.u16(tags::DYNAMIC, &props::JXS_PLEV, d.plev)?;
                w.u16(tags::DYNAMIC, &props::JXS_WF, d.wf)?;
                w.u16(tags::DYNAMIC, &props::JXS_HF, d.hf)?;
                w.u16(tags::DYNAMIC, &props::JXS_CW, d.cw)?;
                w.u16(tags::DYNAMIC, &props::JXS_HSL, d.hsl)?;
                w.u8(tags::DYNAMIC, &props::JXS_NC, d.nc)?;
                w.raw(tags::DYNAMIC, &props::JXS_COMPONENT_TABLE, &d.component_table)?;
            }
            SubDescriptor::TimedTextResource(d) => {
                w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &d.instance_uid)?;
                w.uuid(
                    tags::DYNAMIC,
                    &props::TT_ANCILLARY_RESOURCE_ID,
                    &d.ancillary_resource_id,
                )?;
                w.string(tags::DYNAMIC, &props::TT_MIME_MEDIA_TYPE, &d.mime_media_type)?;
                w.u32(
                    tags::DYNAMIC,
                    &props::TT_ESSENCE_STREAM_ID,
                    d.essence_stream_id,
                )?;
            }
        }
        w.finish(&self.set_key())
    }

    pub fn parse(key: &Ul, set: &SetProperties, primer: &Primer) -> Result<Option<Self>> {
        let sub = if *key == labels::JPEG2000_SUBDESCRIPTOR {
            SubDescriptor::Jp2k(Jp2kSubDescriptor {
                instance_uid: required(
                    set.get_uuid(primer, &props::INSTANCE_UID),
                    "InstanceUID",
                )?,
                rsize: set.get_u16(primer, &props::J2K_RSIZE).unwrap_or(0),
                xsize: set.get_u32(primer, &props::J2K_XSIZE).unwrap_or(0),
                ysize: set.get_u32(primer, &props::J2K_YSIZE).unwrap_or(0),
                xo_size: set.get_u32(primer, &props::J2K_XO_SIZE).unwrap_or(0),
                yo_size: set.get_u32(primer, &props::J2K_YO_SIZE).unwrap_or(0),
                xt_size: set.get_u32(primer, &props::J2K_XT_SIZE).unwrap_or(0),
                yt_size: set.get_u32(primer, &props::J2K_YT_SIZE).unwrap_or(0),
                xto_size: set.get_u32(primer, &props::J2K_XTO_SIZE).unwrap_or(0),
                yto_size: set.get_u32(primer, &props::J2K_YTO_SIZE).unwrap_or(0),
                csize: set.get_u16(primer, &props::J2K_CSIZE).unwrap_or(0),
                picture_component_sizing: set
                    .get(primer, &props::J2K_PICTURE_COMPONENT_SIZING)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
                coding_style_default: set
                    .get(primer, &props::J2K_CODING_STYLE_DEFAULT)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
                quantization_default: set
                    .get(primer, &props::J2K_QUANTIZATION_DEFAULT)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
            })
        } else if *key == labels::JPEGXS_SUBDESCRIPTOR {
            SubDescriptor::Jxs(JxsSubDescriptor {
                instance_uid: required(
                    set.get_uuid(primer, &props::INSTANCE_UID),
                    "InstanceUID",
                )?,
                ppih: set.get_u16(primer, &props::JXS_PPIH).unwrap_or(0),
                plev: set.get_u16(primer, &props::JXS_PLEV).unwrap_or(0),
                wf: set.get_u16(primer, &props::JXS_WF).unwrap_or(0),
                hf: set.get_u16(primer, &props::JXS_HF).unwrap_or(0),
                cw: set.get_u16(primer, &props::JXS_CW).unwrap_or(0),
                hsl: set.get_u16(primer, &props::JXS_HSL).unwrap_or(0),
                nc: set.get_u8(primer, &props::JXS_NC).unwrap_or(0),
                component_table: set
                    .get(primer, &props::JXS_COMPONENT_TABLE)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
            })
        } else if *key == labels::TIMED_TEXT_RESOURCE_SUBDESCRIPTOR {
            SubDescriptor::TimedTextResource(TimedTextResourceSubDescriptor {
                instance_uid: required(
                    set.get_uuid(primer, &props::INSTANCE_UID),
                    "InstanceUID",
                )?,
                ancillary_resource_id: required(
                    set.get_uuid(primer, &props::TT_ANCILLARY_RESOURCE_ID),
                    "AncillaryResourceID",
                )?,
                mime_media_type: set
                    .get_string(primer, &props::TT_MIME_MEDIA_TYPE)
                    .unwrap_or_default(),
                essence_stream_id: set
                    .get_u32(primer, &props::TT_ESSENCE_STREAM_ID)
                    .unwrap_or(0),
            })
        } else {
            return Ok(None);
        };
        Ok(Some(sub))
    }
}

/// Descriptive-metadata framework announcing encrypted essence.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct CryptographicFramework {
    pub instance_uid: Uuid,
    pub context_sr: Uuid,
}

impl CryptographicFramework {
    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.uuid(tags::DYNAMIC, &props::CRYPTO_CONTEXT_SR, &self.context_sr)?;
        w.finish(&labels::CRYPTOGRAPHIC_FRAMEWORK)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(CryptographicFramework {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            context_sr: required(
                set.get_uuid(primer, &props::CRYPTO_CONTEXT_SR),
                "ContextSR",
            )?,
        })
    }
}

/// The per-file cryptographic context: which container was encrypted, with
/// which algorithms, under which key ID.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct CryptographicContext {
    pub instance_uid: Uuid,
    pub context_id: Uuid,
    pub source_essence_container: Ul,
    pub cipher_algorithm: Ul,
    pub mic_algorithm: Ul,
    pub cryptographic_key_id: Uuid,
}

impl CryptographicContext {
    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.uuid(tags::DYNAMIC, &props::CRYPTO_CONTEXT_ID, &self.context_id)?;
        w.ul(
            tags::DYNAMIC,
            &props::CRYPTO_SOURCE_CONTAINER,
            &self.source_essence_container,
        )?;
        w.ul(
            tags::DYNAMIC,
            &props::CRYPTO_CIPHER_ALGORITHM,
            &self.cipher_algorithm,
        )?;
        w.ul(
            tags::DYNAMIC,
            &props::CRYPTO_MIC_ALGORITHM,
            &self.mic_algorithm,
        )?;
        w.uuid(
            tags::DYNAMIC,
            &props::CRYPTO_KEY_ID,
            &self.cryptographic_key_id,
        )?;
        w.finish(&labels::CRYPTOGRAPHIC_CONTEXT)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(CryptographicContext {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            context_id: required(
                set.get_uuid(primer, &props::CRYPTO_CONTEXT_ID),
                "ContextID",
            )?,
            source_essence_container: required(
                set.get_ul(primer, &props::CRYPTO_SOURCE_CONTAINER),
                "SourceEssenceContainer",
            )?,
            cipher_algorithm: required(
                set.get_ul(primer, &props::CRYPTO_CIPHER_ALGORITHM),
                "CipherAlgorithm",
            )?,
            mic_algorithm: required(
                set.get_ul(primer, &props::CRYPTO_MIC_ALGORITHM),
                "MICAlgorithm",
            )?,
            cryptographic_key_id: required(
                set.get_uuid(primer, &props::CRYPTO_KEY_ID),
                "CryptographicKeyID",
            )?,
        })
    }
}
