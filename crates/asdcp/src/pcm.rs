//! Linear PCM audio wrapping.

use crate::{track_number_of, Options};
use asdcp_core::{Error, FrameBuffer, Rational, Result};
use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
use asdcp_essence::wav::{self, AudioDescriptor, PcmParser};
use asdcp_mxf::writer::{MxfFileWriter, Profile, WriteConfig};
use asdcp_mxf::{
    labels, EssenceDescriptor, EssenceTrackInfo, MxfFileReader, WaveAudioDescriptor, WriterInfo,
};
use std::path::Path;

pub use asdcp_essence::wav::{calc_frame_buffer_size, calc_sample_size, calc_samples_per_frame};

pub(crate) fn build_track_info(
    descriptor: &AudioDescriptor,
    edit_rate: Rational,
) -> Result<EssenceTrackInfo> {
    let mxf_descriptor = EssenceDescriptor::WaveAudio(WaveAudioDescriptor {
        file: asdcp_mxf::FileDescriptor {
            instance_uid: asdcp_crypto::make_uuid()?,
            linked_track_id: 0,
            sample_rate: edit_rate,
            container_duration: 0,
            essence_container: labels::ESSENCE_CONTAINER_PCM,
            codec: None,
            sub_descriptors: Vec::new(),
        },
        audio_sampling_rate: descriptor.audio_sampling_rate,
        locked: descriptor.locked,
        channel_count: descriptor.channel_count,
        quantization_bits: descriptor.quantization_bits,
        block_align: descriptor.block_align,
        avg_bps: descriptor.avg_bps,
        sound_essence_compression: Some(labels::SOUND_ESSENCE_UNCOMPRESSED),
    });

    Ok(EssenceTrackInfo {
        descriptor: mxf_descriptor,
        sub_descriptors: Vec::new(),
        data_definition: labels::DATA_DEF_SOUND,
        edit_rate,
        track_number: track_number_of(&labels::ESSENCE_ELEMENT_PCM),
    })
}

pub(crate) fn write_config(profile: Profile, edit_rate: Rational, options: &Options) -> WriteConfig {
    WriteConfig {
        profile,
        essence_element: labels::ESSENCE_ELEMENT_PCM,
        essence_container: labels::ESSENCE_CONTAINER_PCM,
        edit_rate,
        header_reserve: options.header_reserve,
        cbr: true,
    }
}

pub(crate) fn open_write_impl(
    profile: Profile,
    path: &Path,
    mut info: WriterInfo,
    descriptor: &AudioDescriptor,
    options: &Options,
) -> Result<MxfFileWriter> {
    info.label_set = options.label_set;
    let edit_rate = options.edit_rate.unwrap_or(descriptor.edit_rate);
    tracing::debug!(
        channels = descriptor.channel_count,
        %edit_rate,
        "wrapping PCM audio track"
    );
    let essence = build_track_info(descriptor, edit_rate)?;
    MxfFileWriter::open_write(path, info, essence, write_config(profile, edit_rate, options))
}

/// Writes one PCM audio track into an OP-Atom file.
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
            inner: open_write_impl(Profile::OpAtom, path, info, descriptor, options)?,
            frame_size,
        })
    }

    /// Write one edit unit of samples; every frame must carry exactly
    /// `channels × bytes-per-sample × samples-per-edit-unit` bytes.
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

/// Reads one PCM audio track.
#[must_use]
pub struct MxfReader {
    inner: MxfFileReader,
}

impl MxfReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut inner = MxfFileReader::open_read(path)?;
        match inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::WaveAudio(_) => {}
            other => {
                return Err(Error::Format(format!(
                    "expected a wave audio descriptor, found {other:?}"
                )))
            }
        }
        inner.set_essence_element(labels::ESSENCE_ELEMENT_PCM);
        Ok(MxfReader { inner })
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    pub fn writer_info(&self) -> WriterInfo {
        self.inner.writer_info()
    }

    /// The audio parameters recovered from the header metadata.
    pub fn audio_descriptor(&self) -> Result<AudioDescriptor> {
        let descriptor = match self.inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::WaveAudio(d) => d,
            _ => return Err(Error::Format("missing wave audio descriptor".into())),
        };
        Ok(AudioDescriptor {
            edit_rate: self.inner.header_metadata().edit_rate()?,
            audio_sampling_rate: descriptor.audio_sampling_rate,
            locked: descriptor.locked,
            channel_count: descriptor.channel_count,
            quantization_bits: descriptor.quantization_bits,
            block_align: descriptor.block_align,
            avg_bps: descriptor.avg_bps,
            linked_track_id: descriptor.file.linked_track_id,
            container_duration: descriptor.file.container_duration as u32,
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

/// Multiplexes several mono/stereo WAV inputs into one interleaved PCM
/// frame stream.
#[must_use]
pub struct PcmParserList {
    parsers: Vec<PcmParser>,
    descriptor: AudioDescriptor,
    frame_size: u32,
}

impl PcmParserList {
    /// Open every input at the same picture rate. All inputs must share
    /// sample rate and quantization; channel counts add.
    pub fn open_read(paths: &[std::path::PathBuf], picture_rate: Rational) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::Param("no WAV inputs"));
        }

        let mut parsers = Vec::with_capacity(paths.len());
        for path in paths {
            parsers.push(PcmParser::open_read(path, picture_rate)?);
        }

        let first = *parsers[0].audio_descriptor();
        let mut descriptor = first;
        for parser in &parsers[1..] {
            let other = parser.audio_descriptor();
            if other.audio_sampling_rate != first.audio_sampling_rate
                || other.quantization_bits != first.quantization_bits
            {
                return Err(Error::RawFormat(
                    "WAV inputs disagree on sample rate or quantization".into(),
                ));
            }
            descriptor.channel_count += other.channel_count;
            descriptor.container_duration =
                descriptor.container_duration.max(other.container_duration);
        }
        descriptor.block_align = (wav::calc_sample_size(&descriptor)) as u16;
        descriptor.avg_bps =
            descriptor.audio_sampling_rate.num as u32 * wav::calc_sample_size(&descriptor);

        let frame_size = wav::calc_frame_buffer_size(&descriptor);
        Ok(PcmParserList {
            parsers,
            descriptor,
            frame_size,
        })
    }

    pub fn audio_descriptor(&self) -> &AudioDescriptor {
        &self.descriptor
    }

    pub fn frame_buffer_size(&self) -> u32 {
        self.frame_size
    }

    /// Read and interleave the next frame from every input, sample by
    /// sample across the inputs in order.
    pub fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        if frame.capacity() < self.frame_size as usize {
            return Err(Error::SmallBuf {
                need: self.frame_size as usize,
                have: frame.capacity(),
            });
        }

        let mut inputs = Vec::with_capacity(self.parsers.len());
        let mut sample_sizes = Vec::with_capacity(self.parsers.len());
        for parser in &mut self.parsers {
            let mut input = FrameBuffer::with_capacity(parser.frame_buffer_size() as usize);
            parser.read_frame(&mut input)?;
            sample_sizes.push(wav::calc_sample_size(parser.audio_descriptor()) as usize);
            inputs.push(input);
        }

        let samples = wav::calc_samples_per_frame(&self.descriptor) as usize;
        let mut at = 0usize;
        {
            let out = frame.storage_mut();
            for sample in 0..samples {
                for (input, &size) in inputs.iter().zip(&sample_sizes) {
                    let from = sample * size;
                    out[at..at + size].copy_from_slice(&input.data()[from..from + size]);
                    at += size;
                }
            }
        }
        frame.set_len(at)?;
        Ok(())
    }

    /// Rewind every input.
    pub fn reset(&mut self) -> Result<()> {
        for parser in &mut self.parsers {
            parser.reset()?;
        }
        Ok(())
    }
}
