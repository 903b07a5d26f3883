//! RIFF/WAVE parsing and PCM frame extraction.
//!
//! The parser recognizes the canonical chunk layout: `RIFF` + size +
//! `WAVE`, a `fmt ` chunk (PCM or IEEE float), optional chunks, and a
//! `data` chunk. Audio is exposed as a lazy, restartable sequence of
//! frame-sized buffers where one frame covers one picture edit unit.

use asdcp_core::{Error, FrameBuffer, Rational, ReadSeek, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// WAVE format code for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// WAVE format code for IEEE float samples.
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;

/// Parameters of a PCM audio track as carried in the MXF descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[must_use]
pub struct AudioDescriptor {
    /// Picture rate the audio is wrapped against.
    pub edit_rate: Rational,
    pub audio_sampling_rate: Rational,
    pub locked: u8,
    pub channel_count: u32,
    pub quantization_bits: u32,
    pub block_align: u16,
    pub avg_bps: u32,
    pub linked_track_id: u32,
    pub container_duration: u32,
}

/// Bytes in one sample across all channels.
pub fn calc_sample_size(desc: &AudioDescriptor) -> u32 {
    desc.channel_count * ((desc.quantization_bits + 7) / 8)
}

/// Samples in one edit unit of audio.
pub fn calc_samples_per_frame(desc: &AudioDescriptor) -> u32 {
    if desc.edit_rate.num == 0 || desc.audio_sampling_rate.den == 0 {
        return 0;
    }
    let samples = i64::from(desc.audio_sampling_rate.num) * i64::from(desc.edit_rate.den);
    let per = i64::from(desc.audio_sampling_rate.den) * i64::from(desc.edit_rate.num);
    (samples / per) as u32
}

/// Bytes in one edit unit of audio.
pub fn calc_frame_buffer_size(desc: &AudioDescriptor) -> u32 {
    calc_sample_size(desc) * calc_samples_per_frame(desc)
}

/// The canonical `fmt ` chunk contents plus the data-chunk length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct SimpleWavHeader {
    pub format: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub avg_bps: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl SimpleWavHeader {
    pub fn from_descriptor(desc: &AudioDescriptor, data_len: u32) -> Self {
        SimpleWavHeader {
            format: WAVE_FORMAT_PCM,
            channel_count: desc.channel_count as u16,
            sample_rate: desc.audio_sampling_rate.num as u32,
            avg_bps: desc.audio_sampling_rate.num as u32 * calc_sample_size(desc),
            block_align: calc_sample_size(desc) as u16,
            bits_per_sample: desc.quantization_bits as u16,
            data_len,
        }
    }

    /// Scan the RIFF chunk list, returning the header and the byte offset
    /// of the first sample. Non-PCM formats are rejected as `RawFormat`.
    pub fn read<R: ReadSeek>(reader: &mut R) -> Result<(Self, u64)> {
        let mut riff = [0u8; 12];
        reader.read_exact(&mut riff).map_err(Error::ReadFail)?;
        if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
            return Err(Error::RawFormat("not a RIFF/WAVE file".into()));
        }

        let mut header: Option<SimpleWavHeader> = None;

        loop {
            let mut chunk_header = [0u8; 8];
            if reader.read_exact(&mut chunk_header).is_err() {
                return Err(Error::RawFormat("no data chunk in WAVE file".into()));
            }
            let chunk_size =
                u32::from_le_bytes([chunk_header[4], chunk_header[5], chunk_header[6], chunk_header[7]]);

            match &chunk_header[0..4] {
                b"fmt " => {
                    if chunk_size < 16 {
                        return Err(Error::RawFormat("fmt chunk too short".into()));
                    }
                    let mut fmt = [0u8; 16];
                    reader.read_exact(&mut fmt).map_err(Error::ReadFail)?;

                    let format = u16::from_le_bytes([fmt[0], fmt[1]]);
                    if format != WAVE_FORMAT_PCM && format != WAVE_FORMAT_IEEE_FLOAT {
                        return Err(Error::RawFormat(format!(
                            "unsupported WAVE format code {format}"
                        )));
                    }

                    header = Some(SimpleWavHeader {
                        format,
                        channel_count: u16::from_le_bytes([fmt[2], fmt[3]]),
                        sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                        avg_bps: u32::from_le_bytes([fmt[8], fmt[9], fmt[10], fmt[11]]),
                        block_align: u16::from_le_bytes([fmt[12], fmt[13]]),
                        bits_per_sample: u16::from_le_bytes([fmt[14], fmt[15]]),
                        data_len: 0,
                    });

                    // extension bytes and odd-length padding
                    let skip = u64::from(chunk_size - 16) + u64::from(chunk_size & 1);
                    reader
                        .seek(SeekFrom::Current(skip as i64))
                        .map_err(|_| Error::BadSeek)?;
                }
                b"data" => {
                    let mut header = header
                        .ok_or_else(|| Error::RawFormat("data chunk before fmt chunk".into()))?;
                    header.data_len = chunk_size;
                    let data_start = reader
                        .stream_position()
                        .map_err(|_| Error::BadSeek)?;
                    return Ok((header, data_start));
                }
                other => {
                    debug!(
                        "skipping chunk {:?} of {} bytes",
                        String::from_utf8_lossy(other),
                        chunk_size
                    );
                    let skip = u64::from(chunk_size) + u64::from(chunk_size & 1);
                    reader
                        .seek(SeekFrom::Current(skip as i64))
                        .map_err(|_| Error::BadSeek)?;
                }
            }
        }
    }

    /// Write the canonical 44-byte PCM header.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut out = Vec::with_capacity(44);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + self.data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&self.format.to_le_bytes());
        out.extend_from_slice(&self.channel_count.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.avg_bps.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_len.to_le_bytes());
        writer.write_all(&out).map_err(Error::WriteFail)
    }

    /// Derive the MXF audio descriptor for wrapping at `edit_rate`.
    pub fn audio_descriptor(&self, edit_rate: Rational) -> AudioDescriptor {
        let mut desc = AudioDescriptor {
            edit_rate,
            audio_sampling_rate: Rational::new(self.sample_rate as i32, 1),
            locked: 0,
            channel_count: u32::from(self.channel_count),
            quantization_bits: u32::from(self.bits_per_sample),
            block_align: self.block_align,
            avg_bps: self.avg_bps,
            linked_track_id: 0,
            container_duration: 0,
        };
        let frame_size = calc_frame_buffer_size(&desc);
        if frame_size > 0 {
            desc.container_duration = self.data_len.div_ceil(frame_size);
        }
        desc
    }
}

/// Reads a WAV file as a sequence of edit-unit-sized PCM frames.
#[must_use]
pub struct PcmParser {
    file: File,
    data_start: u64,
    data_len: u64,
    position: u64,
    descriptor: AudioDescriptor,
    frame_size: u32,
}

impl PcmParser {
    /// Open `path` and align frame sizing to `picture_rate`.
    pub fn open_read(path: &Path, picture_rate: Rational) -> Result<Self> {
        let mut file =
            File::open(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
        let (header, data_start) = SimpleWavHeader::read(&mut file)?;
        let descriptor = header.audio_descriptor(picture_rate);
        let frame_size = calc_frame_buffer_size(&descriptor);
        if frame_size == 0 {
            return Err(Error::Param("frame size of zero for edit rate"));
        }

        Ok(PcmParser {
            file,
            data_start,
            data_len: u64::from(header.data_len),
            position: 0,
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

    /// Read the next frame; the final short frame is zero-padded to full
    /// size. `EndOfFile` once the data chunk is exhausted.
    pub fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        if self.position >= self.data_len {
            return Err(Error::EndOfFile);
        }
        let frame_size = self.frame_size as usize;
        if frame.capacity() < frame_size {
            return Err(Error::SmallBuf {
                need: frame_size,
                have: frame.capacity(),
            });
        }

        let remaining = (self.data_len - self.position).min(self.frame_size as u64) as usize;
        self.file
            .read_exact(&mut frame.storage_mut()[..remaining])
            .map_err(Error::ReadFail)?;
        frame.storage_mut()[remaining..frame_size].fill(0);
        frame.set_len(frame_size)?;
        frame.set_frame_number((self.position / u64::from(self.frame_size)) as u32);
        self.position += remaining as u64;
        Ok(())
    }

    /// Rewind to the first sample.
    pub fn reset(&mut self) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(self.data_start))
            .map_err(|_| Error::BadSeek)?;
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn descriptor_48k_24fps() -> AudioDescriptor {
        AudioDescriptor {
            edit_rate: asdcp_core::rational::EDIT_RATE_24,
            audio_sampling_rate: asdcp_core::rational::SAMPLE_RATE_48K,
            locked: 0,
            channel_count: 2,
            quantization_bits: 24,
            block_align: 6,
            avg_bps: 288_000,
            linked_track_id: 0,
            container_duration: 0,
        }
    }

    #[test]
    fn frame_sizing_at_48k_24fps() {
        let desc = descriptor_48k_24fps();
        assert_eq!(calc_sample_size(&desc), 6);
        assert_eq!(calc_samples_per_frame(&desc), 2000);
        assert_eq!(calc_frame_buffer_size(&desc), 12000);
    }

    #[test]
    fn header_round_trip() {
        let desc = descriptor_48k_24fps();
        let header = SimpleWavHeader::from_descriptor(&desc, 288_000);

        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 44);

        let (parsed, data_start) = SimpleWavHeader::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(data_start, 44);
    }

    #[test]
    fn optional_chunks_are_skipped() {
        let desc = descriptor_48k_24fps();
        let header = SimpleWavHeader::from_descriptor(&desc, 12);

        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        // splice an unknown chunk between fmt and data
        let data_at = 36;
        let mut with_junk = bytes[..data_at].to_vec();
        with_junk.extend_from_slice(b"JUNK");
        with_junk.extend_from_slice(&4u32.to_le_bytes());
        with_junk.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        with_junk.extend_from_slice(&bytes[data_at..]);

        let (parsed, data_start) = SimpleWavHeader::read(&mut Cursor::new(&with_junk)).unwrap();
        assert_eq!(parsed.data_len, 12);
        assert_eq!(data_start, 56);
    }

    #[test]
    fn non_pcm_format_is_rejected() {
        let desc = descriptor_48k_24fps();
        let mut header = SimpleWavHeader::from_descriptor(&desc, 0);
        header.format = 0x0055; // MP3
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert!(matches!(
            SimpleWavHeader::read(&mut Cursor::new(&bytes)),
            Err(Error::RawFormat(_))
        ));
    }

    #[test]
    fn descriptor_duration_rounds_up() {
        let header = SimpleWavHeader {
            format: WAVE_FORMAT_PCM,
            channel_count: 2,
            sample_rate: 48000,
            avg_bps: 288_000,
            block_align: 6,
            bits_per_sample: 24,
            data_len: 12001,
        };
        let desc = header.audio_descriptor(asdcp_core::rational::EDIT_RATE_24);
        assert_eq!(desc.container_duration, 2);
    }
}
