//! JPEG 2000 picture wrapping, mono and stereoscopic.

use crate::{track_number_of, Options};
use asdcp_core::{Error, FrameBuffer, Rational, Result};
use asdcp_crypto::{CbcDecryptor, CbcEncryptor, HmacContext};
use asdcp_essence::jp2k::PictureDescriptor;
use asdcp_mxf::writer::{MxfFileWriter, Profile, WriteConfig};
use asdcp_mxf::{
    labels, EssenceDescriptor, EssenceTrackInfo, Jp2kSubDescriptor, MxfFileReader,
    PictureEssenceDescriptor, PictureKind, SubDescriptor, WriterInfo,
};
use std::path::Path;

pub use asdcp_essence::jp2k::{CodestreamParser, SequenceParser};

/// 2K/4K selection happens at the width boundary.
const WIDTH_2K: u32 = 2048;

/// Convert a parsed codestream descriptor into the MXF descriptor graph.
pub(crate) fn build_track_info(
    descriptor: &PictureDescriptor,
    edit_rate: Rational,
) -> Result<EssenceTrackInfo> {
    let coding = if descriptor.stored_width > WIDTH_2K {
        labels::JP2K_ESSENCE_COMPRESSION_4K
    } else {
        labels::JP2K_ESSENCE_COMPRESSION_2K
    };

    let mut sizing = Vec::with_capacity(8 + descriptor.components.len() * 3);
    sizing.extend_from_slice(&(descriptor.components.len() as u32).to_be_bytes());
    sizing.extend_from_slice(&3u32.to_be_bytes());
    for component in &descriptor.components {
        sizing.push(component.s_size);
        sizing.push(component.x_r_size);
        sizing.push(component.y_r_size);
    }

    let sub = Jp2kSubDescriptor {
        instance_uid: asdcp_crypto::make_uuid()?,
        rsize: descriptor.rsize,
        xsize: descriptor.xsize,
        ysize: descriptor.ysize,
        xo_size: descriptor.x_o_size,
        yo_size: descriptor.y_o_size,
        xt_size: descriptor.xt_size,
        yt_size: descriptor.yt_size,
        xto_size: descriptor.xt_o_size,
        yto_size: descriptor.yt_o_size,
        csize: descriptor.csize,
        picture_component_sizing: sizing,
        coding_style_default: descriptor.coding_style.clone(),
        quantization_default: descriptor.quant_default.clone(),
    };

    let mxf_descriptor = EssenceDescriptor::Picture(PictureEssenceDescriptor {
        file: asdcp_mxf::FileDescriptor {
            instance_uid: asdcp_crypto::make_uuid()?,
            linked_track_id: 0,
            sample_rate: edit_rate,
            container_duration: 0,
            essence_container: labels::ESSENCE_CONTAINER_JP2K,
            codec: None,
            sub_descriptors: Vec::new(),
        },
        kind: PictureKind::Rgba,
        frame_layout: 0,
        stored_width: descriptor.stored_width,
        stored_height: descriptor.stored_height,
        aspect_ratio: descriptor.aspect_ratio,
        picture_essence_coding: coding,
        component_depth: descriptor
            .components
            .first()
            .map(|c| u32::from(c.s_size & 0x7f) + 1),
        horizontal_subsampling: descriptor.components.first().map(|c| u32::from(c.x_r_size)),
        vertical_subsampling: descriptor.components.first().map(|c| u32::from(c.y_r_size)),
    });

    Ok(EssenceTrackInfo {
        descriptor: mxf_descriptor,
        sub_descriptors: vec![SubDescriptor::Jp2k(sub)],
        data_definition: labels::DATA_DEF_PICTURE,
        edit_rate,
        track_number: track_number_of(&labels::ESSENCE_ELEMENT_JP2K),
    })
}

pub(crate) fn write_config(profile: Profile, edit_rate: Rational, options: &Options) -> WriteConfig {
    WriteConfig {
        profile,
        essence_element: labels::ESSENCE_ELEMENT_JP2K,
        essence_container: labels::ESSENCE_CONTAINER_JP2K,
        edit_rate,
        header_reserve: options.header_reserve,
        cbr: false,
    }
}

/// Open a frame-file sequence, honoring the `pedantic` option.
pub fn open_sequence(files: Vec<std::path::PathBuf>, options: &Options) -> Result<SequenceParser> {
    SequenceParser::open_read(files, options.pedantic)
}

pub(crate) fn open_write_impl(
    profile: Profile,
    path: &Path,
    mut info: WriterInfo,
    descriptor: &PictureDescriptor,
    options: &Options,
) -> Result<MxfFileWriter> {
    info.label_set = options.label_set;
    let edit_rate = options.edit_rate.unwrap_or(descriptor.edit_rate);
    tracing::debug!(
        width = descriptor.stored_width,
        height = descriptor.stored_height,
        %edit_rate,
        "wrapping JP2K picture track"
    );
    let essence = build_track_info(descriptor, edit_rate)?;
    MxfFileWriter::open_write(path, info, essence, write_config(profile, edit_rate, options))
}

/// Writes one JP2K picture track into an OP-Atom file.
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
            inner: open_write_impl(Profile::OpAtom, path, info, descriptor, options)?,
        })
    }

    /// Write one codestream frame. The frame's plaintext offset (set by
    /// the codestream parser) keeps headers in the clear under encryption.
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

/// Reads one JP2K picture track from an OP-Atom or AS-02 file.
#[must_use]
pub struct MxfReader {
    inner: MxfFileReader,
}

impl MxfReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut inner = MxfFileReader::open_read(path)?;
        // confirm the file carries a picture descriptor
        match inner.header_metadata().primary_descriptor()? {
            EssenceDescriptor::Picture(_) => {}
            other => {
                return Err(Error::Format(format!(
                    "expected a picture descriptor, found {other:?}"
                )))
            }
        }
        inner.set_essence_element(labels::ESSENCE_ELEMENT_JP2K);
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
        let edit_rate = self.inner.header_metadata().edit_rate()?;

        let mut out = PictureDescriptor {
            edit_rate,
            sample_rate: descriptor.file.sample_rate,
            container_duration: descriptor.file.container_duration as u32,
            stored_width: descriptor.stored_width,
            stored_height: descriptor.stored_height,
            aspect_ratio: descriptor.aspect_ratio,
            ..PictureDescriptor::default()
        };

        for sub in self.inner.header_metadata().sub_descriptors() {
            if let SubDescriptor::Jp2k(jp2k) = sub {
                out.rsize = jp2k.rsize;
                out.xsize = jp2k.xsize;
                out.ysize = jp2k.ysize;
                out.x_o_size = jp2k.xo_size;
                out.y_o_size = jp2k.yo_size;
                out.xt_size = jp2k.xt_size;
                out.yt_size = jp2k.yt_size;
                out.xt_o_size = jp2k.xto_size;
                out.yt_o_size = jp2k.yto_size;
                out.csize = jp2k.csize;
                out.coding_style = jp2k.coding_style_default.clone();
                out.quant_default = jp2k.quantization_default.clone();

                let sizing = &jp2k.picture_component_sizing;
                if sizing.len() >= 8 {
                    let count =
                        u32::from_be_bytes([sizing[0], sizing[1], sizing[2], sizing[3]]) as usize;
                    for (i, component) in
                        out.components.iter_mut().enumerate().take(count.min(3))
                    {
                        let at = 8 + i * 3;
                        if at + 3 <= sizing.len() {
                            component.s_size = sizing[at];
                            component.x_r_size = sizing[at + 1];
                            component.y_r_size = sizing[at + 2];
                        }
                    }
                }
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

    pub(crate) fn into_inner(self) -> MxfFileReader {
        self.inner
    }
}

/// Which eye a stereoscopic triplet belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StereoscopicPhase {
    Left,
    Right,
}

/// Writes a stereoscopic JP2K track: each edit unit holds a left/right
/// pair, indexed at the left frame.
#[must_use]
pub struct StereoMxfWriter {
    inner: MxfFileWriter,
    next_phase: StereoscopicPhase,
}

impl StereoMxfWriter {
    pub fn open_write(
        path: &Path,
        info: WriterInfo,
        descriptor: &PictureDescriptor,
        options: &Options,
    ) -> Result<Self> {
        Ok(StereoMxfWriter {
            inner: open_write_impl(Profile::OpAtom, path, info, descriptor, options)?,
            next_phase: StereoscopicPhase::Left,
        })
    }

    /// Frames must alternate left, right, left, ... a call out of phase
    /// is a `State` error.
    pub fn write_frame(
        &mut self,
        frame: &FrameBuffer,
        phase: StereoscopicPhase,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        if phase != self.next_phase {
            return Err(Error::State("stereoscopic frame out of phase"));
        }
        match phase {
            StereoscopicPhase::Left => {
                self.inner.write_frame(frame, encryptor, hmac)?;
                self.next_phase = StereoscopicPhase::Right;
            }
            StereoscopicPhase::Right => {
                self.inner.write_companion_frame(frame, encryptor, hmac, None)?;
                self.next_phase = StereoscopicPhase::Left;
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    /// `State` when a right-eye frame is still outstanding.
    pub fn finalize(&mut self) -> Result<()> {
        if self.next_phase == StereoscopicPhase::Right {
            return Err(Error::State("finalize with an unpaired left frame"));
        }
        self.inner.finalize()
    }
}

/// Reads a stereoscopic JP2K track.
#[must_use]
pub struct StereoMxfReader {
    inner: MxfFileReader,
}

impl StereoMxfReader {
    pub fn open_read(path: &Path) -> Result<Self> {
        Ok(StereoMxfReader {
            inner: MxfReader::open_read(path)?.into_inner(),
        })
    }

    pub fn duration(&self) -> u64 {
        self.inner.duration()
    }

    pub fn read_frame(
        &mut self,
        n: u64,
        phase: StereoscopicPhase,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        let skip = match phase {
            StereoscopicPhase::Left => 0,
            StereoscopicPhase::Right => 1,
        };
        self.inner.read_frame_skip(n, skip, frame, decryptor, hmac)
    }
}
