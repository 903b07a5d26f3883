//! JPEG 2000 codestream parser.
//!
//! Walks the marker segments of a JP2K codestream far enough to fill a
//! [`PictureDescriptor`] for MXF wrapping:
//!
//! - `SOC` must open the stream
//! - `SIZ` supplies dimensions, component count, and per-component sizing
//! - `COD` and `QCD` are captured verbatim for the picture sub-descriptor
//! - `SOD` ends the metadata region; the byte after it is the
//!   plaintext-offset boundary for encryption
//!
//! Entropy-coded data is never touched.

use asdcp_core::{Error, FrameBuffer, MemReader, Rational, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::error;

/// Codestream marker codes.
pub mod markers {
    /// Start of codestream.
    pub const SOC: u16 = 0xff4f;
    /// Extended capabilities.
    pub const CAP: u16 = 0xff50;
    /// Image and tile size.
    pub const SIZ: u16 = 0xff51;
    /// Coding style default.
    pub const COD: u16 = 0xff52;
    /// Profile.
    pub const PRF: u16 = 0xff56;
    /// Corresponding profile.
    pub const CPF: u16 = 0xff59;
    /// Quantization default.
    pub const QCD: u16 = 0xff5c;
    /// Comment.
    pub const COM: u16 = 0xff64;
    /// Start of tile-part.
    pub const SOT: u16 = 0xff90;
    /// Start of data.
    pub const SOD: u16 = 0xff93;
    /// End of codestream.
    pub const EOC: u16 = 0xffd9;
}

/// Number of image components a D-Cinema codestream must carry.
pub const REQUIRED_COMPONENTS: u16 = 3;

/// Maximum COD/QCD payload captured into the descriptor.
pub const MAX_CODING_DATA: usize = 256;

/// Per-component sizing from the SIZ segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageComponent {
    /// Bit depth minus one, sign bit in the high bit.
    pub s_size: u8,
    pub x_r_size: u8,
    pub y_r_size: u8,
}

/// Everything the wrapper needs to know about a JP2K picture track.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct PictureDescriptor {
    pub edit_rate: Rational,
    pub sample_rate: Rational,
    pub container_duration: u32,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    pub rsize: u16,
    pub xsize: u32,
    pub ysize: u32,
    pub x_o_size: u32,
    pub y_o_size: u32,
    pub xt_size: u32,
    pub yt_size: u32,
    pub xt_o_size: u32,
    pub yt_o_size: u32,
    pub csize: u16,
    pub components: [ImageComponent; REQUIRED_COMPONENTS as usize],
    pub coding_style: Vec<u8>,
    pub quant_default: Vec<u8>,
}

impl Default for PictureDescriptor {
    fn default() -> Self {
        PictureDescriptor {
            edit_rate: asdcp_core::rational::EDIT_RATE_24,
            sample_rate: asdcp_core::rational::EDIT_RATE_24,
            container_duration: 0,
            stored_width: 0,
            stored_height: 0,
            aspect_ratio: Rational::default(),
            rsize: 0,
            xsize: 0,
            ysize: 0,
            x_o_size: 0,
            y_o_size: 0,
            xt_size: 0,
            yt_size: 0,
            xt_o_size: 0,
            yt_o_size: 0,
            csize: 0,
            components: Default::default(),
            coding_style: Vec::new(),
            quant_default: Vec::new(),
        }
    }
}

/// One decoded marker. Standalone markers (`SOC`, `SOD`, `EOC`) carry no
/// segment data.
struct Marker<'a> {
    kind: u16,
    data: &'a [u8],
}

/// Decode the marker at `pos`, returning it and the position of the next
/// marker (for `SOD`, the first entropy-coded byte).
fn next_marker<'a>(buf: &'a [u8], pos: usize) -> Result<(Marker<'a>, usize)> {
    if pos + 2 > buf.len() {
        return Err(Error::RawFormat("truncated codestream".into()));
    }
    if buf[pos] != 0xff {
        return Err(Error::RawFormat(format!(
            "expected marker at byte {pos}, found 0x{:02x}",
            buf[pos]
        )));
    }

    let kind = 0xff00 | u16::from(buf[pos + 1]);
    if matches!(kind, markers::SOC | markers::SOD | markers::EOC) {
        return Ok((Marker { kind, data: &[] }, pos + 2));
    }

    if pos + 4 > buf.len() {
        return Err(Error::RawFormat("truncated marker segment".into()));
    }
    // segment length includes its own two bytes
    let seg_len = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]) as usize;
    if seg_len < 2 || pos + 2 + seg_len > buf.len() {
        return Err(Error::RawFormat(format!(
            "illegal segment length {seg_len} for marker 0x{kind:04x}"
        )));
    }

    let data = &buf[pos + 4..pos + 2 + seg_len];
    Ok((Marker { kind, data }, pos + 2 + seg_len))
}

fn parse_siz(data: &[u8], desc: &mut PictureDescriptor) -> Result<()> {
    let mut r = MemReader::new(data);
    desc.rsize = r.read_u16()?;
    desc.xsize = r.read_u32()?;
    desc.ysize = r.read_u32()?;
    desc.x_o_size = r.read_u32()?;
    desc.y_o_size = r.read_u32()?;
    desc.xt_size = r.read_u32()?;
    desc.yt_size = r.read_u32()?;
    desc.xt_o_size = r.read_u32()?;
    desc.yt_o_size = r.read_u32()?;
    desc.csize = r.read_u16()?;

    if desc.csize != REQUIRED_COMPONENTS {
        error!("unexpected number of components: {}", desc.csize);
        return Err(Error::RawFormat(format!(
            "expected {REQUIRED_COMPONENTS} components, found {}",
            desc.csize
        )));
    }

    for component in desc.components.iter_mut() {
        component.s_size = r.read_u8()?;
        component.x_r_size = r.read_u8()?;
        component.y_r_size = r.read_u8()?;
    }

    desc.stored_width = desc.xsize;
    desc.stored_height = desc.ysize;
    desc.aspect_ratio = Rational::new(desc.xsize as i32, desc.ysize as i32);
    Ok(())
}

/// Parse codestream metadata, returning the descriptor and the plaintext
/// offset (the byte index just past the `SOD` marker).
pub fn parse_codestream(buf: &[u8]) -> Result<(PictureDescriptor, usize)> {
    let mut desc = PictureDescriptor::default();
    let mut pos = 0usize;
    let (mut siz_count, mut cod_count, mut qcd_count) = (0u32, 0u32, 0u32);
    let mut plaintext_offset = None;

    while pos < buf.len() {
        let (marker, next) = next_marker(buf, pos)?;

        if pos == 0 && marker.kind != markers::SOC {
            return Err(Error::RawFormat(
                "codestream does not begin with SOC".into(),
            ));
        }

        match marker.kind {
            markers::SOD => {
                plaintext_offset = Some(next);
                break;
            }
            markers::SIZ => {
                siz_count += 1;
                parse_siz(marker.data, &mut desc)?;
            }
            markers::COD => {
                cod_count += 1;
                if marker.data.len() > MAX_CODING_DATA {
                    error!("unexpectedly large CodingStyle data: {}", marker.data.len());
                    return Err(Error::RawFormat("oversized COD segment".into()));
                }
                desc.coding_style = marker.data.to_vec();
            }
            markers::QCD => {
                qcd_count += 1;
                if marker.data.len() > MAX_CODING_DATA {
                    error!("unexpectedly large QuantDefault data: {}", marker.data.len());
                    return Err(Error::RawFormat("oversized QCD segment".into()));
                }
                desc.quant_default = marker.data.to_vec();
            }
            // informational segments are tolerated in any count
            markers::SOC | markers::COM | markers::CAP | markers::PRF | markers::CPF
            | markers::SOT => {}
            _ => {}
        }

        pos = next;
    }

    if siz_count != 1 || cod_count != 1 || qcd_count != 1 {
        return Err(Error::RawFormat(format!(
            "required segment counts SIZ={siz_count} COD={cod_count} QCD={qcd_count}"
        )));
    }
    let plaintext_offset =
        plaintext_offset.ok_or_else(|| Error::RawFormat("no SOD marker before end of data".into()))?;

    Ok((desc, plaintext_offset))
}

/// Reads one codestream file and provides its descriptor.
#[derive(Default)]
#[must_use]
pub struct CodestreamParser {
    descriptor: Option<PictureDescriptor>,
}

impl CodestreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path`, read the whole codestream into `frame`, and parse its
    /// metadata. The frame's plaintext offset is set to the SOD boundary.
    pub fn open_read_frame(&mut self, path: &Path, frame: &mut FrameBuffer) -> Result<()> {
        let mut file =
            File::open(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
        let file_size = file.metadata().map_err(Error::ReadFail)?.len() as usize;

        if frame.capacity() < file_size {
            error!(
                "frame buffer capacity {} below codestream length {}",
                frame.capacity(),
                file_size
            );
            return Err(Error::SmallBuf {
                need: file_size,
                have: frame.capacity(),
            });
        }

        file.read_exact(&mut frame.storage_mut()[..file_size])
            .map_err(Error::ReadFail)?;
        frame.set_len(file_size)?;

        let (descriptor, plaintext_offset) = parse_codestream(frame.data())?;
        frame.set_plaintext_offset(plaintext_offset as u32);
        self.descriptor = Some(descriptor);
        Ok(())
    }

    pub fn picture_descriptor(&self) -> Result<&PictureDescriptor> {
        self.descriptor
            .as_ref()
            .ok_or(Error::Init("codestream parser"))
    }
}

/// Presents an ordered list of single-frame codestream files as a frame
/// sequence.
#[must_use]
pub struct SequenceParser {
    files: Vec<std::path::PathBuf>,
    position: usize,
    descriptor: PictureDescriptor,
}

impl SequenceParser {
    /// Open a sequence. The descriptor comes from the first file; with
    /// `pedantic` set, every file is parsed up front and must match it.
    pub fn open_read(files: Vec<std::path::PathBuf>, pedantic: bool) -> Result<Self> {
        let first = files
            .first()
            .ok_or(Error::Param("empty codestream sequence"))?;

        let mut descriptor = parse_file(first)?;

        if pedantic {
            for path in &files[1..] {
                let other = parse_file(path)?;
                if !descriptors_match(&descriptor, &other) {
                    error!("descriptor mismatch in {}", path.display());
                    return Err(Error::RawFormat(format!(
                        "sequence descriptor mismatch: {}",
                        path.display()
                    )));
                }
            }
        }

        descriptor.container_duration = files.len() as u32;
        Ok(SequenceParser {
            files,
            position: 0,
            descriptor,
        })
    }

    pub fn picture_descriptor(&self) -> &PictureDescriptor {
        &self.descriptor
    }

    pub fn duration(&self) -> u32 {
        self.files.len() as u32
    }

    /// Read the next frame. `EndOfFile` past the last file.
    pub fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        let path = self.files.get(self.position).ok_or(Error::EndOfFile)?;
        let mut parser = CodestreamParser::new();
        parser.open_read_frame(path, frame)?;
        frame.set_frame_number(self.position as u32);
        self.position += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

fn parse_file(path: &Path) -> Result<PictureDescriptor> {
    let data = std::fs::read(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
    let (descriptor, _) = parse_codestream(&data)?;
    Ok(descriptor)
}

fn descriptors_match(a: &PictureDescriptor, b: &PictureDescriptor) -> bool {
    a.xsize == b.xsize
        && a.ysize == b.ysize
        && a.csize == b.csize
        && a.components == b.components
        && a.coding_style == b.coding_style
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal well-formed codestream: SOC, SIZ, COD, QCD, SOD,
    /// then `payload` bytes of entropy data.
    pub(crate) fn synthetic_codestream(width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
        let mut cs = vec![0xff, 0x4f]; // SOC

        // SIZ: 2 len + 2 rsize + 8 * 4 + 2 csize + 3 * 3
        cs.extend_from_slice(&[0xff, 0x51]);
        cs.extend_from_slice(&47u16.to_be_bytes());
        cs.extend_from_slice(&0x0306u16.to_be_bytes()); // Rsiz: cinema 2K
        cs.extend_from_slice(&width.to_be_bytes());
        cs.extend_from_slice(&height.to_be_bytes());
        for _ in 0..2 {
            cs.extend_from_slice(&0u32.to_be_bytes()); // XOsiz, YOsiz
        }
        cs.extend_from_slice(&width.to_be_bytes()); // XTsiz
        cs.extend_from_slice(&height.to_be_bytes()); // YTsiz
        for _ in 0..2 {
            cs.extend_from_slice(&0u32.to_be_bytes()); // XTOsiz, YTOsiz
        }
        cs.extend_from_slice(&3u16.to_be_bytes()); // Csiz
        for _ in 0..3 {
            cs.extend_from_slice(&[0x0b, 0x01, 0x01]); // 12-bit, no subsampling
        }

        // COD: arbitrary 10-byte coding style
        cs.extend_from_slice(&[0xff, 0x52]);
        cs.extend_from_slice(&12u16.to_be_bytes());
        cs.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x05, 0x03, 0x03, 0x00, 0x00, 0x77]);

        // QCD: arbitrary 5-byte quantization
        cs.extend_from_slice(&[0xff, 0x5c]);
        cs.extend_from_slice(&7u16.to_be_bytes());
        cs.extend_from_slice(&[0x20, 0x90, 0x98, 0x98, 0xa0]);

        cs.extend_from_slice(&[0xff, 0x93]); // SOD
        cs.extend_from_slice(payload);
        cs
    }

    #[test]
    fn parses_2k_dimensions() {
        let cs = synthetic_codestream(2048, 1080, &[0xaa; 16]);
        let (desc, offset) = parse_codestream(&cs).unwrap();
        assert_eq!(desc.stored_width, 2048);
        assert_eq!(desc.stored_height, 1080);
        assert_eq!(desc.aspect_ratio, Rational::new(2048, 1080));
        assert_eq!(desc.csize, 3);
        assert_eq!(desc.components[0].s_size, 0x0b);
        assert_eq!(desc.coding_style.len(), 10);
        assert_eq!(desc.quant_default.len(), 5);
        // plaintext offset lands on the first entropy byte
        assert_eq!(offset, cs.len() - 16);
        assert_eq!(cs[offset], 0xaa);
    }

    #[test]
    fn rejects_missing_soc() {
        let mut cs = synthetic_codestream(64, 64, &[]);
        cs[1] = 0x51; // overwrite SOC with SIZ
        assert!(matches!(
            parse_codestream(&cs),
            Err(Error::RawFormat(_))
        ));
    }

    #[test]
    fn rejects_wrong_component_count() {
        let mut cs = synthetic_codestream(64, 64, &[]);
        // Csiz lives 36 bytes into the SIZ data
        let csiz_at = 2 + 4 + 36;
        cs[csiz_at] = 0;
        cs[csiz_at + 1] = 1;
        assert!(parse_codestream(&cs).is_err());
    }

    #[test]
    fn rejects_missing_sod() {
        let cs = synthetic_codestream(64, 64, &[]);
        let truncated = &cs[..cs.len() - 2];
        assert!(parse_codestream(truncated).is_err());
    }
}
