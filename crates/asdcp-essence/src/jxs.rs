//! JPEG XS codestream parser.
//!
//! Walks the capability and picture headers of a JXS codestream:
//!
//! - `SOC` must open the stream, exactly once
//! - `PIH` supplies dimensions, profile/level, and the fixed coding
//!   parameters the wrapper insists on (`Ng = 4`, `Ss = 8`, `Nly <= 1`)
//! - `CDT` supplies per-component bit depth and subsampling, preserved
//!   verbatim (with its marker prefix) for the picture sub-descriptor
//! - `SLH` starts the entropy-coded slices and marks the plaintext-offset
//!   boundary for encryption

use asdcp_core::{Error, FrameBuffer, MemReader, Rational, Result};
use std::path::Path;
use tracing::error;

/// Codestream marker codes.
pub mod markers {
    /// Start of codestream.
    pub const SOC: u16 = 0xff10;
    /// End of codestream.
    pub const EOC: u16 = 0xff11;
    /// Picture header.
    pub const PIH: u16 = 0xff12;
    /// Component table.
    pub const CDT: u16 = 0xff13;
    /// Weights table.
    pub const WGT: u16 = 0xff14;
    /// Extension marker.
    pub const COM: u16 = 0xff15;
    /// Nonlinearity marker.
    pub const NLT: u16 = 0xff16;
    /// Slice header.
    pub const SLH: u16 = 0xff20;
    /// Capabilities marker.
    pub const CAP: u16 = 0xff50;
}

/// Number of image components the wrapper accepts.
pub const REQUIRED_COMPONENTS: u8 = 3;

const MAX_COMPONENT_TABLE: usize = 8;

/// Per-component precision and subsampling from the CDT marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageComponent {
    pub bc: u8,
    pub sx: u8,
    pub sy: u8,
}

/// Picture parameters extracted from the PIH and CDT markers.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct PictureDescriptor {
    pub edit_rate: Rational,
    pub sample_rate: Rational,
    pub container_duration: u32,
    pub stored_width: u32,
    pub stored_height: u32,
    pub aspect_ratio: Rational,
    /// Profile identifier (Ppih).
    pub ppih: u16,
    /// Level identifier (Plev).
    pub plev: u16,
    pub wf: u16,
    pub hf: u16,
    pub cw: u16,
    /// Slice height in lines.
    pub hsl: u16,
    pub nc: u8,
    pub ng: u8,
    pub ss: u8,
    /// The component table as stored in the sub-descriptor: the CDT marker
    /// prefix and size followed by `(Bc, Sx<<4|Sy)` per component.
    pub component_table: Vec<u8>,
}

struct Marker<'a> {
    kind: u16,
    data: &'a [u8],
}

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
    if matches!(kind, markers::SOC | markers::EOC) {
        return Ok((Marker { kind, data: &[] }, pos + 2));
    }

    if pos + 4 > buf.len() {
        return Err(Error::RawFormat("truncated marker segment".into()));
    }
    let seg_len = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]) as usize;
    if seg_len < 2 || pos + 2 + seg_len > buf.len() {
        return Err(Error::RawFormat(format!(
            "illegal segment length {seg_len} for marker 0x{kind:04x}"
        )));
    }

    let data = &buf[pos + 4..pos + 2 + seg_len];
    Ok((Marker { kind, data }, pos + 2 + seg_len))
}

fn parse_pih(data: &[u8], desc: &mut PictureDescriptor) -> Result<()> {
    let mut r = MemReader::new(data);
    let _lcod = r.read_u32()?;
    desc.ppih = r.read_u16()?;
    desc.plev = r.read_u16()?;
    desc.wf = r.read_u16()?;
    desc.hf = r.read_u16()?;
    desc.cw = r.read_u16()?;
    desc.hsl = r.read_u16()?;
    desc.nc = r.read_u8()?;
    desc.ng = r.read_u8()?;
    desc.ss = r.read_u8()?;
    let _bw = r.read_u8()?;
    let _fq_br = r.read_u8()?;
    let _fslc_ppoc_cpih = r.read_u8()?;
    let nlx_nly = r.read_u8()?;

    desc.stored_width = u32::from(desc.wf);
    desc.stored_height = u32::from(desc.hf);
    desc.aspect_ratio = Rational::new(i32::from(desc.wf), i32::from(desc.hf));

    if desc.nc != REQUIRED_COMPONENTS {
        error!("unexpected number of components: {}", desc.nc);
        return Err(Error::RawFormat(format!(
            "expected {REQUIRED_COMPONENTS} components, found {}",
            desc.nc
        )));
    }
    if desc.ng != 4 {
        return Err(Error::RawFormat(
            "coefficients per coding group must be 4".into(),
        ));
    }
    if desc.ss != 8 {
        return Err(Error::RawFormat(
            "coding groups per significance group must be 8".into(),
        ));
    }
    if desc.hsl == 0 {
        error!("unsupported slice height: must be > 0 and < 65536");
        return Err(Error::RawFormat("slice height of zero".into()));
    }

    let nlx = nlx_nly >> 4;
    let nly = nlx_nly & 0x0f;
    if nlx == 0 {
        return Err(Error::RawFormat(
            "horizontal decomposition levels must be > 0".into(),
        ));
    }
    if nly > 1 {
        return Err(Error::RawFormat(
            "vertical decomposition levels must be <= 1".into(),
        ));
    }
    Ok(())
}

/// Parse codestream metadata, returning the descriptor and the plaintext
/// offset (the first byte of entropy-coded slice data).
pub fn parse_codestream(buf: &[u8]) -> Result<(PictureDescriptor, usize)> {
    let mut desc = PictureDescriptor::default();
    let mut pos = 0usize;
    let mut have_soc = false;
    let mut have_pih = false;
    let mut components = [ImageComponent::default(); MAX_COMPONENT_TABLE];
    let mut plaintext_offset = None;

    while pos < buf.len() {
        let (marker, next) = next_marker(buf, pos)?;

        match marker.kind {
            markers::SOC => {
                if have_soc {
                    return Err(Error::RawFormat("duplicate SOC marker".into()));
                }
                have_soc = true;
            }
            markers::EOC => {
                error!("EOC before any picture data");
            }
            markers::PIH => {
                if !have_soc {
                    return Err(Error::RawFormat(
                        "SOC marker missing at start of frame".into(),
                    ));
                }
                if have_pih {
                    return Err(Error::RawFormat("duplicate picture header".into()));
                }
                have_pih = true;
                parse_pih(marker.data, &mut desc)?;
            }
            markers::CDT => {
                if !have_pih {
                    return Err(Error::RawFormat(
                        "component table before picture header".into(),
                    ));
                }
                let count = (marker.data.len() / 2).min(usize::from(desc.nc));
                for (i, component) in components.iter_mut().take(count).enumerate() {
                    component.bc = marker.data[i * 2];
                    component.sx = marker.data[i * 2 + 1] >> 4;
                    component.sy = marker.data[i * 2 + 1] & 0x0f;
                }
            }
            markers::SLH => {
                plaintext_offset = Some(next);
                break;
            }
            _ => {}
        }

        pos = next;
    }

    if !have_pih {
        return Err(Error::RawFormat("no picture header in codestream".into()));
    }
    let plaintext_offset = plaintext_offset
        .ok_or_else(|| Error::RawFormat("no slice header before end of data".into()))?;

    // component table as carried by the sub-descriptor, marker prefix included
    let comps = usize::from(desc.nc).min(MAX_COMPONENT_TABLE);
    let mut table = Vec::with_capacity(4 + comps * 2);
    table.extend_from_slice(&[0xff, 0x13, 0x00, (comps * 2 + 2) as u8]);
    for component in &components[..comps] {
        table.push(component.bc);
        table.push((component.sx << 4) | component.sy);
    }
    desc.component_table = table;

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

    pub fn open_read_frame(&mut self, path: &Path, frame: &mut FrameBuffer) -> Result<()> {
        let data = std::fs::read(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
        if frame.capacity() < data.len() {
            return Err(Error::SmallBuf {
                need: data.len(),
                have: frame.capacity(),
            });
        }
        frame.set_data(&data)?;

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
    pub fn open_read(files: Vec<std::path::PathBuf>, pedantic: bool) -> Result<Self> {
        let first = files
            .first()
            .ok_or(Error::Param("empty codestream sequence"))?;

        let data =
            std::fs::read(first).map_err(|_| Error::FileOpen(first.display().to_string()))?;
        let (mut descriptor, _) = parse_codestream(&data)?;

        if pedantic {
            for path in &files[1..] {
                let data =
                    std::fs::read(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
                let (other, _) = parse_codestream(&data)?;
                if other.wf != descriptor.wf
                    || other.hf != descriptor.hf
                    || other.component_table != descriptor.component_table
                {
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal codestream: SOC, PIH, CDT, SLH, then payload.
    pub(crate) fn synthetic_codestream(width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
        let mut cs = vec![0xff, 0x10]; // SOC

        // PIH: 26 bytes total including the length field
        cs.extend_from_slice(&[0xff, 0x12]);
        cs.extend_from_slice(&26u16.to_be_bytes());
        cs.extend_from_slice(&1024u32.to_be_bytes()); // Lcod
        cs.extend_from_slice(&0x1500u16.to_be_bytes()); // Ppih
        cs.extend_from_slice(&0x2040u16.to_be_bytes()); // Plev
        cs.extend_from_slice(&width.to_be_bytes());
        cs.extend_from_slice(&height.to_be_bytes());
        cs.extend_from_slice(&width.to_be_bytes()); // Cw
        cs.extend_from_slice(&16u16.to_be_bytes()); // Hsl
        cs.push(3); // Nc
        cs.push(4); // Ng
        cs.push(8); // Ss
        cs.push(8); // Bw
        cs.push(0x08); // Fq/Br
        cs.push(0x00); // Fslc/Ppoc/Cpih
        cs.push(0x51); // Nlx=5, Nly=1
        cs.push(0x00); // Lh/Rl/Qpih/Fs/Rm

        // CDT: 2 bytes per component
        cs.extend_from_slice(&[0xff, 0x13]);
        cs.extend_from_slice(&8u16.to_be_bytes());
        for _ in 0..3 {
            cs.extend_from_slice(&[0x0a, 0x11]); // 10-bit, 1x1 sampling
        }

        // SLH: slice 0
        cs.extend_from_slice(&[0xff, 0x20]);
        cs.extend_from_slice(&4u16.to_be_bytes());
        cs.extend_from_slice(&0u16.to_be_bytes());

        cs.extend_from_slice(payload);
        cs
    }

    #[test]
    fn parses_picture_header() {
        let cs = synthetic_codestream(1920, 1080, &[0x55; 32]);
        let (desc, offset) = parse_codestream(&cs).unwrap();
        assert_eq!(desc.stored_width, 1920);
        assert_eq!(desc.stored_height, 1080);
        assert_eq!(desc.hsl, 16);
        assert_eq!(desc.nc, 3);
        assert_eq!(
            desc.component_table,
            vec![0xff, 0x13, 0x00, 0x08, 0x0a, 0x11, 0x0a, 0x11, 0x0a, 0x11]
        );
        assert_eq!(offset, cs.len() - 32);
        assert_eq!(cs[offset], 0x55);
    }

    #[test]
    fn rejects_duplicate_picture_header() {
        let cs = synthetic_codestream(64, 64, &[]);
        // splice a second copy of the 28-byte PIH segment after the first
        let pih = &cs[2..30];
        let mut bad = cs[..30].to_vec();
        bad.extend_from_slice(pih);
        bad.extend_from_slice(&cs[30..]);
        assert!(matches!(parse_codestream(&bad), Err(Error::RawFormat(_))));
    }

    #[test]
    fn rejects_component_table_before_picture_header() {
        let mut cs = vec![0xff, 0x10]; // SOC
        cs.extend_from_slice(&[0xff, 0x13, 0x00, 0x04, 0x0a, 0x11]);
        assert!(matches!(parse_codestream(&cs), Err(Error::RawFormat(_))));
    }

    #[test]
    fn rejects_bad_coding_group_parameters() {
        let mut cs = synthetic_codestream(64, 64, &[0; 4]);
        // Ng byte is 17 bytes into the PIH data
        let ng_at = 2 + 4 + 17;
        cs[ng_at] = 5;
        assert!(matches!(parse_codestream(&cs), Err(Error::RawFormat(_))));
    }
}
