//! Per-essence facades for AS-DCP and AS-02 MXF wrapping.
//!
//! Each essence type gets a writer and a reader over the same contract:
//! `open_write` / `write_frame` / `finalize`, and `open_read` /
//! `read_frame`. Frames travel in [`FrameBuffer`]s; encryption and
//! integrity are opt-in per call via [`CbcEncryptor`] / [`CbcDecryptor`]
//! and [`HmacContext`].
//!
//! - [`jp2k`] - JPEG 2000 picture, mono and stereoscopic (OP-Atom)
//! - [`pcm`] - linear PCM audio, incl. multi-WAV multiplexing (OP-Atom)
//! - [`timed_text`] - D-Cinema timed text with ancillary resources
//! - [`dcdata`] - D-Cinema auxiliary data, incl. Atmos flavor
//! - [`phdr`] - JPEG 2000 with Prosumer HDR per-frame metadata
//! - [`as_02`] - the AS-02 (OP-1a) variants: JP2K, JPEG XS, PCM

pub mod as_02;
pub mod dcdata;
pub mod jp2k;
pub mod pcm;
pub mod phdr;
pub mod timed_text;

pub use asdcp_core::{Error, FrameBuffer, Rational, Result, Ul, Umid, Uuid};
pub use asdcp_crypto::{
    configure, make_uuid, CbcDecryptor, CbcEncryptor, FortunaRng, HmacContext, SeedSource,
};
pub use asdcp_mxf::{LabelSet, WriterInfo, DEFAULT_HEADER_RESERVE};

/// Options recognized by every facade operation.
#[derive(Clone, Debug)]
#[must_use]
pub struct Options {
    /// Bytes of filler reserved in the header for rewrite at finalize.
    pub header_reserve: u32,
    /// Frame rate; required for timed text, overrides the parsed rate
    /// elsewhere.
    pub edit_rate: Option<Rational>,
    /// On sequence open, validate every frame's descriptor against the
    /// first.
    pub pedantic: bool,
    /// Treat JP2K frames as left/right pairs (stereoscopic facades).
    pub stereo: bool,
    /// Interop vs SMPTE label variants.
    pub label_set: LabelSet,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            header_reserve: DEFAULT_HEADER_RESERVE,
            edit_rate: None,
            pedantic: false,
            stereo: false,
            label_set: LabelSet::Smpte,
        }
    }
}

/// Essence track number derived from an element key's trailing bytes.
pub(crate) fn track_number_of(element: &asdcp_core::Ul) -> u32 {
    let bytes = element.as_bytes();
    u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]])
}
