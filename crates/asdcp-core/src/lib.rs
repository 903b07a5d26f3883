//! Core types for AS-DCP/AS-02 MXF essence wrapping.
//!
//! This crate provides the low-level primitives shared by every other layer:
//!
//! - [`Error`] / [`Result`] - the shared error taxonomy
//! - [`FrameBuffer`] - the per-frame byte-region contract
//! - [`Ul`], [`Uuid`], [`Umid`] - fixed-size identifiers with hex/base64 codecs
//! - [`Rational`] - edit rates, sample rates, aspect ratios
//! - [`MemReader`] / [`MemWriter`] - bounds-checked big-endian cursors
//! - [`klv`] - the SMPTE 336 Key-Length-Value codec
//! - [`timecode`] - timecode-to-frame-count conversion
//!
//! # Example
//!
//! ```
//! use asdcp_core::klv;
//!
//! // The smallest BER form is chosen on encode...
//! assert_eq!(klv::encode_ber(100, 0).unwrap(), vec![0x64]);
//! // ...except essence frames, which use the fixed 9-byte form.
//! let long = klv::encode_ber(100, klv::MXF_BER_LENGTH).unwrap();
//! assert_eq!(long.len(), 9);
//! assert_eq!(klv::decode_ber(&long).unwrap(), (100, 9));
//! ```

mod buffer;
mod error;
pub mod ident;
pub mod klv;
mod memio;
pub mod rational;
pub mod timecode;

pub use buffer::{FrameBuffer, MIC_LENGTH};
pub use error::{Error, Result};
pub use ident::{Ul, Umid, Uuid, UL_LENGTH, UMID_LENGTH};
pub use memio::{MemReader, MemWriter};
pub use rational::Rational;

use std::io::{Read, Seek};

/// Combined trait for seekable byte sources (needed for trait objects).
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}
