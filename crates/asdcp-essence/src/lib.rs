//! Essence parsers for MXF wrapping.
//!
//! Each parser turns a raw essence source into the pair the wrapping
//! layer needs: a descriptor for the header metadata and a sequence of
//! frame buffers for the body.
//!
//! - [`jp2k`] - JPEG 2000 codestream walker and file-sequence parser
//! - [`jxs`] - JPEG XS codestream walker and file-sequence parser
//! - [`wav`] - RIFF/WAVE parsing and edit-unit-sized PCM frames

pub mod jp2k;
pub mod jxs;
pub mod wav;
