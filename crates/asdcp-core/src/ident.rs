//! Fixed-size identifiers: SMPTE Universal Labels, UUIDs, and UMIDs.
//!
//! - [`Ul`] - 16-byte SMPTE Universal Label, displayed as dotted hex
//! - `Uuid` - RFC 4122 identifier (re-exported from the `uuid` crate)
//! - [`Umid`] - 32-byte SMPTE 330 Unique Material Identifier

use crate::{Error, Result};
use base64::Engine;
use std::fmt;

pub use uuid::Uuid;

/// Length in bytes of a SMPTE Universal Label.
pub const UL_LENGTH: usize = 16;

/// Length in bytes of a UMID.
pub const UMID_LENGTH: usize = 32;

/// A 16-byte SMPTE Universal Label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Ul([u8; UL_LENGTH]);

impl Ul {
    /// Create a UL from its 16 bytes.
    pub const fn new(bytes: [u8; UL_LENGTH]) -> Self {
        Ul(bytes)
    }

    /// Create a UL from a byte slice of exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; UL_LENGTH] = bytes.try_into().map_err(|_| Error::SmallBuf {
            need: UL_LENGTH,
            have: bytes.len(),
        })?;
        Ok(Ul(arr))
    }

    /// The raw label bytes.
    pub fn as_bytes(&self) -> &[u8; UL_LENGTH] {
        &self.0
    }

    /// Compare the leading bytes of the label against a prefix.
    ///
    /// Partition pack keys and essence element keys are families that share
    /// a fixed prefix and vary in the trailing bytes.
    pub fn has_prefix(&self, prefix: &[u8]) -> bool {
        prefix.len() <= UL_LENGTH && self.0[..prefix.len()] == *prefix
    }

    /// The byte at the given position, for key-family dispatch.
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }
}

impl fmt::Display for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ul({self})")
    }
}

impl AsRef<[u8]> for Ul {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// SMPTE 330 basic UMID prefix: universal label identifying a UMID whose
/// material number is a random UUID, followed by the length byte 0x13.
const UMID_PREFIX: [u8; 16] = [
    0x06, 0x0a, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x01, 0x01, 0x0f, 0x20, 0x13, 0x00, 0x00, 0x00,
];

/// A 32-byte SMPTE Unique Material Identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct Umid([u8; UMID_LENGTH]);

impl Umid {
    /// Create a UMID from its 32 bytes.
    pub const fn new(bytes: [u8; UMID_LENGTH]) -> Self {
        Umid(bytes)
    }

    /// Create a UMID from a byte slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; UMID_LENGTH] = bytes.try_into().map_err(|_| Error::SmallBuf {
            need: UMID_LENGTH,
            have: bytes.len(),
        })?;
        Ok(Umid(arr))
    }

    /// Build a basic UMID around the given material number.
    pub fn from_material(material: Uuid) -> Self {
        let mut bytes = [0u8; UMID_LENGTH];
        bytes[..16].copy_from_slice(&UMID_PREFIX);
        bytes[16..].copy_from_slice(material.as_bytes());
        Umid(bytes)
    }

    /// The raw UMID bytes.
    pub fn as_bytes(&self) -> &[u8; UMID_LENGTH] {
        &self.0
    }

    /// The 16-byte material number portion.
    pub fn material(&self) -> Uuid {
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&self.0[16..]);
        Uuid::from_bytes(arr)
    }
}

impl Default for Umid {
    fn default() -> Self {
        Umid([0u8; UMID_LENGTH])
    }
}

impl fmt::Display for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(&self.0))
    }
}

impl fmt::Debug for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Umid({self})")
    }
}

/// Encode bytes as lowercase hexadecimal.
pub fn hex_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[usize::from(b >> 4)] as char);
        out.push(DIGITS[usize::from(b & 0x0f)] as char);
    }
    out
}

/// Decode a hexadecimal string, ignoring ASCII whitespace.
pub fn hex_decode(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() / 2);
    let mut high: Option<u8> = None;

    for c in text.chars() {
        if c.is_ascii_whitespace() {
            continue;
        }
        let nibble = c
            .to_digit(16)
            .ok_or(Error::Param("non-hexadecimal character"))? as u8;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => out.push((h << 4) | nibble),
        }
    }

    if high.is_some() {
        return Err(Error::Param("odd-length hexadecimal string"));
    }
    Ok(out)
}

/// Encode bytes as standard base64.
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode a standard base64 string.
pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|_| Error::Param("invalid base64 string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ul_display_is_dotted_hex() {
        let ul = Ul::new([
            0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x02,
            0x04, 0x00,
        ]);
        assert_eq!(
            ul.to_string(),
            "06.0e.2b.34.02.05.01.01.0d.01.02.01.01.02.04.00"
        );
    }

    #[test]
    fn ul_prefix_match() {
        let ul = Ul::new([
            0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x02,
            0x04, 0x00,
        ]);
        assert!(ul.has_prefix(&[0x06, 0x0e, 0x2b, 0x34]));
        assert!(!ul.has_prefix(&[0x06, 0x0e, 0x2b, 0x35]));
    }

    #[test]
    fn umid_carries_material_number() {
        let material = Uuid::from_bytes([0xab; 16]);
        let umid = Umid::from_material(material);
        assert_eq!(umid.material(), material);
        assert_eq!(&umid.as_bytes()[..12], &UMID_PREFIX[..12]);
        assert_eq!(umid.as_bytes()[12], 0x13);
    }

    #[test]
    fn hex_round_trip() {
        let bytes = [0x00, 0x7f, 0x80, 0xff];
        let text = hex_encode(&bytes);
        assert_eq!(text, "007f80ff");
        assert_eq!(hex_decode(&text).unwrap(), bytes);
    }

    #[test]
    fn hex_decode_rejects_odd_length() {
        assert!(hex_decode("abc").is_err());
    }

    #[test]
    fn base64_round_trip() {
        let bytes = b"essence key material";
        let text = base64_encode(bytes);
        assert_eq!(base64_decode(&text).unwrap(), bytes);
    }
}
