//! KLV (Key-Length-Value) codec per SMPTE 336.
//!
//! A triplet is a 16-byte UL key, a BER-coded length, and exactly that many
//! value bytes. Lengths are written in the smallest form that fits, with one
//! exception: essence-frame triplets always use the fixed 9-byte long form
//! ([`MXF_BER_LENGTH`]) so a partially written frame can be patched in place
//! by rewriting the length field.

use crate::{Error, Result, Ul, UL_LENGTH};
use std::io::{Read, Write};

/// Fixed BER encoding size used for essence-frame KLV lengths: the
/// `0x87` sentinel plus eight big-endian length bytes.
pub const MXF_BER_LENGTH: usize = 9;

/// The smallest BER encoding size (in total bytes) that fits `value`.
pub fn ber_size_for(value: u64) -> usize {
    if value < 0x80 {
        1
    } else if value <= 0xff {
        2
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Encode a BER length. A `ber_size` of zero selects the smallest form;
/// otherwise it must be 1, 2, 3, 5, or 9 total bytes and large enough for
/// the value.
pub fn encode_ber(value: u64, ber_size: usize) -> Result<Vec<u8>> {
    let size = if ber_size == 0 {
        ber_size_for(value)
    } else {
        ber_size
    };

    if size < ber_size_for(value) {
        return Err(Error::Param("BER length form too small for value"));
    }

    match size {
        1 => Ok(vec![value as u8]),
        2 | 3 | 5 | 9 => {
            let count = size - 1;
            let mut out = Vec::with_capacity(size);
            out.push(0x80 | count as u8);
            out.extend_from_slice(&value.to_be_bytes()[8 - count..]);
            Ok(out)
        }
        _ => Err(Error::Param("invalid BER length form")),
    }
}

/// Decode a BER length from the front of `bytes`, returning the value and
/// the number of bytes consumed.
pub fn decode_ber(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut reader = crate::MemReader::new(bytes);
    let value = reader.read_ber()?;
    Ok((value, reader.position()))
}

/// The key and length of a KLV triplet, without its value bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct KlvHeader {
    pub key: Ul,
    /// Length of the value region in bytes.
    pub length: u64,
    /// Bytes occupied by the key and length fields together.
    pub size: usize,
}

/// Read a KLV key and length from the stream, leaving the cursor at the
/// first value byte. The value itself is not read, enabling streaming over
/// large essence triplets.
pub fn read_klv_header<R: Read>(reader: &mut R) -> Result<KlvHeader> {
    let mut key_buf = [0u8; UL_LENGTH];
    read_exact_mapped(reader, &mut key_buf)?;
    let key = Ul::new(key_buf);

    let mut first = [0u8; 1];
    read_exact_mapped(reader, &mut first)?;

    if first[0] & 0x80 == 0 {
        return Ok(KlvHeader {
            key,
            length: u64::from(first[0]),
            size: UL_LENGTH + 1,
        });
    }

    let count = (first[0] & 0x7f) as usize;
    if count == 0 || count > 8 {
        return Err(Error::MalformedBer);
    }

    let mut len_buf = [0u8; 8];
    read_exact_mapped(reader, &mut len_buf[..count])?;
    let mut length = 0u64;
    for &b in &len_buf[..count] {
        length = (length << 8) | u64::from(b);
    }

    Ok(KlvHeader {
        key,
        length,
        size: UL_LENGTH + 1 + count,
    })
}

fn read_exact_mapped<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::EndOfFile
        } else {
            Error::ReadFail(e)
        }
    })
}

/// Write a KLV key and length, returning the number of header bytes.
pub fn write_klv_header<W: Write>(
    writer: &mut W,
    key: &Ul,
    length: u64,
    ber_size: usize,
) -> Result<usize> {
    let encoded = encode_ber(length, ber_size)?;
    writer.write_all(key.as_bytes()).map_err(Error::WriteFail)?;
    writer.write_all(&encoded).map_err(Error::WriteFail)?;
    Ok(UL_LENGTH + encoded.len())
}

/// Write a filler KLV of exactly `total_size` bytes including its key and
/// length fields. Fillers align subsequent data to KAG boundaries and pad
/// reserved header space.
pub fn write_fill_klv<W: Write>(writer: &mut W, key: &Ul, total_size: usize) -> Result<()> {
    if total_size < UL_LENGTH + 1 {
        return Err(Error::Param("filler KLV requires at least 17 bytes"));
    }

    let value_len = if total_size - (UL_LENGTH + 1) <= 0x7f {
        let value_len = total_size - (UL_LENGTH + 1);
        write_klv_header(writer, key, value_len as u64, 1)?;
        value_len
    } else {
        let value_len = total_size - (UL_LENGTH + 5);
        write_klv_header(writer, key, value_len as u64, 5)?;
        value_len
    };

    let zeros = [0u8; 512];
    let mut remaining = value_len;
    while remaining > 0 {
        let n = remaining.min(zeros.len());
        writer.write_all(&zeros[..n]).map_err(Error::WriteFail)?;
        remaining -= n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEST_KEY: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x15, 0x01, 0x08,
        0x01,
    ]);

    #[test]
    fn smallest_form_is_chosen() {
        assert_eq!(encode_ber(0x7f, 0).unwrap(), vec![0x7f]);
        assert_eq!(encode_ber(0x80, 0).unwrap(), vec![0x81, 0x80]);
        assert_eq!(encode_ber(0x1234, 0).unwrap(), vec![0x82, 0x12, 0x34]);
        assert_eq!(
            encode_ber(0x0001_0000, 0).unwrap(),
            vec![0x84, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(encode_ber(u64::MAX, 0).unwrap().len(), 9);
    }

    #[test]
    fn fixed_essence_form_is_nine_bytes() {
        let encoded = encode_ber(100, MXF_BER_LENGTH).unwrap();
        assert_eq!(encoded.len(), 9);
        assert_eq!(encoded[0], 0x88);
        assert_eq!(decode_ber(&encoded).unwrap(), (100, 9));
    }

    #[test]
    fn too_small_form_is_rejected() {
        assert!(encode_ber(0x80, 1).is_err());
        assert!(encode_ber(0x1_0000, 3).is_err());
    }

    #[test]
    fn klv_header_round_trip() {
        let mut buf = Vec::new();
        let size = write_klv_header(&mut buf, &TEST_KEY, 12000, MXF_BER_LENGTH).unwrap();
        assert_eq!(size, 25);

        let header = read_klv_header(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(header.key, TEST_KEY);
        assert_eq!(header.length, 12000);
        assert_eq!(header.size, 25);
    }

    #[test]
    fn truncated_header_is_end_of_file() {
        let mut buf = Vec::new();
        write_klv_header(&mut buf, &TEST_KEY, 7, 0).unwrap();
        buf.truncate(10);
        assert!(matches!(
            read_klv_header(&mut Cursor::new(&buf)),
            Err(Error::EndOfFile)
        ));
    }

    #[test]
    fn fill_klv_produces_exact_size() {
        for total in [17usize, 20, 144, 145, 16384] {
            let mut buf = Vec::new();
            write_fill_klv(&mut buf, &TEST_KEY, total).unwrap();
            assert_eq!(buf.len(), total, "total {total}");

            let header = read_klv_header(&mut Cursor::new(&buf)).unwrap();
            assert_eq!(header.size as u64 + header.length, total as u64);
        }
    }

    #[test]
    fn fill_klv_rejects_undersize() {
        let mut buf = Vec::new();
        assert!(write_fill_klv(&mut buf, &TEST_KEY, 16).is_err());
    }
}
