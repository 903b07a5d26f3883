//! Bounds-checked big-endian cursors over caller-owned buffers.
//!
//! Every operation either completes fully or fails without advancing the
//! cursor; there is no partial success. Multi-byte integers are big-endian
//! per SMPTE 377.

use crate::{Error, Result, Ul, UL_LENGTH};

/// Read cursor over a borrowed byte slice.
#[must_use]
pub struct MemReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> MemReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        MemReader { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::SmallBuf {
                need: self.pos + len,
                have: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Decode a BER length at the cursor: a single byte below 0x80, or
    /// `0x80|k` followed by `k` big-endian bytes. Fails with `MalformedBer`
    /// on `k == 0` or `k > 8`.
    pub fn read_ber(&mut self) -> Result<u64> {
        let start = self.pos;
        let first = self.read_u8()?;
        if first & 0x80 == 0 {
            return Ok(u64::from(first));
        }

        let count = (first & 0x7f) as usize;
        if count == 0 || count > 8 {
            self.pos = start;
            return Err(Error::MalformedBer);
        }

        match self.take(count) {
            Ok(bytes) => {
                let mut value = 0u64;
                for &b in bytes {
                    value = (value << 8) | u64::from(b);
                }
                Ok(value)
            }
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    pub fn read_ul(&mut self) -> Result<Ul> {
        Ul::from_slice(self.take(UL_LENGTH)?)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len)?;
        Ok(())
    }
}

/// Write cursor over a borrowed mutable byte slice.
#[must_use]
pub struct MemWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> MemWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        MemWriter { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        if self.remaining() < bytes.len() {
            return Err(Error::SmallBuf {
                need: self.pos + bytes.len(),
                have: self.buf.len(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.put(&[v])
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.put(&v.to_be_bytes())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.put(&v.to_be_bytes())
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.put(&v.to_be_bytes())
    }

    /// Encode a BER length. `ber_size` of zero selects the smallest form
    /// that fits; otherwise it must be one of the fixed encodings produced
    /// by [`crate::klv::ber_size_for`].
    pub fn write_ber(&mut self, value: u64, ber_size: usize) -> Result<()> {
        let encoded = crate::klv::encode_ber(value, ber_size)?;
        self.put(&encoded)
    }

    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)
    }

    pub fn write_ul(&mut self, ul: &Ul) -> Result<()> {
        self.put(ul.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_integers_big_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut r = MemReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
        assert_eq!(r.read_u8().unwrap(), 0x07);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn overrun_fails_without_advancing() {
        let data = [0x01, 0x02];
        let mut r = MemReader::new(&data);
        assert!(r.read_u32().is_err());
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn ber_short_and_long_forms() {
        let mut r = MemReader::new(&[0x7f]);
        assert_eq!(r.read_ber().unwrap(), 0x7f);

        let mut r = MemReader::new(&[0x83, 0x01, 0x02, 0x03]);
        assert_eq!(r.read_ber().unwrap(), 0x01_0203);
    }

    #[test]
    fn ber_rejects_reserved_forms() {
        // k = 0
        let mut r = MemReader::new(&[0x80]);
        assert!(matches!(r.read_ber(), Err(Error::MalformedBer)));

        // k > 8
        let mut r = MemReader::new(&[0x89, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert!(matches!(r.read_ber(), Err(Error::MalformedBer)));

        // truncated long form
        let mut r = MemReader::new(&[0x84, 0x00, 0x01]);
        assert!(r.read_ber().is_err());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn writer_round_trip() {
        let mut buf = [0u8; 32];
        let mut w = MemWriter::new(&mut buf);
        w.write_u16(0xbeef).unwrap();
        w.write_u64(42).unwrap();
        w.write_ber(200, 0).unwrap();
        let written = w.len();

        let mut r = MemReader::new(&buf[..written]);
        assert_eq!(r.read_u16().unwrap(), 0xbeef);
        assert_eq!(r.read_u64().unwrap(), 42);
        assert_eq!(r.read_ber().unwrap(), 200);
    }

    #[test]
    fn writer_overrun_is_total() {
        let mut buf = [0u8; 3];
        let mut w = MemWriter::new(&mut buf);
        assert!(w.write_u32(1).is_err());
        assert_eq!(w.len(), 0);
        w.write_u16(7).unwrap();
    }
}
