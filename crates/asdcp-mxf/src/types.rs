//! Shared metadata value types and the local-set wire helpers.
//!
//! A metadata set is a KLV whose value is a run of local tuples: a 2-byte
//! tag, a 2-byte length, and the property value. [`SetWriter`] registers
//! each property UL with the primer as it serializes; [`SetProperties`]
//! holds a parsed tuple run for tolerant, order-preserving decoding.

use crate::primer::Primer;
use asdcp_core::{Error, MemReader, Rational, Result, Ul, Umid, Uuid};
use chrono::{Datelike, Timelike, Utc};

/// An MXF timestamp: year through 1/4-millisecond, 8 bytes on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub quarter_msec: u8,
}

impl Timestamp {
    /// The current UTC time.
    pub fn now() -> Self {
        let now = Utc::now();
        Timestamp {
            year: now.year().clamp(0, u16::MAX as i32) as u16,
            month: now.month() as u8,
            day: now.day() as u8,
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            second: now.second() as u8,
            quarter_msec: (now.timestamp_subsec_millis() / 4) as u8,
        }
    }

    pub fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..2].copy_from_slice(&self.year.to_be_bytes());
        out[2] = self.month;
        out[3] = self.day;
        out[4] = self.hour;
        out[5] = self.minute;
        out[6] = self.second;
        out[7] = self.quarter_msec;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; 8] = bytes.try_into().ok()?;
        Some(Timestamp {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
            hour: bytes[4],
            minute: bytes[5],
            second: bytes[6],
            quarter_msec: bytes[7],
        })
    }
}

/// A 5-part product version: major, minor, patch, build, release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct VersionType(pub [u16; 5]);

impl VersionType {
    pub fn to_bytes(self) -> [u8; 10] {
        let mut out = [0u8; 10];
        for (i, part) in self.0.iter().enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&part.to_be_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; 10] = bytes.try_into().ok()?;
        let mut parts = [0u16; 5];
        for (i, part) in parts.iter_mut().enumerate() {
            *part = u16::from_be_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
        }
        Some(VersionType(parts))
    }
}

/// Which family of labels the file carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelSet {
    /// Pre-2004 MXF Interop labels.
    Interop,
    /// SMPTE 429/2067 labels.
    #[default]
    Smpte,
}

impl LabelSet {
    /// The fill-item key for this label family.
    pub fn fill_key(self) -> Ul {
        match self {
            LabelSet::Interop => crate::labels::KLV_FILL_INTEROP,
            LabelSet::Smpte => crate::labels::KLV_FILL_SMPTE,
        }
    }

    /// The OP-Atom label variant for this family.
    pub fn op_atom(self) -> Ul {
        match self {
            LabelSet::Interop => crate::labels::OP_ATOM_INTEROP,
            LabelSet::Smpte => crate::labels::OP_ATOM_SMPTE,
        }
    }
}

/// Identity and crypto settings stamped into every written file.
#[derive(Clone, Debug)]
#[must_use]
pub struct WriterInfo {
    pub product_uuid: Uuid,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
    pub label_set: LabelSet,
    pub encrypted_essence: bool,
    pub uses_hmac: bool,
    /// MaterialPackage UMID material number.
    pub asset_id: Uuid,
    /// HMAC namespace; fresh per file unless the caller overrides it.
    pub context_id: Uuid,
    /// Identifies the key used for encryption; the key itself is never
    /// stored.
    pub cryptographic_key_id: Uuid,
}

impl Default for WriterInfo {
    fn default() -> Self {
        WriterInfo {
            product_uuid: Uuid::from_bytes([
                0x43, 0x05, 0x9a, 0x1d, 0x04, 0x32, 0x41, 0x01, 0xb8, 0x3f, 0x73, 0x68, 0x15,
                0xac, 0xf3, 0x1d,
            ]),
            company_name: "asdcp-rs project".to_string(),
            product_name: "asdcp-rs".to_string(),
            product_version: env!("CARGO_PKG_VERSION").to_string(),
            label_set: LabelSet::Smpte,
            encrypted_essence: false,
            uses_hmac: false,
            asset_id: Uuid::nil(),
            context_id: Uuid::nil(),
            cryptographic_key_id: Uuid::nil(),
        }
    }
}

/// Serializes one metadata set, registering property ULs with the primer.
#[must_use]
pub struct SetWriter<'p> {
    primer: &'p mut Primer,
    body: Vec<u8>,
}

impl<'p> SetWriter<'p> {
    pub fn new(primer: &'p mut Primer) -> Self {
        SetWriter {
            primer,
            body: Vec::new(),
        }
    }

    /// Append one local tuple, resolving the property UL to a tag.
    pub fn raw(&mut self, static_tag: u16, ul: &Ul, value: &[u8]) -> Result<()> {
        let tag = self.primer.insert(static_tag, ul)?;
        self.raw_tag(tag, value)
    }

    /// Append one local tuple with an already-resolved tag (unknown
    /// properties preserved from a prior parse).
    pub fn raw_tag(&mut self, tag: u16, value: &[u8]) -> Result<()> {
        if value.len() > u16::MAX as usize {
            return Err(Error::Format(format!(
                "property value of {} bytes exceeds local tuple limit",
                value.len()
            )));
        }
        self.body.extend_from_slice(&tag.to_be_bytes());
        self.body.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.body.extend_from_slice(value);
        Ok(())
    }

    pub fn u8(&mut self, tag: u16, ul: &Ul, v: u8) -> Result<()> {
        self.raw(tag, ul, &[v])
    }

    pub fn u16(&mut self, tag: u16, ul: &Ul, v: u16) -> Result<()> {
        self.raw(tag, ul, &v.to_be_bytes())
    }

    pub fn u32(&mut self, tag: u16, ul: &Ul, v: u32) -> Result<()> {
        self.raw(tag, ul, &v.to_be_bytes())
    }

    pub fn u64(&mut self, tag: u16, ul: &Ul, v: u64) -> Result<()> {
        self.raw(tag, ul, &v.to_be_bytes())
    }

    pub fn bool(&mut self, tag: u16, ul: &Ul, v: bool) -> Result<()> {
        self.raw(tag, ul, &[u8::from(v)])
    }

    pub fn ul(&mut self, tag: u16, ul: &Ul, v: &Ul) -> Result<()> {
        self.raw(tag, ul, v.as_bytes())
    }

    pub fn uuid(&mut self, tag: u16, ul: &Ul, v: &Uuid) -> Result<()> {
        self.raw(tag, ul, v.as_bytes())
    }

    pub fn umid(&mut self, tag: u16, ul: &Ul, v: &Umid) -> Result<()> {
        self.raw(tag, ul, v.as_bytes())
    }

    pub fn rational(&mut self, tag: u16, ul: &Ul, v: Rational) -> Result<()> {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&v.num.to_be_bytes());
        bytes[4..].copy_from_slice(&v.den.to_be_bytes());
        self.raw(tag, ul, &bytes)
    }

    /// UTF-16BE string, no terminator.
    pub fn string(&mut self, tag: u16, ul: &Ul, v: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(v.len() * 2);
        for unit in v.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        self.raw(tag, ul, &bytes)
    }

    pub fn timestamp(&mut self, tag: u16, ul: &Ul, v: Timestamp) -> Result<()> {
        self.raw(tag, ul, &v.to_bytes())
    }

    pub fn version(&mut self, tag: u16, ul: &Ul, v: VersionType) -> Result<()> {
        self.raw(tag, ul, &v.to_bytes())
    }

    /// Batch of UUIDs: element count, element size, elements.
    pub fn uuid_batch(&mut self, tag: u16, ul: &Ul, items: &[Uuid]) -> Result<()> {
        let mut bytes = Vec::with_capacity(8 + items.len() * 16);
        bytes.extend_from_slice(&(items.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&16u32.to_be_bytes());
        for item in items {
            bytes.extend_from_slice(item.as_bytes());
        }
        self.raw(tag, ul, &bytes)
    }

    /// Batch of ULs: element count, element size, elements.
    pub fn ul_batch(&mut self, tag: u16, ul: &Ul, items: &[Ul]) -> Result<()> {
        let mut bytes = Vec::with_capacity(8 + items.len() * 16);
        bytes.extend_from_slice(&(items.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&16u32.to_be_bytes());
        for item in items {
            bytes.extend_from_slice(item.as_bytes());
        }
        self.raw(tag, ul, &bytes)
    }

    /// Produce the full set KLV.
    pub fn finish(self, set_key: &Ul) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.body.len() + 20);
        asdcp_core::klv::write_klv_header(&mut out, set_key, self.body.len() as u64, 0)?;
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

/// The parsed local tuples of one set, in wire order.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct SetProperties {
    entries: Vec<(u16, Vec<u8>)>,
}

impl SetProperties {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = MemReader::new(body);
        let mut entries = Vec::new();
        while reader.remaining() >= 4 {
            let tag = reader.read_u16()?;
            let len = reader.read_u16()? as usize;
            let value = reader.read_raw(len)?;
            entries.push((tag, value.to_vec()));
        }
        if reader.remaining() != 0 {
            return Err(Error::Format("truncated local tuple in set".into()));
        }
        Ok(SetProperties { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &[u8])> {
        self.entries.iter().map(|(tag, value)| (*tag, value.as_slice()))
    }

    pub fn get<'a>(&'a self, primer: &Primer, ul: &Ul) -> Option<&'a [u8]> {
        let tag = primer.tag_for(ul)?;
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_slice())
    }

    pub fn get_u8(&self, primer: &Primer, ul: &Ul) -> Option<u8> {
        match self.get(primer, ul)? {
            [v] => Some(*v),
            _ => None,
        }
    }

    pub fn get_u16(&self, primer: &Primer, ul: &Ul) -> Option<u16> {
        let bytes: [u8; 2] = self.get(primer, ul)?.try_into().ok()?;
        Some(u16::from_be_bytes(bytes))
    }

    pub fn get_u32(&self, primer: &Primer, ul: &Ul) -> Option<u32> {
        let bytes: [u8; 4] = self.get(primer, ul)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    pub fn get_u64(&self, primer: &Primer, ul: &Ul) -> Option<u64> {
        let bytes: [u8; 8] = self.get(primer, ul)?.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    pub fn get_bool(&self, primer: &Primer, ul: &Ul) -> Option<bool> {
        self.get_u8(primer, ul).map(|v| v != 0)
    }

    pub fn get_ul(&self, primer: &Primer, ul: &Ul) -> Option<Ul> {
        Ul::from_slice(self.get(primer, ul)?).ok()
    }

    pub fn get_uuid(&self, primer: &Primer, ul: &Ul) -> Option<Uuid> {
        let bytes: [u8; 16] = self.get(primer, ul)?.try_into().ok()?;
        Some(Uuid::from_bytes(bytes))
    }

    pub fn get_umid(&self, primer: &Primer, ul: &Ul) -> Option<Umid> {
        Umid::from_slice(self.get(primer, ul)?).ok()
    }

    pub fn get_rational(&self, primer: &Primer, ul: &Ul) -> Option<Rational> {
        let bytes: [u8; 8] = self.get(primer, ul)?.try_into().ok()?;
        let num = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let den = i32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(Rational::new(num, den))
    }

    pub fn get_string(&self, primer: &Primer, ul: &Ul) -> Option<String> {
        let bytes = self.get(primer, ul)?;
        if bytes.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    pub fn get_timestamp(&self, primer: &Primer, ul: &Ul) -> Option<Timestamp> {
        Timestamp::from_bytes(self.get(primer, ul)?)
    }

    pub fn get_version(&self, primer: &Primer, ul: &Ul) -> Option<VersionType> {
        VersionType::from_bytes(self.get(primer, ul)?)
    }

    pub fn get_uuid_batch(&self, primer: &Primer, ul: &Ul) -> Option<Vec<Uuid>> {
        let bytes = self.get(primer, ul)?;
        parse_batch(bytes, 16)?
            .map(|item| {
                let arr: [u8; 16] = item.try_into().ok()?;
                Some(Uuid::from_bytes(arr))
            })
            .collect()
    }

    pub fn get_ul_batch(&self, primer: &Primer, ul: &Ul) -> Option<Vec<Ul>> {
        let bytes = self.get(primer, ul)?;
        parse_batch(bytes, 16)?
            .map(|item| Ul::from_slice(item).ok())
            .collect()
    }

    /// Tuples whose UL is not in `known` (or not in the primer at all),
    /// preserved verbatim for round-trip rewriting.
    pub fn unknown(&self, primer: &Primer, known: &[Ul]) -> Vec<(u16, Vec<u8>)> {
        self.entries
            .iter()
            .filter(|(tag, _)| match primer.ul_for(*tag) {
                Some(ul) => !known.contains(ul),
                None => true,
            })
            .cloned()
            .collect()
    }
}

/// Unwrap a required property, naming it in the failure.
pub(crate) fn required<T>(value: Option<T>, what: &'static str) -> Result<T> {
    value.ok_or_else(|| Error::Format(format!("missing required property {what}")))
}

/// Iterate the items of a count+size-prefixed batch.
fn parse_batch(bytes: &[u8], expect_size: u32) -> Option<impl Iterator<Item = &[u8]>> {
    if bytes.len() < 8 {
        return None;
    }
    let count = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let size = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if size != expect_size || bytes.len() < 8 + count * size as usize {
        return None;
    }
    Some(bytes[8..8 + count * size as usize].chunks_exact(size as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{props, tags};

    #[test]
    fn tuple_round_trip() {
        let mut primer = Primer::new();
        let mut writer = SetWriter::new(&mut primer);
        writer
            .u32(tags::TRACK_ID, &props::TRACK_ID, 7)
            .unwrap();
        writer
            .string(tags::TRACK_NAME, &props::TRACK_NAME, "Picture Track")
            .unwrap();
        writer
            .rational(tags::EDIT_RATE, &props::EDIT_RATE, Rational::new(24, 1))
            .unwrap();
        let bytes = writer.finish(&crate::labels::TIMELINE_TRACK).unwrap();

        let header =
            asdcp_core::klv::read_klv_header(&mut std::io::Cursor::new(&bytes)).unwrap();
        let props_parsed = SetProperties::parse(&bytes[header.size..]).unwrap();
        assert_eq!(props_parsed.get_u32(&primer, &props::TRACK_ID), Some(7));
        assert_eq!(
            props_parsed.get_string(&primer, &props::TRACK_NAME).as_deref(),
            Some("Picture Track")
        );
        assert_eq!(
            props_parsed.get_rational(&primer, &props::EDIT_RATE),
            Some(Rational::new(24, 1))
        );
    }

    #[test]
    fn unknown_tuples_are_preserved() {
        let mut primer = Primer::new();
        let mut writer = SetWriter::new(&mut primer);
        writer.u32(tags::TRACK_ID, &props::TRACK_ID, 7).unwrap();
        writer.raw_tag(0xfeed, &[1, 2, 3]).unwrap();
        let bytes = writer.finish(&crate::labels::TIMELINE_TRACK).unwrap();

        let header =
            asdcp_core::klv::read_klv_header(&mut std::io::Cursor::new(&bytes)).unwrap();
        let parsed = SetProperties::parse(&bytes[header.size..]).unwrap();
        let unknown = parsed.unknown(&primer, &[props::TRACK_ID]);
        assert_eq!(unknown, vec![(0xfeed, vec![1, 2, 3])]);
    }

    #[test]
    fn batch_round_trip() {
        let ids = vec![Uuid::from_bytes([1; 16]), Uuid::from_bytes([2; 16])];
        let mut primer = Primer::new();
        let mut writer = SetWriter::new(&mut primer);
        writer
            .uuid_batch(tags::TRACKS, &props::TRACKS, &ids)
            .unwrap();
        let bytes = writer.finish(&crate::labels::MATERIAL_PACKAGE).unwrap();

        let header =
            asdcp_core::klv::read_klv_header(&mut std::io::Cursor::new(&bytes)).unwrap();
        let parsed = SetProperties::parse(&bytes[header.size..]).unwrap();
        assert_eq!(parsed.get_uuid_batch(&primer, &props::TRACKS), Some(ids));
    }

    #[test]
    fn timestamp_round_trip() {
        let ts = Timestamp {
            year: 2012,
            month: 3,
            day: 14,
            hour: 15,
            minute: 9,
            second: 26,
            quarter_msec: 53,
        };
        assert_eq!(Timestamp::from_bytes(&ts.to_bytes()), Some(ts));
    }
}
