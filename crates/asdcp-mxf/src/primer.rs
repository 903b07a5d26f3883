//! The primer pack: the per-partition table mapping 2-byte local tags to
//! 16-byte property ULs.
//!
//! Tags below 0x8000 are statically reserved for standard properties; tags
//! from 0x8000 up are allocated dynamically in order of first use. Every
//! property tag appearing in a metadata set of the same partition must
//! resolve through this table.

use crate::labels;
use asdcp_core::{Error, MemReader, Result, Ul, UL_LENGTH};
use std::collections::HashMap;

const PRIMER_ITEM_SIZE: u32 = 2 + UL_LENGTH as u32;
const FIRST_DYNAMIC_TAG: u16 = 0x8000;

/// An ordered local-tag table.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct Primer {
    entries: Vec<(u16, Ul)>,
    by_ul: HashMap<Ul, u16>,
    by_tag: HashMap<u16, Ul>,
    next_dynamic: u16,
}

impl Primer {
    pub fn new() -> Self {
        Primer {
            entries: Vec::new(),
            by_ul: HashMap::new(),
            by_tag: HashMap::new(),
            next_dynamic: FIRST_DYNAMIC_TAG,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `ul` to a local tag, inserting it on first use. A non-zero
    /// `static_tag` is used as-is; a zero hint allocates the next dynamic
    /// tag.
    pub fn insert(&mut self, static_tag: u16, ul: &Ul) -> Result<u16> {
        if let Some(&tag) = self.by_ul.get(ul) {
            return Ok(tag);
        }

        let tag = if static_tag != 0 {
            static_tag
        } else {
            let tag = self.next_dynamic;
            self.next_dynamic = self
                .next_dynamic
                .checked_add(1)
                .ok_or_else(|| Error::Format("dynamic local tag space exhausted".into()))?;
            tag
        };

        if self.by_tag.contains_key(&tag) {
            return Err(Error::Format(format!(
                "local tag 0x{tag:04x} assigned to two properties"
            )));
        }

        self.entries.push((tag, *ul));
        self.by_ul.insert(*ul, tag);
        self.by_tag.insert(tag, *ul);
        Ok(tag)
    }

    pub fn tag_for(&self, ul: &Ul) -> Option<u16> {
        self.by_ul.get(ul).copied()
    }

    pub fn ul_for(&self, tag: u16) -> Option<&Ul> {
        self.by_tag.get(&tag)
    }

    /// Serialize the full primer pack KLV.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let value_len = 8 + self.entries.len() * PRIMER_ITEM_SIZE as usize;
        let mut out = Vec::with_capacity(25 + value_len);
        asdcp_core::klv::write_klv_header(&mut out, &labels::PRIMER_PACK, value_len as u64, 0)?;

        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        out.extend_from_slice(&PRIMER_ITEM_SIZE.to_be_bytes());
        for (tag, ul) in &self.entries {
            out.extend_from_slice(&tag.to_be_bytes());
            out.extend_from_slice(ul.as_bytes());
        }
        Ok(out)
    }

    /// Decode a primer pack value region.
    pub fn parse(value: &[u8]) -> Result<Self> {
        let mut reader = MemReader::new(value);
        let count = reader.read_u32()?;
        let item_size = reader.read_u32()?;
        if item_size != PRIMER_ITEM_SIZE {
            return Err(Error::Format(format!(
                "primer item size {item_size}, expected {PRIMER_ITEM_SIZE}"
            )));
        }

        let mut primer = Primer::new();
        for _ in 0..count {
            let tag = reader.read_u16()?;
            let ul = reader.read_ul()?;
            // tolerate duplicate items; first mapping wins
            if primer.by_tag.contains_key(&tag) {
                continue;
            }
            primer.entries.push((tag, ul));
            primer.by_ul.insert(ul, tag);
            primer.by_tag.insert(tag, ul);
            if tag >= FIRST_DYNAMIC_TAG && tag >= primer.next_dynamic {
                primer.next_dynamic = tag.saturating_add(1);
            }
        }
        Ok(primer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::props;

    #[test]
    fn dynamic_tags_allocate_in_first_use_order() {
        let mut primer = Primer::new();
        assert_eq!(
            primer.insert(0, &props::J2K_RSIZE).unwrap(),
            0x8000
        );
        assert_eq!(
            primer.insert(0, &props::J2K_XSIZE).unwrap(),
            0x8001
        );
        assert_eq!(
            primer.insert(0, &props::J2K_YSIZE).unwrap(),
            0x8002
        );
        // repeated insert returns the existing tag
        assert_eq!(
            primer.insert(0, &props::J2K_XSIZE).unwrap(),
            0x8001
        );
    }

    #[test]
    fn static_tags_are_used_verbatim() {
        let mut primer = Primer::new();
        let tag = primer
            .insert(crate::labels::tags::INSTANCE_UID, &props::INSTANCE_UID)
            .unwrap();
        assert_eq!(tag, 0x3c0a);
        assert_eq!(primer.ul_for(0x3c0a), Some(&props::INSTANCE_UID));
        assert_eq!(primer.tag_for(&props::INSTANCE_UID), Some(0x3c0a));
    }

    #[test]
    fn serialize_parse_round_trip() {
        let mut primer = Primer::new();
        primer
            .insert(crate::labels::tags::INSTANCE_UID, &props::INSTANCE_UID)
            .unwrap();
        primer.insert(0, &props::J2K_CSIZE).unwrap();

        let bytes = primer.serialize().unwrap();
        let header =
            asdcp_core::klv::read_klv_header(&mut std::io::Cursor::new(&bytes)).unwrap();
        assert_eq!(header.key, labels::PRIMER_PACK);

        let parsed = Primer::parse(&bytes[header.size..]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.tag_for(&props::J2K_CSIZE), Some(0x8000));
        // dynamic allocation resumes past parsed entries
        let mut parsed = parsed;
        assert_eq!(parsed.insert(0, &props::J2K_XSIZE).unwrap(), 0x8001);
    }

    #[test]
    fn conflicting_static_tags_are_rejected() {
        let mut primer = Primer::new();
        primer.insert(0x3c0a, &props::INSTANCE_UID).unwrap();
        assert!(primer.insert(0x3c0a, &props::GENERATION_UID).is_err());
    }
}
