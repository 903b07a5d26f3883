//! Index table segments: the per-edit-unit map from frame number to byte
//! offset within the essence stream.
//!
//! Two shapes exist. Constant-bytes-per-element essence (PCM) uses a CBR
//! segment carrying only `EditUnitByteCount`; variable essence (JP2K, JXS,
//! timed text) uses VBR segments with one entry per edit unit. `lookup` is
//! uniform over both.

use crate::labels;
use asdcp_core::{klv, Error, MemReader, Rational, Result, Uuid};

/// Per-edit-unit index entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct IndexEntry {
    pub temporal_offset: i8,
    pub key_frame_offset: i8,
    pub flags: u8,
    /// Byte offset of the essence KLV, relative to the start of the
    /// essence stream (body offset space).
    pub stream_offset: u64,
}

/// Random-access flag: every frame of the supported essence types is
/// independently decodable.
const FLAG_RANDOM_ACCESS: u8 = 0x80;

const ENTRY_SIZE: u32 = 11;

/// Local tags for index segment properties (static per SMPTE 377).
mod tags {
    pub const INSTANCE_UID: u16 = 0x3c0a;
    pub const INDEX_EDIT_RATE: u16 = 0x3f0b;
    pub const INDEX_START_POSITION: u16 = 0x3f0c;
    pub const INDEX_DURATION: u16 = 0x3f0d;
    pub const EDIT_UNIT_BYTE_COUNT: u16 = 0x3f05;
    pub const INDEX_SID: u16 = 0x3f06;
    pub const BODY_SID: u16 = 0x3f07;
    pub const SLICE_COUNT: u16 = 0x3f08;
    pub const INDEX_ENTRY_ARRAY: u16 = 0x3f0a;
}

/// Entries per serialized VBR segment, bounded by the 2-byte local tuple
/// length (65535 / 11 entries).
pub const MAX_ENTRIES_PER_SEGMENT: usize = 5000;

#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct IndexTableSegment {
    pub instance_uid: Uuid,
    pub index_edit_rate: Rational,
    pub index_start_position: u64,
    pub index_duration: u64,
    /// Non-zero for CBR segments; zero selects the entry array.
    pub edit_unit_byte_count: u32,
    pub index_sid: u32,
    pub body_sid: u32,
    pub slice_count: u8,
    pub entries: Vec<IndexEntry>,
}

impl IndexTableSegment {
    /// A CBR segment covering `duration` edit units of fixed size.
    pub fn cbr(
        instance_uid: Uuid,
        index_edit_rate: Rational,
        index_sid: u32,
        body_sid: u32,
        edit_unit_byte_count: u32,
        duration: u64,
    ) -> Self {
        IndexTableSegment {
            instance_uid,
            index_edit_rate,
            index_start_position: 0,
            index_duration: duration,
            edit_unit_byte_count,
            index_sid,
            body_sid,
            slice_count: 0,
            entries: Vec::new(),
        }
    }

    /// A VBR segment starting at edit unit `start`.
    pub fn vbr(
        instance_uid: Uuid,
        index_edit_rate: Rational,
        index_sid: u32,
        body_sid: u32,
        start: u64,
        entries: Vec<IndexEntry>,
    ) -> Self {
        IndexTableSegment {
            instance_uid,
            index_edit_rate,
            index_start_position: start,
            index_duration: entries.len() as u64,
            edit_unit_byte_count: 0,
            index_sid,
            body_sid,
            slice_count: 0,
            entries,
        }
    }

    /// Serialize the full segment KLV. Index segments use only static
    /// tags, so no primer is involved.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        let mut tuple = |tag: u16, value: &[u8]| {
            body.extend_from_slice(&tag.to_be_bytes());
            body.extend_from_slice(&(value.len() as u16).to_be_bytes());
            body.extend_from_slice(value);
        };

        tuple(tags::INSTANCE_UID, self.instance_uid.as_bytes());
        let mut rate = [0u8; 8];
        rate[..4].copy_from_slice(&self.index_edit_rate.num.to_be_bytes());
        rate[4..].copy_from_slice(&self.index_edit_rate.den.to_be_bytes());
        tuple(tags::INDEX_EDIT_RATE, &rate);
        tuple(
            tags::INDEX_START_POSITION,
            &self.index_start_position.to_be_bytes(),
        );
        tuple(tags::INDEX_DURATION, &self.index_duration.to_be_bytes());
        tuple(
            tags::EDIT_UNIT_BYTE_COUNT,
            &self.edit_unit_byte_count.to_be_bytes(),
        );
        tuple(tags::INDEX_SID, &self.index_sid.to_be_bytes());
        tuple(tags::BODY_SID, &self.body_sid.to_be_bytes());
        tuple(tags::SLICE_COUNT, &[self.slice_count]);

        if !self.entries.is_empty() {
            if self.entries.len() > MAX_ENTRIES_PER_SEGMENT {
                return Err(Error::Format(format!(
                    "index segment of {} entries exceeds the per-segment limit",
                    self.entries.len()
                )));
            }
            let mut array = Vec::with_capacity(8 + self.entries.len() * ENTRY_SIZE as usize);
            array.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
            array.extend_from_slice(&ENTRY_SIZE.to_be_bytes());
            for entry in &self.entries {
                array.push(entry.temporal_offset as u8);
                array.push(entry.key_frame_offset as u8);
                array.push(entry.flags);
                array.extend_from_slice(&entry.stream_offset.to_be_bytes());
            }
            tuple(tags::INDEX_ENTRY_ARRAY, &array);
        }

        let mut out = Vec::with_capacity(body.len() + 20);
        klv::write_klv_header(&mut out, &labels::INDEX_TABLE_SEGMENT, body.len() as u64, 0)?;
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode a segment value region.
    pub fn parse(value: &[u8]) -> Result<Self> {
        let mut segment = IndexTableSegment::default();
        let mut reader = MemReader::new(value);

        while reader.remaining() >= 4 {
            let tag = reader.read_u16()?;
            let len = reader.read_u16()? as usize;
            let bytes = reader.read_raw(len)?;
            let mut field = MemReader::new(bytes);

            match tag {
                tags::INSTANCE_UID => {
                    let arr: [u8; 16] = bytes
                        .try_into()
                        .map_err(|_| Error::Format("bad InstanceUID length".into()))?;
                    segment.instance_uid = Uuid::from_bytes(arr);
                }
                tags::INDEX_EDIT_RATE => {
                    let num = field.read_u32()? as i32;
                    let den = field.read_u32()? as i32;
                    segment.index_edit_rate = Rational::new(num, den);
                }
                tags::INDEX_START_POSITION => segment.index_start_position = field.read_u64()?,
                tags::INDEX_DURATION => segment.index_duration = field.read_u64()?,
                tags::EDIT_UNIT_BYTE_COUNT => segment.edit_unit_byte_count = field.read_u32()?,
                tags::INDEX_SID => segment.index_sid = field.read_u32()?,
                tags::BODY_SID => segment.body_sid = field.read_u32()?,
                tags::SLICE_COUNT => segment.slice_count = field.read_u8()?,
                tags::INDEX_ENTRY_ARRAY => {
                    let count = field.read_u32()? as usize;
                    let size = field.read_u32()?;
                    if size != ENTRY_SIZE {
                        return Err(Error::Format(format!(
                            "index entry size {size}, expected {ENTRY_SIZE}"
                        )));
                    }
                    let mut entries = Vec::with_capacity(count);
                    for _ in 0..count {
                        entries.push(IndexEntry {
                            temporal_offset: field.read_u8()? as i8,
                            key_frame_offset: field.read_u8()? as i8,
                            flags: field.read_u8()?,
                            stream_offset: field.read_u64()?,
                        });
                    }
                    segment.entries = entries;
                }
                _ => {}
            }
        }

        Ok(segment)
    }
}

/// All index segments of one essence stream, ordered by start position.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct IndexTable {
    segments: Vec<IndexTableSegment>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: IndexTableSegment) {
        self.segments.push(segment);
        self.segments
            .sort_by_key(|s| s.index_start_position);
    }

    pub fn segments(&self) -> &[IndexTableSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Indexed duration in edit units.
    pub fn duration(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| s.index_start_position + s.index_duration)
            .max()
            .unwrap_or(0)
    }

    /// The stream offset of edit unit `n`. `EndOfFile` past the indexed
    /// duration.
    pub fn lookup(&self, n: u64) -> Result<u64> {
        for segment in &self.segments {
            if segment.edit_unit_byte_count != 0 {
                if segment.index_duration == 0 || n < segment.index_duration {
                    return Ok(n * u64::from(segment.edit_unit_byte_count));
                }
                continue;
            }
            let start = segment.index_start_position;
            if n >= start && n < start + segment.index_duration {
                return Ok(segment.entries[(n - start) as usize].stream_offset);
            }
        }
        Err(Error::EndOfFile)
    }

    /// Build VBR segments from the writer's per-frame offsets, chunked to
    /// honor the local-tuple size limit.
    pub fn from_offsets(
        index_edit_rate: Rational,
        index_sid: u32,
        body_sid: u32,
        offsets: &[u64],
        mut next_uid: impl FnMut() -> Result<Uuid>,
    ) -> Result<Self> {
        let mut table = IndexTable::new();
        for (chunk_index, chunk) in offsets.chunks(MAX_ENTRIES_PER_SEGMENT).enumerate() {
            let entries = chunk
                .iter()
                .map(|&stream_offset| IndexEntry {
                    temporal_offset: 0,
                    key_frame_offset: 0,
                    flags: FLAG_RANDOM_ACCESS,
                    stream_offset,
                })
                .collect();
            table.push(IndexTableSegment::vbr(
                next_uid()?,
                index_edit_rate,
                index_sid,
                body_sid,
                (chunk_index * MAX_ENTRIES_PER_SEGMENT) as u64,
                entries,
            ));
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asdcp_core::rational::EDIT_RATE_24;

    #[test]
    fn vbr_round_trip_and_lookup() {
        let offsets: Vec<u64> = (0..24).map(|n| n * 12_025).collect();
        let table = IndexTable::from_offsets(EDIT_RATE_24, 129, 1, &offsets, || {
            Ok(Uuid::from_bytes([7; 16]))
        })
        .unwrap();

        assert_eq!(table.duration(), 24);
        for (n, &offset) in offsets.iter().enumerate() {
            assert_eq!(table.lookup(n as u64).unwrap(), offset);
        }
        assert!(matches!(table.lookup(24), Err(Error::EndOfFile)));

        let segment = &table.segments()[0];
        let bytes = segment.serialize().unwrap();
        let header = klv::read_klv_header(&mut std::io::Cursor::new(&bytes)).unwrap();
        assert_eq!(header.key, labels::INDEX_TABLE_SEGMENT);
        let parsed = IndexTableSegment::parse(&bytes[header.size..]).unwrap();
        assert_eq!(parsed, *segment);
    }

    #[test]
    fn cbr_lookup_is_arithmetic() {
        let mut table = IndexTable::new();
        table.push(IndexTableSegment::cbr(
            Uuid::from_bytes([1; 16]),
            EDIT_RATE_24,
            129,
            1,
            12_000,
            24,
        ));
        assert_eq!(table.lookup(0).unwrap(), 0);
        assert_eq!(table.lookup(23).unwrap(), 276_000);
        assert!(table.lookup(24).is_err());
    }

    #[test]
    fn long_tables_split_into_segments() {
        let offsets: Vec<u64> = (0..12_000).map(|n| n * 100).collect();
        let table = IndexTable::from_offsets(EDIT_RATE_24, 129, 1, &offsets, || {
            Ok(Uuid::from_bytes([9; 16]))
        })
        .unwrap();
        assert_eq!(table.segments().len(), 3);
        assert_eq!(table.lookup(11_999).unwrap(), 1_199_900);
        // entries are strictly monotonic in frame number and byte offset
        let mut last = None;
        for segment in table.segments() {
            for entry in &segment.entries {
                if let Some(prev) = last {
                    assert!(entry.stream_offset > prev);
                }
                last = Some(entry.stream_offset);
            }
        }
    }
}
