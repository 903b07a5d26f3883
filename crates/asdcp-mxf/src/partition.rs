//! Partition packs and the Random Index Pack.

use crate::labels;
use asdcp_core::{klv, Error, MemReader, ReadSeek, Result, Ul};
use std::io::SeekFrom;

/// The pack prefixing every partition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct PartitionPack {
    pub major_version: u16,
    pub minor_version: u16,
    pub kag_size: u32,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_offset: u64,
    pub body_sid: u32,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
}

impl PartitionPack {
    pub fn new(operational_pattern: Ul, essence_containers: Vec<Ul>) -> Self {
        PartitionPack {
            major_version: 1,
            minor_version: 3,
            kag_size: 1,
            this_partition: 0,
            previous_partition: 0,
            footer_partition: 0,
            header_byte_count: 0,
            index_byte_count: 0,
            index_sid: 0,
            body_offset: 0,
            body_sid: 0,
            operational_pattern,
            essence_containers,
        }
    }

    fn value_len(&self) -> usize {
        // fixed fields + essence container batch
        2 + 2 + 4 + 8 * 5 + 4 + 8 + 4 + 16 + 8 + self.essence_containers.len() * 16
    }

    /// Total on-disk size of the pack KLV. Constant for a given essence
    /// container count, so the header pack can be rewritten in place at
    /// finalization.
    pub fn size(&self) -> usize {
        let value_len = self.value_len();
        16 + klv::ber_size_for(value_len as u64) + value_len
    }

    /// Serialize the full pack KLV under the given partition key.
    pub fn serialize(&self, key: &Ul) -> Result<Vec<u8>> {
        let value_len = self.value_len();
        let mut out = Vec::with_capacity(25 + value_len);
        klv::write_klv_header(&mut out, key, value_len as u64, 0)?;

        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.kag_size.to_be_bytes());
        out.extend_from_slice(&self.this_partition.to_be_bytes());
        out.extend_from_slice(&self.previous_partition.to_be_bytes());
        out.extend_from_slice(&self.footer_partition.to_be_bytes());
        out.extend_from_slice(&self.header_byte_count.to_be_bytes());
        out.extend_from_slice(&self.index_byte_count.to_be_bytes());
        out.extend_from_slice(&self.index_sid.to_be_bytes());
        out.extend_from_slice(&self.body_offset.to_be_bytes());
        out.extend_from_slice(&self.body_sid.to_be_bytes());
        out.extend_from_slice(self.operational_pattern.as_bytes());
        out.extend_from_slice(&(self.essence_containers.len() as u32).to_be_bytes());
        out.extend_from_slice(&16u32.to_be_bytes());
        for container in &self.essence_containers {
            out.extend_from_slice(container.as_bytes());
        }
        Ok(out)
    }

    /// Decode a pack value region.
    pub fn parse(value: &[u8]) -> Result<Self> {
        let mut r = MemReader::new(value);
        let major_version = r.read_u16()?;
        let minor_version = r.read_u16()?;
        let kag_size = r.read_u32()?;
        let this_partition = r.read_u64()?;
        let previous_partition = r.read_u64()?;
        let footer_partition = r.read_u64()?;
        let header_byte_count = r.read_u64()?;
        let index_byte_count = r.read_u64()?;
        let index_sid = r.read_u32()?;
        let body_offset = r.read_u64()?;
        let body_sid = r.read_u32()?;
        let operational_pattern = r.read_ul()?;

        let count = r.read_u32()? as usize;
        let item_size = r.read_u32()?;
        if item_size != 16 {
            return Err(Error::Format(format!(
                "essence container batch item size {item_size}"
            )));
        }
        let mut essence_containers = Vec::with_capacity(count);
        for _ in 0..count {
            essence_containers.push(r.read_ul()?);
        }

        Ok(PartitionPack {
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern,
            essence_containers,
        })
    }
}

/// The trailing table of `(body SID, partition offset)` pairs. The last
/// four bytes of the file are the RIP's own length, making it locatable
/// by seeking backward from the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct RandomIndexPack {
    pub entries: Vec<(u32, u64)>,
}

impl RandomIndexPack {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let value_len = self.entries.len() * 12 + 4;
        let ber_size = klv::ber_size_for(value_len as u64);
        let overall = 16 + ber_size + value_len;

        let mut out = Vec::with_capacity(overall);
        klv::write_klv_header(&mut out, &labels::RANDOM_INDEX_PACK, value_len as u64, 0)?;
        for (body_sid, offset) in &self.entries {
            out.extend_from_slice(&body_sid.to_be_bytes());
            out.extend_from_slice(&offset.to_be_bytes());
        }
        out.extend_from_slice(&(overall as u32).to_be_bytes());
        Ok(out)
    }

    /// Locate and decode the RIP at the end of a stream. Fails with
    /// `Format` when the trailing length does not land on the RIP key.
    pub fn read_from_end<R: ReadSeek>(reader: &mut R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0)).map_err(|_| Error::BadSeek)?;
        if file_size < 4 {
            return Err(Error::Format("file too short for a RIP".into()));
        }

        reader
            .seek(SeekFrom::End(-4))
            .map_err(|_| Error::BadSeek)?;
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).map_err(Error::ReadFail)?;
        let rip_len = u64::from(u32::from_be_bytes(len_buf));
        if rip_len < 21 || rip_len > file_size {
            return Err(Error::Format("RIP length field out of range".into()));
        }

        reader
            .seek(SeekFrom::Start(file_size - rip_len))
            .map_err(|_| Error::BadSeek)?;
        let header = klv::read_klv_header(reader)?;
        if header.key != labels::RANDOM_INDEX_PACK {
            return Err(Error::Format("no RIP at end of file".into()));
        }

        let mut value = vec![0u8; header.length as usize];
        reader.read_exact(&mut value).map_err(Error::ReadFail)?;

        if header.length < 4 || (header.length - 4) % 12 != 0 {
            return Err(Error::Format("RIP value length malformed".into()));
        }

        let mut entries = Vec::new();
        let mut r = MemReader::new(&value[..value.len() - 4]);
        while r.remaining() > 0 {
            let body_sid = r.read_u32()?;
            let offset = r.read_u64()?;
            entries.push((body_sid, offset));
        }
        Ok(RandomIndexPack { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn partition_pack_round_trip() {
        let pack = PartitionPack {
            major_version: 1,
            minor_version: 3,
            kag_size: 1,
            this_partition: 0,
            previous_partition: 0,
            footer_partition: 123_456,
            header_byte_count: 16_384,
            index_byte_count: 0,
            index_sid: 0,
            body_offset: 0,
            body_sid: 1,
            operational_pattern: labels::OP_ATOM_SMPTE,
            essence_containers: vec![labels::ESSENCE_CONTAINER_JP2K],
        };

        let bytes = pack.serialize(&labels::HEADER_PARTITION_OPEN_INCOMPLETE).unwrap();
        assert_eq!(bytes.len(), pack.size());

        let header = klv::read_klv_header(&mut Cursor::new(&bytes)).unwrap();
        assert!(labels::is_partition_key(&header.key));
        let parsed = PartitionPack::parse(&bytes[header.size..]).unwrap();
        assert_eq!(parsed, pack);
    }

    #[test]
    fn pack_size_is_stable_across_field_updates() {
        let mut pack = PartitionPack::new(
            labels::OP_ATOM_SMPTE,
            vec![labels::ESSENCE_CONTAINER_PCM],
        );
        let before = pack.serialize(&labels::HEADER_PARTITION_OPEN_INCOMPLETE).unwrap();
        pack.footer_partition = u64::MAX;
        pack.header_byte_count = 999_999;
        let after = pack.serialize(&labels::HEADER_PARTITION_CLOSED_COMPLETE).unwrap();
        assert_eq!(before.len(), after.len());
    }

    #[test]
    fn rip_round_trip() {
        let rip = RandomIndexPack {
            entries: vec![(0, 0), (1, 16_384), (0, 900_000)],
        };
        let bytes = rip.serialize().unwrap();

        // last four bytes carry the overall length
        let trailer = u32::from_be_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
        assert_eq!(trailer as usize, bytes.len());

        let parsed = RandomIndexPack::read_from_end(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, rip);
    }

    #[test]
    fn missing_rip_is_a_format_error() {
        let data = vec![0u8; 64];
        assert!(matches!(
            RandomIndexPack::read_from_end(&mut Cursor::new(&data)),
            Err(Error::Format(_))
        ));
    }
}
