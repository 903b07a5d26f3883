//! The file-reader state machine.
//!
//! `open_read` walks header partition pack → primer → header metadata,
//! then uses the Random Index Pack to visit every partition and collect
//! index segments and essence-body locations. `read_frame` resolves an
//! edit unit through the index, seeks, reads one KLV, and optionally
//! unwraps the crypto envelope.

use crate::index::{IndexTable, IndexTableSegment};
use crate::labels;
use crate::metadata::{HeaderMetadata, PackageKind};
use crate::partition::{PartitionPack, RandomIndexPack};
use crate::primer::Primer;
use crate::types::{LabelSet, WriterInfo};
use asdcp_core::{klv, Error, FrameBuffer, MemReader, Result, Ul};
use asdcp_crypto::{decrypt_frame, CbcDecryptor, HmacContext};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Prefix shared by unencrypted essence element keys.
const ESSENCE_ELEMENT_PREFIX: [u8; 8] = [0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01];

/// Where one essence stream's bytes live in the file.
#[derive(Clone, Copy, Debug)]
struct BodyRegion {
    /// Stream offset of the region's first essence byte.
    body_offset: u64,
    /// Absolute file offset of that byte.
    essence_start: u64,
}

/// The low-level MXF reader shared by every essence facade.
#[must_use]
pub struct MxfFileReader {
    file: File,
    header_pack: PartitionPack,
    primer: Primer,
    metadata: HeaderMetadata,
    index: IndexTable,
    bodies: Vec<BodyRegion>,
    duration: u64,
    /// Element keys an essence triplet may carry. Triplets are matched by
    /// full key equality; an indexed KLV (or decrypted envelope) with any
    /// other key is a `Format` error.
    expected_elements: Vec<Ul>,
}

impl MxfFileReader {
    /// Open and validate the file through its index.
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::FileOpen(path.display().to_string())
            }
        })?;

        // header partition pack
        let header = klv::read_klv_header(&mut file)?;
        if !labels::is_partition_key(&header.key)
            || header.key.byte(13) != labels::PARTITION_KIND_HEADER
        {
            return Err(Error::Format("file does not begin with a header partition".into()));
        }
        let mut pack_value = vec![0u8; header.length as usize];
        file.read_exact(&mut pack_value).map_err(Error::ReadFail)?;
        let header_pack = PartitionPack::parse(&pack_value)?;

        let metadata_start = file.stream_position().map_err(|_| Error::BadSeek)?;

        // primer pack, past any leading fill
        let primer = loop {
            let klv_header = klv::read_klv_header(&mut file)?;
            let mut value = vec![0u8; klv_header.length as usize];
            file.read_exact(&mut value).map_err(Error::ReadFail)?;

            if labels::is_fill_key(&klv_header.key) {
                continue;
            }
            if klv_header.key == labels::PRIMER_PACK {
                break Primer::parse(&value)?;
            }
            return Err(Error::Format(format!(
                "expected primer pack, found {}",
                klv_header.key
            )));
        };

        // remaining header metadata
        let metadata_end = metadata_start + header_pack.header_byte_count;
        let sets_start = file.stream_position().map_err(|_| Error::BadSeek)?;
        if metadata_end < sets_start {
            return Err(Error::Format("header byte count shorter than primer".into()));
        }
        let mut sets_body = vec![0u8; (metadata_end - sets_start) as usize];
        file.read_exact(&mut sets_body).map_err(Error::ReadFail)?;
        let metadata = HeaderMetadata::parse(&sets_body, &primer)?;

        let mut reader = MxfFileReader {
            file,
            header_pack,
            primer,
            metadata,
            index: IndexTable::new(),
            bodies: Vec::new(),
            duration: 0,
            expected_elements: Vec::new(),
        };

        // the descriptor's container label pins the element key; facades
        // override or extend this for companion triplets
        if let Ok(descriptor) = reader.metadata.primary_descriptor() {
            if let Some(element) =
                labels::element_for_container(&descriptor.file().essence_container)
            {
                reader.expected_elements.push(element);
            }
        }

        // index segments riding the header partition
        if reader.header_pack.index_byte_count > 0 {
            reader.read_index_region(metadata_end, reader.header_pack.index_byte_count)?;
        }

        // essence in the header partition (OP-Atom geometry)
        if reader.header_pack.body_sid != 0 {
            reader.bodies.push(BodyRegion {
                body_offset: reader.header_pack.body_offset,
                essence_start: metadata_end + reader.header_pack.index_byte_count,
            });
        }

        // walk the remaining partitions through the RIP
        let rip = RandomIndexPack::read_from_end(&mut reader.file)?;
        for &(_, offset) in &rip.entries {
            if offset == 0 {
                continue;
            }
            reader.visit_partition(offset)?;
        }

        if reader.index.is_empty() {
            return Err(Error::Format("no index table segments found".into()));
        }
        reader.duration = reader.index.duration();
        debug!(duration = reader.duration, "opened MXF file");
        Ok(reader)
    }

    fn visit_partition(&mut self, offset: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|_| Error::BadSeek)?;
        let header = klv::read_klv_header(&mut self.file)?;
        if !labels::is_partition_key(&header.key) {
            return Err(Error::Format(format!(
                "RIP entry at {offset} is not a partition pack"
            )));
        }
        let mut value = vec![0u8; header.length as usize];
        self.file.read_exact(&mut value).map_err(Error::ReadFail)?;
        let pack = PartitionPack::parse(&value)?;
        if pack.this_partition != offset {
            return Err(Error::Format(format!(
                "partition at {offset} claims offset {}",
                pack.this_partition
            )));
        }

        let content_start = offset + (header.size as u64) + header.length;
        if pack.index_byte_count > 0 {
            self.read_index_region(
                content_start + pack.header_byte_count,
                pack.index_byte_count,
            )?;
        }
        if pack.body_sid != 0 {
            if self.bodies.iter().any(|b| b.body_offset == pack.body_offset) {
                return Err(Error::Format("body partitions with conflicting offsets".into()));
            }
            self.bodies.push(BodyRegion {
                body_offset: pack.body_offset,
                essence_start: content_start + pack.header_byte_count + pack.index_byte_count,
            });
        }
        Ok(())
    }

    fn read_index_region(&mut self, start: u64, length: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(start))
            .map_err(|_| Error::BadSeek)?;
        let mut region = vec![0u8; length as usize];
        self.file.read_exact(&mut region).map_err(Error::ReadFail)?;

        let mut pos = 0usize;
        while pos < region.len() {
            let mut cursor = std::io::Cursor::new(&region[pos..]);
            let header = klv::read_klv_header(&mut cursor)?;
            let value_start = pos + header.size;
            let value_end = value_start + header.length as usize;
            if value_end > region.len() {
                return Err(Error::Format("truncated index table segment".into()));
            }
            if header.key == labels::INDEX_TABLE_SEGMENT {
                self.index
                    .push(IndexTableSegment::parse(&region[value_start..value_end])?);
            } else if !labels::is_fill_key(&header.key) {
                return Err(Error::Format(format!(
                    "unexpected key {} in index region",
                    header.key
                )));
            }
            pos = value_end;
        }
        Ok(())
    }

    /// Edit units in the file.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn header_metadata(&self) -> &HeaderMetadata {
        &self.metadata
    }

    pub fn primer(&self) -> &Primer {
        &self.primer
    }

    pub fn operational_pattern(&self) -> &Ul {
        &self.header_pack.operational_pattern
    }

    /// Reconstruct the writer identity recorded in the header.
    pub fn writer_info(&self) -> WriterInfo {
        let mut info = WriterInfo::default();

        if self.header_pack.operational_pattern == labels::OP_ATOM_INTEROP {
            info.label_set = LabelSet::Interop;
        }

        if let Ok(preface) = self.metadata.preface() {
            for uid in &preface.identifications {
                if let Some(crate::metadata::Set::Identification(ident)) = self.metadata.get(uid) {
                    info.company_name = ident.company_name.clone();
                    info.product_name = ident.product_name.clone();
                    info.product_version = ident.version_string.clone();
                    info.product_uuid = ident.product_uid;
                }
            }
        }

        for package in self.metadata.packages() {
            if package.kind == PackageKind::Material {
                info.asset_id = package.package_uid.material();
            }
        }

        if let Some(context) = self.metadata.cryptographic_context() {
            info.encrypted_essence = true;
            info.uses_hmac = true;
            info.context_id = context.context_id;
            info.cryptographic_key_id = context.cryptographic_key_id;
        }

        info
    }

    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Accept exactly `element` as this container's essence triplet key.
    pub fn set_essence_element(&mut self, element: Ul) {
        self.expected_elements = vec![element];
    }

    /// Additionally accept `element` (companion triplets sharing the edit
    /// unit: side metadata, trailing documents).
    pub fn add_essence_element(&mut self, element: Ul) {
        if !self.expected_elements.contains(&element) {
            self.expected_elements.push(element);
        }
    }

    fn is_expected_element(&self, key: &Ul) -> bool {
        if self.expected_elements.is_empty() {
            // no descriptor pinned a key; fall back to the family prefix
            key.has_prefix(&ESSENCE_ELEMENT_PREFIX)
        } else {
            self.expected_elements.contains(key)
        }
    }

    /// Absolute file offset of edit unit `n`'s essence triplet.
    pub fn frame_offset(&self, n: u64) -> Result<u64> {
        let stream_offset = self.index.lookup(n)?;
        self.absolute_offset(stream_offset)
    }

    /// Resolve a stream offset to an absolute file position.
    fn absolute_offset(&self, stream_offset: u64) -> Result<u64> {
        self.bodies
            .iter()
            .filter(|b| b.body_offset <= stream_offset)
            .max_by_key(|b| b.body_offset)
            .map(|b| b.essence_start + (stream_offset - b.body_offset))
            .ok_or_else(|| Error::Format("stream offset outside any body partition".into()))
    }

    /// Read edit unit `n` into `frame`. Ciphertext triplets are unwrapped
    /// when a decryptor is supplied (with MIC verification when an HMAC
    /// context is also supplied) and returned raw otherwise.
    pub fn read_frame(
        &mut self,
        n: u64,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.read_frame_skip(n, 0, frame, decryptor, hmac)
    }

    /// Like [`read_frame`](Self::read_frame), but skip `skip_triplets`
    /// KLVs past the indexed one first. Edit units holding several
    /// triplets (stereoscopic pairs, side metadata) are indexed once, at
    /// their first triplet.
    pub fn read_frame_skip(
        &mut self,
        n: u64,
        skip_triplets: u32,
        frame: &mut FrameBuffer,
        decryptor: Option<&mut CbcDecryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        let stream_offset = self.index.lookup(n)?;
        let position = self.absolute_offset(stream_offset)?;
        self.file
            .seek(SeekFrom::Start(position))
            .map_err(|_| Error::BadSeek)?;

        for _ in 0..skip_triplets {
            let header = klv::read_klv_header(&mut self.file)?;
            self.file
                .seek(SeekFrom::Current(header.length as i64))
                .map_err(|_| Error::BadSeek)?;
        }

        let header = klv::read_klv_header(&mut self.file)?;
        let length = header.length as usize;

        if header.key == labels::ENCRYPTED_TRIPLET {
            let mut value = vec![0u8; length];
            self.file.read_exact(&mut value).map_err(Error::ReadFail)?;

            match decryptor {
                Some(decryptor) => {
                    let essence_ul = decrypt_frame(&value, frame, decryptor, hmac)?;
                    if !self.is_expected_element(&essence_ul) {
                        return Err(Error::Format(format!(
                            "envelope wraps key {essence_ul}, not this container's essence key"
                        )));
                    }
                }
                None => {
                    // check the envelope's plaintext essence-key field
                    // before handing back the raw envelope
                    if value.len() < 64 {
                        return Err(Error::Format("encrypted triplet too short".into()));
                    }
                    let mut header_fields = MemReader::new(&value);
                    header_fields.skip(48)?;
                    let essence_ul = header_fields.read_ul()?;
                    if !self.is_expected_element(&essence_ul) {
                        return Err(Error::Format(format!(
                            "envelope wraps key {essence_ul}, not this container's essence key"
                        )));
                    }

                    if frame.capacity() < length {
                        return Err(Error::SmallBuf {
                            need: length,
                            have: frame.capacity(),
                        });
                    }
                    frame.set_data(&value)?;
                }
            }
        } else if self.is_expected_element(&header.key) {
            if frame.capacity() < length {
                return Err(Error::SmallBuf {
                    need: length,
                    have: frame.capacity(),
                });
            }
            self.file
                .read_exact(&mut frame.storage_mut()[..length])
                .map_err(Error::ReadFail)?;
            frame.set_len(length)?;
            frame.set_plaintext_offset(0);
            frame.set_source_length(length as u32);
        } else {
            return Err(Error::Format(format!(
                "indexed offset {stream_offset} holds key {}, not this container's essence key",
                header.key
            )));
        }

        frame.set_frame_number(n as u32);
        Ok(())
    }
}
