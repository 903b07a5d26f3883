//! The file-writer state machine.
//!
//! `Opened → FramesWritten → Finalized`; writing a frame after finalize,
//! or finalizing twice, is a `State` error. The header partition reserves
//! `header_reserve` bytes of metadata-plus-filler space so finalization
//! can rewrite the partition pack and metadata in place; the filler
//! absorbs any residual, and no byte outside the reserved region moves.

use crate::index::{IndexTable, IndexTableSegment};
use crate::labels;
use crate::metadata::{build_header_metadata, CryptoTrackInfo, EssenceTrackInfo, HeaderMetadata};
use crate::partition::{PartitionPack, RandomIndexPack};
use crate::primer::Primer;
use crate::types::{LabelSet, WriterInfo};
use asdcp_core::{klv, Error, FrameBuffer, Rational, Result, Ul};
use asdcp_crypto::{
    encrypt_frame, CbcEncryptor, EnvelopeParams, FortunaRng, HmacContext, CBC_BLOCK_SIZE,
};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Default bytes reserved in the header partition for rewrite at
/// finalization.
pub const DEFAULT_HEADER_RESERVE: u32 = 16384;

const MIN_FILL: usize = 17;

/// Which partition geometry the file uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    /// AS-DCP: essence follows the header partition; the index rides the
    /// footer.
    OpAtom,
    /// AS-02 (OP-1a): essence in a body partition; the index rides the
    /// header reserve when it fits, the footer otherwise.
    As02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Opened,
    FramesWritten,
    Finalized,
}

/// Everything `open_write` needs beyond the descriptor graph.
#[derive(Clone, Debug)]
#[must_use]
pub struct WriteConfig {
    pub profile: Profile,
    /// The body triplet key for this essence type.
    pub essence_element: Ul,
    /// The essence container announced in partition packs and the Preface.
    pub essence_container: Ul,
    pub edit_rate: Rational,
    pub header_reserve: u32,
    /// Constant-bytes-per-element indexing (PCM). The actual edit-unit
    /// byte count is measured from the first written triplet; later
    /// frames must match.
    pub cbr: bool,
}

/// The low-level MXF writer shared by every essence facade.
#[must_use]
pub struct MxfFileWriter {
    file: File,
    state: State,
    profile: Profile,
    info: WriterInfo,
    metadata: HeaderMetadata,
    header_pack: PartitionPack,
    header_reserve: usize,
    /// Absolute offset of the AS-02 body partition pack.
    body_partition: Option<u64>,
    /// Absolute offset of the first essence byte.
    essence_start: u64,
    essence_element: Ul,
    edit_rate: Rational,
    index_sid: u32,
    body_sid: u32,
    /// CBR edit-unit byte count; `Some(0)` until the first frame fixes it.
    cbr_unit_size: Option<u32>,
    offsets: Vec<u64>,
    body_offset: u64,
    duration: u64,
    rng: FortunaRng,
    label_set: LabelSet,
}

impl MxfFileWriter {
    /// Create the file, build the metadata graph, and write the header
    /// partition with its reserve filler.
    pub fn open_write(
        path: &Path,
        mut info: WriterInfo,
        essence: EssenceTrackInfo,
        config: WriteConfig,
    ) -> Result<Self> {
        if info.asset_id.is_nil() {
            info.asset_id = asdcp_crypto::make_uuid()?;
        }
        if info.encrypted_essence {
            if info.context_id.is_nil() {
                info.context_id = asdcp_crypto::make_uuid()?;
            }
            if info.cryptographic_key_id.is_nil() {
                info.cryptographic_key_id = asdcp_crypto::make_uuid()?;
            }
        }

        let label_set = info.label_set;
        let operational_pattern = match config.profile {
            Profile::OpAtom => label_set.op_atom(),
            Profile::As02 => labels::OP_1A,
        };

        let mut essence_containers = vec![config.essence_container];
        let crypto = if info.encrypted_essence {
            essence_containers.push(labels::ESSENCE_CONTAINER_CRYPT);
            Some(CryptoTrackInfo {
                context_id: info.context_id,
                source_essence_container: config.essence_container,
                cryptographic_key_id: info.cryptographic_key_id,
            })
        } else {
            None
        };

        let (index_sid, body_sid) = (129, 1);
        let metadata = build_header_metadata(
            &info,
            essence,
            operational_pattern,
            essence_containers.clone(),
            index_sid,
            body_sid,
            crypto,
        )?;

        let header_reserve = config.header_reserve as usize;
        let region = serialize_header_region(&metadata, label_set, header_reserve, None)?;

        let mut header_pack = PartitionPack::new(operational_pattern, essence_containers);
        if config.profile == Profile::OpAtom {
            header_pack.body_sid = body_sid;
        }
        header_pack.header_byte_count = region.header_byte_count;

        let mut file =
            File::create(path).map_err(|_| Error::FileOpen(path.display().to_string()))?;
        let pack_bytes = header_pack.serialize(&labels::HEADER_PARTITION_OPEN_INCOMPLETE)?;
        file.write_all(&pack_bytes).map_err(Error::WriteFail)?;
        file.write_all(&region.bytes).map_err(Error::WriteFail)?;

        let body_partition = if config.profile == Profile::As02 {
            let body_at = file.stream_position().map_err(|_| Error::BadSeek)?;
            let mut body_pack = PartitionPack::new(
                header_pack.operational_pattern,
                header_pack.essence_containers.clone(),
            );
            body_pack.this_partition = body_at;
            body_pack.body_sid = body_sid;
            let body_bytes = body_pack.serialize(&labels::BODY_PARTITION_CLOSED_COMPLETE)?;
            file.write_all(&body_bytes).map_err(Error::WriteFail)?;
            Some(body_at)
        } else {
            None
        };

        let essence_start = file.stream_position().map_err(|_| Error::BadSeek)?;

        Ok(MxfFileWriter {
            file,
            state: State::Opened,
            profile: config.profile,
            info,
            metadata,
            header_pack,
            header_reserve,
            body_partition,
            essence_start,
            essence_element: config.essence_element,
            edit_rate: config.edit_rate,
            index_sid,
            body_sid,
            cbr_unit_size: config.cbr.then_some(0),
            offsets: Vec::new(),
            body_offset: 0,
            duration: 0,
            rng: FortunaRng::new(),
            label_set,
        })
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn writer_info(&self) -> &WriterInfo {
        &self.info
    }

    /// Append one essence triplet, recording its index entry. When an
    /// encryptor is supplied the frame is wrapped in the crypto envelope
    /// under a fresh IV.
    pub fn write_frame(
        &mut self,
        frame: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
    ) -> Result<()> {
        self.write_triplet(frame, encryptor, hmac, true, None)
    }

    /// Append a triplet that shares the current edit unit with the one
    /// before it (stereoscopic right eye, per-frame side metadata). Only
    /// the first triplet of an edit unit gets an index entry.
    pub fn write_companion_frame(
        &mut self,
        frame: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
        element: Option<Ul>,
    ) -> Result<()> {
        if self.state == State::Opened {
            return Err(Error::State("companion triplet before first frame"));
        }
        self.write_triplet(frame, encryptor, hmac, false, element)
    }

    fn write_triplet(
        &mut self,
        frame: &FrameBuffer,
        encryptor: Option<&mut CbcEncryptor>,
        hmac: Option<&mut HmacContext>,
        new_edit_unit: bool,
        element: Option<Ul>,
    ) -> Result<()> {
        match self.state {
            State::Opened | State::FramesWritten => {}
            State::Finalized => return Err(Error::State("write_frame after finalize")),
        }

        let element = element.unwrap_or(self.essence_element);
        let stream_offset = self.body_offset;
        let mut written = 0u64;

        if let Some(encryptor) = encryptor {
            let mut iv = [0u8; CBC_BLOCK_SIZE];
            self.rng.fill_random(&mut iv)?;
            let params = EnvelopeParams {
                context_id: self.info.context_id,
                cipher_key_id: self.info.cryptographic_key_id,
                essence_ul: element,
                iv,
            };
            let mut envelope = FrameBuffer::new();
            encrypt_frame(frame, &mut envelope, &params, encryptor, hmac)?;

            written += klv::write_klv_header(
                &mut self.file,
                &labels::ENCRYPTED_TRIPLET,
                envelope.len() as u64,
                klv::MXF_BER_LENGTH,
            )? as u64;
            self.file
                .write_all(envelope.data())
                .map_err(Error::WriteFail)?;
            written += envelope.len() as u64;
        } else {
            written += klv::write_klv_header(
                &mut self.file,
                &element,
                frame.len() as u64,
                klv::MXF_BER_LENGTH,
            )? as u64;
            self.file.write_all(frame.data()).map_err(Error::WriteFail)?;
            written += frame.len() as u64;
        }

        if new_edit_unit {
            match self.cbr_unit_size.as_mut() {
                Some(unit) if *unit == 0 => *unit = written as u32,
                Some(unit) => {
                    if u64::from(*unit) != written {
                        return Err(Error::Format(format!(
                            "CBR frame size changed from {unit} to {written} bytes"
                        )));
                    }
                }
                None => self.offsets.push(stream_offset),
            }
            self.duration += 1;
        } else if self.cbr_unit_size.is_some() {
            return Err(Error::Param(
                "companion triplets are not supported in CBR streams",
            ));
        }

        self.body_offset += written;
        self.state = State::FramesWritten;
        Ok(())
    }

    /// Write the footer partition, index, and RIP, then rewrite the header
    /// partition in place inside its reserved region.
    pub fn finalize(&mut self) -> Result<()> {
        match self.state {
            State::Opened | State::FramesWritten => {}
            State::Finalized => return Err(Error::State("finalize after finalize")),
        }

        self.metadata.update_durations(self.duration);

        let index = self.build_index()?;
        let mut index_bytes = Vec::new();
        for segment in index.segments() {
            index_bytes.extend_from_slice(&segment.serialize()?);
        }

        // AS-02 carries the index in the header reserve when it fits
        let index_in_header = self.profile == Profile::As02
            && serialize_header_region(
                &self.metadata,
                self.label_set,
                self.header_reserve,
                Some(&index_bytes),
            )
            .is_ok();

        let footer_at = self
            .file
            .seek(SeekFrom::End(0))
            .map_err(|_| Error::BadSeek)?;

        let mut footer_pack = PartitionPack::new(
            self.header_pack.operational_pattern,
            self.header_pack.essence_containers.clone(),
        );
        footer_pack.this_partition = footer_at;
        footer_pack.previous_partition = self.body_partition.unwrap_or(0);
        footer_pack.footer_partition = footer_at;
        if !index_in_header {
            footer_pack.index_byte_count = index_bytes.len() as u64;
            footer_pack.index_sid = self.index_sid;
        }

        let footer_bytes = footer_pack.serialize(&labels::FOOTER_PARTITION_CLOSED_COMPLETE)?;
        self.file
            .write_all(&footer_bytes)
            .map_err(Error::WriteFail)?;
        if !index_in_header {
            self.file
                .write_all(&index_bytes)
                .map_err(Error::WriteFail)?;
        }

        let mut rip = RandomIndexPack::default();
        rip.entries.push((self.header_pack.body_sid, 0));
        if let Some(body_at) = self.body_partition {
            rip.entries.push((self.body_sid, body_at));
        }
        rip.entries.push((0, footer_at));
        self.file
            .write_all(&rip.serialize()?)
            .map_err(Error::WriteFail)?;

        // rewrite the header partition inside the reserved region
        let header_index = index_in_header.then_some(index_bytes.as_slice());
        let region = serialize_header_region(
            &self.metadata,
            self.label_set,
            self.header_reserve,
            header_index,
        )?;
        self.header_pack.footer_partition = footer_at;
        self.header_pack.header_byte_count = region.header_byte_count;
        self.header_pack.index_byte_count = region.index_byte_count;
        self.header_pack.index_sid = if index_in_header { self.index_sid } else { 0 };

        let pack_bytes = self
            .header_pack
            .serialize(&labels::HEADER_PARTITION_CLOSED_COMPLETE)?;

        // the rewrite spans exactly the bytes laid down at open
        let region_end = pack_bytes.len() as u64 + region.bytes.len() as u64;
        debug_assert_eq!(region_end, self.body_partition.unwrap_or(self.essence_start));

        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|_| Error::BadSeek)?;
        self.file.write_all(&pack_bytes).map_err(Error::WriteFail)?;
        self.file
            .write_all(&region.bytes)
            .map_err(Error::WriteFail)?;

        self.file.flush().map_err(Error::WriteFail)?;
        self.state = State::Finalized;
        debug!(duration = self.duration, "finalized MXF file");
        Ok(())
    }

    fn build_index(&mut self) -> Result<IndexTable> {
        match self.cbr_unit_size {
            Some(unit) => {
                let mut table = IndexTable::new();
                table.push(IndexTableSegment::cbr(
                    asdcp_crypto::make_uuid()?,
                    self.edit_rate,
                    self.index_sid,
                    self.body_sid,
                    unit,
                    self.duration,
                ));
                Ok(table)
            }
            None => IndexTable::from_offsets(
                self.edit_rate,
                self.index_sid,
                self.body_sid,
                &self.offsets,
                asdcp_crypto::make_uuid,
            ),
        }
    }
}

struct HeaderRegion {
    header_byte_count: u64,
    index_byte_count: u64,
    bytes: Vec<u8>,
}

/// Serialize primer + sets + fill (+ optional index segments) to exactly
/// `reserve` bytes.
fn serialize_header_region(
    metadata: &HeaderMetadata,
    label_set: LabelSet,
    reserve: usize,
    index: Option<&[u8]>,
) -> Result<HeaderRegion> {
    let mut primer = Primer::new();
    let sets = metadata.serialize(&mut primer)?;
    let primer_bytes = primer.serialize()?;

    let index_len = index.map_or(0, <[u8]>::len);
    let used = primer_bytes.len() + sets.len();
    if used + MIN_FILL + index_len > reserve {
        return Err(Error::Format(format!(
            "header metadata of {used} bytes exceeds the {reserve}-byte reserve"
        )));
    }
    let fill_len = reserve - used - index_len;

    let mut bytes = Vec::with_capacity(reserve);
    bytes.extend_from_slice(&primer_bytes);
    bytes.extend_from_slice(&sets);
    klv::write_fill_klv(&mut bytes, &label_set.fill_key(), fill_len)?;
    if let Some(index) = index {
        bytes.extend_from_slice(index);
    }

    debug_assert_eq!(bytes.len(), reserve);
    Ok(HeaderRegion {
        header_byte_count: (used + fill_len) as u64,
        index_byte_count: index_len as u64,
        bytes,
    })
}
