//! The header-metadata object graph.
//!
//! Sets live in an arena keyed by InstanceUID; cross-set links are UUIDs
//! resolved by lookup, so the graph needs no cyclic ownership. The decoder
//! is tolerant: unknown local tags are preserved verbatim inside known
//! sets, and whole sets with unknown keys are carried through for
//! round-trip rewriting.
//!
//! Graph invariant: exactly one Preface, one ContentStorage, one
//! MaterialPackage, and one or more SourcePackages, each FileSourcePackage
//! carrying one essence descriptor.

use crate::descriptor::{
    CryptographicContext, CryptographicFramework, EssenceDescriptor, SubDescriptor,
};
use crate::labels::{self, props, tags};
use crate::primer::Primer;
use crate::types::{required, SetProperties, SetWriter, Timestamp, VersionType, WriterInfo};
use asdcp_core::{Error, Rational, Result, Ul, Umid, Uuid};
use std::collections::HashMap;

type UnknownTuples = Vec<(u16, Vec<u8>)>;

fn write_unknown(w: &mut SetWriter<'_>, unknown: &UnknownTuples) -> Result<()> {
    for (tag, value) in unknown {
        w.raw_tag(*tag, value)?;
    }
    Ok(())
}

#[derive(Clone, Debug)]
#[must_use]
pub struct Preface {
    pub instance_uid: Uuid,
    pub last_modified_date: Timestamp,
    pub version: u16,
    pub object_model_version: Option<u32>,
    pub primary_package: Option<Uuid>,
    pub identifications: Vec<Uuid>,
    pub content_storage: Uuid,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
    pub dm_schemes: Vec<Ul>,
    pub unknown: UnknownTuples,
}

impl Preface {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::LAST_MODIFIED_DATE,
        props::VERSION,
        props::OBJECT_MODEL_VERSION,
        props::PRIMARY_PACKAGE,
        props::IDENTIFICATIONS,
        props::CONTENT_STORAGE_REF,
        props::OPERATIONAL_PATTERN,
        props::ESSENCE_CONTAINERS,
        props::DM_SCHEMES,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.timestamp(
            tags::LAST_MODIFIED_DATE,
            &props::LAST_MODIFIED_DATE,
            self.last_modified_date,
        )?;
        w.u16(tags::VERSION, &props::VERSION, self.version)?;
        if let Some(omv) = self.object_model_version {
            w.u32(tags::OBJECT_MODEL_VERSION, &props::OBJECT_MODEL_VERSION, omv)?;
        }
        if let Some(primary) = &self.primary_package {
            w.uuid(tags::PRIMARY_PACKAGE, &props::PRIMARY_PACKAGE, primary)?;
        }
        w.uuid_batch(
            tags::IDENTIFICATIONS,
            &props::IDENTIFICATIONS,
            &self.identifications,
        )?;
        w.uuid(
            tags::CONTENT_STORAGE_REF,
            &props::CONTENT_STORAGE_REF,
            &self.content_storage,
        )?;
        w.ul(
            tags::OPERATIONAL_PATTERN,
            &props::OPERATIONAL_PATTERN,
            &self.operational_pattern,
        )?;
        w.ul_batch(
            tags::ESSENCE_CONTAINERS,
            &props::ESSENCE_CONTAINERS,
            &self.essence_containers,
        )?;
        w.ul_batch(tags::DM_SCHEMES, &props::DM_SCHEMES, &self.dm_schemes)?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::PREFACE)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(Preface {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            last_modified_date: set
                .get_timestamp(primer, &props::LAST_MODIFIED_DATE)
                .unwrap_or_default(),
            version: set.get_u16(primer, &props::VERSION).unwrap_or(0x0102),
            object_model_version: set.get_u32(primer, &props::OBJECT_MODEL_VERSION),
            primary_package: set.get_uuid(primer, &props::PRIMARY_PACKAGE),
            identifications: set
                .get_uuid_batch(primer, &props::IDENTIFICATIONS)
                .unwrap_or_default(),
            content_storage: required(
                set.get_uuid(primer, &props::CONTENT_STORAGE_REF),
                "ContentStorage",
            )?,
            operational_pattern: required(
                set.get_ul(primer, &props::OPERATIONAL_PATTERN),
                "OperationalPattern",
            )?,
            essence_containers: set
                .get_ul_batch(primer, &props::ESSENCE_CONTAINERS)
                .unwrap_or_default(),
            dm_schemes: set.get_ul_batch(primer, &props::DM_SCHEMES).unwrap_or_default(),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Identification {
    pub instance_uid: Uuid,
    pub this_generation_uid: Uuid,
    pub company_name: String,
    pub product_name: String,
    pub product_version: Option<VersionType>,
    pub version_string: String,
    pub product_uid: Uuid,
    pub modification_date: Timestamp,
    pub platform: Option<String>,
    pub unknown: UnknownTuples,
}

impl Identification {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::GENERATION_UID,
        props::COMPANY_NAME,
        props::PRODUCT_NAME,
        props::PRODUCT_VERSION,
        props::VERSION_STRING,
        props::PRODUCT_UID,
        props::MODIFICATION_DATE,
        props::PLATFORM,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.uuid(
            tags::THIS_GENERATION_UID,
            &props::GENERATION_UID,
            &self.this_generation_uid,
        )?;
        w.string(tags::COMPANY_NAME, &props::COMPANY_NAME, &self.company_name)?;
        w.string(tags::PRODUCT_NAME, &props::PRODUCT_NAME, &self.product_name)?;
        if let Some(version) = self.product_version {
            w.version(tags::PRODUCT_VERSION, &props::PRODUCT_VERSION, version)?;
        }
        w.string(tags::VERSION_STRING, &props::VERSION_STRING, &self.version_string)?;
        w.uuid(tags::PRODUCT_UID, &props::PRODUCT_UID, &self.product_uid)?;
        w.timestamp(
            tags::MODIFICATION_DATE,
            &props::MODIFICATION_DATE,
            self.modification_date,
        )?;
        if let Some(platform) = &self.platform {
            w.string(tags::PLATFORM, &props::PLATFORM, platform)?;
        }
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::IDENTIFICATION)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(Identification {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            this_generation_uid: set
                .get_uuid(primer, &props::GENERATION_UID)
                .unwrap_or_default(),
            company_name: set
                .get_string(primer, &props::COMPANY_NAME)
                .unwrap_or_default(),
            product_name: set
                .get_string(primer, &props::PRODUCT_NAME)
                .unwrap_or_default(),
            product_version: set.get_version(primer, &props::PRODUCT_VERSION),
            version_string: set
                .get_string(primer, &props::VERSION_STRING)
                .unwrap_or_default(),
            product_uid: set.get_uuid(primer, &props::PRODUCT_UID).unwrap_or_default(),
            modification_date: set
                .get_timestamp(primer, &props::MODIFICATION_DATE)
                .unwrap_or_default(),
            platform: set.get_string(primer, &props::PLATFORM),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug, Default)]
#[must_use]
pub struct ContentStorage {
    pub instance_uid: Uuid,
    pub packages: Vec<Uuid>,
    pub essence_container_data: Vec<Uuid>,
    pub unknown: UnknownTuples,
}

impl ContentStorage {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::PACKAGES,
        props::ESSENCE_CONTAINER_DATA_REFS,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.uuid_batch(tags::PACKAGES, &props::PACKAGES, &self.packages)?;
        w.uuid_batch(
            tags::ESSENCE_CONTAINER_DATA_REFS,
            &props::ESSENCE_CONTAINER_DATA_REFS,
            &self.essence_container_data,
        )?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::CONTENT_STORAGE)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(ContentStorage {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            packages: required(set.get_uuid_batch(primer, &props::PACKAGES), "Packages")?,
            essence_container_data: set
                .get_uuid_batch(primer, &props::ESSENCE_CONTAINER_DATA_REFS)
                .unwrap_or_default(),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug, Default)]
#[must_use]
pub struct EssenceContainerData {
    pub instance_uid: Uuid,
    pub linked_package_uid: Umid,
    pub index_sid: u32,
    pub body_sid: u32,
    pub unknown: UnknownTuples,
}

impl EssenceContainerData {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::LINKED_PACKAGE_UID,
        props::INDEX_SID,
        props::BODY_SID,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.umid(
            tags::LINKED_PACKAGE_UID,
            &props::LINKED_PACKAGE_UID,
            &self.linked_package_uid,
        )?;
        w.u32(tags::INDEX_SID, &props::INDEX_SID, self.index_sid)?;
        w.u32(tags::BODY_SID, &props::BODY_SID, self.body_sid)?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::ESSENCE_CONTAINER_DATA)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(EssenceContainerData {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            linked_package_uid: required(
                set.get_umid(primer, &props::LINKED_PACKAGE_UID),
                "LinkedPackageUID",
            )?,
            index_sid: set.get_u32(primer, &props::INDEX_SID).unwrap_or(0),
            body_sid: set.get_u32(primer, &props::BODY_SID).unwrap_or(0),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

/// Material or (file) source package.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageKind {
    Material,
    Source,
}

#[derive(Clone, Debug)]
#[must_use]
pub struct Package {
    pub kind: PackageKind,
    pub instance_uid: Uuid,
    pub package_uid: Umid,
    pub name: Option<String>,
    pub creation_date: Timestamp,
    pub modified_date: Timestamp,
    pub tracks: Vec<Uuid>,
    /// Strong reference to the essence descriptor; source packages only.
    pub descriptor: Option<Uuid>,
    pub unknown: UnknownTuples,
}

impl Package {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::PACKAGE_UID,
        props::PACKAGE_NAME,
        props::PACKAGE_CREATION_DATE,
        props::PACKAGE_MODIFIED_DATE,
        props::TRACKS,
        props::DESCRIPTOR_REF,
    ];

    pub fn set_key(&self) -> Ul {
        match self.kind {
            PackageKind::Material => labels::MATERIAL_PACKAGE,
            PackageKind::Source => labels::SOURCE_PACKAGE,
        }
    }

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.umid(tags::PACKAGE_UID, &props::PACKAGE_UID, &self.package_uid)?;
        if let Some(name) = &self.name {
            w.string(tags::PACKAGE_NAME, &props::PACKAGE_NAME, name)?;
        }
        w.timestamp(
            tags::PACKAGE_CREATION_DATE,
            &props::PACKAGE_CREATION_DATE,
            self.creation_date,
        )?;
        w.timestamp(
            tags::PACKAGE_MODIFIED_DATE,
            &props::PACKAGE_MODIFIED_DATE,
            self.modified_date,
        )?;
        w.uuid_batch(tags::TRACKS, &props::TRACKS, &self.tracks)?;
        if let Some(descriptor) = &self.descriptor {
            w.uuid(tags::DESCRIPTOR_REF, &props::DESCRIPTOR_REF, descriptor)?;
        }
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&self.set_key())
    }

    pub fn parse(kind: PackageKind, set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(Package {
            kind,
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            package_uid: required(set.get_umid(primer, &props::PACKAGE_UID), "PackageUID")?,
            name: set.get_string(primer, &props::PACKAGE_NAME),
            creation_date: set
                .get_timestamp(primer, &props::PACKAGE_CREATION_DATE)
                .unwrap_or_default(),
            modified_date: set
                .get_timestamp(primer, &props::PACKAGE_MODIFIED_DATE)
                .unwrap_or_default(),
            tracks: required(set.get_uuid_batch(primer, &props::TRACKS), "Tracks")?,
            descriptor: set.get_uuid(primer, &props::DESCRIPTOR_REF),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug)]
#[must_use]
pub struct Track {
    pub instance_uid: Uuid,
    pub track_id: u32,
    pub track_number: u32,
    pub track_name: Option<String>,
    /// Timeline tracks only.
    pub edit_rate: Option<Rational>,
    pub origin: Option<u64>,
    pub sequence: Uuid,
    pub unknown: UnknownTuples,
}

impl Track {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::TRACK_ID,
        props::TRACK_NUMBER,
        props::TRACK_NAME,
        props::EDIT_RATE,
        props::ORIGIN,
        props::SEQUENCE_REF,
    ];

    pub fn set_key(&self) -> Ul {
        if self.edit_rate.is_some() {
            labels::TIMELINE_TRACK
        } else {
            labels::STATIC_TRACK
        }
    }

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.u32(tags::TRACK_ID, &props::TRACK_ID, self.track_id)?;
        w.u32(tags::TRACK_NUMBER, &props::TRACK_NUMBER, self.track_number)?;
        if let Some(name) = &self.track_name {
            w.string(tags::TRACK_NAME, &props::TRACK_NAME, name)?;
        }
        if let Some(edit_rate) = self.edit_rate {
            w.rational(tags::EDIT_RATE, &props::EDIT_RATE, edit_rate)?;
            w.u64(tags::ORIGIN, &props::ORIGIN, self.origin.unwrap_or(0))?;
        }
        w.uuid(tags::SEQUENCE_REF, &props::SEQUENCE_REF, &self.sequence)?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&self.set_key())
    }

    pub fn parse(timeline: bool, set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(Track {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            track_id: required(set.get_u32(primer, &props::TRACK_ID), "TrackID")?,
            track_number: set.get_u32(primer, &props::TRACK_NUMBER).unwrap_or(0),
            track_name: set.get_string(primer, &props::TRACK_NAME),
            edit_rate: if timeline {
                Some(required(
                    set.get_rational(primer, &props::EDIT_RATE),
                    "EditRate",
                )?)
            } else {
                None
            },
            origin: set.get_u64(primer, &props::ORIGIN),
            sequence: required(set.get_uuid(primer, &props::SEQUENCE_REF), "Sequence")?,
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug)]
#[must_use]
pub struct Sequence {
    pub instance_uid: Uuid,
    pub data_definition: Ul,
    pub duration: u64,
    pub components: Vec<Uuid>,
    pub unknown: UnknownTuples,
}

impl Sequence {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::DATA_DEFINITION,
        props::DURATION,
        props::STRUCTURAL_COMPONENTS,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.ul(
            tags::DATA_DEFINITION,
            &props::DATA_DEFINITION,
            &self.data_definition,
        )?;
        w.u64(tags::DURATION, &props::DURATION, self.duration)?;
        w.uuid_batch(
            tags::STRUCTURAL_COMPONENTS,
            &props::STRUCTURAL_COMPONENTS,
            &self.components,
        )?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::SEQUENCE)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(Sequence {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            data_definition: required(
                set.get_ul(primer, &props::DATA_DEFINITION),
                "DataDefinition",
            )?,
            duration: set.get_u64(primer, &props::DURATION).unwrap_or(0),
            components: required(
                set.get_uuid_batch(primer, &props::STRUCTURAL_COMPONENTS),
                "StructuralComponents",
            )?,
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug)]
#[must_use]
pub struct SourceClip {
    pub instance_uid: Uuid,
    pub data_definition: Ul,
    pub duration: u64,
    pub start_position: u64,
    pub source_package_id: Umid,
    pub source_track_id: u32,
    pub unknown: UnknownTuples,
}

impl SourceClip {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::DATA_DEFINITION,
        props::DURATION,
        props::START_POSITION,
        props::SOURCE_PACKAGE_ID,
        props::SOURCE_TRACK_ID,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.ul(
            tags::DATA_DEFINITION,
            &props::DATA_DEFINITION,
            &self.data_definition,
        )?;
        w.u64(tags::DURATION, &props::DURATION, self.duration)?;
        w.u64(tags::START_POSITION, &props::START_POSITION, self.start_position)?;
        w.umid(
            tags::SOURCE_PACKAGE_ID,
            &props::SOURCE_PACKAGE_ID,
            &self.source_package_id,
        )?;
        w.u32(
            tags::SOURCE_TRACK_ID,
            &props::SOURCE_TRACK_ID,
            self.source_track_id,
        )?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::SOURCE_CLIP)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(SourceClip {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            data_definition: required(
                set.get_ul(primer, &props::DATA_DEFINITION),
                "DataDefinition",
            )?,
            duration: set.get_u64(primer, &props::DURATION).unwrap_or(0),
            start_position: set.get_u64(primer, &props::START_POSITION).unwrap_or(0),
            source_package_id: set
                .get_umid(primer, &props::SOURCE_PACKAGE_ID)
                .unwrap_or_default(),
            source_track_id: set.get_u32(primer, &props::SOURCE_TRACK_ID).unwrap_or(0),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

#[derive(Clone, Debug)]
#[must_use]
pub struct TimecodeComponent {
    pub instance_uid: Uuid,
    pub data_definition: Ul,
    pub duration: u64,
    pub rounded_timecode_base: u16,
    pub start_timecode: u64,
    pub drop_frame: bool,
    pub unknown: UnknownTuples,
}

impl TimecodeComponent {
    const KNOWN: &'static [Ul] = &[
        props::INSTANCE_UID,
        props::DATA_DEFINITION,
        props::DURATION,
        props::ROUNDED_TIMECODE_BASE,
        props::START_TIMECODE,
        props::DROP_FRAME,
    ];

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut w = SetWriter::new(primer);
        w.uuid(tags::INSTANCE_UID, &props::INSTANCE_UID, &self.instance_uid)?;
        w.ul(
            tags::DATA_DEFINITION,
            &props::DATA_DEFINITION,
            &self.data_definition,
        )?;
        w.u64(tags::DURATION, &props::DURATION, self.duration)?;
        w.u16(
            tags::ROUNDED_TIMECODE_BASE,
            &props::ROUNDED_TIMECODE_BASE,
            self.rounded_timecode_base,
        )?;
        w.u64(tags::START_TIMECODE, &props::START_TIMECODE, self.start_timecode)?;
        w.bool(tags::DROP_FRAME, &props::DROP_FRAME, self.drop_frame)?;
        write_unknown(&mut w, &self.unknown)?;
        w.finish(&labels::TIMECODE_COMPONENT)
    }

    pub fn parse(set: &SetProperties, primer: &Primer) -> Result<Self> {
        Ok(TimecodeComponent {
            instance_uid: required(set.get_uuid(primer, &props::INSTANCE_UID), "InstanceUID")?,
            data_definition: set
                .get_ul(primer, &props::DATA_DEFINITION)
                .unwrap_or(labels::DATA_DEF_TIMECODE),
            duration: set.get_u64(primer, &props::DURATION).unwrap_or(0),
            rounded_timecode_base: set
                .get_u16(primer, &props::ROUNDED_TIMECODE_BASE)
                .unwrap_or(24),
            start_timecode: set.get_u64(primer, &props::START_TIMECODE).unwrap_or(0),
            drop_frame: set.get_bool(primer, &props::DROP_FRAME).unwrap_or(false),
            unknown: set.unknown(primer, Self::KNOWN),
        })
    }
}

/// One arena slot.
#[derive(Clone, Debug)]
#[must_use]
pub enum Set {
    Preface(Preface),
    Identification(Identification),
    ContentStorage(ContentStorage),
    EssenceContainerData(EssenceContainerData),
    Package(Package),
    Track(Track),
    Sequence(Sequence),
    SourceClip(SourceClip),
    TimecodeComponent(TimecodeComponent),
    Descriptor(EssenceDescriptor),
    SubDescriptor(SubDescriptor),
    CryptographicFramework(CryptographicFramework),
    CryptographicContext(CryptographicContext),
    /// A set with an unrecognized key, preserved whole.
    Unknown { key: Ul, body: Vec<u8> },
}

impl Set {
    pub fn instance_uid(&self) -> Option<Uuid> {
        match self {
            Set::Preface(s) => Some(s.instance_uid),
            Set::Identification(s) => Some(s.instance_uid),
            Set::ContentStorage(s) => Some(s.instance_uid),
            Set::EssenceContainerData(s) => Some(s.instance_uid),
            Set::Package(s) => Some(s.instance_uid),
            Set::Track(s) => Some(s.instance_uid),
            Set::Sequence(s) => Some(s.instance_uid),
            Set::SourceClip(s) => Some(s.instance_uid),
            Set::TimecodeComponent(s) => Some(s.instance_uid),
            Set::Descriptor(s) => Some(s.instance_uid()),
            Set::SubDescriptor(s) => Some(s.instance_uid()),
            Set::CryptographicFramework(s) => Some(s.instance_uid),
            Set::CryptographicContext(s) => Some(s.instance_uid),
            Set::Unknown { .. } => None,
        }
    }

    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        match self {
            Set::Preface(s) => s.serialize(primer),
            Set::Identification(s) => s.serialize(primer),
            Set::ContentStorage(s) => s.serialize(primer),
            Set::EssenceContainerData(s) => s.serialize(primer),
            Set::Package(s) => s.serialize(primer),
            Set::Track(s) => s.serialize(primer),
            Set::Sequence(s) => s.serialize(primer),
            Set::SourceClip(s) => s.serialize(primer),
            Set::TimecodeComponent(s) => s.serialize(primer),
            Set::Descriptor(s) => s.serialize(primer),
            Set::SubDescriptor(s) => s.serialize(primer),
            Set::CryptographicFramework(s) => s.serialize(primer),
            Set::CryptographicContext(s) => s.serialize(primer),
            Set::Unknown { key, body } => {
                let mut out = Vec::with_capacity(body.len() + 20);
                asdcp_core::klv::write_klv_header(&mut out, key, body.len() as u64, 0)?;
                out.extend_from_slice(body);
                Ok(out)
            }
        }
    }
}

/// The arena of header-metadata sets, in serialization order.
#[derive(Debug, Default)]
#[must_use]
pub struct HeaderMetadata {
    sets: Vec<Set>,
    by_uid: HashMap<Uuid, usize>,
}

impl HeaderMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, set: Set) {
        if let Some(uid) = set.instance_uid() {
            self.by_uid.insert(uid, self.sets.len());
        }
        self.sets.push(set);
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn get(&self, uid: &Uuid) -> Option<&Set> {
        self.by_uid.get(uid).map(|&i| &self.sets[i])
    }

    pub fn preface(&self) -> Result<&Preface> {
        self.sets
            .iter()
            .find_map(|s| match s {
                Set::Preface(p) => Some(p),
                _ => None,
            })
            .ok_or_else(|| Error::Format("header metadata has no Preface".into()))
    }

    pub fn content_storage(&self) -> Result<&ContentStorage> {
        self.sets
            .iter()
            .find_map(|s| match s {
                Set::ContentStorage(c) => Some(c),
                _ => None,
            })
            .ok_or_else(|| Error::Format("header metadata has no ContentStorage".into()))
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.sets.iter().filter_map(|s| match s {
            Set::Package(p) => Some(p),
            _ => None,
        })
    }

    pub fn file_source_package(&self) -> Result<&Package> {
        self.packages()
            .find(|p| p.kind == PackageKind::Source)
            .ok_or_else(|| Error::Format("header metadata has no SourcePackage".into()))
    }

    /// The descriptor of the (first) file source package.
    pub fn primary_descriptor(&self) -> Result<&EssenceDescriptor> {
        let package = self.file_source_package()?;
        let uid = required(package.descriptor, "SourcePackage Descriptor")?;
        match self.get(&uid) {
            Some(Set::Descriptor(d)) => Ok(d),
            _ => Err(Error::Format("descriptor reference unresolved".into())),
        }
    }

    pub fn sub_descriptors(&self) -> impl Iterator<Item = &SubDescriptor> {
        self.sets.iter().filter_map(|s| match s {
            Set::SubDescriptor(d) => Some(d),
            _ => None,
        })
    }

    pub fn cryptographic_context(&self) -> Option<&CryptographicContext> {
        self.sets.iter().find_map(|s| match s {
            Set::CryptographicContext(c) => Some(c),
            _ => None,
        })
    }

    /// Edit rate of the file package's essence track.
    pub fn edit_rate(&self) -> Result<Rational> {
        let package = self.file_source_package()?;
        for track_uid in &package.tracks {
            if let Some(Set::Track(track)) = self.get(track_uid) {
                if track.track_number != 0 {
                    if let Some(rate) = track.edit_rate {
                        return Ok(rate);
                    }
                }
            }
        }
        // fall back to any timeline track
        self.sets
            .iter()
            .find_map(|s| match s {
                Set::Track(t) => t.edit_rate,
                _ => None,
            })
            .ok_or_else(|| Error::Format("no timeline track with an edit rate".into()))
    }

    /// Serialize every set in arena order.
    pub fn serialize(&self, primer: &mut Primer) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for set in &self.sets {
            out.extend_from_slice(&set.serialize(primer)?);
        }
        Ok(out)
    }

    /// Decode a run of metadata-set KLVs (fillers skipped) using a primer
    /// parsed from the same partition.
    pub fn parse(body: &[u8], primer: &Primer) -> Result<Self> {
        let mut metadata = HeaderMetadata::new();
        let mut pos = 0usize;

        while pos < body.len() {
            let mut cursor = std::io::Cursor::new(&body[pos..]);
            let header = asdcp_core::klv::read_klv_header(&mut cursor)?;
            let value_start = pos + header.size;
            let value_end = value_start + header.length as usize;
            if value_end > body.len() {
                return Err(Error::Format("truncated metadata set".into()));
            }
            let value = &body[value_start..value_end];
            pos = value_end;

            if labels::is_fill_key(&header.key) {
                continue;
            }

            let set = SetProperties::parse(value)?;
            let key = header.key;

            let parsed = if key == labels::PREFACE {
                Set::Preface(Preface::parse(&set, primer)?)
            } else if key == labels::IDENTIFICATION {
                Set::Identification(Identification::parse(&set, primer)?)
            } else if key == labels::CONTENT_STORAGE {
                Set::ContentStorage(ContentStorage::parse(&set, primer)?)
            } else if key == labels::ESSENCE_CONTAINER_DATA {
                Set::EssenceContainerData(EssenceContainerData::parse(&set, primer)?)
            } else if key == labels::MATERIAL_PACKAGE {
                Set::Package(Package::parse(PackageKind::Material, &set, primer)?)
            } else if key == labels::SOURCE_PACKAGE {
                Set::Package(Package::parse(PackageKind::Source, &set, primer)?)
            } else if key == labels::TIMELINE_TRACK {
                Set::Track(Track::parse(true, &set, primer)?)
            } else if key == labels::STATIC_TRACK {
                Set::Track(Track::parse(false, &set, primer)?)
            } else if key == labels::SEQUENCE {
                Set::Sequence(Sequence::parse(&set, primer)?)
            } else if key == labels::SOURCE_CLIP {
                Set::SourceClip(SourceClip::parse(&set, primer)?)
            } else if key == labels::TIMECODE_COMPONENT {
                Set::TimecodeComponent(TimecodeComponent::parse(&set, primer)?)
            } else if key == labels::CRYPTOGRAPHIC_FRAMEWORK {
                Set::CryptographicFramework(CryptographicFramework::parse(&set, primer)?)
            } else if key == labels::CRYPTOGRAPHIC_CONTEXT {
                Set::CryptographicContext(CryptographicContext::parse(&set, primer)?)
            } else if let Some(descriptor) = EssenceDescriptor::parse(&key, &set, primer)? {
                Set::Descriptor(descriptor)
            } else if let Some(sub) = SubDescriptor::parse(&key, &set, primer)? {
                Set::SubDescriptor(sub)
            } else {
                Set::Unknown {
                    key,
                    body: value.to_vec(),
                }
            };
            metadata.add(parsed);
        }

        Ok(metadata)
    }

    /// Stamp the final duration into sequences, components, and the
    /// descriptor, as finalize rewrites the header in place.
    pub fn update_durations(&mut self, duration: u64) {
        for set in &mut self.sets {
            match set {
                Set::Sequence(s) => s.duration = duration,
                Set::SourceClip(c) => c.duration = duration,
                Set::TimecodeComponent(t) => t.duration = duration,
                Set::Descriptor(d) => d.file_mut().container_duration = duration,
                _ => {}
            }
        }
    }
}

/// Everything the metadata builder needs to describe one essence track.
#[derive(Clone, Debug)]
#[must_use]
pub struct EssenceTrackInfo {
    pub descriptor: EssenceDescriptor,
    pub sub_descriptors: Vec<SubDescriptor>,
    pub data_definition: Ul,
    pub edit_rate: Rational,
    /// Essence track number, matching the element key's trailing bytes.
    pub track_number: u32,
}

/// Crypto identity recorded in the header when essence is encrypted.
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct CryptoTrackInfo {
    pub context_id: Uuid,
    pub source_essence_container: Ul,
    pub cryptographic_key_id: Uuid,
}

/// Assemble the full writer-side metadata graph.
pub fn build_header_metadata(
    info: &WriterInfo,
    essence: EssenceTrackInfo,
    operational_pattern: Ul,
    essence_containers: Vec<Ul>,
    index_sid: u32,
    body_sid: u32,
    crypto: Option<CryptoTrackInfo>,
) -> Result<HeaderMetadata> {
    let now = Timestamp::now();
    let material_umid = Umid::from_material(info.asset_id);
    let file_umid = Umid::from_material(asdcp_crypto::make_uuid()?);

    let preface_uid = asdcp_crypto::make_uuid()?;
    let ident_uid = asdcp_crypto::make_uuid()?;
    let storage_uid = asdcp_crypto::make_uuid()?;
    let ecd_uid = asdcp_crypto::make_uuid()?;
    let material_uid = asdcp_crypto::make_uuid()?;
    let file_uid = asdcp_crypto::make_uuid()?;

    let mut metadata = HeaderMetadata::new();
    let descriptor_uid = essence.descriptor.instance_uid();

    metadata.add(Set::Preface(Preface {
        instance_uid: preface_uid,
        last_modified_date: now,
        version: 0x0102,
        object_model_version: None,
        primary_package: Some(file_uid),
        identifications: vec![ident_uid],
        content_storage: storage_uid,
        operational_pattern,
        essence_containers: essence_containers.clone(),
        dm_schemes: Vec::new(),
        unknown: Vec::new(),
    }));

    metadata.add(Set::Identification(Identification {
        instance_uid: ident_uid,
        this_generation_uid: asdcp_crypto::make_uuid()?,
        company_name: info.company_name.clone(),
        product_name: info.product_name.clone(),
        product_version: None,
        version_string: info.product_version.clone(),
        product_uid: info.product_uuid,
        modification_date: now,
        platform: None,
        unknown: Vec::new(),
    }));

    metadata.add(Set::ContentStorage(ContentStorage {
        instance_uid: storage_uid,
        packages: vec![material_uid, file_uid],
        essence_container_data: vec![ecd_uid],
        unknown: Vec::new(),
    }));

    metadata.add(Set::EssenceContainerData(EssenceContainerData {
        instance_uid: ecd_uid,
        linked_package_uid: file_umid,
        index_sid,
        body_sid,
        unknown: Vec::new(),
    }));

    // material package: timecode track + essence track referencing the
    // file package
    let mp_tc_track = asdcp_crypto::make_uuid()?;
    let mp_tc_sequence = asdcp_crypto::make_uuid()?;
    let mp_tc_component = asdcp_crypto::make_uuid()?;
    let mp_es_track = asdcp_crypto::make_uuid()?;
    let mp_es_sequence = asdcp_crypto::make_uuid()?;
    let mp_es_clip = asdcp_crypto::make_uuid()?;

    metadata.add(Set::Package(Package {
        kind: PackageKind::Material,
        instance_uid: material_uid,
        package_uid: material_umid,
        name: Some("Material Package".to_string()),
        creation_date: now,
        modified_date: now,
        tracks: vec![mp_tc_track, mp_es_track],
        descriptor: None,
        unknown: Vec::new(),
    }));

    let timecode_base = if essence.edit_rate.den != 0 {
        ((essence.edit_rate.num as f64 / essence.edit_rate.den as f64).round()) as u16
    } else {
        24
    };

    metadata.add(Set::Track(Track {
        instance_uid: mp_tc_track,
        track_id: 1,
        track_number: 0,
        track_name: Some("Timecode Track".to_string()),
        edit_rate: Some(essence.edit_rate),
        origin: Some(0),
        sequence: mp_tc_sequence,
        unknown: Vec::new(),
    }));
    metadata.add(Set::Sequence(Sequence {
        instance_uid: mp_tc_sequence,
        data_definition: labels::DATA_DEF_TIMECODE,
        duration: 0,
        components: vec![mp_tc_component],
        unknown: Vec::new(),
    }));
    metadata.add(Set::TimecodeComponent(TimecodeComponent {
        instance_uid: mp_tc_component,
        data_definition: labels::DATA_DEF_TIMECODE,
        duration: 0,
        rounded_timecode_base: timecode_base,
        start_timecode: 0,
        drop_frame: false,
        unknown: Vec::new(),
    }));

    metadata.add(Set::Track(Track {
        instance_uid: mp_es_track,
        track_id: 2,
        track_number: 0,
        track_name: None,
        edit_rate: Some(essence.edit_rate),
        origin: Some(0),
        sequence: mp_es_sequence,
        unknown: Vec::new(),
    }));
    metadata.add(Set::Sequence(Sequence {
        instance_uid: mp_es_sequence,
        data_definition: essence.data_definition,
        duration: 0,
        components: vec![mp_es_clip],
        unknown: Vec::new(),
    }));
    metadata.add(Set::SourceClip(SourceClip {
        instance_uid: mp_es_clip,
        data_definition: essence.data_definition,
        duration: 0,
        start_position: 0,
        source_package_id: file_umid,
        source_track_id: 2,
        unknown: Vec::new(),
    }));

    // file source package: essence track terminating the reference chain
    let fp_track = asdcp_crypto::make_uuid()?;
    let fp_sequence = asdcp_crypto::make_uuid()?;
    let fp_clip = asdcp_crypto::make_uuid()?;

    metadata.add(Set::Package(Package {
        kind: PackageKind::Source,
        instance_uid: file_uid,
        package_uid: file_umid,
        name: Some("File Package".to_string()),
        creation_date: now,
        modified_date: now,
        tracks: vec![fp_track],
        descriptor: Some(descriptor_uid),
        unknown: Vec::new(),
    }));
    metadata.add(Set::Track(Track {
        instance_uid: fp_track,
        track_id: 2,
        track_number: essence.track_number,
        track_name: None,
        edit_rate: Some(essence.edit_rate),
        origin: Some(0),
        sequence: fp_sequence,
        unknown: Vec::new(),
    }));
    metadata.add(Set::Sequence(Sequence {
        instance_uid: fp_sequence,
        data_definition: essence.data_definition,
        duration: 0,
        components: vec![fp_clip],
        unknown: Vec::new(),
    }));
    metadata.add(Set::SourceClip(SourceClip {
        instance_uid: fp_clip,
        data_definition: essence.data_definition,
        duration: 0,
        start_position: 0,
        source_package_id: Umid::default(),
        source_track_id: 0,
        unknown: Vec::new(),
    }));

    let mut descriptor = essence.descriptor;
    descriptor.file_mut().linked_track_id = 2;
    descriptor.file_mut().sub_descriptors = essence
        .sub_descriptors
        .iter()
        .map(SubDescriptor::instance_uid)
        .collect();
    metadata.add(Set::Descriptor(descriptor));
    for sub in essence.sub_descriptors {
        metadata.add(Set::SubDescriptor(sub));
    }

    if let Some(crypto) = crypto {
        let framework_uid = asdcp_crypto::make_uuid()?;
        let context_uid = asdcp_crypto::make_uuid()?;
        metadata.add(Set::CryptographicFramework(CryptographicFramework {
            instance_uid: framework_uid,
            context_sr: context_uid,
        }));
        metadata.add(Set::CryptographicContext(CryptographicContext {
            instance_uid: context_uid,
            context_id: crypto.context_id,
            source_essence_container: crypto.source_essence_container,
            cipher_algorithm: labels::CIPHER_ALGORITHM_AES128_CBC,
            mic_algorithm: labels::MIC_ALGORITHM_HMAC_SHA1,
            cryptographic_key_id: crypto.cryptographic_key_id,
        }));
    }

    Ok(metadata)
}
