//! The Universal Label dictionary.
//!
//! Keys come in families sharing a fixed prefix:
//!
//! - partition packs: `06.0e.2b.34.02.05.01.01.0d.01.02.01.01.kk.ss.00`
//!   where `kk` selects header/body/footer and `ss` the open/closed status
//! - metadata sets: `06.0e.2b.34.02.53.01.01.0d.01.01.01.01.01.kk.00`
//! - essence elements: `06.0e.2b.34.01.02.01.01.0d.01.03.01.tt.cc.nn.kk`
//!
//! Property ULs live in the [`props`] submodule; they are resolved to
//! 2-byte local tags through the primer.

use asdcp_core::Ul;

/// First 13 bytes shared by every partition pack key.
pub const PARTITION_PREFIX: [u8; 13] = [
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01,
];

const fn partition_key(kind: u8, status: u8) -> Ul {
    Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, kind,
        status, 0x00,
    ])
}

pub const PARTITION_KIND_HEADER: u8 = 0x02;
pub const PARTITION_KIND_BODY: u8 = 0x03;
pub const PARTITION_KIND_FOOTER: u8 = 0x04;

pub const PARTITION_STATUS_OPEN_INCOMPLETE: u8 = 0x01;
pub const PARTITION_STATUS_CLOSED_INCOMPLETE: u8 = 0x02;
pub const PARTITION_STATUS_OPEN_COMPLETE: u8 = 0x03;
pub const PARTITION_STATUS_CLOSED_COMPLETE: u8 = 0x04;

pub const HEADER_PARTITION_OPEN_INCOMPLETE: Ul =
    partition_key(PARTITION_KIND_HEADER, PARTITION_STATUS_OPEN_INCOMPLETE);
pub const HEADER_PARTITION_CLOSED_COMPLETE: Ul =
    partition_key(PARTITION_KIND_HEADER, PARTITION_STATUS_CLOSED_COMPLETE);
pub const BODY_PARTITION_CLOSED_COMPLETE: Ul =
    partition_key(PARTITION_KIND_BODY, PARTITION_STATUS_CLOSED_COMPLETE);
pub const FOOTER_PARTITION_CLOSED_COMPLETE: Ul =
    partition_key(PARTITION_KIND_FOOTER, PARTITION_STATUS_CLOSED_COMPLETE);

pub const PRIMER_PACK: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01,
    0x00,
]);

pub const RANDOM_INDEX_PACK: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01,
    0x00,
]);

pub const INDEX_TABLE_SEGMENT: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01,
    0x00,
]);

/// KLV fill item, SMPTE version.
pub const KLV_FILL_SMPTE: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00,
    0x00,
]);

/// KLV fill item, pre-2004 Interop version.
pub const KLV_FILL_INTEROP: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x03, 0x01, 0x02, 0x10, 0x01, 0x00, 0x00,
    0x00,
]);

/// True for either flavor of fill key.
pub fn is_fill_key(key: &Ul) -> bool {
    *key == KLV_FILL_SMPTE || *key == KLV_FILL_INTEROP
}

/// True for any partition pack key.
pub fn is_partition_key(key: &Ul) -> bool {
    key.has_prefix(&PARTITION_PREFIX)
}

// Operational patterns

pub const OP_ATOM_SMPTE: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x02, 0x0d, 0x01, 0x02, 0x01, 0x10, 0x00, 0x00,
    0x00,
]);

pub const OP_ATOM_INTEROP: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x10, 0x00, 0x00,
    0x00,
]);

pub const OP_1A: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x01, 0x09,
    0x00,
]);

// Essence containers

pub const ESSENCE_CONTAINER_JP2K: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x07, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x0c, 0x01,
    0x00,
]);

pub const ESSENCE_CONTAINER_JXS: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x0d, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x21, 0x01,
    0x00,
]);

pub const ESSENCE_CONTAINER_PCM: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x06, 0x01,
    0x00,
]);

pub const ESSENCE_CONTAINER_TIMED_TEXT: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x0a, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x13, 0x01,
    0x01,
]);

pub const ESSENCE_CONTAINER_DCDATA: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x0e, 0x00,
    0x00,
]);

/// Container label announcing encrypted essence.
pub const ESSENCE_CONTAINER_CRYPT: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x07, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x0b, 0x01,
    0x00,
]);

// Essence element keys (the K of body triplets)

pub const ESSENCE_ELEMENT_JP2K: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x15, 0x01, 0x08,
    0x01,
]);

pub const ESSENCE_ELEMENT_JXS: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x15, 0x01, 0x17,
    0x01,
]);

pub const ESSENCE_ELEMENT_PCM: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x16, 0x01, 0x01,
    0x01,
]);

pub const ESSENCE_ELEMENT_TIMED_TEXT: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x17, 0x01, 0x01,
    0x01,
]);

pub const ESSENCE_ELEMENT_DCDATA: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x17, 0x01, 0x02,
    0x01,
]);

/// Per-frame Prosumer HDR metadata element, paired with a JP2K picture
/// triplet in the same edit unit.
pub const ESSENCE_ELEMENT_PHDR_METADATA: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x17, 0x01, 0x03,
    0x01,
]);

/// The trailing PHDR master metadata document.
pub const ESSENCE_ELEMENT_PHDR_MASTER: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x17, 0x01, 0x04,
    0x01,
]);

/// Key carried by encrypted essence triplets in place of the element key.
pub const ENCRYPTED_TRIPLET: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x04, 0x01, 0x07, 0x0d, 0x01, 0x03, 0x01, 0x02, 0x7e, 0x01,
    0x00,
]);

/// The body element key wrapped by a given essence container label.
pub fn element_for_container(container: &Ul) -> Option<Ul> {
    if *container == ESSENCE_CONTAINER_JP2K {
        Some(ESSENCE_ELEMENT_JP2K)
    } else if *container == ESSENCE_CONTAINER_JXS {
        Some(ESSENCE_ELEMENT_JXS)
    } else if *container == ESSENCE_CONTAINER_PCM {
        Some(ESSENCE_ELEMENT_PCM)
    } else if *container == ESSENCE_CONTAINER_TIMED_TEXT {
        Some(ESSENCE_ELEMENT_TIMED_TEXT)
    } else if *container == ESSENCE_CONTAINER_DCDATA {
        Some(ESSENCE_ELEMENT_DCDATA)
    } else {
        None
    }
}

// Metadata set keys

const fn set_key(b14: u8) -> Ul {
    Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x01, 0x01, 0x01, 0x01, b14,
        0x00,
    ])
}

pub const PREFACE: Ul = set_key(0x2f);
pub const IDENTIFICATION: Ul = set_key(0x30);
pub const CONTENT_STORAGE: Ul = set_key(0x18);
pub const ESSENCE_CONTAINER_DATA: Ul = set_key(0x23);
pub const MATERIAL_PACKAGE: Ul = set_key(0x36);
pub const SOURCE_PACKAGE: Ul = set_key(0x37);
pub const TIMELINE_TRACK: Ul = set_key(0x3b);
pub const STATIC_TRACK: Ul = set_key(0x3a);
pub const SEQUENCE: Ul = set_key(0x0f);
pub const SOURCE_CLIP: Ul = set_key(0x11);
pub const TIMECODE_COMPONENT: Ul = set_key(0x14);
pub const FILE_DESCRIPTOR: Ul = set_key(0x25);
pub const CDCI_DESCRIPTOR: Ul = set_key(0x28);
pub const RGBA_DESCRIPTOR: Ul = set_key(0x29);
pub const WAVE_AUDIO_DESCRIPTOR: Ul = set_key(0x48);
pub const DC_DATA_DESCRIPTOR: Ul = set_key(0x43);
pub const TIMED_TEXT_DESCRIPTOR: Ul = set_key(0x64);
pub const TIMED_TEXT_RESOURCE_SUBDESCRIPTOR: Ul = set_key(0x65);
pub const JPEG2000_SUBDESCRIPTOR: Ul = set_key(0x5a);
pub const JPEGXS_SUBDESCRIPTOR: Ul = set_key(0x7a);

pub const CRYPTOGRAPHIC_FRAMEWORK: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x04, 0x01, 0x02, 0x01, 0x00,
    0x00,
]);

pub const CRYPTOGRAPHIC_CONTEXT: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x04, 0x01, 0x02, 0x02, 0x00,
    0x00,
]);

// Track data definitions

pub const DATA_DEF_PICTURE: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x01, 0x03, 0x02, 0x02, 0x01, 0x00, 0x00,
    0x00,
]);

pub const DATA_DEF_SOUND: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x01, 0x03, 0x02, 0x02, 0x02, 0x00, 0x00,
    0x00,
]);

pub const DATA_DEF_TIMECODE: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x01, 0x03, 0x02, 0x01, 0x01, 0x00, 0x00,
    0x00,
]);

pub const DATA_DEF_DATA: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x01, 0x03, 0x02, 0x03, 0x02, 0x00, 0x00,
    0x00,
]);

// Essence coding labels

pub const JP2K_ESSENCE_COMPRESSION_2K: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x09, 0x04, 0x01, 0x02, 0x02, 0x03, 0x01, 0x01,
    0x03,
]);

pub const JP2K_ESSENCE_COMPRESSION_4K: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x09, 0x04, 0x01, 0x02, 0x02, 0x03, 0x01, 0x01,
    0x04,
]);

pub const JPEGXS_ESSENCE_COMPRESSION: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x0d, 0x04, 0x01, 0x02, 0x02, 0x03, 0x09, 0x01,
    0x00,
]);

pub const SOUND_ESSENCE_UNCOMPRESSED: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x04, 0x02, 0x02, 0x01, 0x00, 0x00, 0x00,
    0x00,
]);

pub const DCDATA_CODING_GENERIC: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x02, 0x01, 0x00, 0x00,
    0x00,
]);

pub const DCDATA_CODING_ATMOS: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x0d, 0x04, 0x04, 0x02, 0x02, 0x02, 0x01, 0x00,
    0x00,
]);

// Cryptographic algorithm labels

pub const CIPHER_ALGORITHM_AES128_CBC: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x07, 0x02, 0x09, 0x02, 0x01, 0x01, 0x00, 0x00,
    0x00,
]);

pub const MIC_ALGORITHM_HMAC_SHA1: Ul = Ul::new([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x07, 0x02, 0x09, 0x02, 0x02, 0x01, 0x00, 0x00,
    0x00,
]);

/// Property ULs, resolved to local tags through the primer. A property
/// whose static tag is zero is dynamically tagged from 0x8000.
pub mod props {
    use asdcp_core::Ul;

    pub const INSTANCE_UID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0x00, 0x00,
        0x00, 0x00,
    ]);

    pub const GENERATION_UID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x08, 0x00,
        0x00, 0x00,
    ]);

    // Preface
    pub const LAST_MODIFIED_DATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x10, 0x02, 0x04,
        0x00, 0x00,
    ]);
    pub const VERSION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x01, 0x05, 0x00,
        0x00, 0x00,
    ]);
    pub const OBJECT_MODEL_VERSION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x03, 0x01, 0x02, 0x01, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const PRIMARY_PACKAGE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x01, 0x04, 0x01, 0x08,
        0x00, 0x00,
    ]);
    pub const IDENTIFICATIONS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x06, 0x04,
        0x00, 0x00,
    ]);
    pub const CONTENT_STORAGE_REF: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x02, 0x01,
        0x00, 0x00,
    ]);
    pub const OPERATIONAL_PATTERN: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x03, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const ESSENCE_CONTAINERS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x10, 0x02, 0x01,
        0x00, 0x00,
    ]);
    pub const DM_SCHEMES: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x10, 0x02, 0x02,
        0x00, 0x00,
    ]);

    // Identification
    pub const COMPANY_NAME: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x02, 0x01,
        0x00, 0x00,
    ]);
    pub const PRODUCT_NAME: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x03, 0x01,
        0x00, 0x00,
    ]);
    pub const PRODUCT_VERSION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const VERSION_STRING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x05, 0x01,
        0x00, 0x00,
    ]);
    pub const PRODUCT_UID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x07, 0x00,
        0x00, 0x00,
    ]);
    pub const MODIFICATION_DATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x10, 0x02, 0x03,
        0x00, 0x00,
    ]);
    pub const TOOLKIT_VERSION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x0a, 0x00,
        0x00, 0x00,
    ]);
    pub const PLATFORM: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x06, 0x01,
        0x00, 0x00,
    ]);

    // ContentStorage
    pub const PACKAGES: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x05, 0x01,
        0x00, 0x00,
    ]);
    pub const ESSENCE_CONTAINER_DATA_REFS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x05, 0x02,
        0x00, 0x00,
    ]);

    // EssenceContainerData
    pub const LINKED_PACKAGE_UID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x06, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const INDEX_SID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x04, 0x01, 0x03, 0x04, 0x05, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const BODY_SID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x04, 0x01, 0x03, 0x04, 0x04, 0x00, 0x00,
        0x00, 0x00,
    ]);

    // GenericPackage
    pub const PACKAGE_UID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x10, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const PACKAGE_NAME: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x03, 0x03, 0x02, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const PACKAGE_CREATION_DATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x10, 0x01, 0x03,
        0x00, 0x00,
    ]);
    pub const PACKAGE_MODIFIED_DATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x10, 0x02, 0x05,
        0x00, 0x00,
    ]);
    pub const TRACKS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x06, 0x05,
        0x00, 0x00,
    ]);
    pub const DESCRIPTOR_REF: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x02, 0x03,
        0x00, 0x00,
    ]);

    // Track
    pub const TRACK_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x07, 0x01, 0x01, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TRACK_NUMBER: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x04, 0x01, 0x03, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TRACK_NAME: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x01, 0x07, 0x01, 0x02, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const EDIT_RATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x30, 0x04, 0x05, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const ORIGIN: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x03, 0x01, 0x03,
        0x00, 0x00,
    ]);
    pub const SEQUENCE_REF: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x02, 0x04,
        0x00, 0x00,
    ]);

    // StructuralComponent
    pub const DATA_DEFINITION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x07, 0x01, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const DURATION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x02, 0x01, 0x01, 0x03,
        0x00, 0x00,
    ]);
    pub const STRUCTURAL_COMPONENTS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x06, 0x09,
        0x00, 0x00,
    ]);

    // SourceClip
    pub const START_POSITION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x03, 0x01, 0x04,
        0x00, 0x00,
    ]);
    pub const SOURCE_PACKAGE_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x03, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const SOURCE_TRACK_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x03, 0x02, 0x00,
        0x00, 0x00,
    ]);

    // TimecodeComponent
    pub const ROUNDED_TIMECODE_BASE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x04, 0x01, 0x01, 0x02, 0x06,
        0x00, 0x00,
    ]);
    pub const START_TIMECODE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x07, 0x02, 0x01, 0x03, 0x01, 0x05,
        0x00, 0x00,
    ]);
    pub const DROP_FRAME: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x04, 0x01, 0x01, 0x05, 0x00,
        0x00, 0x00,
    ]);

    // FileDescriptor
    pub const LINKED_TRACK_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x06, 0x01, 0x01, 0x03, 0x05, 0x00,
        0x00, 0x00,
    ]);
    pub const SAMPLE_RATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x01, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const CONTAINER_DURATION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x06, 0x01, 0x02, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const ESSENCE_CONTAINER_REF: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x06, 0x01, 0x01, 0x04, 0x01, 0x02,
        0x00, 0x00,
    ]);
    pub const CODEC: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x03, 0x01, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const SUB_DESCRIPTORS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x01, 0x04, 0x06, 0x10,
        0x00, 0x00,
    ]);

    // GenericPictureEssenceDescriptor
    pub const FRAME_LAYOUT: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x03, 0x01, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const STORED_WIDTH: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x02, 0x00,
        0x00, 0x00,
    ]);
    pub const STORED_HEIGHT: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x02, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const ASPECT_RATIO: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x01, 0x01, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const PICTURE_ESSENCE_CODING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x06, 0x01, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const COMPONENT_DEPTH: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x03, 0x0a, 0x00,
        0x00, 0x00,
    ]);
    pub const HORIZONTAL_SUBSAMPLING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x04, 0x01, 0x05, 0x01, 0x05, 0x00,
        0x00, 0x00,
    ]);
    pub const VERTICAL_SUBSAMPLING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x01, 0x05, 0x01, 0x10, 0x00,
        0x00, 0x00,
    ]);

    // GenericSoundEssenceDescriptor / WaveAudioDescriptor
    pub const AUDIO_SAMPLING_RATE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x01, 0x01, 0x01,
        0x00, 0x00,
    ]);
    pub const LOCKED: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x03, 0x01, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const CHANNEL_COUNT: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x01, 0x01, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const QUANTIZATION_BITS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x04, 0x04, 0x02, 0x03, 0x03, 0x04, 0x00,
        0x00, 0x00,
    ]);
    pub const BLOCK_ALIGN: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x02, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const AVG_BPS: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x04, 0x02, 0x03, 0x03, 0x05, 0x00,
        0x00, 0x00,
    ]);
    pub const SOUND_ESSENCE_COMPRESSION: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x02, 0x04, 0x02, 0x04, 0x02, 0x00, 0x00,
        0x00, 0x00,
    ]);

    // GenericDataEssenceDescriptor
    pub const DATA_ESSENCE_CODING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x05, 0x04, 0x03, 0x03, 0x02, 0x00, 0x00,
        0x00, 0x00,
    ]);

    // TimedTextDescriptor
    pub const TT_RESOURCE_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x01, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TT_NAMESPACE_URI: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x02, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TT_UCS_ENCODING: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x03, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TT_ANCILLARY_RESOURCE_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x04, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TT_MIME_MEDIA_TYPE: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x05, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const TT_ESSENCE_STREAM_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x06, 0x0c, 0x06, 0x00, 0x00,
        0x00, 0x00,
    ]);

    // JPEG2000PictureSubDescriptor
    const fn jp2k_prop(b13: u8) -> Ul {
        Ul::new([
            0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0a, 0x04, 0x01, 0x06, 0x03, b13, 0x00,
            0x00, 0x00,
        ])
    }
    pub const J2K_RSIZE: Ul = jp2k_prop(0x01);
    pub const J2K_XSIZE: Ul = jp2k_prop(0x02);
    pub const J2K_YSIZE: Ul = jp2k_prop(0x03);
    pub const J2K_XO_SIZE: Ul = jp2k_prop(0x04);
    pub const J2K_YO_SIZE: Ul = jp2k_prop(0x05);
    pub const J2K_XT_SIZE: Ul = jp2k_prop(0x06);
    pub const J2K_YT_SIZE: Ul = jp2k_prop(0x07);
    pub const J2K_XTO_SIZE: Ul = jp2k_prop(0x08);
    pub const J2K_YTO_SIZE: Ul = jp2k_prop(0x09);
    pub const J2K_CSIZE: Ul = jp2k_prop(0x0a);
    pub const J2K_PICTURE_COMPONENT_SIZING: Ul = jp2k_prop(0x0b);
    pub const J2K_CODING_STYLE_DEFAULT: Ul = jp2k_prop(0x0c);
    pub const J2K_QUANTIZATION_DEFAULT: Ul = jp2k_prop(0x0d);

    // JPEGXSPictureSubDescriptor
    const fn jxs_prop(b13: u8) -> Ul {
        Ul::new([
            0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x0d, 0x04, 0x01, 0x06, 0x05, b13, 0x00,
            0x00, 0x00,
        ])
    }
    pub const JXS_PPIH: Ul = jxs_prop(0x01);
    pub const JXS_PLEV: Ul = jxs_prop(0x02);
    pub const JXS_WF: Ul = jxs_prop(0x03);
    pub const JXS_HF: Ul = jxs_prop(0x04);
    pub const JXS_CW: Ul = jxs_prop(0x05);
    pub const JXS_HSL: Ul = jxs_prop(0x06);
    pub const JXS_NC: Ul = jxs_prop(0x07);
    pub const JXS_COMPONENT_TABLE: Ul = jxs_prop(0x08);

    // CryptographicFramework / CryptographicContext
    pub const CRYPTO_CONTEXT_SR: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x04, 0x06, 0x0d, 0x00,
        0x00, 0x00,
    ]);
    pub const CRYPTO_CONTEXT_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x01, 0x01, 0x15, 0x11, 0x00, 0x00,
        0x00, 0x00,
    ]);
    pub const CRYPTO_SOURCE_CONTAINER: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x06, 0x01, 0x04, 0x06, 0x0e, 0x00,
        0x00, 0x00,
    ]);
    pub const CRYPTO_CIPHER_ALGORITHM: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x02, 0x09, 0x03, 0x01, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const CRYPTO_MIC_ALGORITHM: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x02, 0x09, 0x03, 0x02, 0x01, 0x00,
        0x00, 0x00,
    ]);
    pub const CRYPTO_KEY_ID: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x09, 0x02, 0x09, 0x03, 0x03, 0x01, 0x00,
        0x00, 0x00,
    ]);
}

/// Static local tags per SMPTE 377; a tag of zero requests dynamic
/// assignment from 0x8000.
pub mod tags {
    pub const INSTANCE_UID: u16 = 0x3c0a;
    pub const GENERATION_UID: u16 = 0x0102;

    pub const LAST_MODIFIED_DATE: u16 = 0x3b02;
    pub const VERSION: u16 = 0x3b05;
    pub const OBJECT_MODEL_VERSION: u16 = 0x3b07;
    pub const PRIMARY_PACKAGE: u16 = 0x3b08;
    pub const IDENTIFICATIONS: u16 = 0x3b06;
    pub const CONTENT_STORAGE_REF: u16 = 0x3b03;
    pub const OPERATIONAL_PATTERN: u16 = 0x3b09;
    pub const ESSENCE_CONTAINERS: u16 = 0x3b0a;
    pub const DM_SCHEMES: u16 = 0x3b0b;

    pub const COMPANY_NAME: u16 = 0x3c01;
    pub const PRODUCT_NAME: u16 = 0x3c02;
    pub const PRODUCT_VERSION: u16 = 0x3c03;
    pub const VERSION_STRING: u16 = 0x3c04;
    pub const PRODUCT_UID: u16 = 0x3c05;
    pub const MODIFICATION_DATE: u16 = 0x3c06;
    pub const TOOLKIT_VERSION: u16 = 0x3c07;
    pub const PLATFORM: u16 = 0x3c08;
    pub const THIS_GENERATION_UID: u16 = 0x3c09;

    pub const PACKAGES: u16 = 0x1901;
    pub const ESSENCE_CONTAINER_DATA_REFS: u16 = 0x1902;

    pub const LINKED_PACKAGE_UID: u16 = 0x2701;
    pub const INDEX_SID: u16 = 0x3f06;
    pub const BODY_SID: u16 = 0x3f07;

    pub const PACKAGE_UID: u16 = 0x4401;
    pub const PACKAGE_NAME: u16 = 0x4402;
    pub const PACKAGE_CREATION_DATE: u16 = 0x4405;
    pub const PACKAGE_MODIFIED_DATE: u16 = 0x4404;
    pub const TRACKS: u16 = 0x4403;
    pub const DESCRIPTOR_REF: u16 = 0x4701;

    pub const TRACK_ID: u16 = 0x4801;
    pub const TRACK_NUMBER: u16 = 0x4804;
    pub const TRACK_NAME: u16 = 0x4802;
    pub const EDIT_RATE: u16 = 0x4b01;
    pub const ORIGIN: u16 = 0x4b02;
    pub const SEQUENCE_REF: u16 = 0x4803;

    pub const DATA_DEFINITION: u16 = 0x0201;
    pub const DURATION: u16 = 0x0202;
    pub const STRUCTURAL_COMPONENTS: u16 = 0x1001;

    pub const START_POSITION: u16 = 0x1201;
    pub const SOURCE_PACKAGE_ID: u16 = 0x1101;
    pub const SOURCE_TRACK_ID: u16 = 0x1102;

    pub const ROUNDED_TIMECODE_BASE: u16 = 0x1502;
    pub const START_TIMECODE: u16 = 0x1501;
    pub const DROP_FRAME: u16 = 0x1503;

    pub const LINKED_TRACK_ID: u16 = 0x3006;
    pub const SAMPLE_RATE: u16 = 0x3001;
    pub const CONTAINER_DURATION: u16 = 0x3002;
    pub const ESSENCE_CONTAINER_REF: u16 = 0x3004;
    pub const CODEC: u16 = 0x3005;

    pub const FRAME_LAYOUT: u16 = 0x320c;
    pub const STORED_WIDTH: u16 = 0x3203;
    pub const STORED_HEIGHT: u16 = 0x3202;
    pub const ASPECT_RATIO: u16 = 0x320e;
    pub const PICTURE_ESSENCE_CODING: u16 = 0x3201;
    pub const COMPONENT_DEPTH: u16 = 0x3301;
    pub const HORIZONTAL_SUBSAMPLING: u16 = 0x3302;
    pub const VERTICAL_SUBSAMPLING: u16 = 0x3308;

    pub const AUDIO_SAMPLING_RATE: u16 = 0x3d03;
    pub const LOCKED: u16 = 0x3d02;
    pub const CHANNEL_COUNT: u16 = 0x3d07;
    pub const QUANTIZATION_BITS: u16 = 0x3d01;
    pub const BLOCK_ALIGN: u16 = 0x3d0a;
    pub const AVG_BPS: u16 = 0x3d09;
    pub const SOUND_ESSENCE_COMPRESSION: u16 = 0x3d06;

    pub const DATA_ESSENCE_CODING: u16 = 0x3e01;

    /// Dynamic: no static tag assigned.
    pub const DYNAMIC: u16 = 0;
}
