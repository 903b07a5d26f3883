//! MXF structure for AS-DCP and AS-02 essence wrapping.
//!
//! - [`labels`] - the Universal Label dictionary
//! - [`primer`] - local tag ↔ UL resolution
//! - [`types`] / [`metadata`] / [`descriptor`] - the header-metadata
//!   object model (arena of sets keyed by InstanceUID)
//! - [`partition`] - partition packs and the Random Index Pack
//! - [`index`] - CBR and VBR index table segments
//! - [`writer`] / [`reader`] - the file-level state machines the essence
//!   facades build on

pub mod descriptor;
pub mod index;
pub mod labels;
pub mod metadata;
pub mod partition;
pub mod primer;
pub mod reader;
pub mod types;
pub mod writer;

pub use descriptor::{
    CryptographicContext, CryptographicFramework, DataEssenceDescriptor, EssenceDescriptor,
    FileDescriptor, Jp2kSubDescriptor, JxsSubDescriptor, PictureEssenceDescriptor, PictureKind,
    SubDescriptor, TimedTextEssenceDescriptor, TimedTextResourceSubDescriptor,
    WaveAudioDescriptor,
};
pub use index::{IndexEntry, IndexTable, IndexTableSegment};
pub use metadata::{build_header_metadata, EssenceTrackInfo, HeaderMetadata, Set};
pub use partition::{PartitionPack, RandomIndexPack};
pub use primer::Primer;
pub use reader::MxfFileReader;
pub use types::{LabelSet, SetProperties, SetWriter, Timestamp, VersionType, WriterInfo};
pub use writer::{MxfFileWriter, Profile, WriteConfig, DEFAULT_HEADER_RESERVE};
