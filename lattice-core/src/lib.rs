//! LATTICE Core - Identity, Wire Types, Errors, Configuration
//!
//! Plain data shared by the cache and client crates. Nothing in here performs
//! I/O apart from reading a configuration file.

pub mod config;
pub mod error;
pub mod identity;
pub mod raw;
pub mod uri;

pub use config::{CacheConfig, CacheMode, ClientConfig};
pub use error::{
    BoxError, CacheError, ClientError, ClientResult, ConfigError, ErrorKind, TransformError,
    TransportError,
};
pub use identity::{EntityKind, ItemId, PublicationId, ReferenceKey, Timestamp};
pub use raw::{
    odata_date, DeferredUri, RawBinary, RawBinaryContent, RawBinaryVariant, RawComponent,
    RawComponentPresentation, RawCustomMeta, RawEntity, RawItem, RawKeyword, RawLink,
    RawMetadata, RawPage, RawPageContent, RawPublication, RawPublished, RawSchema,
    RawStructureGroup, RawTaxonomy, RawTemplate,
};
pub use uri::ResourcePath;
