//! LATTICE Client - Lazy Reference Resolution for Content Delivery
//!
//! Entities fetched from the content delivery service carry their
//! relationships as unresolved references. A reference is resolved on demand
//! with exactly one fetch, optionally memoized by the client's cache
//! strategy, and can be awaited or waited on with a deadline.
//!
//! # Example
//!
//! ```ignore
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let page = client.page(1, 123).resolve_blocking(None)?;
//! if let Some(page) = page {
//!     let group = page.structure_group().resolve().await?;
//! }
//! ```

pub mod blocking;
pub mod client;
pub mod collection;
pub mod context;
pub mod entities;
pub mod fetch;
pub mod http;
pub mod projection;
pub mod reference;
pub mod runtime;
pub mod telemetry;

pub use blocking::{BlockingAdapter, BlockingError};
pub use client::Client;
pub use collection::ReferenceList;
pub use context::ClientContext;
pub use entities::{
    Binary, BinaryContent, BinaryVariant, Component, ComponentPresentation, CustomMeta, ItemInfo,
    Keyword, MetaValue, Page, PageContent, Presentations, Publication, PublishInfo, Schema,
    StructureGroup, Taxonomy, Template,
};
pub use fetch::FetchAdapter;
pub use http::HttpFetchAdapter;
pub use projection::{Projectable, ProjectionError};
pub use reference::{ProjectFn, Reference};
pub use runtime::{ExecutionContext, ExecutionHandle};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig, TelemetryError};

pub use lattice_cache::{CacheStats, CacheStore, CacheStrategy, InMemoryCacheStore};
pub use lattice_core::{
    CacheConfig, CacheMode, ClientConfig, ClientError, ClientResult, ErrorKind, ReferenceKey,
};
