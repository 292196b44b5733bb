//! Content node graph.
//!
//! Each entity kind is plain data plus lazy references to related entities.
//! Shared facets are composed from the capability structs below instead of a
//! type hierarchy.

mod binary;
mod component;
mod keyword;
mod page;
mod publication;

pub use binary::{Binary, BinaryContent, BinaryVariant};
pub use component::{Component, ComponentPresentation, Schema, Template};
pub use keyword::{CustomMeta, Keyword, MetaValue};
pub use page::{Page, PageContent, StructureGroup};
pub use publication::Publication;

use crate::collection::ReferenceList;
use crate::context::ClientContext;
use lattice_core::{
    ItemId, PublicationId, RawComponentPresentation, RawCustomMeta, RawItem, RawKeyword, RawLink,
    RawPublished, RawTaxonomy, Timestamp,
};

/// Fields every item carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub publication_id: PublicationId,
    /// Canonical URI reported by the service.
    pub uri: String,
    /// Service-side type name, e.g. `SDL.ContentDelivery.Page`.
    pub type_name: String,
}

impl ItemInfo {
    pub(crate) fn from_raw(raw: RawItem) -> Self {
        Self {
            publication_id: raw.publication_id,
            uri: raw.metadata.uri,
            type_name: raw.metadata.type_name,
        }
    }
}

/// Publish metadata of pages, components and templates.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishInfo {
    pub item_id: ItemId,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creation_date: Option<Timestamp>,
    pub initial_publish_date: Option<Timestamp>,
    pub last_publish_date: Option<Timestamp>,
    pub modification_date: Option<Timestamp>,
    pub major_version: Option<i32>,
    pub minor_version: Option<i32>,
    pub owning_publication: Option<i32>,
}

impl PublishInfo {
    pub(crate) fn from_raw(raw: RawPublished) -> Self {
        Self {
            item_id: raw.item_id,
            title: raw.title,
            author: raw.author,
            creation_date: raw.creation_date,
            initial_publish_date: raw.initial_publish_date,
            last_publish_date: raw.last_publish_date,
            modification_date: raw.modification_date,
            major_version: raw.major_version,
            minor_version: raw.minor_version,
            owning_publication: raw.owning_publication,
        }
    }
}

/// Keywords and custom metadata attached to an item.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    keywords: ReferenceList<RawKeyword, Keyword>,
    custom_metas: ReferenceList<RawCustomMeta, CustomMeta>,
}

impl Taxonomy {
    pub(crate) fn from_raw(ctx: &ClientContext, raw: &RawTaxonomy) -> Self {
        Self {
            keywords: ctx.list(raw.keywords.as_ref()),
            custom_metas: ctx.list(raw.custom_metas.as_ref()),
        }
    }

    pub fn keywords(&self) -> &ReferenceList<RawKeyword, Keyword> {
        &self.keywords
    }

    pub fn custom_metas(&self) -> &ReferenceList<RawCustomMeta, CustomMeta> {
        &self.custom_metas
    }
}

/// Component presentations an item takes part in.
#[derive(Debug, Clone)]
pub struct Presentations {
    component_presentations: ReferenceList<RawComponentPresentation, ComponentPresentation>,
}

impl Presentations {
    pub(crate) fn new(ctx: &ClientContext, link: Option<&RawLink>) -> Self {
        Self {
            component_presentations: ctx.list(link),
        }
    }

    pub fn component_presentations(
        &self,
    ) -> &ReferenceList<RawComponentPresentation, ComponentPresentation> {
        &self.component_presentations
    }
}
