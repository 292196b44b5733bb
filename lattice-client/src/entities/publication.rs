use super::{
    Binary, BinaryVariant, Component, ComponentPresentation, CustomMeta, ItemInfo, Keyword, Page,
    PageContent, Schema, StructureGroup, Template,
};
use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::projection::Projectable;
use lattice_core::{
    BoxError, EntityKind, PublicationId, RawBinary, RawBinaryVariant, RawComponent,
    RawComponentPresentation, RawCustomMeta, RawKeyword, RawPage, RawPageContent, RawPublication,
    RawSchema, RawStructureGroup, RawTemplate,
};

/// Root of a publication's content. Every collection is lazy; a large
/// publication costs nothing until one of them is resolved.
#[derive(Debug, Clone)]
pub struct Publication {
    pub item: ItemInfo,
    pub id: PublicationId,
    pub key: Option<String>,
    pub multimedia_path: Option<String>,
    pub multimedia_url: Option<String>,
    pub publication_path: Option<String>,
    pub publication_url: Option<String>,
    pub title: Option<String>,
    schemas: ReferenceList<RawSchema, Schema>,
    component_presentations: ReferenceList<RawComponentPresentation, ComponentPresentation>,
    keywords: ReferenceList<RawKeyword, Keyword>,
    binaries: ReferenceList<RawBinary, Binary>,
    binary_variants: ReferenceList<RawBinaryVariant, BinaryVariant>,
    components: ReferenceList<RawComponent, Component>,
    custom_metas: ReferenceList<RawCustomMeta, CustomMeta>,
    pages: ReferenceList<RawPage, Page>,
    page_contents: ReferenceList<RawPageContent, PageContent>,
    structure_groups: ReferenceList<RawStructureGroup, StructureGroup>,
    templates: ReferenceList<RawTemplate, Template>,
}

impl Publication {
    pub fn schemas(&self) -> &ReferenceList<RawSchema, Schema> {
        &self.schemas
    }

    pub fn component_presentations(
        &self,
    ) -> &ReferenceList<RawComponentPresentation, ComponentPresentation> {
        &self.component_presentations
    }

    pub fn keywords(&self) -> &ReferenceList<RawKeyword, Keyword> {
        &self.keywords
    }

    pub fn binaries(&self) -> &ReferenceList<RawBinary, Binary> {
        &self.binaries
    }

    pub fn binary_variants(&self) -> &ReferenceList<RawBinaryVariant, BinaryVariant> {
        &self.binary_variants
    }

    pub fn components(&self) -> &ReferenceList<RawComponent, Component> {
        &self.components
    }

    pub fn custom_metas(&self) -> &ReferenceList<RawCustomMeta, CustomMeta> {
        &self.custom_metas
    }

    pub fn pages(&self) -> &ReferenceList<RawPage, Page> {
        &self.pages
    }

    pub fn page_contents(&self) -> &ReferenceList<RawPageContent, PageContent> {
        &self.page_contents
    }

    pub fn structure_groups(&self) -> &ReferenceList<RawStructureGroup, StructureGroup> {
        &self.structure_groups
    }

    pub fn templates(&self) -> &ReferenceList<RawTemplate, Template> {
        &self.templates
    }
}

impl Projectable for Publication {
    type Raw = RawPublication;
    const KIND: EntityKind = EntityKind::Publication;

    fn project(ctx: &ClientContext, raw: RawPublication) -> Result<Self, BoxError> {
        Ok(Self {
            schemas: ctx.list(raw.schemas.as_ref()),
            component_presentations: ctx.list(raw.component_presentations.as_ref()),
            keywords: ctx.list(raw.keywords.as_ref()),
            binaries: ctx.list(raw.binaries.as_ref()),
            binary_variants: ctx.list(raw.binary_variants.as_ref()),
            components: ctx.list(raw.components.as_ref()),
            custom_metas: ctx.list(raw.custom_metas.as_ref()),
            pages: ctx.list(raw.pages.as_ref()),
            page_contents: ctx.list(raw.page_contents.as_ref()),
            structure_groups: ctx.list(raw.structure_groups.as_ref()),
            templates: ctx.list(raw.templates.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            id: raw.id,
            key: raw.key,
            multimedia_path: raw.multimedia_path,
            multimedia_url: raw.multimedia_url,
            publication_path: raw.publication_path,
            publication_url: raw.publication_url,
            title: raw.title,
        })
    }
}
