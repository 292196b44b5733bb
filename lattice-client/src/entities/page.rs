use super::{ItemInfo, Presentations, PublishInfo, Taxonomy};
use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::projection::{non_negative, Projectable};
use crate::reference::Reference;
use lattice_core::{BoxError, EntityKind, ItemId, RawPage, RawPageContent, RawStructureGroup};

/// A published page.
#[derive(Debug, Clone)]
pub struct Page {
    pub item: ItemInfo,
    pub publish: PublishInfo,
    pub template_id: Option<ItemId>,
    pub page_path: Option<String>,
    pub url: Option<String>,
    taxonomy: Taxonomy,
    presentations: Presentations,
    page_content: Reference<RawPageContent, PageContent>,
    structure_group: Reference<RawStructureGroup, StructureGroup>,
}

impl Page {
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn presentations(&self) -> &Presentations {
        &self.presentations
    }

    pub fn page_content(&self) -> &Reference<RawPageContent, PageContent> {
        &self.page_content
    }

    pub fn structure_group(&self) -> &Reference<RawStructureGroup, StructureGroup> {
        &self.structure_group
    }
}

impl Projectable for Page {
    type Raw = RawPage;
    const KIND: EntityKind = EntityKind::Page;

    fn project(ctx: &ClientContext, raw: RawPage) -> Result<Self, BoxError> {
        Ok(Self {
            taxonomy: Taxonomy::from_raw(ctx, &raw.taxonomy),
            presentations: Presentations::new(ctx, raw.component_presentations.as_ref()),
            page_content: ctx.single(raw.page_content.as_ref()),
            structure_group: ctx.single(raw.structure_group.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            publish: PublishInfo::from_raw(raw.published),
            template_id: raw.template_id,
            page_path: raw.page_path,
            url: raw.url,
        })
    }
}

/// Rendered content of a page.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub item: ItemInfo,
    pub page_id: ItemId,
    pub charset: Option<String>,
    pub content: Option<String>,
    page: Reference<RawPage, Page>,
}

impl PageContent {
    pub fn page(&self) -> &Reference<RawPage, Page> {
        &self.page
    }
}

impl Projectable for PageContent {
    type Raw = RawPageContent;
    const KIND: EntityKind = EntityKind::PageContent;

    fn project(ctx: &ClientContext, raw: RawPageContent) -> Result<Self, BoxError> {
        Ok(Self {
            page: ctx.single(raw.page.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            page_id: raw.page_id,
            charset: raw.charset,
            content: raw.content,
        })
    }
}

/// Node of the publication's directory tree.
#[derive(Debug, Clone)]
pub struct StructureGroup {
    pub item: ItemInfo,
    pub id: i32,
    pub title: Option<String>,
    pub depth: i32,
    pub directory: Option<String>,
    pages: ReferenceList<RawPage, Page>,
    parent: Reference<RawStructureGroup, StructureGroup>,
    children: ReferenceList<RawStructureGroup, StructureGroup>,
}

impl StructureGroup {
    pub fn pages(&self) -> &ReferenceList<RawPage, Page> {
        &self.pages
    }

    /// Resolves to `None` for the root group.
    pub fn parent(&self) -> &Reference<RawStructureGroup, StructureGroup> {
        &self.parent
    }

    pub fn children(&self) -> &ReferenceList<RawStructureGroup, StructureGroup> {
        &self.children
    }
}

impl Projectable for StructureGroup {
    type Raw = RawStructureGroup;
    const KIND: EntityKind = EntityKind::StructureGroup;

    fn project(ctx: &ClientContext, raw: RawStructureGroup) -> Result<Self, BoxError> {
        Ok(Self {
            depth: non_negative("Depth", raw.depth)?,
            pages: ctx.list(raw.pages.as_ref()),
            parent: ctx.single(raw.parent.as_ref()),
            children: ctx.list(raw.children.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            id: raw.id,
            title: raw.title,
            directory: raw.directory,
        })
    }
}
