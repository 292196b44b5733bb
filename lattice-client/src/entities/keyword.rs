use super::{Component, ItemInfo, Page};
use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::projection::{non_empty, non_negative, Projectable};
use crate::reference::Reference;
use lattice_core::{
    BoxError, EntityKind, ItemId, RawComponent, RawCustomMeta, RawKeyword, RawPage, Timestamp,
};

/// Taxonomy keyword. Keywords form a tree per taxonomy.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub item: ItemInfo,
    pub id: i32,
    pub taxonomy_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_children: bool,
    pub is_abstract: bool,
    pub navigable: bool,
    pub key: Option<String>,
    pub depth: i32,
    pub item_type: i32,
    pub total_related_items: Option<i32>,
    components: ReferenceList<RawComponent, Component>,
    pages: ReferenceList<RawPage, Page>,
    custom_metas: ReferenceList<RawCustomMeta, CustomMeta>,
    children: ReferenceList<RawKeyword, Keyword>,
    parent: Reference<RawKeyword, Keyword>,
}

impl Keyword {
    pub fn components(&self) -> &ReferenceList<RawComponent, Component> {
        &self.components
    }

    pub fn pages(&self) -> &ReferenceList<RawPage, Page> {
        &self.pages
    }

    pub fn custom_metas(&self) -> &ReferenceList<RawCustomMeta, CustomMeta> {
        &self.custom_metas
    }

    pub fn children(&self) -> &ReferenceList<RawKeyword, Keyword> {
        &self.children
    }

    pub fn parent(&self) -> &Reference<RawKeyword, Keyword> {
        &self.parent
    }
}

impl Projectable for Keyword {
    type Raw = RawKeyword;
    const KIND: EntityKind = EntityKind::Keyword;

    fn project(ctx: &ClientContext, raw: RawKeyword) -> Result<Self, BoxError> {
        Ok(Self {
            depth: non_negative("Depth", raw.depth)?,
            components: ctx.list(raw.components.as_ref()),
            pages: ctx.list(raw.pages.as_ref()),
            custom_metas: ctx.list(raw.custom_metas.as_ref()),
            children: ctx.list(raw.children.as_ref()),
            parent: ctx.single(raw.parent.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            id: raw.id,
            taxonomy_id: raw.taxonomy_id,
            title: raw.title,
            description: raw.description,
            has_children: raw.has_children,
            is_abstract: raw.is_abstract,
            navigable: raw.navigable,
            key: raw.key,
            item_type: raw.item_type,
            total_related_items: raw.total_related_items,
        })
    }
}

/// Typed value of a custom metadata field.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Date(Timestamp),
    Float(f32),
    String(String),
}

/// Custom metadata key/value attached to a page, component or keyword.
#[derive(Debug, Clone)]
pub struct CustomMeta {
    pub item: ItemInfo,
    pub item_id: ItemId,
    pub id: i32,
    pub item_type: i32,
    pub key_name: String,
    pub date_value: Option<Timestamp>,
    pub float_value: Option<f32>,
    pub string_value: Option<String>,
    component: Reference<RawComponent, Component>,
    page: Reference<RawPage, Page>,
    keyword: Reference<RawKeyword, Keyword>,
}

impl CustomMeta {
    /// The populated value, preferring string over date over float.
    pub fn value(&self) -> Option<MetaValue> {
        if let Some(s) = &self.string_value {
            return Some(MetaValue::String(s.clone()));
        }
        if let Some(d) = self.date_value {
            return Some(MetaValue::Date(d));
        }
        self.float_value.map(MetaValue::Float)
    }

    pub fn component(&self) -> &Reference<RawComponent, Component> {
        &self.component
    }

    pub fn page(&self) -> &Reference<RawPage, Page> {
        &self.page
    }

    pub fn keyword(&self) -> &Reference<RawKeyword, Keyword> {
        &self.keyword
    }
}

impl Projectable for CustomMeta {
    type Raw = RawCustomMeta;
    const KIND: EntityKind = EntityKind::CustomMeta;

    fn project(ctx: &ClientContext, raw: RawCustomMeta) -> Result<Self, BoxError> {
        Ok(Self {
            key_name: non_empty("KeyName", raw.key_name)?,
            component: ctx.single(raw.component.as_ref()),
            page: ctx.single(raw.page.as_ref()),
            keyword: ctx.single(raw.keyword.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            item_id: raw.item_id,
            id: raw.id,
            item_type: raw.item_type,
            date_value: raw.date_value,
            float_value: raw.float_value,
            string_value: raw.string_value,
        })
    }
}
