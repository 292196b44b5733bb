use super::{ItemInfo, Page, Presentations, PublishInfo, Taxonomy};
use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::projection::Projectable;
use crate::reference::Reference;
use lattice_core::{
    BoxError, EntityKind, ItemId, RawComponent, RawComponentPresentation, RawPage, RawSchema,
    RawTemplate,
};

/// A published component.
#[derive(Debug, Clone)]
pub struct Component {
    pub item: ItemInfo,
    pub publish: PublishInfo,
    pub multimedia: bool,
    pub schema_id: i32,
    taxonomy: Taxonomy,
    presentations: Presentations,
    schema: Reference<RawSchema, Schema>,
}

impl Component {
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn presentations(&self) -> &Presentations {
        &self.presentations
    }

    pub fn schema(&self) -> &Reference<RawSchema, Schema> {
        &self.schema
    }
}

impl Projectable for Component {
    type Raw = RawComponent;
    const KIND: EntityKind = EntityKind::Component;

    fn project(ctx: &ClientContext, raw: RawComponent) -> Result<Self, BoxError> {
        Ok(Self {
            taxonomy: Taxonomy::from_raw(ctx, &raw.taxonomy),
            presentations: Presentations::new(ctx, raw.component_presentations.as_ref()),
            schema: ctx.single(raw.schema.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            publish: PublishInfo::from_raw(raw.published),
            multimedia: raw.multimedia,
            schema_id: raw.schema_id,
        })
    }
}

/// A component rendered with a template.
#[derive(Debug, Clone)]
pub struct ComponentPresentation {
    pub item: ItemInfo,
    pub component_id: ItemId,
    pub template_id: ItemId,
    pub output_format: Option<String>,
    pub content: Option<String>,
    component: Reference<RawComponent, Component>,
    template: Reference<RawTemplate, Template>,
    pages: ReferenceList<RawPage, Page>,
}

impl ComponentPresentation {
    pub fn component(&self) -> &Reference<RawComponent, Component> {
        &self.component
    }

    pub fn template(&self) -> &Reference<RawTemplate, Template> {
        &self.template
    }

    pub fn pages(&self) -> &ReferenceList<RawPage, Page> {
        &self.pages
    }
}

impl Projectable for ComponentPresentation {
    type Raw = RawComponentPresentation;
    const KIND: EntityKind = EntityKind::ComponentPresentation;

    fn project(ctx: &ClientContext, raw: RawComponentPresentation) -> Result<Self, BoxError> {
        Ok(Self {
            component: ctx.single(raw.component.as_ref()),
            template: ctx.single(raw.template.as_ref()),
            pages: ctx.list(raw.pages.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            component_id: raw.component_id,
            template_id: raw.template_id,
            output_format: raw.output_format,
            content: raw.presentation_content,
        })
    }
}

/// A component or page template.
#[derive(Debug, Clone)]
pub struct Template {
    pub item: ItemInfo,
    pub publish: PublishInfo,
    pub output_format: Option<String>,
    pub priority: i32,
    presentations: Presentations,
}

impl Template {
    pub fn presentations(&self) -> &Presentations {
        &self.presentations
    }
}

impl Projectable for Template {
    type Raw = RawTemplate;
    const KIND: EntityKind = EntityKind::Template;

    fn project(ctx: &ClientContext, raw: RawTemplate) -> Result<Self, BoxError> {
        Ok(Self {
            presentations: Presentations::new(ctx, raw.component_presentations.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            publish: PublishInfo::from_raw(raw.published),
            output_format: raw.output_format,
            priority: raw.template_priority,
        })
    }
}

/// Schema that components are based on.
#[derive(Debug, Clone)]
pub struct Schema {
    pub item: ItemInfo,
    pub schema_id: i32,
    pub title: Option<String>,
    components: ReferenceList<RawComponent, Component>,
}

impl Schema {
    pub fn components(&self) -> &ReferenceList<RawComponent, Component> {
        &self.components
    }
}

impl Projectable for Schema {
    type Raw = RawSchema;
    const KIND: EntityKind = EntityKind::Schema;

    fn project(ctx: &ClientContext, raw: RawSchema) -> Result<Self, BoxError> {
        Ok(Self {
            components: ctx.list(raw.components.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            schema_id: raw.schema_id,
            title: raw.title,
        })
    }
}
