use super::ItemInfo;
use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::projection::Projectable;
use crate::reference::Reference;
use lattice_core::{BoxError, EntityKind, RawBinary, RawBinaryContent, RawBinaryVariant};

/// A multimedia binary.
#[derive(Debug, Clone)]
pub struct Binary {
    pub item: ItemInfo,
    pub binary_id: i32,
    pub binary_type: Option<String>,
    binary_variants: ReferenceList<RawBinaryVariant, BinaryVariant>,
}

impl Binary {
    pub fn binary_variants(&self) -> &ReferenceList<RawBinaryVariant, BinaryVariant> {
        &self.binary_variants
    }
}

impl Projectable for Binary {
    type Raw = RawBinary;
    const KIND: EntityKind = EntityKind::Binary;

    fn project(ctx: &ClientContext, raw: RawBinary) -> Result<Self, BoxError> {
        Ok(Self {
            binary_variants: ctx.list(raw.binary_variants.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            binary_id: raw.binary_id,
            binary_type: raw.binary_type,
        })
    }
}

/// One published rendition of a binary.
#[derive(Debug, Clone)]
pub struct BinaryVariant {
    pub item: ItemInfo,
    pub binary_id: i32,
    pub binary_type: Option<String>,
    pub url_path: Option<String>,
    pub is_component: bool,
    pub path: Option<String>,
    pub variant_id: Option<String>,
    pub description: Option<String>,
    binary: Reference<RawBinary, Binary>,
}

impl BinaryVariant {
    pub fn binary(&self) -> &Reference<RawBinary, Binary> {
        &self.binary
    }
}

impl Projectable for BinaryVariant {
    type Raw = RawBinaryVariant;
    const KIND: EntityKind = EntityKind::BinaryVariant;

    fn project(ctx: &ClientContext, raw: RawBinaryVariant) -> Result<Self, BoxError> {
        Ok(Self {
            binary: ctx.single(raw.binary.as_ref()),
            item: ItemInfo::from_raw(raw.item),
            binary_id: raw.binary_id,
            binary_type: raw.binary_type,
            url_path: raw.url_path,
            is_component: raw.component,
            path: raw.path,
            variant_id: raw.variant_id,
            description: raw.description,
        })
    }
}

/// Content of a binary variant. Has no references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryContent {
    pub item: ItemInfo,
    pub binary_id: i32,
    pub variant_id: Option<String>,
    /// Base64 payload as delivered by the service.
    pub content: Option<String>,
}

impl Projectable for BinaryContent {
    type Raw = RawBinaryContent;
    const KIND: EntityKind = EntityKind::BinaryContent;

    fn project(_ctx: &ClientContext, raw: RawBinaryContent) -> Result<Self, BoxError> {
        Ok(Self {
            item: ItemInfo::from_raw(raw.item),
            binary_id: raw.binary_id,
            variant_id: raw.variant_id,
            content: raw.content,
        })
    }
}
