//! Identity types for LATTICE entities and references

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Publication identifier as used by the content delivery service.
pub type PublicationId = i32;

/// Item identifier (page, component, template) within a publication.
pub type ItemId = i32;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Opaque key identifying the target of a relationship.
///
/// In this domain the key is the resolved URI of the target resource. It is
/// the lookup key of every cache strategy and never changes once built.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceKey(Arc<str>);

impl ReferenceKey {
    /// Create a key from a resolved URI.
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(Arc::from(uri.as_ref()))
    }

    /// The URI this key stands for.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReferenceKey").field(&&*self.0).finish()
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferenceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReferenceKey {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for ReferenceKey {
    fn from(uri: String) -> Self {
        Self(Arc::from(uri))
    }
}

/// Entity kind discriminator for the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Publication,
    Page,
    PageContent,
    StructureGroup,
    Component,
    ComponentPresentation,
    Template,
    Schema,
    Keyword,
    CustomMeta,
    Binary,
    BinaryVariant,
    BinaryContent,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 13] = [
        EntityKind::Publication,
        EntityKind::Page,
        EntityKind::PageContent,
        EntityKind::StructureGroup,
        EntityKind::Component,
        EntityKind::ComponentPresentation,
        EntityKind::Template,
        EntityKind::Schema,
        EntityKind::Keyword,
        EntityKind::CustomMeta,
        EntityKind::Binary,
        EntityKind::BinaryVariant,
        EntityKind::BinaryContent,
    ];

    /// Singular name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Publication => "Publication",
            EntityKind::Page => "Page",
            EntityKind::PageContent => "PageContent",
            EntityKind::StructureGroup => "StructureGroup",
            EntityKind::Component => "Component",
            EntityKind::ComponentPresentation => "ComponentPresentation",
            EntityKind::Template => "Template",
            EntityKind::Schema => "Schema",
            EntityKind::Keyword => "Keyword",
            EntityKind::CustomMeta => "CustomMeta",
            EntityKind::Binary => "Binary",
            EntityKind::BinaryVariant => "BinaryVariant",
            EntityKind::BinaryContent => "BinaryContent",
        }
    }

    /// Name of the entity set this kind lives in on the service.
    pub fn entity_set(&self) -> &'static str {
        match self {
            EntityKind::Publication => "Publications",
            EntityKind::Page => "Pages",
            EntityKind::PageContent => "PageContents",
            EntityKind::StructureGroup => "StructureGroups",
            EntityKind::Component => "Components",
            EntityKind::ComponentPresentation => "ComponentPresentations",
            EntityKind::Template => "Templates",
            EntityKind::Schema => "Schemas",
            EntityKind::Keyword => "Keywords",
            EntityKind::CustomMeta => "CustomMetas",
            EntityKind::Binary => "Binaries",
            EntityKind::BinaryVariant => "BinaryVariants",
            EntityKind::BinaryContent => "BinaryContents",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_key_equality_and_display() {
        let a = ReferenceKey::new("http://cd/odata.svc/Pages(PublicationId=1,ItemId=2)");
        let b = ReferenceKey::from(String::from(
            "http://cd/odata.svc/Pages(PublicationId=1,ItemId=2)",
        ));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.as_str());
    }

    #[test]
    fn test_reference_key_clone_shares_storage() {
        let a = ReferenceKey::new("page/123/structureGroup");
        let b = a.clone();
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
    }

    #[test]
    fn test_entity_sets_are_unique() {
        let sets: HashSet<_> = EntityKind::ALL.iter().map(|k| k.entity_set()).collect();
        assert_eq!(sets.len(), EntityKind::ALL.len());
    }
}
