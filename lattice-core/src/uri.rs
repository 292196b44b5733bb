//! Resource URIs for root lookups on the content delivery service.
//!
//! Root entities are addressed with OData key syntax, e.g.
//! `{location}/Pages(PublicationId=1,ItemId=123)`. Relationship URIs are not
//! built here: they arrive as deferred links inside raw entities.

use crate::identity::{EntityKind, ItemId, PublicationId, ReferenceKey};

/// Builds resource URIs relative to the configured webservice location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    location: String,
}

impl ResourcePath {
    /// Create a path builder. Trailing slashes on `location` are ignored.
    pub fn new(location: impl AsRef<str>) -> Self {
        Self {
            location: location.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// The webservice location without trailing slash.
    pub fn location(&self) -> &str {
        &self.location
    }

    fn keyed(&self, kind: EntityKind, keys: &[(&str, String)]) -> ReferenceKey {
        let keys = keys
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        ReferenceKey::from(format!("{}/{}({})", self.location, kind.entity_set(), keys))
    }

    pub fn publication(&self, id: PublicationId) -> ReferenceKey {
        self.keyed(EntityKind::Publication, &[("Id", id.to_string())])
    }

    pub fn page(&self, publication_id: PublicationId, item_id: ItemId) -> ReferenceKey {
        self.keyed(
            EntityKind::Page,
            &[
                ("PublicationId", publication_id.to_string()),
                ("ItemId", item_id.to_string()),
            ],
        )
    }

    /// Pages are not unique by URL across publications, so this addresses a collection.
    ///
    /// The filter expression is percent-encoded as one query value.
    pub fn pages_by_url(&self, url: &str) -> ReferenceKey {
        let filter = format!("Url eq {}", quote(url));
        ReferenceKey::from(format!(
            "{}/{}?$filter={}",
            self.location,
            EntityKind::Page.entity_set(),
            urlencoding::encode(&filter)
        ))
    }

    pub fn page_content(&self, publication_id: PublicationId, page_id: ItemId) -> ReferenceKey {
        self.keyed(
            EntityKind::PageContent,
            &[
                ("PublicationId", publication_id.to_string()),
                ("PageId", page_id.to_string()),
            ],
        )
    }

    pub fn structure_group(&self, publication_id: PublicationId, id: i32) -> ReferenceKey {
        self.keyed(
            EntityKind::StructureGroup,
            &[
                ("PublicationId", publication_id.to_string()),
                ("Id", id.to_string()),
            ],
        )
    }

    pub fn component(&self, publication_id: PublicationId, item_id: ItemId) -> ReferenceKey {
        self.keyed(
            EntityKind::Component,
            &[
                ("PublicationId", publication_id.to_string()),
                ("ItemId", item_id.to_string()),
            ],
        )
    }

    pub fn component_presentation(
        &self,
        publication_id: PublicationId,
        component_id: ItemId,
        template_id: ItemId,
    ) -> ReferenceKey {
        self.keyed(
            EntityKind::ComponentPresentation,
            &[
                ("PublicationId", publication_id.to_string()),
                ("ComponentId", component_id.to_string()),
                ("TemplateId", template_id.to_string()),
            ],
        )
    }

    pub fn template(&self, publication_id: PublicationId, item_id: ItemId) -> ReferenceKey {
        self.keyed(
            EntityKind::Template,
            &[
                ("PublicationId", publication_id.to_string()),
                ("ItemId", item_id.to_string()),
            ],
        )
    }

    pub fn schema(&self, publication_id: PublicationId, schema_id: i32) -> ReferenceKey {
        self.keyed(
            EntityKind::Schema,
            &[
                ("PublicationId", publication_id.to_string()),
                ("SchemaId", schema_id.to_string()),
            ],
        )
    }

    pub fn keyword(&self, publication_id: PublicationId, id: i32, taxonomy_id: i32) -> ReferenceKey {
        self.keyed(
            EntityKind::Keyword,
            &[
                ("PublicationId", publication_id.to_string()),
                ("Id", id.to_string()),
                ("TaxonomyId", taxonomy_id.to_string()),
            ],
        )
    }

    pub fn custom_meta(&self, id: i32) -> ReferenceKey {
        self.keyed(EntityKind::CustomMeta, &[("Id", id.to_string())])
    }

    pub fn binary(&self, publication_id: PublicationId, binary_id: i32) -> ReferenceKey {
        self.keyed(
            EntityKind::Binary,
            &[
                ("PublicationId", publication_id.to_string()),
                ("BinaryId", binary_id.to_string()),
            ],
        )
    }

    pub fn binary_variant(&self, publication_id: PublicationId, binary_id: i32) -> ReferenceKey {
        self.keyed(
            EntityKind::BinaryVariant,
            &[
                ("PublicationId", publication_id.to_string()),
                ("BinaryId", binary_id.to_string()),
            ],
        )
    }

    pub fn binary_content(
        &self,
        publication_id: PublicationId,
        binary_id: i32,
        variant_id: &str,
    ) -> ReferenceKey {
        self.keyed(
            EntityKind::BinaryContent,
            &[
                ("PublicationId", publication_id.to_string()),
                ("BinaryId", binary_id.to_string()),
                ("VariantId", quote_key(variant_id)),
            ],
        )
    }
}

/// OData string literal: single-quoted, embedded quotes doubled.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// String literal inside a key segment; the content is percent-encoded.
fn quote_key(value: &str) -> String {
    format!("'{}'", urlencoding::encode(&value.replace('\'', "''")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let paths = ResourcePath::new("http://cd.example/odata.svc/");
        assert_eq!(paths.location(), "http://cd.example/odata.svc");
    }

    #[test]
    fn test_page_uri() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        assert_eq!(
            paths.page(1, 123).as_str(),
            "http://cd.example/odata.svc/Pages(PublicationId=1,ItemId=123)"
        );
    }

    #[test]
    fn test_binary_content_quotes_variant() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        assert_eq!(
            paths.binary_content(3, 7, "thumb'nail").as_str(),
            "http://cd.example/odata.svc/BinaryContents(PublicationId=3,BinaryId=7,VariantId='thumb%27%27nail')"
        );
    }

    #[test]
    fn test_pages_by_url_filter() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        assert_eq!(
            paths.pages_by_url("/index.html").as_str(),
            "http://cd.example/odata.svc/Pages?$filter=Url%20eq%20%27%2Findex.html%27"
        );
    }

    #[test]
    fn test_pages_by_url_encodes_reserved_characters() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        let key = paths.pages_by_url("/news#top&x=1+2%");
        let (_, query) = key.as_str().split_once('?').unwrap();
        assert_eq!(
            query,
            "$filter=Url%20eq%20%27%2Fnews%23top%26x%3D1%2B2%25%27"
        );
        assert!(!query.contains('#'));
        assert_eq!(query.matches('&').count(), 0);
        assert_eq!(
            urlencoding::decode(query.trim_start_matches("$filter=")).unwrap(),
            "Url eq '/news#top&x=1+2%'"
        );
    }

    #[test]
    fn test_pages_by_url_doubles_quotes_before_encoding() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        let key = paths.pages_by_url("/o'neil");
        let (_, filter) = key.as_str().split_once("$filter=").unwrap();
        assert_eq!(urlencoding::decode(filter).unwrap(), "Url eq '/o''neil'");
    }

    #[test]
    fn test_keyword_uri_has_three_keys() {
        let paths = ResourcePath::new("http://cd.example/odata.svc");
        assert_eq!(
            paths.keyword(1, 2, 3).as_str(),
            "http://cd.example/odata.svc/Keywords(PublicationId=1,Id=2,TaxonomyId=3)"
        );
    }
}
