//! Raw wire representations of content delivery entities.
//!
//! These mirror the OData v2 JSON the service returns. Relationships are not
//! expanded: each one is a `{"__deferred": {"uri": ...}}` link whose URI
//! becomes the [`ReferenceKey`] of a lazy reference on the client side.

use crate::error::TransportError;
use crate::identity::{ItemId, PublicationId, ReferenceKey, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One fetched entity: where it came from and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub uri: ReferenceKey,
    pub body: Value,
}

impl RawEntity {
    pub fn new(uri: ReferenceKey, body: Value) -> Self {
        Self { uri, body }
    }

    /// Decode the body into a typed raw struct.
    pub fn decode<R: DeserializeOwned>(self) -> Result<R, TransportError> {
        serde_json::from_value(self.body).map_err(|e| TransportError::Decode {
            uri: self.uri.to_string(),
            expected: std::any::type_name::<R>(),
            reason: e.to_string(),
        })
    }
}

/// Deferred navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    #[serde(rename = "__deferred")]
    pub deferred: DeferredUri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredUri {
    pub uri: String,
}

impl RawLink {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            deferred: DeferredUri { uri: uri.into() },
        }
    }

    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.deferred.uri)
    }
}

/// `__metadata` block present on every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub uri: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// Fields shared by every item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawItem {
    #[serde(rename = "__metadata", default)]
    pub metadata: RawMetadata,
    #[serde(default)]
    pub publication_id: PublicationId,
}

/// Publish metadata shared by pages, components and templates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPublished {
    pub item_id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "odata_date::deserialize")]
    pub creation_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "odata_date::deserialize")]
    pub initial_publish_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "odata_date::deserialize")]
    pub last_publish_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "odata_date::deserialize")]
    pub modification_date: Option<Timestamp>,
    #[serde(default)]
    pub major_version: Option<i32>,
    #[serde(default)]
    pub minor_version: Option<i32>,
    #[serde(default)]
    pub owning_publication: Option<i32>,
}

/// Keyword and custom meta links of taxonomised items.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTaxonomy {
    #[serde(default)]
    pub keywords: Option<RawLink>,
    #[serde(default)]
    pub custom_metas: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPublication {
    #[serde(flatten)]
    pub item: RawItem,
    pub id: PublicationId,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub multimedia_path: Option<String>,
    #[serde(default)]
    pub multimedia_url: Option<String>,
    #[serde(default)]
    pub publication_path: Option<String>,
    #[serde(default)]
    pub publication_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub schemas: Option<RawLink>,
    #[serde(default)]
    pub component_presentations: Option<RawLink>,
    #[serde(default)]
    pub keywords: Option<RawLink>,
    #[serde(default)]
    pub binaries: Option<RawLink>,
    #[serde(default)]
    pub binary_variants: Option<RawLink>,
    #[serde(default)]
    pub components: Option<RawLink>,
    #[serde(default)]
    pub custom_metas: Option<RawLink>,
    #[serde(default)]
    pub pages: Option<RawLink>,
    #[serde(default)]
    pub page_contents: Option<RawLink>,
    #[serde(default)]
    pub structure_groups: Option<RawLink>,
    #[serde(default)]
    pub templates: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPage {
    #[serde(flatten)]
    pub item: RawItem,
    #[serde(flatten)]
    pub published: RawPublished,
    #[serde(flatten)]
    pub taxonomy: RawTaxonomy,
    #[serde(default)]
    pub template_id: Option<ItemId>,
    #[serde(default)]
    pub page_path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub component_presentations: Option<RawLink>,
    #[serde(default)]
    pub page_content: Option<RawLink>,
    #[serde(default)]
    pub structure_group: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPageContent {
    #[serde(flatten)]
    pub item: RawItem,
    pub page_id: ItemId,
    #[serde(rename = "CharSet", default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub page: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStructureGroup {
    #[serde(flatten)]
    pub item: RawItem,
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub depth: i32,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub pages: Option<RawLink>,
    #[serde(default)]
    pub parent: Option<RawLink>,
    #[serde(default)]
    pub children: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawComponent {
    #[serde(flatten)]
    pub item: RawItem,
    #[serde(flatten)]
    pub published: RawPublished,
    #[serde(flatten)]
    pub taxonomy: RawTaxonomy,
    #[serde(default)]
    pub multimedia: bool,
    pub schema_id: i32,
    #[serde(default)]
    pub component_presentations: Option<RawLink>,
    #[serde(default)]
    pub schema: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawComponentPresentation {
    #[serde(flatten)]
    pub item: RawItem,
    pub component_id: ItemId,
    pub template_id: ItemId,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub presentation_content: Option<String>,
    #[serde(default)]
    pub component: Option<RawLink>,
    #[serde(default)]
    pub template: Option<RawLink>,
    #[serde(default)]
    pub pages: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTemplate {
    #[serde(flatten)]
    pub item: RawItem,
    #[serde(flatten)]
    pub published: RawPublished,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub template_priority: i32,
    #[serde(default)]
    pub component_presentations: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSchema {
    #[serde(flatten)]
    pub item: RawItem,
    pub schema_id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub components: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawKeyword {
    #[serde(flatten)]
    pub item: RawItem,
    pub id: i32,
    pub taxonomy_id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub navigable: bool,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub depth: i32,
    #[serde(default)]
    pub item_type: i32,
    #[serde(default)]
    pub total_related_items: Option<i32>,
    #[serde(default)]
    pub components: Option<RawLink>,
    #[serde(default)]
    pub pages: Option<RawLink>,
    #[serde(default)]
    pub custom_metas: Option<RawLink>,
    #[serde(default)]
    pub children: Option<RawLink>,
    #[serde(default)]
    pub parent: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCustomMeta {
    #[serde(flatten)]
    pub item: RawItem,
    pub item_id: ItemId,
    pub id: i32,
    #[serde(default)]
    pub item_type: i32,
    pub key_name: String,
    #[serde(default, deserialize_with = "odata_date::deserialize")]
    pub date_value: Option<Timestamp>,
    #[serde(default)]
    pub float_value: Option<f32>,
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(default)]
    pub component: Option<RawLink>,
    #[serde(default)]
    pub page: Option<RawLink>,
    #[serde(default)]
    pub keyword: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBinary {
    #[serde(flatten)]
    pub item: RawItem,
    pub binary_id: i32,
    #[serde(rename = "Type", default)]
    pub binary_type: Option<String>,
    #[serde(default)]
    pub binary_variants: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBinaryVariant {
    #[serde(flatten)]
    pub item: RawItem,
    pub binary_id: i32,
    #[serde(rename = "Type", default)]
    pub binary_type: Option<String>,
    #[serde(rename = "URLPath", default)]
    pub url_path: Option<String>,
    #[serde(rename = "IsComponent", default)]
    pub component: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub binary: Option<RawLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBinaryContent {
    #[serde(flatten)]
    pub item: RawItem,
    pub binary_id: i32,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// OData v2 dates: `"/Date(1400000000000)/"`, optionally with an offset
/// suffix, or plain RFC 3339 strings.
pub mod odata_date {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error;

    pub fn parse(value: &str) -> Option<Timestamp> {
        if let Some(inner) = value
            .strip_prefix("/Date(")
            .and_then(|rest| rest.strip_suffix(")/"))
        {
            // Offsets after the millis only describe the original zone.
            let millis_end = inner
                .char_indices()
                .skip(1)
                .find(|(_, c)| *c == '+' || *c == '-')
                .map(|(i, _)| i)
                .unwrap_or(inner.len());
            let millis: i64 = inner[..millis_end].parse().ok()?;
            return Utc.timestamp_millis_opt(millis).single();
        }
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid OData date: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_odata_date_forms() {
        let expected = Utc.timestamp_millis_opt(1_400_000_000_000).single();
        assert_eq!(odata_date::parse("/Date(1400000000000)/"), expected);
        assert_eq!(odata_date::parse("/Date(1400000000000+0200)/"), expected);
        let rfc = odata_date::parse("2014-05-13T16:53:20Z").unwrap();
        assert_eq!(rfc.year(), 2014);
        assert!(odata_date::parse("yesterday").is_none());
    }

    #[test]
    fn test_decode_page_with_links() {
        let raw = RawEntity::new(
            ReferenceKey::new("http://cd/Pages(PublicationId=1,ItemId=123)"),
            json!({
                "__metadata": { "uri": "http://cd/Pages(PublicationId=1,ItemId=123)", "type": "Page" },
                "PublicationId": 1,
                "ItemId": 123,
                "Title": "Home",
                "LastPublishDate": "/Date(1400000000000)/",
                "Url": "/index.html",
                "StructureGroup": { "__deferred": { "uri": "http://cd/Pages(PublicationId=1,ItemId=123)/StructureGroup" } },
                "Keywords": { "__deferred": { "uri": "http://cd/Pages(PublicationId=1,ItemId=123)/Keywords" } }
            }),
        );
        let page: RawPage = raw.decode().unwrap();
        assert_eq!(page.item.publication_id, 1);
        assert_eq!(page.published.item_id, 123);
        assert_eq!(page.published.title.as_deref(), Some("Home"));
        assert!(page.published.last_publish_date.is_some());
        assert!(page.page_content.is_none());
        assert_eq!(
            page.structure_group.unwrap().key().as_str(),
            "http://cd/Pages(PublicationId=1,ItemId=123)/StructureGroup"
        );
        assert!(page.taxonomy.keywords.is_some());
        assert!(page.taxonomy.custom_metas.is_none());
    }

    #[test]
    fn test_decode_failure_is_transport_decode() {
        let raw = RawEntity::new(ReferenceKey::new("http://cd/Schemas(1)"), json!({ "Title": 7 }));
        match raw.decode::<RawSchema>() {
            Err(TransportError::Decode { uri, .. }) => assert_eq!(uri, "http://cd/Schemas(1)"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
