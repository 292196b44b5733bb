//! HTTP fetch adapter for the content delivery OData service.

use crate::fetch::FetchAdapter;
use async_trait::async_trait;
use lattice_core::{ClientConfig, RawEntity, ReferenceKey, TransportError};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// Fetch adapter speaking OData v2 JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetchAdapter {
    client: reqwest::Client,
}

impl HttpFetchAdapter {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Request {
                uri: config.webservice_location.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom TLS or proxy settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `uri` as JSON. `Ok(None)` on 404.
    async fn get_json(&self, uri: &ReferenceKey) -> Result<Option<Value>, TransportError> {
        debug!(uri = %uri, "GET");
        let response = self
            .client
            .get(uri.as_str())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| TransportError::Request {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| TransportError::Malformed {
                uri: uri.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl FetchAdapter for HttpFetchAdapter {
    async fn fetch_one(&self, uri: &ReferenceKey) -> Result<Option<RawEntity>, TransportError> {
        let Some(body) = self.get_json(uri).await? else {
            return Ok(None);
        };
        let entity = single_entity(body).map_err(|reason| TransportError::Malformed {
            uri: uri.to_string(),
            reason,
        })?;
        Ok(entity.map(|entity| RawEntity::new(uri.clone(), entity)))
    }

    async fn fetch_many(&self, uri: &ReferenceKey) -> Result<Vec<RawEntity>, TransportError> {
        let Some(body) = self.get_json(uri).await? else {
            return Ok(Vec::new());
        };
        let elements = unwrap_collection(body).map_err(|reason| TransportError::Malformed {
            uri: uri.to_string(),
            reason,
        })?;
        Ok(elements
            .into_iter()
            .map(|element| {
                let key = entity_uri(&element)
                    .map(ReferenceKey::new)
                    .unwrap_or_else(|| uri.clone());
                RawEntity::new(key, element)
            })
            .collect())
    }
}

/// `{"d": {...}}` -> `{...}`; anything else is returned as is.
fn unwrap_single(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("d") => map.remove("d").unwrap_or(Value::Null),
        other => other,
    }
}

/// The entity object of a single-entity response. A `results` collection
/// envelope is rejected.
fn single_entity(body: Value) -> Result<Option<Value>, String> {
    match unwrap_single(body) {
        Value::Null => Ok(None),
        Value::Object(map) if matches!(map.get("results"), Some(Value::Array(_))) => {
            Err("expected a single entity, got a results collection".to_string())
        }
        entity @ Value::Object(_) => Ok(Some(entity)),
        other => Err(format!("expected an entity object, got {}", json_type(&other))),
    }
}

/// Accepts `{"d": {"results": [...]}}`, `{"d": [...]}`, `{"value": [...]}` and bare arrays.
fn unwrap_collection(body: Value) -> Result<Vec<Value>, String> {
    let inner = unwrap_single(body);
    match inner {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("value")) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(format!("expected results array, got {}", json_type(&other))),
            None => Err("collection envelope has no results".to_string()),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(format!("expected a collection, got {}", json_type(&other))),
    }
}

fn entity_uri(entity: &Value) -> Option<&str> {
    entity.get("__metadata")?.get("uri")?.as_str()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_single_envelope() {
        let body = json!({ "d": { "ItemId": 1 } });
        assert_eq!(unwrap_single(body), json!({ "ItemId": 1 }));
        assert_eq!(unwrap_single(json!({ "ItemId": 2 })), json!({ "ItemId": 2 }));
    }

    #[test]
    fn test_single_entity_rejects_collection_envelope() {
        let v2 = json!({ "d": { "results": [{ "ItemId": 1 }] } });
        let err = single_entity(v2).unwrap_err();
        assert!(err.contains("results collection"), "{err}");

        assert!(single_entity(json!({ "d": [{ "ItemId": 1 }] })).is_err());
        assert_eq!(single_entity(json!({ "d": null })).unwrap(), None);
        assert_eq!(
            single_entity(json!({ "d": { "ItemId": 1 } })).unwrap(),
            Some(json!({ "ItemId": 1 }))
        );
    }

    #[test]
    fn test_pages_by_url_key_survives_url_parsing() {
        let key = lattice_core::ResourcePath::new("http://cd.example/odata.svc")
            .pages_by_url("/news#top&x=1");
        let url = reqwest::Url::parse(key.as_str()).unwrap();
        assert_eq!(url.fragment(), None);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("$filter".to_string(), "Url eq '/news#top&x=1'".to_string())]
        );
    }

    #[test]
    fn test_unwrap_collection_envelopes() {
        let v2 = json!({ "d": { "results": [{ "Id": 1 }, { "Id": 2 }] } });
        assert_eq!(unwrap_collection(v2).unwrap().len(), 2);

        let bare_d = json!({ "d": [{ "Id": 1 }] });
        assert_eq!(unwrap_collection(bare_d).unwrap().len(), 1);

        let v4 = json!({ "value": [] });
        assert!(unwrap_collection(v4).unwrap().is_empty());

        assert!(unwrap_collection(json!({ "d": { "Id": 1 } })).is_err());
        assert!(unwrap_collection(json!("nope")).is_err());
    }

    #[test]
    fn test_collection_keeps_order() {
        let body = json!({ "d": { "results": [{ "Id": "a" }, { "Id": "b" }, { "Id": "c" }] } });
        let ids: Vec<_> = unwrap_collection(body)
            .unwrap()
            .into_iter()
            .map(|v| v["Id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_entity_uri_from_metadata() {
        let entity = json!({ "__metadata": { "uri": "http://cd/Keywords(PublicationId=1,Id=2,TaxonomyId=3)" } });
        assert_eq!(
            entity_uri(&entity),
            Some("http://cd/Keywords(PublicationId=1,Id=2,TaxonomyId=3)")
        );
        assert_eq!(entity_uri(&json!({})), None);
    }

    #[test]
    fn test_adapter_builds_from_config() {
        assert!(HttpFetchAdapter::new(&ClientConfig::default()).is_ok());
    }
}
