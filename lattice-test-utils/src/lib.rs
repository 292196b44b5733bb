//! LATTICE Test Utilities
//!
//! Shared test infrastructure for the LATTICE workspace:
//! - A call-counting fetch adapter with optional simulated latency
//! - JSON fixtures for every entity kind
//! - Proptest generators
//! - Client builders and assertions

pub use lattice_cache::{CacheStrategy, InMemoryCacheStore};
pub use lattice_client::{
    BlockingError, Client, ClientContext, ExecutionContext, FetchAdapter, Reference,
    ReferenceList,
};
pub use lattice_core::{
    CacheConfig, CacheMode, ClientConfig, ClientError, ClientResult, RawEntity, ReferenceKey,
    TransportError,
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Webservice location used by all fixtures.
pub const BASE: &str = "http://cd.test/odata.svc";

// ============================================================================
// COUNTING FETCH ADAPTER
// ============================================================================

/// What the adapter answers for one URI.
#[derive(Debug, Clone)]
pub enum Fixture {
    One(Value),
    Many(Vec<Value>),
    Fail(TransportError),
}

/// In-memory fetch adapter that records how often each URI was fetched.
///
/// URIs without a fixture are "not found": `None` for single fetches, an
/// empty list for collections.
#[derive(Debug, Default)]
pub struct CountingFetchAdapter {
    fixtures: DashMap<ReferenceKey, Fixture>,
    calls: DashMap<ReferenceKey, usize>,
    total: AtomicUsize,
    latency: Option<Duration>,
}

impl CountingFetchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep `latency` before answering every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_one(&self, uri: impl Into<ReferenceKey>, body: Value) -> &Self {
        self.fixtures.insert(uri.into(), Fixture::One(body));
        self
    }

    pub fn insert_many(&self, uri: impl Into<ReferenceKey>, bodies: Vec<Value>) -> &Self {
        self.fixtures.insert(uri.into(), Fixture::Many(bodies));
        self
    }

    pub fn insert_failure(&self, uri: impl Into<ReferenceKey>, error: TransportError) -> &Self {
        self.fixtures.insert(uri.into(), Fixture::Fail(error));
        self
    }

    /// Fetches of `uri` so far.
    pub fn calls(&self, uri: impl Into<ReferenceKey>) -> usize {
        self.calls.get(&uri.into()).map(|c| *c).unwrap_or(0)
    }

    /// Fetches of any URI so far.
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    async fn record(&self, uri: &ReferenceKey) -> Option<Fixture> {
        *self.calls.entry(uri.clone()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.fixtures.get(uri).map(|f| f.value().clone())
    }
}

fn shape_mismatch(uri: &ReferenceKey, expected: &str) -> TransportError {
    TransportError::Malformed {
        uri: uri.to_string(),
        reason: format!("fixture is not {expected}"),
    }
}

#[async_trait]
impl FetchAdapter for CountingFetchAdapter {
    async fn fetch_one(&self, uri: &ReferenceKey) -> Result<Option<RawEntity>, TransportError> {
        match self.record(uri).await {
            None => Ok(None),
            Some(Fixture::One(body)) => Ok(Some(RawEntity::new(uri.clone(), body))),
            Some(Fixture::Many(_)) => Err(shape_mismatch(uri, "a single entity")),
            Some(Fixture::Fail(error)) => Err(error),
        }
    }

    async fn fetch_many(&self, uri: &ReferenceKey) -> Result<Vec<RawEntity>, TransportError> {
        match self.record(uri).await {
            None => Ok(Vec::new()),
            Some(Fixture::Many(bodies)) => Ok(bodies
                .into_iter()
                .map(|body| RawEntity::new(uri.clone(), body))
                .collect()),
            Some(Fixture::One(_)) => Err(shape_mismatch(uri, "a collection")),
            Some(Fixture::Fail(error)) => Err(error),
        }
    }
}

// ============================================================================
// CLIENT BUILDERS
// ============================================================================

/// Config pointing at [`BASE`] with the given cache settings.
pub fn test_config(mode: CacheMode, refresh_after: u32) -> ClientConfig {
    ClientConfig {
        webservice_location: BASE.to_string(),
        default_timeout_ms: 2_000,
        cache: CacheConfig {
            mode,
            refresh_after,
        },
        ..ClientConfig::default()
    }
}

/// In-memory strategy for `mode`; auto-update uses `refresh_after` (min 1).
pub fn strategy(mode: CacheMode, refresh_after: u32) -> CacheStrategy {
    let store = Arc::new(InMemoryCacheStore::new());
    match mode {
        CacheMode::None => CacheStrategy::none(),
        CacheMode::Simple => CacheStrategy::simple(store),
        CacheMode::AutoUpdate => {
            CacheStrategy::auto_update(store, NonZeroU32::new(refresh_after).unwrap_or(NonZeroU32::MIN))
        }
    }
}

/// Client for `#[tokio::test]`s: borrows the current runtime.
///
/// Must be called from inside a tokio runtime.
pub fn async_client(fetcher: Arc<CountingFetchAdapter>, mode: CacheMode, refresh_after: u32) -> Client {
    let execution = ExecutionContext::from_handle(tokio::runtime::Handle::current());
    Client::with_fetcher(
        test_config(mode, refresh_after),
        fetcher,
        strategy(mode, refresh_after),
        execution,
    )
}

/// Client for plain `#[test]`s using blocking getters: owns a small runtime.
pub fn blocking_client(fetcher: Arc<CountingFetchAdapter>, mode: CacheMode, refresh_after: u32) -> Client {
    let execution = match ExecutionContext::new(2) {
        Ok(execution) => execution,
        Err(e) => panic!("failed to start test runtime: {e}"),
    };
    Client::with_fetcher(
        test_config(mode, refresh_after),
        fetcher,
        strategy(mode, refresh_after),
        execution,
    )
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating LATTICE values.

    use super::*;
    use proptest::prelude::*;

    /// Generate an arbitrary entity URI under [`BASE`].
    pub fn arb_reference_key() -> impl Strategy<Value = ReferenceKey> {
        (1i32..100, 1i32..100_000)
            .prop_map(|(p, i)| ReferenceKey::from(format!("{BASE}/Pages(PublicationId={p},ItemId={i})")))
    }

    /// Generate an arbitrary CacheMode.
    pub fn arb_cache_mode() -> impl Strategy<Value = CacheMode> {
        prop_oneof![
            Just(CacheMode::None),
            Just(CacheMode::Simple),
            Just(CacheMode::AutoUpdate),
        ]
    }

    /// Generate a valid CacheConfig.
    pub fn arb_cache_config() -> impl Strategy<Value = CacheConfig> {
        (arb_cache_mode(), 1u32..1_000).prop_map(|(mode, refresh_after)| CacheConfig {
            mode,
            refresh_after,
        })
    }

    /// Generate a ClientConfig that passes validation.
    pub fn arb_valid_config() -> impl Strategy<Value = ClientConfig> {
        (
            prop_oneof![Just("http"), Just("https")],
            "[a-z]{1,12}",
            1u64..60_000,
            1u64..60_000,
            0usize..8,
            arb_cache_config(),
        )
            .prop_map(
                |(scheme, host, default_timeout_ms, request_timeout_ms, worker_threads, cache)| {
                    ClientConfig {
                        webservice_location: format!("{scheme}://{host}.test/odata.svc"),
                        default_timeout_ms,
                        request_timeout_ms,
                        worker_threads,
                        cache,
                    }
                },
            )
    }

    /// Generate keyword titles for collection fixtures.
    pub fn arb_titles() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[A-Za-z ]{1,16}", 0..12)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Raw OData JSON for every entity kind, addressed under [`BASE`].

    use super::*;
    use serde_json::json;

    /// `{"__deferred": {"uri": ...}}`
    pub fn deferred(uri: impl AsRef<str>) -> Value {
        json!({ "__deferred": { "uri": uri.as_ref() } })
    }

    fn metadata(uri: &str, type_name: &str) -> Value {
        json!({ "uri": uri, "type": format!("SDL.ContentDelivery.{type_name}") })
    }

    pub fn publication_uri(id: i32) -> String {
        format!("{BASE}/Publications(Id={id})")
    }

    pub fn page_uri(publication_id: i32, item_id: i32) -> String {
        format!("{BASE}/Pages(PublicationId={publication_id},ItemId={item_id})")
    }

    pub fn structure_group_uri(publication_id: i32, id: i32) -> String {
        format!("{BASE}/StructureGroups(PublicationId={publication_id},Id={id})")
    }

    pub fn component_uri(publication_id: i32, item_id: i32) -> String {
        format!("{BASE}/Components(PublicationId={publication_id},ItemId={item_id})")
    }

    pub fn schema_uri(publication_id: i32, schema_id: i32) -> String {
        format!("{BASE}/Schemas(PublicationId={publication_id},SchemaId={schema_id})")
    }

    pub fn keyword_uri(publication_id: i32, id: i32, taxonomy_id: i32) -> String {
        format!("{BASE}/Keywords(PublicationId={publication_id},Id={id},TaxonomyId={taxonomy_id})")
    }

    pub fn publication(id: i32, title: &str) -> Value {
        let uri = publication_uri(id);
        json!({
            "__metadata": metadata(&uri, "Publication"),
            "Id": id,
            "Title": title,
            "Key": format!("pub-{id}"),
            "PublicationUrl": "/",
            "Pages": deferred(format!("{uri}/Pages")),
            "Schemas": deferred(format!("{uri}/Schemas")),
            "Keywords": deferred(format!("{uri}/Keywords"))
        })
    }

    /// Page with structure group, page content and keyword links.
    pub fn page(publication_id: i32, item_id: i32, title: &str) -> Value {
        let uri = page_uri(publication_id, item_id);
        json!({
            "__metadata": metadata(&uri, "Page"),
            "PublicationId": publication_id,
            "ItemId": item_id,
            "Title": title,
            "Author": "editor",
            "LastPublishDate": "/Date(1400000000000)/",
            "MajorVersion": 1,
            "MinorVersion": 0,
            "Url": format!("/{item_id}.html"),
            "PagePath": format!("\\site\\{item_id}.html"),
            "TemplateId": 77,
            "StructureGroup": deferred(format!("{uri}/StructureGroup")),
            "PageContent": deferred(format!("{uri}/PageContent")),
            "Keywords": deferred(format!("{uri}/Keywords")),
            "CustomMetas": deferred(format!("{uri}/CustomMetas")),
            "ComponentPresentations": deferred(format!("{uri}/ComponentPresentations"))
        })
    }

    pub fn page_content(publication_id: i32, page_id: i32, content: &str) -> Value {
        let uri = format!("{BASE}/PageContents(PublicationId={publication_id},PageId={page_id})");
        json!({
            "__metadata": metadata(&uri, "PageContent"),
            "PublicationId": publication_id,
            "PageId": page_id,
            "CharSet": "UTF-8",
            "Content": content,
            "Page": deferred(page_uri(publication_id, page_id))
        })
    }

    /// Structure group; `parent` of `None` makes it the root.
    pub fn structure_group(publication_id: i32, id: i32, depth: i32, parent: Option<i32>) -> Value {
        let uri = structure_group_uri(publication_id, id);
        let mut body = json!({
            "__metadata": metadata(&uri, "StructureGroup"),
            "PublicationId": publication_id,
            "Id": id,
            "Title": format!("Group {id}"),
            "Depth": depth,
            "Directory": format!("dir{id}"),
            "Pages": deferred(format!("{uri}/Pages")),
            "Children": deferred(format!("{uri}/Children"))
        });
        if let Some(parent) = parent {
            body["Parent"] = deferred(structure_group_uri(publication_id, parent));
        }
        body
    }

    pub fn component(publication_id: i32, item_id: i32, schema_id: i32) -> Value {
        let uri = component_uri(publication_id, item_id);
        json!({
            "__metadata": metadata(&uri, "Component"),
            "PublicationId": publication_id,
            "ItemId": item_id,
            "Title": format!("Component {item_id}"),
            "Multimedia": false,
            "SchemaId": schema_id,
            "Schema": deferred(format!("{uri}/Schema")),
            "ComponentPresentations": deferred(format!("{uri}/ComponentPresentations"))
        })
    }

    pub fn component_presentation(publication_id: i32, component_id: i32, template_id: i32) -> Value {
        let uri = format!(
            "{BASE}/ComponentPresentations(PublicationId={publication_id},ComponentId={component_id},TemplateId={template_id})"
        );
        json!({
            "__metadata": metadata(&uri, "ComponentPresentation"),
            "PublicationId": publication_id,
            "ComponentId": component_id,
            "TemplateId": template_id,
            "OutputFormat": "HTML Fragment",
            "PresentationContent": "<div/>",
            "Component": deferred(component_uri(publication_id, component_id)),
            "Template": deferred(format!("{BASE}/Templates(PublicationId={publication_id},ItemId={template_id})"))
        })
    }

    pub fn template(publication_id: i32, item_id: i32) -> Value {
        let uri = format!("{BASE}/Templates(PublicationId={publication_id},ItemId={item_id})");
        json!({
            "__metadata": metadata(&uri, "Template"),
            "PublicationId": publication_id,
            "ItemId": item_id,
            "Title": format!("Template {item_id}"),
            "OutputFormat": "HTML Fragment",
            "TemplatePriority": 200
        })
    }

    pub fn schema(publication_id: i32, schema_id: i32, title: &str) -> Value {
        let uri = schema_uri(publication_id, schema_id);
        json!({
            "__metadata": metadata(&uri, "Schema"),
            "PublicationId": publication_id,
            "SchemaId": schema_id,
            "Title": title,
            "Components": deferred(format!("{uri}/Components"))
        })
    }

    pub fn keyword(publication_id: i32, id: i32, taxonomy_id: i32, title: &str, depth: i32) -> Value {
        let uri = keyword_uri(publication_id, id, taxonomy_id);
        json!({
            "__metadata": metadata(&uri, "Keyword"),
            "PublicationId": publication_id,
            "Id": id,
            "TaxonomyId": taxonomy_id,
            "Title": title,
            "Depth": depth,
            "ItemType": 1024,
            "Navigable": true,
            "Children": deferred(format!("{uri}/Children"))
        })
    }

    pub fn custom_meta(id: i32, key_name: &str, string_value: &str) -> Value {
        let uri = format!("{BASE}/CustomMetas(Id={id})");
        json!({
            "__metadata": metadata(&uri, "CustomMeta"),
            "PublicationId": 1,
            "ItemId": 123,
            "Id": id,
            "ItemType": 64,
            "KeyName": key_name,
            "StringValue": string_value,
            "Page": deferred(page_uri(1, 123))
        })
    }

    pub fn binary(publication_id: i32, binary_id: i32) -> Value {
        let uri = format!("{BASE}/Binaries(PublicationId={publication_id},BinaryId={binary_id})");
        json!({
            "__metadata": metadata(&uri, "Binary"),
            "PublicationId": publication_id,
            "BinaryId": binary_id,
            "Type": "image/png",
            "BinaryVariants": deferred(format!("{uri}/BinaryVariants"))
        })
    }

    pub fn binary_variant(publication_id: i32, binary_id: i32, variant_id: &str) -> Value {
        let uri = format!("{BASE}/BinaryVariants(PublicationId={publication_id},BinaryId={binary_id})");
        json!({
            "__metadata": metadata(&uri, "BinaryVariant"),
            "PublicationId": publication_id,
            "BinaryId": binary_id,
            "Type": "image/png",
            "URLPath": format!("/media/{binary_id}.png"),
            "IsComponent": true,
            "VariantId": variant_id,
            "Binary": deferred(format!("{BASE}/Binaries(PublicationId={publication_id},BinaryId={binary_id})"))
        })
    }

    pub fn binary_content(publication_id: i32, binary_id: i32, variant_id: &str) -> Value {
        let uri = format!(
            "{BASE}/BinaryContents(PublicationId={publication_id},BinaryId={binary_id},VariantId='{variant_id}')"
        );
        json!({
            "__metadata": metadata(&uri, "BinaryContent"),
            "PublicationId": publication_id,
            "BinaryId": binary_id,
            "VariantId": variant_id,
            "Content": "iVBORw0KGgo="
        })
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for LATTICE error shapes.

    use super::*;

    /// Assert that a resolution failed in projection, optionally at `index`.
    #[track_caller]
    pub fn assert_transform_error<T: std::fmt::Debug>(result: &ClientResult<T>, index: Option<usize>) {
        match result {
            Err(ClientError::Transform(t)) => assert_eq!(t.index, index, "Wrong element index"),
            other => panic!("Expected Transform error, got: {:?}", other),
        }
    }

    /// Assert that a resolution failed in transport.
    #[track_caller]
    pub fn assert_transport_error<T: std::fmt::Debug>(result: &ClientResult<T>) {
        match result {
            Err(ClientError::Transport(_)) => {}
            other => panic!("Expected Transport error, got: {:?}", other),
        }
    }

    /// Assert that a blocking call timed out.
    #[track_caller]
    pub fn assert_timeout<T: std::fmt::Debug>(result: &Result<T, BlockingError>) {
        match result {
            Err(e) if e.is_timeout() => {}
            other => panic!("Expected Timeout, got: {:?}", other),
        }
    }
}
