//! Entity client: root lookups by identity.
//!
//! Every lookup returns an unresolved reference. Resolve it with
//! `resolve().await` or `resolve_blocking(deadline)`; the projected entity
//! comes back with its own references built but not resolved.

use crate::collection::ReferenceList;
use crate::context::ClientContext;
use crate::entities::{
    Binary, BinaryContent, BinaryVariant, Component, ComponentPresentation, CustomMeta, Keyword,
    Page, PageContent, Publication, Schema, StructureGroup, Template,
};
use crate::fetch::FetchAdapter;
use crate::http::HttpFetchAdapter;
use crate::reference::Reference;
use crate::runtime::ExecutionContext;
use lattice_cache::{CacheStats, CacheStrategy};
use lattice_core::{
    ClientConfig, ClientResult, ItemId, PublicationId, RawBinary, RawBinaryContent,
    RawBinaryVariant, RawComponent, RawComponentPresentation, RawCustomMeta, RawKeyword, RawPage,
    RawPageContent, RawPublication, RawSchema, RawStructureGroup, RawTemplate,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Content delivery client.
///
/// Owns its execution context. Call [`Client::shutdown`] to stop it
/// explicitly; dropping the client stops it in the background.
pub struct Client {
    ctx: ClientContext,
    execution: ExecutionContext,
}

impl Client {
    /// HTTP client with the cache strategy `config.cache` selects, backed by
    /// an in-memory store.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let cache = CacheStrategy::in_memory(&config.cache)?;
        Self::with_cache(config, cache)
    }

    /// HTTP client with a caller-built cache strategy.
    pub fn with_cache(config: ClientConfig, cache: CacheStrategy) -> ClientResult<Self> {
        config.validate()?;
        let fetcher = HttpFetchAdapter::new(&config)?;
        let execution = ExecutionContext::new(config.worker_threads)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher), cache, execution))
    }

    /// Client over any fetch adapter and execution context.
    pub fn with_fetcher(
        config: ClientConfig,
        fetcher: Arc<dyn FetchAdapter>,
        cache: CacheStrategy,
        execution: ExecutionContext,
    ) -> Self {
        info!(
            webservice_location = %config.webservice_location,
            cache_mode = ?cache.mode(),
            "Client created"
        );
        let ctx = ClientContext::new(config, fetcher, cache, execution.handle().clone());
        Self { ctx, execution }
    }

    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.ctx.cache().stats()
    }

    /// Stop the execution context, waiting up to `timeout` for in-flight
    /// resolutions. Later blocking calls fail with a shut-down error.
    /// Returns `false` if the client was already shut down.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.execution.shutdown(timeout)
    }

    pub fn publication(&self, id: PublicationId) -> Reference<RawPublication, Publication> {
        self.ctx.single_at(self.ctx.paths().publication(id))
    }

    pub fn page(&self, publication_id: PublicationId, item_id: ItemId) -> Reference<RawPage, Page> {
        self.ctx.single_at(self.ctx.paths().page(publication_id, item_id))
    }

    /// Pages published under `url`, across publications.
    pub fn pages_by_url(&self, url: &str) -> ReferenceList<RawPage, Page> {
        self.ctx.list_at(self.ctx.paths().pages_by_url(url))
    }

    pub fn page_content(
        &self,
        publication_id: PublicationId,
        page_id: ItemId,
    ) -> Reference<RawPageContent, PageContent> {
        self.ctx
            .single_at(self.ctx.paths().page_content(publication_id, page_id))
    }

    pub fn structure_group(
        &self,
        publication_id: PublicationId,
        id: i32,
    ) -> Reference<RawStructureGroup, StructureGroup> {
        self.ctx
            .single_at(self.ctx.paths().structure_group(publication_id, id))
    }

    pub fn component(
        &self,
        publication_id: PublicationId,
        item_id: ItemId,
    ) -> Reference<RawComponent, Component> {
        self.ctx
            .single_at(self.ctx.paths().component(publication_id, item_id))
    }

    pub fn component_presentation(
        &self,
        publication_id: PublicationId,
        component_id: ItemId,
        template_id: ItemId,
    ) -> Reference<RawComponentPresentation, ComponentPresentation> {
        self.ctx.single_at(self.ctx.paths().component_presentation(
            publication_id,
            component_id,
            template_id,
        ))
    }

    pub fn template(
        &self,
        publication_id: PublicationId,
        item_id: ItemId,
    ) -> Reference<RawTemplate, Template> {
        self.ctx
            .single_at(self.ctx.paths().template(publication_id, item_id))
    }

    pub fn schema(&self, publication_id: PublicationId, schema_id: i32) -> Reference<RawSchema, Schema> {
        self.ctx
            .single_at(self.ctx.paths().schema(publication_id, schema_id))
    }

    pub fn keyword(
        &self,
        publication_id: PublicationId,
        id: i32,
        taxonomy_id: i32,
    ) -> Reference<RawKeyword, Keyword> {
        self.ctx
            .single_at(self.ctx.paths().keyword(publication_id, id, taxonomy_id))
    }

    pub fn custom_meta(&self, id: i32) -> Reference<RawCustomMeta, CustomMeta> {
        self.ctx.single_at(self.ctx.paths().custom_meta(id))
    }

    pub fn binary(&self, publication_id: PublicationId, binary_id: i32) -> Reference<RawBinary, Binary> {
        self.ctx
            .single_at(self.ctx.paths().binary(publication_id, binary_id))
    }

    pub fn binary_variant(
        &self,
        publication_id: PublicationId,
        binary_id: i32,
    ) -> Reference<RawBinaryVariant, BinaryVariant> {
        self.ctx
            .single_at(self.ctx.paths().binary_variant(publication_id, binary_id))
    }

    pub fn binary_content(
        &self,
        publication_id: PublicationId,
        binary_id: i32,
        variant_id: &str,
    ) -> Reference<RawBinaryContent, BinaryContent> {
        self.ctx.single_at(
            self.ctx
                .paths()
                .binary_content(publication_id, binary_id, variant_id),
        )
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("ctx", &self.ctx)
            .field("execution", &self.execution)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{CacheMode, ClientError, ConfigError};

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig {
            default_timeout_ms: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(
            Client::new(config),
            Err(ClientError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_root_references_use_resource_paths() {
        let mut config = ClientConfig::default();
        config.webservice_location = "http://cd.example/odata.svc".to_string();
        config.cache.mode = CacheMode::Simple;
        let client = Client::new(config).unwrap();

        assert_eq!(
            client.page(1, 123).key().map(|k| k.as_str()),
            Some("http://cd.example/odata.svc/Pages(PublicationId=1,ItemId=123)")
        );
        assert_eq!(
            client.schema(1, 9).key().map(|k| k.as_str()),
            Some("http://cd.example/odata.svc/Schemas(PublicationId=1,SchemaId=9)")
        );
        assert_eq!(client.context().cache().mode(), CacheMode::Simple);
        assert!(client.shutdown(Duration::from_secs(1)));
        assert!(!client.shutdown(Duration::from_secs(1)));
    }
}
