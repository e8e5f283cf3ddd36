use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Content type declaration contributed by a module.
///
/// Collected at startup and registered with the content store before any
/// request is served. The store rejects records of unregistered kinds.
#[derive(Debug, Clone)]
pub struct RecordTypeDef {
    /// Store-level kind identifier, e.g. `book`.
    pub kind: &'static str,
    /// URL segment used when deriving permalinks.
    pub rewrite_slug: &'static str,
    /// Human-readable label for logs and admin surfaces.
    pub label: &'static str,
}

/// Core module trait that all Folio modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup before record types are registered
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under `/api/{module_name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON
    /// Will be merged with other modules' specs
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Return content type declarations contributed by this module
    fn record_types(&self) -> Vec<RecordTypeDef> {
        vec![]
    }

    /// Start background tasks for this module
    /// Called after record types are registered
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
