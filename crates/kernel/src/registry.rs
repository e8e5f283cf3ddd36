use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module, RecordTypeDef};

/// Module registry for managing module lifecycle
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Initialize all modules in registration order
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start all modules in registration order
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop all modules in reverse registration order
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all content type declarations from all modules.
    ///
    /// Sorted by module name and kind for deterministic registration order.
    pub fn collect_record_types(&self) -> Vec<(String, RecordTypeDef)> {
        let mut types = Vec::new();

        for module in &self.modules {
            for def in module.record_types() {
                types.push((module.name().to_string(), def));
            }
        }

        types.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.kind.cmp(b.1.kind)));

        types
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn record_types(&self) -> Vec<RecordTypeDef> {
            vec![RecordTypeDef {
                kind: "note",
                rewrite_slug: "notes",
                label: "Note",
            }]
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_record_types().is_empty());
    }

    #[test]
    fn record_types_are_collected_per_module() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "notes" }));

        let types = registry.collect_record_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].0, "notes");
        assert_eq!(types[0].1.kind, "note");
    }

    #[test]
    fn get_module_finds_registered_module() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "notes" }));

        assert!(registry.get_module("notes").is_some());
        assert!(registry.get_module("missing").is_none());
    }

    #[tokio::test]
    async fn module_lifecycle_runs_without_error() {
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.register(Arc::new(TestModule { name: "test" }));

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();
    }
}
