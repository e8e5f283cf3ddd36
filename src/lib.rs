//! Folio Application Library
//!
//! Wires the host collaborators (content store, media importer, authorizer)
//! into the module registry. Everything is constructed once here and passed
//! down explicitly; no global state.

pub mod modules;

use std::sync::Arc;

use folio_authz::RoleAuthorizer;
use folio_kernel::settings::Settings;
use folio_kernel::{InitCtx, ModuleRegistry};
use folio_media::HttpMediaImporter;
use folio_store::{ContentStore, MemoryHost};

/// Composition root: build the host collaborators, register modules, run
/// their init phase, and register the content types they declare.
pub async fn compose(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let host = Arc::new(MemoryHost::new(settings.store.base_url.clone()));
    let importer = Arc::new(HttpMediaImporter::new(&settings.media, host.clone())?);
    let authz = Arc::new(RoleAuthorizer);

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, host.clone(), importer, authz);

    let ctx = InitCtx { settings };
    registry.init_all(&ctx).await?;

    for (module, def) in registry.collect_record_types() {
        tracing::info!(module, kind = def.kind, "registering record type with store");
        host.register_type(def).await;
    }

    registry.start_all(&ctx).await?;

    Ok(registry)
}
