pub mod books;

use std::sync::Arc;

use folio_authz::AuthorizationPort;
use folio_kernel::ModuleRegistry;
use folio_media::MediaImport;
use folio_store::ContentStore;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: Arc<dyn ContentStore>,
    importer: Arc<dyn MediaImport>,
    authz: Arc<dyn AuthorizationPort>,
) {
    registry.register(books::create_module(store, importer, authz));
}
