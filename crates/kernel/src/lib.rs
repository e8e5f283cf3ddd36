pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, RecordTypeDef};
pub use registry::ModuleRegistry;
