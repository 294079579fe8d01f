//! # synapse-core
//!
//! Build-time and shared functionality for CortexSynapse:
//! - Whitelist loading and per-platform / unified registry generation
//! - Generated registry artifacts and their runtime merge
//! - Categorized markdown documentation
//! - Settings and logging setup shared by the binaries

pub mod codegen;
pub mod docs;
pub mod error;
pub mod logging;
pub mod platform;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod whitelist;

pub use codegen::{
    build_platform_registry, build_unified_registry, generate_platform_tools_file,
    generate_unified_tools_file, GenerationReport, SkippedEntry,
};
pub use docs::{generate_docs, DocsReport};
pub use error::{CoreError, Result};
pub use platform::{Platform, RegistrySource};
pub use registry::{
    load_generated, ArgumentLocation, BoundParameter, HttpBinding, MergedRegistry, ToolEntry,
    ToolHandler, ToolRegistry,
};
pub use schema::{common_input_schema, unified_input_schema};
pub use settings::{PlatformEndpoint, Settings};
pub use whitelist::{RouteBinding, UnifiedEntry, Whitelist, WhitelistEntry};
