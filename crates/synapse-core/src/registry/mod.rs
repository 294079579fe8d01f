//! Tool registries: generated per source, merged at runtime

mod merge;
mod store;
mod types;

pub use merge::MergedRegistry;
pub use store::{load_generated, ToolEntry, ToolRegistry};
pub use types::{ArgumentLocation, BoundParameter, HttpBinding, ToolHandler};
