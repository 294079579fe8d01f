//! # openapi-parser
//!
//! OpenAPI 3.x parser for CortexSynapse.
//! Loads YAML/JSON specs, resolves `$ref`s, extracts operations and answers
//! exact route + method lookups. Also hosts the identifier normalizer used for
//! tool and argument names.

mod error;
mod index;
mod naming;
mod operations;
mod parser;
mod resolver;
mod types;

pub use error::{ParseError, ParseResult};
pub use index::find_operation_in_spec;
pub use naming::to_snake_case;
pub use operations::OperationExtractor;
pub use parser::OpenApiParser;
pub use resolver::SchemaResolver;
pub use types::*;
