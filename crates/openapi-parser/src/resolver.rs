//! `$ref` resolution for component schemas and parameters

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{RawComponents, RawParameter};

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const PARAMETER_PREFIX: &str = "#/components/parameters/";

/// Resolves `$ref` references against a document's `components`
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, Value>,
    parameters: &'a IndexMap<String, RawParameter>,
    /// Maximum recursion depth to prevent infinite loops
    max_depth: usize,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver over the given components
    pub fn new(components: &'a RawComponents) -> Self {
        Self {
            schemas: &components.schemas,
            parameters: &components.parameters,
            max_depth: 10,
        }
    }

    /// Resolve a schema, following $ref references
    pub fn resolve(&self, schema: &Value) -> Value {
        self.resolve_with_depth(schema, 0)
    }

    /// Follow a parameter `$ref`; inline parameters are returned as-is.
    ///
    /// Returns `None` for references that point outside
    /// `#/components/parameters` or at a missing entry.
    pub fn resolve_parameter<'p>(&'p self, param: &'p RawParameter) -> Option<&'p RawParameter> {
        let mut current = param;
        for _ in 0..=self.max_depth {
            match current.reference.as_deref() {
                None => return Some(current),
                Some(reference) => {
                    let name = reference.strip_prefix(PARAMETER_PREFIX)?;
                    current = self.parameters.get(name)?;
                }
            }
        }
        None
    }

    fn resolve_with_depth(&self, schema: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return schema.clone();
        }

        match schema {
            Value::Object(obj) => {
                if let Some(resolved) = obj
                    .get("$ref")
                    .and_then(Value::as_str)
                    .and_then(|r| self.resolve_ref(r))
                {
                    return self.resolve_with_depth(resolved, depth + 1);
                }

                let mut result = serde_json::Map::new();
                for (key, value) in obj {
                    let resolved = match key.as_str() {
                        "properties" => self.resolve_properties(value, depth),
                        "items" => self.resolve_with_depth(value, depth + 1),
                        "additionalProperties" if value.is_object() => {
                            self.resolve_with_depth(value, depth + 1)
                        }
                        "allOf" | "oneOf" | "anyOf" => self.resolve_array(value, depth),
                        _ => value.clone(),
                    };
                    result.insert(key.clone(), resolved);
                }
                Value::Object(result)
            }
            _ => schema.clone(),
        }
    }

    fn resolve_ref(&self, ref_str: &str) -> Option<&Value> {
        ref_str
            .strip_prefix(SCHEMA_PREFIX)
            .and_then(|name| self.schemas.get(name))
    }

    fn resolve_properties(&self, value: &Value, depth: usize) -> Value {
        match value.as_object() {
            Some(obj) => Value::Object(
                obj.iter()
                    .map(|(key, prop)| (key.clone(), self.resolve_with_depth(prop, depth + 1)))
                    .collect(),
            ),
            None => value.clone(),
        }
    }

    fn resolve_array(&self, value: &Value, depth: usize) -> Value {
        match value.as_array() {
            Some(arr) => Value::Array(
                arr.iter()
                    .map(|item| self.resolve_with_depth(item, depth + 1))
                    .collect(),
            ),
            None => value.clone(),
        }
    }
}
