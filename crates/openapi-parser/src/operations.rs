//! Operation extraction from OpenAPI specs

use tracing::debug;

use crate::resolver::SchemaResolver;
use crate::types::*;

/// Extracts operations from raw OpenAPI spec structures
pub struct OperationExtractor;

impl OperationExtractor {
    /// Extract all operations from a raw OpenAPI spec, in document order
    pub fn extract(spec: &RawOpenApiSpec) -> Vec<ApiOperation> {
        let empty = RawComponents::default();
        let resolver = SchemaResolver::new(spec.components.as_ref().unwrap_or(&empty));

        let mut operations = Vec::new();
        for (path, path_item) in &spec.paths {
            let path_params: Vec<OperationParameter> = path_item
                .parameters
                .iter()
                .filter_map(|p| Self::convert_parameter(p, &resolver))
                .collect();

            for method in HttpMethod::ALL {
                if let Some(op) = path_item.operation(method) {
                    operations.push(Self::extract_operation(
                        path,
                        method,
                        op,
                        &path_params,
                        &resolver,
                    ));
                }
            }
        }

        operations
    }

    fn extract_operation(
        path: &str,
        method: HttpMethod,
        operation: &RawOperation,
        path_params: &[OperationParameter],
        resolver: &SchemaResolver,
    ) -> ApiOperation {
        let operation_id = operation
            .operation_id
            .clone()
            .unwrap_or_else(|| Self::generate_operation_id(path, method));

        // Operation-level parameters override path-level ones of the same name and location
        let mut parameters = path_params.to_vec();
        for param in &operation.parameters {
            if let Some(p) = Self::convert_parameter(param, resolver) {
                parameters.retain(|existing| {
                    !(existing.name == p.name && existing.location == p.location)
                });
                parameters.push(p);
            }
        }

        let request_body = operation
            .request_body
            .as_ref()
            .and_then(|body| Self::extract_request_body(body, resolver));

        ApiOperation {
            operation_id,
            method,
            path: path.to_string(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            tags: operation.tags.clone(),
            deprecated: operation.deprecated,
            parameters,
            request_body,
        }
    }

    /// Generate an operation ID from path and method
    fn generate_operation_id(path: &str, method: HttpMethod) -> String {
        // /incidents/{id}/notes -> incidents_id_notes
        let path_part = path
            .trim_start_matches('/')
            .replace('/', "_")
            .replace(['{', '}'], "");

        format!("{}_{}", method.as_str().to_lowercase(), path_part)
    }

    fn convert_parameter(
        param: &RawParameter,
        resolver: &SchemaResolver,
    ) -> Option<OperationParameter> {
        let Some(param) = resolver.resolve_parameter(param) else {
            debug!("Skipping unresolvable parameter reference: {:?}", param.reference);
            return None;
        };

        let location = match param.location.as_str() {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "cookie" => ParameterLocation::Cookie,
            _ => return None,
        };

        Some(OperationParameter {
            name: param.name.clone(),
            location,
            required: param.required || location == ParameterLocation::Path,
            description: param.description.clone(),
            schema: param.schema.as_ref().map(|s| resolver.resolve(s)),
        })
    }

    fn extract_request_body(body: &RawRequestBody, resolver: &SchemaResolver) -> Option<RequestBody> {
        // Prefer JSON content type
        let (content_type, media) = body
            .content
            .iter()
            .find(|(ct, _)| ct.contains("json"))
            .or_else(|| body.content.first())?;

        Some(RequestBody {
            required: body.required,
            content_type: content_type.clone(),
            schema: media.schema.as_ref().map(|s| resolver.resolve(s)),
            description: body.description.clone(),
        })
    }
}
