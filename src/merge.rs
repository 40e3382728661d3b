//! Multi-Document Merge
//!
//! Each input document is classified once, as a component schema, an icon
//! registry, or something unrecognized. Schemas are validated one by one;
//! if all are clean they are concatenated in input order and checked again
//! for ids that collide across files.
//!
//! `[file N]` tags are 1-based.

use serde_json::Value;
use std::collections::HashMap;

use crate::config::ValidationLimits;
use crate::diagnostics::{index_path, join_path, Diagnostics, ErrorCode};
use crate::schema::{IconRegistry, Schema};
use crate::validate::{parse_document, ParseResult, SchemaValidator};

/// What kind of document a parsed value is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Component schema (`components` / `componentSets` / `organization`)
    Schema,
    /// Icon registry (has both `library` and `icons`)
    IconRegistry,
    /// Root is not an object
    Unrecognized,
}

/// Classify a parsed document by its shape
pub fn classify(value: &Value) -> DocumentKind {
    match value.as_object() {
        Some(obj) if obj.contains_key("library") && obj.contains_key("icons") => DocumentKind::IconRegistry,
        Some(_) => DocumentKind::Schema,
        None => DocumentKind::Unrecognized,
    }
}

/// Merge documents with default limits
pub fn merge_all<S: AsRef<str>>(documents: &[S]) -> ParseResult {
    DocumentMerger::default().merge_all(documents)
}

/// Validates and merges a batch of documents
#[derive(Debug, Clone, Default)]
pub struct DocumentMerger {
    validator: SchemaValidator,
}

impl DocumentMerger {
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self {
            validator: SchemaValidator::with_limits(limits),
        }
    }

    pub fn merge_all<S: AsRef<str>>(&self, documents: &[S]) -> ParseResult {
        let mut diagnostics = Diagnostics::new();
        let mut schemas: Vec<(usize, Schema)> = Vec::new();
        let mut registries = Vec::new();

        for (i, text) in documents.iter().enumerate() {
            let file = i + 1;
            let value = match parse_document(text.as_ref()) {
                Ok(value) => value,
                Err(e) => {
                    let mut doc = Diagnostics::new();
                    doc.error(ErrorCode::InvalidJson, "", format!("Invalid JSON: {}", e));
                    diagnostics.merge_tagged(doc, file);
                    continue;
                }
            };

            let kind = classify(&value);
            tracing::debug!(file, ?kind, "document classified");

            match kind {
                DocumentKind::IconRegistry => {
                    let mut doc = Diagnostics::new();
                    if let Some(registry) = read_registry(value, &mut doc) {
                        registries.push(registry);
                    }
                    diagnostics.merge_tagged(doc, file);
                }
                DocumentKind::Schema | DocumentKind::Unrecognized => {
                    let mut doc = Diagnostics::new();
                    if let Some(schema) = self.validator.check_document(&value, &mut doc) {
                        schemas.push((file, schema));
                    }
                    diagnostics.merge_tagged(doc, file);
                }
            }
        }

        if diagnostics.has_errors() {
            tracing::debug!(errors = diagnostics.error_count(), "merge aborted");
            return ParseResult::from_diagnostics(diagnostics, None, registries);
        }

        let merged = merge_schemas(schemas, &mut diagnostics);
        tracing::debug!(
            components = merged.components.len(),
            component_sets = merged.component_sets.len(),
            registries = registries.len(),
            "documents merged"
        );
        ParseResult::from_diagnostics(diagnostics, Some(merged), registries)
    }
}

fn read_registry(value: Value, diagnostics: &mut Diagnostics) -> Option<IconRegistry> {
    match value.get("library") {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => {
            diagnostics.error(ErrorCode::InvalidValue, "library", "Icon library name must not be empty");
            return None;
        }
        _ => {
            diagnostics.error(ErrorCode::InvalidType, "library", "Icon library name must be a string");
            return None;
        }
    }

    match serde_json::from_value::<IconRegistry>(value) {
        Ok(registry) => Some(registry),
        Err(e) => {
            diagnostics.error(ErrorCode::InvalidType, "icons", format!("Invalid icon registry: {}", e));
            None
        }
    }
}

/// Concatenate schemas in order; first `organization` wins; flag cross-file duplicate ids
fn merge_schemas(schemas: Vec<(usize, Schema)>, diagnostics: &mut Diagnostics) -> Schema {
    let mut merged = Schema::default();
    let mut origins: HashMap<String, usize> = HashMap::new();

    for (file, schema) in schemas {
        if merged.organization.is_none() {
            merged.organization = schema.organization;
        }

        for (i, component) in schema.components.into_iter().enumerate() {
            let path = join_path(&index_path("components", i), "id");
            record_origin(&mut origins, &component.id, file, &path, diagnostics);
            merged.components.push(component);
        }
        for (i, set) in schema.component_sets.into_iter().enumerate() {
            let path = join_path(&index_path("componentSets", i), "id");
            record_origin(&mut origins, &set.id, file, &path, diagnostics);
            merged.component_sets.push(set);
        }
    }

    merged
}

fn record_origin(
    origins: &mut HashMap<String, usize>,
    id: &str,
    file: usize,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    match origins.get(id) {
        Some(&first) => diagnostics.error(
            ErrorCode::DuplicateId,
            format!("[file {}] {}", file, path),
            format!("Duplicate id \"{}\" (defined in file {} and file {})", id, first, file),
        ),
        None => {
            origins.insert(id.to_string(), file);
        }
    }
}
