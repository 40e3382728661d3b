//! Structural Validation
//!
//! Parses one JSON document and walks it against the component schema shape,
//! collecting every violation instead of stopping at the first. Only a JSON
//! parse failure or a non-object root ends the walk early.
//!
//! Recursion into child nodes is bounded by [`ValidationLimits::max_depth`];
//! a subtree past the limit is reported once and not descended into.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::ValidationLimits;
use crate::diagnostics::{index_path, join_path, Diagnostics, ErrorCode, ValidationError};
use crate::icons::IconRef;
use crate::schema::{IconRegistry, NodeType, Schema};

type Object = Map<String, Value>;

/// Raw/token field pairs on layout objects
const LAYOUT_EXCLUSIVE_PAIRS: [(&str, &str); 6] = [
    ("padding", "paddingToken"),
    ("paddingTop", "paddingTopToken"),
    ("paddingRight", "paddingRightToken"),
    ("paddingBottom", "paddingBottomToken"),
    ("paddingLeft", "paddingLeftToken"),
    ("gap", "gapToken"),
];

/// Raw/token field pairs on style-bearing objects; raw values are unit fractions
const STYLE_EXCLUSIVE_PAIRS: [(&str, &str); 2] = [
    ("opacity", "opacityToken"),
    ("fillOpacity", "fillOpacityToken"),
];

const STYLE_TOKEN_FIELDS: [&str; 4] = ["fillToken", "strokeToken", "radiusToken", "shadowToken"];

const STYLE_NON_NEGATIVE_FIELDS: [&str; 2] = ["strokeWidth", "radius"];

const DIRECTIONS: [&str; 3] = ["horizontal", "vertical", "none"];

const AXIS_ALIGNMENTS: [&str; 4] = ["start", "center", "end", "space-between"];

const SIZE_MODES: [&str; 2] = ["fill", "hug"];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(?: [A-Za-z0-9_-]+)*(?:[./][A-Za-z0-9_-]+(?: [A-Za-z0-9_-]+)*)*$")
            .expect("token pattern is valid")
    })
}

/// Whether a string is a well-formed token path (`semantic.color.primary`, `spacing/md`)
pub fn is_valid_token_path(token: &str) -> bool {
    token_pattern().is_match(token)
}

// =============================================================================
// Parse Result
// =============================================================================

/// Outcome of validating (and possibly merging) documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    /// Present only when there are no errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub registries: Vec<IconRegistry>,
}

impl ParseResult {
    pub(crate) fn from_diagnostics(
        diagnostics: Diagnostics,
        schema: Option<Schema>,
        registries: Vec<IconRegistry>,
    ) -> Self {
        let (errors, warnings) = diagnostics.into_parts();
        let valid = errors.is_empty();
        Self {
            valid,
            schema: if valid { schema } else { None },
            errors,
            warnings,
            registries,
        }
    }

    /// Whether any error carries the given code
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code() == code)
    }

    /// Whether any warning carries the given code
    pub fn has_warning(&self, code: ErrorCode) -> bool {
        self.warnings.iter().any(|w| w.code() == code)
    }
}

/// Parse JSON text without serde_json's nesting cap.
///
/// Depth is a validation concern (`MAX_DEPTH_EXCEEDED`), so well-formed text
/// must always parse; recursion runs on a growable stack.
pub(crate) fn parse_document(json: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Validate a single document with default limits
pub fn validate(json: &str) -> ParseResult {
    SchemaValidator::default().validate_str(json)
}

// =============================================================================
// Validator
// =============================================================================

/// Structural validator for component schema documents
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    limits: ValidationLimits,
}

impl SchemaValidator {
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Parse and validate a JSON document
    pub fn validate_str(&self, json: &str) -> ParseResult {
        match parse_document(json) {
            Ok(value) => self.validate_value(&value),
            Err(e) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.error(ErrorCode::InvalidJson, "", format!("Invalid JSON: {}", e));
                ParseResult::from_diagnostics(diagnostics, None, Vec::new())
            }
        }
    }

    /// Validate an already-parsed document
    pub fn validate_value(&self, value: &Value) -> ParseResult {
        let mut diagnostics = Diagnostics::new();
        let schema = self.check_document(value, &mut diagnostics);
        ParseResult::from_diagnostics(diagnostics, schema, Vec::new())
    }

    /// Walk the document, then build the typed schema if nothing was wrong
    pub(crate) fn check_document(&self, value: &Value, diagnostics: &mut Diagnostics) -> Option<Schema> {
        let Some(root) = value.as_object() else {
            diagnostics.error(
                ErrorCode::InvalidType,
                "",
                format!("Schema root must be an object, found {}", type_name(value)),
            );
            return None;
        };

        self.check_root(root, diagnostics);

        tracing::debug!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "schema document validated"
        );

        if diagnostics.has_errors() {
            return None;
        }

        match Schema::deserialize(serde_stacker::Deserializer::new(value.clone())) {
            Ok(schema) => Some(schema),
            Err(e) => {
                diagnostics.error(ErrorCode::InvalidType, "", format!("Schema could not be read: {}", e));
                None
            }
        }
    }

    fn check_root(&self, root: &Object, diagnostics: &mut Diagnostics) {
        if let Some(org) = present(root, "organization") {
            match org.as_object() {
                Some(org) => check_organization(org, "organization", diagnostics),
                None => type_error(diagnostics, "organization", "an object", org),
            }
        }

        let components = optional_array(root, "components", "components", diagnostics);
        let sets = optional_array(root, "componentSets", "componentSets", diagnostics);

        let total = components.map_or(0, Vec::len) + sets.map_or(0, Vec::len);
        if total > self.limits.max_components {
            diagnostics.error(
                ErrorCode::MaxComponentsExceeded,
                "components",
                format!(
                    "Schema defines {} components and component sets; the maximum is {}",
                    total, self.limits.max_components
                ),
            );
        }
        if total == 0 {
            diagnostics.warning(ErrorCode::EmptySchema, "", "Schema defines no components or component sets");
        }

        let mut ids: Vec<(&str, String)> = Vec::with_capacity(total);

        for (i, component) in components.into_iter().flatten().enumerate() {
            let path = index_path("components", i);
            if let Some(id) = self.check_component(component, &path, diagnostics) {
                ids.push((id, join_path(&path, "id")));
            }
        }

        for (i, set) in sets.into_iter().flatten().enumerate() {
            let path = index_path("componentSets", i);
            if let Some(id) = self.check_component_set(set, &path, diagnostics) {
                ids.push((id, join_path(&path, "id")));
            }
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for (id, path) in ids {
            if !seen.insert(id) {
                diagnostics.error(ErrorCode::DuplicateId, path, format!("Duplicate id \"{}\"", id));
            }
        }
    }

    /// Returns the component id when it is a usable string
    fn check_component<'v>(&self, value: &'v Value, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v str> {
        let Some(obj) = value.as_object() else {
            type_error(diagnostics, path, "an object", value);
            return None;
        };

        let id = required_id(obj, path, diagnostics);
        required_string(obj, "name", path, diagnostics);
        optional_string(obj, "description", path, diagnostics);
        optional_string(obj, "category", path, diagnostics);
        optional_string_array(obj, "tags", path, diagnostics);

        match required(obj, "layout", path, diagnostics) {
            Some(Value::Object(layout)) => check_layout(layout, &join_path(path, "layout"), diagnostics),
            Some(other) => type_error(diagnostics, &join_path(path, "layout"), "an object", other),
            None => {}
        }

        check_style(obj, path, diagnostics);

        if let Some(children) = optional_array(obj, "children", &join_path(path, "children"), diagnostics) {
            self.check_children(children, &join_path(path, "children"), 1, diagnostics);
        }

        id
    }

    fn check_component_set<'v>(&self, value: &'v Value, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v str> {
        let Some(obj) = value.as_object() else {
            type_error(diagnostics, path, "an object", value);
            return None;
        };

        let id = required_id(obj, path, diagnostics);
        required_string(obj, "name", path, diagnostics);
        optional_string(obj, "description", path, diagnostics);
        optional_string(obj, "category", path, diagnostics);

        let variant_props = self.check_variant_props(obj, path, diagnostics);

        match required(obj, "base", path, diagnostics) {
            Some(Value::Object(base)) => {
                let base_path = join_path(path, "base");
                match required(base, "layout", &base_path, diagnostics) {
                    Some(Value::Object(layout)) => {
                        check_layout(layout, &join_path(&base_path, "layout"), diagnostics)
                    }
                    Some(other) => type_error(diagnostics, &join_path(&base_path, "layout"), "an object", other),
                    None => {}
                }
                check_style(base, &base_path, diagnostics);
                let children_path = join_path(&base_path, "children");
                if let Some(children) = optional_array(base, "children", &children_path, diagnostics) {
                    self.check_children(children, &children_path, 1, diagnostics);
                }
            }
            Some(other) => type_error(diagnostics, &join_path(path, "base"), "an object", other),
            None => {}
        }

        let variants_path = join_path(path, "variants");
        match required(obj, "variants", path, diagnostics) {
            Some(Value::Array(variants)) => {
                if variants.is_empty() {
                    diagnostics.error(
                        ErrorCode::InvalidValue,
                        &variants_path,
                        "Component set must define at least one variant",
                    );
                } else if variants.len() > self.limits.max_variants {
                    diagnostics.error(
                        ErrorCode::MaxVariantsExceeded,
                        &variants_path,
                        format!(
                            "Component set defines {} variants; the maximum is {}",
                            variants.len(),
                            self.limits.max_variants
                        ),
                    );
                }
                for (i, variant) in variants.iter().enumerate() {
                    check_variant(variant, &index_path(&variants_path, i), variant_props.as_deref(), diagnostics);
                }
            }
            Some(other) => type_error(diagnostics, &variants_path, "an array", other),
            None => {}
        }

        id
    }

    /// `None` when variantProps is unusable; variant prop checks are then skipped
    fn check_variant_props<'v>(&self, obj: &'v Object, path: &str, diagnostics: &mut Diagnostics) -> Option<Vec<&'v str>> {
        let props_path = join_path(path, "variantProps");
        let props = match required(obj, "variantProps", path, diagnostics)? {
            Value::Array(props) => props,
            other => {
                type_error(diagnostics, &props_path, "an array", other);
                return None;
            }
        };

        let mut keys = Vec::with_capacity(props.len());
        let mut seen = HashSet::with_capacity(props.len());
        let mut usable = true;
        for (i, prop) in props.iter().enumerate() {
            let prop_path = index_path(&props_path, i);
            match prop.as_str() {
                Some(key) if key.trim().is_empty() => {
                    diagnostics.error(ErrorCode::InvalidValue, prop_path, "Variant prop name must not be empty");
                    usable = false;
                }
                Some(key) => {
                    if !seen.insert(key) {
                        diagnostics.error(
                            ErrorCode::InvalidValue,
                            prop_path,
                            format!("Variant prop \"{}\" is listed more than once", key),
                        );
                    }
                    keys.push(key);
                }
                None => {
                    type_error(diagnostics, &prop_path, "a string", prop);
                    usable = false;
                }
            }
        }

        usable.then_some(keys)
    }

    fn check_children(&self, children: &[Value], path: &str, depth: usize, diagnostics: &mut Diagnostics) {
        if children.len() > self.limits.max_children {
            diagnostics.error(
                ErrorCode::MaxChildrenExceeded,
                path,
                format!(
                    "Node has {} children; the maximum is {}",
                    children.len(),
                    self.limits.max_children
                ),
            );
        }

        for (i, child) in children.iter().enumerate() {
            self.check_child(child, &index_path(path, i), depth, diagnostics);
        }
    }

    fn check_child(&self, value: &Value, path: &str, depth: usize, diagnostics: &mut Diagnostics) {
        if depth > self.limits.max_depth {
            diagnostics.error(
                ErrorCode::MaxDepthExceeded,
                path,
                format!("Nesting exceeds the maximum depth of {}", self.limits.max_depth),
            );
            return;
        }

        let Some(obj) = value.as_object() else {
            type_error(diagnostics, path, "an object", value);
            return;
        };

        let node_type = match present(obj, "nodeType") {
            None => {
                diagnostics.error(ErrorCode::MissingRequired, join_path(path, "nodeType"), "Missing required field \"nodeType\"");
                return;
            }
            Some(Value::String(s)) => match NodeType::parse(s) {
                Some(node_type) => node_type,
                None => {
                    diagnostics.error(
                        ErrorCode::InvalidNodeType,
                        join_path(path, "nodeType"),
                        format!("Unknown nodeType \"{}\"; expected one of: {}", s, node_type_list()),
                    );
                    return;
                }
            },
            Some(other) => {
                diagnostics.error(
                    ErrorCode::InvalidNodeType,
                    join_path(path, "nodeType"),
                    format!("nodeType must be a string, found {}", type_name(other)),
                );
                return;
            }
        };

        if node_type == NodeType::Instance {
            optional_string(obj, "id", path, diagnostics);
        } else {
            required_id(obj, path, diagnostics);
        }
        optional_string(obj, "name", path, diagnostics);

        match node_type {
            NodeType::Frame => {
                if let Some(layout) = present(obj, "layout") {
                    match layout.as_object() {
                        Some(layout) => check_layout(layout, &join_path(path, "layout"), diagnostics),
                        None => type_error(diagnostics, &join_path(path, "layout"), "an object", layout),
                    }
                }
                check_style(obj, path, diagnostics);
                let children_path = join_path(path, "children");
                if let Some(children) = optional_array(obj, "children", &children_path, diagnostics) {
                    self.check_children(children, &children_path, depth + 1, diagnostics);
                }
            }
            NodeType::Text => {
                optional_string(obj, "content", path, diagnostics);
                optional_token(obj, "textStyleToken", path, diagnostics);
                check_style(obj, path, diagnostics);
            }
            NodeType::Instance => check_instance(obj, path, diagnostics),
            NodeType::Rectangle | NodeType::Ellipse => {
                optional_size(obj, "width", path, diagnostics);
                optional_size(obj, "height", path, diagnostics);
                check_style(obj, path, diagnostics);
            }
        }
    }
}

// =============================================================================
// Node-level checks
// =============================================================================

fn check_organization(org: &Object, path: &str, diagnostics: &mut Diagnostics) {
    optional_string(org, "pageName", path, diagnostics);
    optional_string(org, "namingPrefix", path, diagnostics);
    optional_non_negative(org, "gridColumns", path, diagnostics);
    optional_non_negative(org, "spacing", path, diagnostics);
}

fn check_instance(obj: &Object, path: &str, diagnostics: &mut Diagnostics) {
    let targets: Vec<&str> = ["ref", "componentKey", "iconRef"]
        .into_iter()
        .filter(|key| present(obj, key).is_some())
        .collect();

    match targets.len() {
        0 => diagnostics.error(
            ErrorCode::MissingRequired,
            path,
            "Instance requires exactly one of \"ref\", \"componentKey\" or \"iconRef\"",
        ),
        1 => {}
        _ => diagnostics.error(
            ErrorCode::MutuallyExclusive,
            path,
            format!(
                "Instance requires exactly one of \"ref\", \"componentKey\" or \"iconRef\"; found {}",
                targets.join(", ")
            ),
        ),
    }

    for key in ["ref", "componentKey"] {
        if let Some(s) = optional_string(obj, key, path, diagnostics) {
            if s.trim().is_empty() {
                diagnostics.error(ErrorCode::InvalidValue, join_path(path, key), format!("\"{}\" must not be empty", key));
            }
        }
    }

    if let Some(reference) = optional_string(obj, "iconRef", path, diagnostics) {
        if let Err(e) = IconRef::parse(reference) {
            diagnostics.error(
                ErrorCode::InvalidIconRef,
                join_path(path, "iconRef"),
                format!("Invalid icon reference \"{}\": {}", reference, e),
            );
        }
    }

    optional_string_map(obj, "variantProps", path, diagnostics);
}

fn check_variant(value: &Value, path: &str, variant_props: Option<&[&str]>, diagnostics: &mut Diagnostics) {
    let Some(obj) = value.as_object() else {
        type_error(diagnostics, path, "an object", value);
        return;
    };

    let props_path = join_path(path, "props");
    match required(obj, "props", path, diagnostics) {
        Some(Value::Object(props)) => {
            for (key, val) in props {
                if !val.is_string() {
                    type_error(diagnostics, &join_path(&props_path, key), "a string", val);
                }
            }
            if let Some(expected) = variant_props {
                for key in expected {
                    if !props.contains_key(*key) {
                        diagnostics.error(
                            ErrorCode::MissingRequired,
                            join_path(&props_path, key),
                            format!("Variant is missing prop \"{}\" declared in variantProps", key),
                        );
                    }
                }
                for key in props.keys() {
                    if !expected.contains(&key.as_str()) {
                        diagnostics.warning(
                            ErrorCode::InvalidValue,
                            join_path(&props_path, key),
                            format!("Variant prop \"{}\" is not declared in variantProps", key),
                        );
                    }
                }
            }
        }
        Some(other) => type_error(diagnostics, &props_path, "an object", other),
        None => {}
    }

    if let Some(layout) = present(obj, "layout") {
        match layout.as_object() {
            Some(layout) => check_layout(layout, &join_path(path, "layout"), diagnostics),
            None => type_error(diagnostics, &join_path(path, "layout"), "an object", layout),
        }
    }
    check_style(obj, path, diagnostics);
}

fn check_layout(layout: &Object, path: &str, diagnostics: &mut Diagnostics) {
    optional_enum(layout, "direction", &DIRECTIONS, path, diagnostics);
    optional_enum(layout, "mainAxisAlign", &AXIS_ALIGNMENTS, path, diagnostics);
    optional_enum(layout, "crossAxisAlign", &AXIS_ALIGNMENTS, path, diagnostics);
    optional_size(layout, "width", path, diagnostics);
    optional_size(layout, "height", path, diagnostics);

    for (raw, token) in LAYOUT_EXCLUSIVE_PAIRS {
        optional_non_negative(layout, raw, path, diagnostics);
        optional_token(layout, token, path, diagnostics);
        check_exclusive(layout, raw, token, path, diagnostics);
    }
}

/// Style fields live directly on components, bases, variants and nodes
fn check_style(obj: &Object, path: &str, diagnostics: &mut Diagnostics) {
    for key in STYLE_TOKEN_FIELDS {
        optional_token(obj, key, path, diagnostics);
    }
    for key in STYLE_NON_NEGATIVE_FIELDS {
        optional_non_negative(obj, key, path, diagnostics);
    }
    for (raw, token) in STYLE_EXCLUSIVE_PAIRS {
        if let Some(n) = optional_number(obj, raw, path, diagnostics) {
            if !(0.0..=1.0).contains(&n) {
                diagnostics.error(
                    ErrorCode::InvalidValue,
                    join_path(path, raw),
                    format!("{} must be between 0 and 1, found {}", raw, n),
                );
            }
        }
        optional_token(obj, token, path, diagnostics);
        check_exclusive(obj, raw, token, path, diagnostics);
    }
}

fn check_exclusive(obj: &Object, raw: &str, token: &str, path: &str, diagnostics: &mut Diagnostics) {
    if present(obj, raw).is_some() && present(obj, token).is_some() {
        diagnostics.error(
            ErrorCode::MutuallyExclusive,
            join_path(path, raw),
            format!("Cannot specify both \"{}\" and \"{}\"", raw, token),
        );
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// Field value, treating `null` as absent
fn present<'v>(obj: &'v Object, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn required<'v>(obj: &'v Object, key: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v Value> {
    let value = present(obj, key);
    if value.is_none() {
        diagnostics.error(
            ErrorCode::MissingRequired,
            join_path(path, key),
            format!("Missing required field \"{}\"", key),
        );
    }
    value
}

fn required_string<'v>(obj: &'v Object, key: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v str> {
    match required(obj, key, path, diagnostics)? {
        Value::String(s) => Some(s),
        other => {
            type_error(diagnostics, &join_path(path, key), "a string", other);
            None
        }
    }
}

/// Required non-empty `id`
fn required_id<'v>(obj: &'v Object, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v str> {
    let id = required_string(obj, "id", path, diagnostics)?;
    if id.trim().is_empty() {
        diagnostics.error(ErrorCode::InvalidValue, join_path(path, "id"), "\"id\" must not be empty");
        return None;
    }
    Some(id)
}

fn optional_string<'v>(obj: &'v Object, key: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v str> {
    match present(obj, key)? {
        Value::String(s) => Some(s),
        other => {
            type_error(diagnostics, &join_path(path, key), "a string", other);
            None
        }
    }
}

fn optional_number(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<f64> {
    let value = present(obj, key)?;
    match value.as_f64() {
        Some(n) => Some(n),
        None => {
            type_error(diagnostics, &join_path(path, key), "a number", value);
            None
        }
    }
}

fn optional_non_negative(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) {
    if let Some(n) = optional_number(obj, key, path, diagnostics) {
        if n < 0.0 {
            diagnostics.error(
                ErrorCode::InvalidValue,
                join_path(path, key),
                format!("{} must not be negative, found {}", key, n),
            );
        }
    }
}

fn optional_token(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) {
    if let Some(token) = optional_string(obj, key, path, diagnostics) {
        if !is_valid_token_path(token) {
            diagnostics.error(
                ErrorCode::InvalidTokenFormat,
                join_path(path, key),
                format!("Invalid token reference \"{}\" in {}", token, key),
            );
        }
    }
}

fn optional_enum(obj: &Object, key: &str, allowed: &[&str], path: &str, diagnostics: &mut Diagnostics) {
    if let Some(s) = optional_string(obj, key, path, diagnostics) {
        if !allowed.contains(&s) {
            diagnostics.error(
                ErrorCode::InvalidValue,
                join_path(path, key),
                format!("Invalid {} \"{}\"; expected one of: {}", key, s, allowed.join(", ")),
            );
        }
    }
}

/// Non-negative number, or `"fill"` / `"hug"`
fn optional_size(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) {
    let Some(value) = present(obj, key) else { return };
    let field_path = join_path(path, key);
    match value {
        Value::Number(n) => {
            if n.as_f64().map_or(true, |n| n < 0.0) {
                diagnostics.error(ErrorCode::InvalidValue, field_path, format!("{} must not be negative", key));
            }
        }
        Value::String(s) if SIZE_MODES.contains(&s.as_str()) => {}
        Value::String(s) => diagnostics.error(
            ErrorCode::InvalidValue,
            field_path,
            format!("Invalid {} \"{}\"; expected a number, \"fill\" or \"hug\"", key, s),
        ),
        other => type_error(diagnostics, &field_path, "a number or string", other),
    }
}

fn optional_array<'v>(obj: &'v Object, key: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<&'v Vec<Value>> {
    match present(obj, key)? {
        Value::Array(items) => Some(items),
        other => {
            type_error(diagnostics, path, "an array", other);
            None
        }
    }
}

fn optional_string_array(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) {
    let field_path = join_path(path, key);
    if let Some(items) = optional_array(obj, key, &field_path, diagnostics) {
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                type_error(diagnostics, &index_path(&field_path, i), "a string", item);
            }
        }
    }
}

fn optional_string_map(obj: &Object, key: &str, path: &str, diagnostics: &mut Diagnostics) {
    let Some(value) = present(obj, key) else { return };
    let field_path = join_path(path, key);
    match value.as_object() {
        Some(map) => {
            for (k, v) in map {
                if !v.is_string() {
                    type_error(diagnostics, &join_path(&field_path, k), "a string", v);
                }
            }
        }
        None => type_error(diagnostics, &field_path, "an object", value),
    }
}

fn type_error(diagnostics: &mut Diagnostics, path: &str, expected: &str, found: &Value) {
    diagnostics.error(
        ErrorCode::InvalidType,
        path,
        format!("Expected {}, found {}", expected, type_name(found)),
    );
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn node_type_list() -> String {
    NodeType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn button() -> Value {
        json!({
            "id": "button",
            "name": "Button",
            "layout": {"direction": "horizontal", "paddingToken": "spacing.md"},
            "fillToken": "color.primary",
        })
    }

    fn run(doc: Value) -> ParseResult {
        SchemaValidator::default().validate_value(&doc)
    }

    fn codes(result: &ParseResult) -> Vec<ErrorCode> {
        result.errors.iter().map(|e| e.code()).collect()
    }

    #[test]
    fn test_valid_schema() {
        let result = run(json!({"components": [button()]}));
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        let schema = result.schema.unwrap();
        assert_eq!(schema.components[0].id, "button");
    }

    #[test]
    fn test_invalid_json_short_circuits() {
        let result = validate("not valid json");
        assert!(!result.valid);
        assert_eq!(codes(&result), vec![ErrorCode::InvalidJson]);
        assert!(result.schema.is_none());
    }

    #[test]
    fn test_non_object_root() {
        let result = validate("[1, 2, 3]");
        assert_eq!(codes(&result), vec![ErrorCode::InvalidType]);
    }

    #[test]
    fn test_empty_schema_is_warning() {
        let result = run(json!({}));
        assert!(result.valid);
        assert!(result.has_warning(ErrorCode::EmptySchema));
        assert!(result.schema.is_some());
    }

    #[test]
    fn test_collects_every_error() {
        let result = run(json!({
            "components": [
                {"name": "No id", "layout": {}},
                {"id": "x", "layout": {"direction": "diagonal"}},
            ]
        }));
        assert!(!result.valid);
        let codes = codes(&result);
        assert!(codes.contains(&ErrorCode::MissingRequired));
        assert!(codes.contains(&ErrorCode::InvalidValue));
        assert!(result.errors.iter().any(|e| e.path() == "components[0].id"));
        assert!(result.errors.iter().any(|e| e.path() == "components[1].name"));
        assert!(result.errors.iter().any(|e| e.path() == "components[1].layout.direction"));
    }

    #[test]
    fn test_mutually_exclusive_padding() {
        let result = run(json!({
            "components": [{
                "id": "card", "name": "Card",
                "layout": {"padding": 8, "paddingToken": "spacing.md"},
            }]
        }));
        assert!(!result.valid);
        let err = result.errors.iter().find(|e| e.code() == ErrorCode::MutuallyExclusive).unwrap();
        assert!(err.message().contains("padding"));
        assert_eq!(err.path(), "components[0].layout.padding");
    }

    #[test]
    fn test_each_pair_checked_independently() {
        let result = run(json!({
            "components": [{
                "id": "card", "name": "Card",
                "layout": {
                    "paddingTop": 4, "paddingTopToken": "spacing.xs",
                    "gap": 2, "gapToken": "spacing.xs",
                    "paddingLeft": 4,
                },
                "opacity": 0.5, "opacityToken": "opacity.half",
            }]
        }));
        let exclusive = result.errors.iter().filter(|e| e.code() == ErrorCode::MutuallyExclusive).count();
        assert_eq!(exclusive, 3);
    }

    #[test]
    fn test_opacity_range() {
        let mut doc = button();
        doc["opacity"] = json!(1.5);
        doc["fillOpacity"] = json!(-0.1);
        let result = run(json!({"components": [doc]}));
        let invalid: Vec<_> = result.errors.iter().filter(|e| e.code() == ErrorCode::InvalidValue).collect();
        assert_eq!(invalid.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_report_later_occurrences() {
        let result = run(json!({
            "components": [button(), button()],
            "componentSets": [{
                "id": "button", "name": "Button",
                "variantProps": ["size"],
                "base": {"layout": {}},
                "variants": [{"props": {"size": "md"}}],
            }]
        }));
        let dups: Vec<_> = result.errors.iter().filter(|e| e.code() == ErrorCode::DuplicateId).collect();
        assert_eq!(dups.len(), 2);
        assert_eq!(dups[0].path(), "components[1].id");
        assert_eq!(dups[1].path(), "componentSets[0].id");
    }

    #[test]
    fn test_empty_variants() {
        let result = run(json!({
            "componentSets": [{
                "id": "button", "name": "Button",
                "variantProps": ["size"],
                "base": {"layout": {}},
                "variants": [],
            }]
        }));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.message().contains("at least one variant")));
    }

    #[test]
    fn test_too_many_variants() {
        let variants: Vec<Value> = (0..4).map(|i| json!({"props": {"size": i.to_string()}})).collect();
        let limits = ValidationLimits { max_variants: 3, ..ValidationLimits::default() };
        let result = SchemaValidator::with_limits(limits).validate_value(&json!({
            "componentSets": [{
                "id": "button", "name": "Button",
                "variantProps": ["size"],
                "base": {"layout": {}},
                "variants": variants,
            }]
        }));
        assert!(result.has_error(ErrorCode::MaxVariantsExceeded));
    }

    #[test]
    fn test_variant_props_missing_is_error_extra_is_warning() {
        let result = run(json!({
            "componentSets": [{
                "id": "button", "name": "Button",
                "variantProps": ["size", "state"],
                "base": {"layout": {}},
                "variants": [
                    {"props": {"size": "md"}},
                    {"props": {"size": "md", "state": "hover", "tone": "brand"}},
                ],
            }]
        }));
        assert!(!result.valid);
        let missing: Vec<_> = result.errors.iter().filter(|e| e.code() == ErrorCode::MissingRequired).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path(), "componentSets[0].variants[0].props.state");
        assert!(result.warnings.iter().any(|w| w.path() == "componentSets[0].variants[1].props.tone"));
    }

    #[test]
    fn test_instance_requires_exactly_one_target() {
        let mut doc = button();
        doc["children"] = json!([
            {"nodeType": "instance"},
            {"nodeType": "instance", "ref": "a", "componentKey": "k"},
            {"nodeType": "instance", "iconRef": "lucide:search"},
        ]);
        let result = run(json!({"components": [doc]}));
        assert!(result.errors.iter().any(|e| e.code() == ErrorCode::MissingRequired && e.path() == "components[0].children[0]"));
        assert!(result.errors.iter().any(|e| e.code() == ErrorCode::MutuallyExclusive && e.path() == "components[0].children[1]"));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_icon_ref_format() {
        let mut doc = button();
        doc["children"] = json!([
            {"nodeType": "instance", "iconRef": "search"},
            {"nodeType": "instance", "iconRef": "lucide:"},
        ]);
        let result = run(json!({"components": [doc]}));
        let icon_errors = result.errors.iter().filter(|e| e.code() == ErrorCode::InvalidIconRef).count();
        assert_eq!(icon_errors, 2);
    }

    #[test]
    fn test_unknown_node_type() {
        let mut doc = button();
        doc["children"] = json!([{"nodeType": "polygon", "id": "p"}]);
        let result = run(json!({"components": [doc]}));
        assert_eq!(codes(&result), vec![ErrorCode::InvalidNodeType]);
    }

    #[test]
    fn test_child_requires_id_except_instance() {
        let mut doc = button();
        doc["children"] = json!([
            {"nodeType": "text", "content": "Hi"},
            {"nodeType": "instance", "ref": "icon"},
        ]);
        let result = run(json!({"components": [doc]}));
        assert_eq!(codes(&result), vec![ErrorCode::MissingRequired]);
        assert_eq!(result.errors[0].path(), "components[0].children[0].id");
    }

    #[test]
    fn test_max_children() {
        let limits = ValidationLimits { max_children: 2, ..ValidationLimits::default() };
        let mut doc = button();
        doc["children"] = json!([
            {"nodeType": "rectangle", "id": "a"},
            {"nodeType": "rectangle", "id": "b"},
            {"nodeType": "ellipse", "id": "c"},
        ]);
        let result = SchemaValidator::with_limits(limits).validate_value(&json!({"components": [doc]}));
        assert_eq!(codes(&result), vec![ErrorCode::MaxChildrenExceeded]);
    }

    #[test]
    fn test_max_components() {
        let limits = ValidationLimits { max_components: 1, ..ValidationLimits::default() };
        let mut second = button();
        second["id"] = json!("other");
        let result = SchemaValidator::with_limits(limits).validate_value(&json!({"components": [button(), second]}));
        assert_eq!(codes(&result), vec![ErrorCode::MaxComponentsExceeded]);
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        let limits = ValidationLimits { max_depth: 3, ..ValidationLimits::default() };
        let mut node = json!({"nodeType": "frame", "id": "leaf"});
        for i in 0..5 {
            node = json!({"nodeType": "frame", "id": format!("f{}", i), "children": [node]});
        }
        let mut doc = button();
        doc["children"] = json!([node]);
        let result = SchemaValidator::with_limits(limits).validate_value(&json!({"components": [doc]}));
        assert_eq!(codes(&result), vec![ErrorCode::MaxDepthExceeded]);
    }

    /// A component whose children nest `frames` frames deep
    fn nested_frames(frames: usize) -> String {
        let mut node = json!({"nodeType": "frame", "id": format!("f{}", frames)});
        for i in (1..frames).rev() {
            node = json!({"nodeType": "frame", "id": format!("f{}", i), "children": [node]});
        }
        let mut doc = button();
        doc["children"] = json!([node]);
        json!({"components": [doc]}).to_string()
    }

    #[test]
    fn test_default_depth_limit_from_text() {
        let result = validate(&nested_frames(50));
        assert!(result.valid, "unexpected errors: {:?}", result.errors);

        let result = validate(&nested_frames(51));
        assert_eq!(codes(&result), vec![ErrorCode::MaxDepthExceeded]);
    }

    #[test]
    fn test_very_deep_document_is_depth_error_not_parse_error() {
        for frames in [63, 100, 200] {
            let result = validate(&nested_frames(frames));
            assert_eq!(codes(&result), vec![ErrorCode::MaxDepthExceeded], "{} frames", frames);
        }
    }

    #[test]
    fn test_large_configured_depth_is_honored() {
        let limits = ValidationLimits { max_depth: 70, ..ValidationLimits::default() };
        let validator = SchemaValidator::with_limits(limits);
        assert!(validator.validate_str(&nested_frames(70)).valid);
        assert_eq!(codes(&validator.validate_str(&nested_frames(71))), vec![ErrorCode::MaxDepthExceeded]);
    }

    #[test]
    fn test_null_collections_count_as_absent() {
        let result = run(json!({"components": null, "componentSets": [{
            "id": "chip", "name": "Chip", "variantProps": ["state"],
            "base": {"layout": {}, "children": null},
            "variants": [{"props": {"state": "on"}}],
        }]}));
        assert!(result.valid, "unexpected errors: {:?}", result.errors);

        let mut doc = button();
        doc["tags"] = Value::Null;
        doc["children"] = json!([
            {"nodeType": "frame", "id": "body", "children": null},
            {"nodeType": "instance", "ref": "icon", "variantProps": null},
        ]);
        let result = run(json!({"components": [doc]}));
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        let schema = result.schema.unwrap();
        assert!(schema.components[0].tags.is_empty());
        assert!(schema.components[0].children[0].children().is_empty());

        let mut doc = button();
        doc["children"] = Value::Null;
        assert!(run(json!({"components": [doc]})).valid);
    }

    #[test]
    fn test_token_format() {
        assert!(is_valid_token_path("semantic.color.primary"));
        assert!(is_valid_token_path("Typography/Heading Large"));
        assert!(is_valid_token_path("spacing-md"));
        assert!(!is_valid_token_path(""));
        assert!(!is_valid_token_path("color..primary"));
        assert!(!is_valid_token_path(".color"));
        assert!(!is_valid_token_path("color/"));
        assert!(!is_valid_token_path("{color.primary}"));

        let mut doc = button();
        doc["strokeToken"] = json!("color//border");
        let result = run(json!({"components": [doc]}));
        assert_eq!(codes(&result), vec![ErrorCode::InvalidTokenFormat]);
    }

    #[test]
    fn test_wrong_types() {
        let result = run(json!({
            "organization": "main",
            "components": {"id": "x"},
        }));
        let codes = codes(&result);
        assert_eq!(codes, vec![ErrorCode::InvalidType, ErrorCode::InvalidType]);
    }

    #[test]
    fn test_reserialized_schema_validates_identically() {
        let doc = json!({
            "organization": {"pageName": "Components"},
            "components": [{
                "id": "card", "name": "Card", "tags": ["surface"],
                "layout": {"direction": "vertical", "padding": 16, "width": "fill"},
                "radiusToken": "radius.md",
                "children": [
                    {"nodeType": "text", "id": "title", "textStyleToken": "heading.sm", "content": "Title"},
                    {"nodeType": "instance", "ref": "button", "variantProps": {"size": "sm"}},
                ],
            }],
            "componentSets": [{
                "id": "button", "name": "Button",
                "variantProps": ["size"],
                "base": {"layout": {"gapToken": "spacing.xs"}},
                "variants": [{"props": {"size": "sm"}, "opacity": 0.9}],
            }],
        });
        let first = run(doc);
        assert!(first.valid, "unexpected errors: {:?}", first.errors);

        let json = serde_json::to_string(first.schema.as_ref().unwrap()).unwrap();
        let second = validate(&json);
        assert_eq!(second.valid, first.valid);
        assert_eq!(second.errors, first.errors);
        assert_eq!(second.schema, first.schema);
    }
}
