//! Diagnostics
//!
//! Typed error/warning records shared by every pass. Validation never stops
//! at the first problem: each pass pushes into a [`Diagnostics`] accumulator
//! that is threaded through the recursion by `&mut`.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Error Codes
// =============================================================================

/// Closed set of diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Document is not parseable JSON
    InvalidJson,
    /// A required field is absent
    MissingRequired,
    /// A value has the wrong JSON type
    InvalidType,
    /// Component or component set id defined more than once
    DuplicateId,
    /// `nodeType` is missing or not one of the known node kinds
    InvalidNodeType,
    /// Child nesting exceeds the depth limit
    MaxDepthExceeded,
    /// Too many components + component sets
    MaxComponentsExceeded,
    /// Too many children under a single node
    MaxChildrenExceeded,
    /// Variant count outside the allowed range
    MaxVariantsExceeded,
    /// Token reference does not match the token path grammar
    InvalidTokenFormat,
    /// Icon reference does not match `library:icon`
    InvalidIconRef,
    /// A raw value and its token counterpart are both set
    MutuallyExclusive,
    /// Value has the right type but is out of range or not allowed
    InvalidValue,
    /// Schema defines no components (warning)
    EmptySchema,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "INVALID_JSON",
            Self::MissingRequired => "MISSING_REQUIRED",
            Self::InvalidType => "INVALID_TYPE",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::InvalidNodeType => "INVALID_NODE_TYPE",
            Self::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
            Self::MaxComponentsExceeded => "MAX_COMPONENTS_EXCEEDED",
            Self::MaxChildrenExceeded => "MAX_CHILDREN_EXCEEDED",
            Self::MaxVariantsExceeded => "MAX_VARIANTS_EXCEEDED",
            Self::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            Self::InvalidIconRef => "INVALID_ICON_REF",
            Self::MutuallyExclusive => "MUTUALLY_EXCLUSIVE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::EmptySchema => "EMPTY_SCHEMA",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single diagnostic record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    code: ErrorCode,
    path: String,
    message: String,
}

impl ValidationError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Copy of this record with the path prefixed by `[file N]`
    pub fn tagged(&self, file: usize) -> Self {
        let path = if self.path.is_empty() {
            format!("[file {}]", file)
        } else {
            format!("[file {}] {}", file, self.path)
        };
        Self {
            code: self.code,
            path,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.code, self.path, self.message)
        }
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Accumulator for errors and warnings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error
    pub fn error(&mut self, code: ErrorCode, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(code, path, message));
    }

    /// Add a warning
    pub fn warning(&mut self, code: ErrorCode, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationError::new(code, path, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Merge another collection into this one, tagging every path with `[file N]`
    pub fn merge_tagged(&mut self, other: Diagnostics, file: usize) {
        self.errors.extend(other.errors.iter().map(|e| e.tagged(file)));
        self.warnings.extend(other.warnings.iter().map(|w| w.tagged(file)));
    }

    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ValidationError>) {
        (self.errors, self.warnings)
    }
}

/// Join a parent path and a field name (`components[0]` + `layout`)
pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Append an index to a path (`children` + 2 -> `children[2]`)
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}
