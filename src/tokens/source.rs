//! Where token names come from.
//!
//! The host design tool owns the real variables and styles; the index only
//! needs their names. `StaticNameSource` is the JSON-backed implementation
//! used by the CLI and tests.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// A variable as exposed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub collection: String,
}

impl VariableName {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            collection: collection.into(),
        }
    }
}

/// A text or effect style as exposed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl StyleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into() }
    }
}

/// Read-only view of the host's tokens
pub trait NameSource {
    fn variables(&self) -> Vec<VariableName>;
    fn text_styles(&self) -> Vec<StyleName>;
    fn effect_styles(&self) -> Vec<StyleName>;
}

/// Token names held in memory, usually loaded from a JSON export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticNameSource {
    #[serde(default)]
    pub variables: Vec<VariableName>,
    #[serde(default)]
    pub text_styles: Vec<StyleName>,
    #[serde(default)]
    pub effect_styles: Vec<StyleName>,
}

impl StaticNameSource {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_variable(mut self, name: &str, collection: &str) -> Self {
        self.variables.push(VariableName::new(name, collection));
        self
    }

    pub fn with_text_style(mut self, name: &str) -> Self {
        self.text_styles.push(StyleName::new(name));
        self
    }

    pub fn with_effect_style(mut self, name: &str) -> Self {
        self.effect_styles.push(StyleName::new(name));
        self
    }
}

impl NameSource for StaticNameSource {
    fn variables(&self) -> Vec<VariableName> {
        self.variables.clone()
    }

    fn text_styles(&self) -> Vec<StyleName> {
        self.text_styles.clone()
    }

    fn effect_styles(&self) -> Vec<StyleName> {
        self.effect_styles.clone()
    }
}
