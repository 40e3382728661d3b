//! Token Alias Index
//!
//! Session-scoped lookup tables from alias to token, one per token kind,
//! plus a suffix index over variable aliases for partial lookups.
//!
//! Collision policy: when an alias already points at a different token, the
//! newest registration wins and the collision is logged and recorded. This is
//! intentional; callers rely on later registrations taking precedence.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::aliases::{build_style_aliases, build_variable_aliases, final_segment};
use super::source::{NameSource, StyleName, VariableName};

// =============================================================================
// Token Entries
// =============================================================================

/// Which table a token lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Variable,
    TextStyle,
    EffectStyle,
}

impl TokenKind {
    /// Common roots tried in front of a reference that missed exactly
    pub fn root_prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Variable => &["semantic", "primitives", "core", "tokens"],
            Self::TextStyle => &["typography", "text", "font"],
            Self::EffectStyle => &["effects", "shadow"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::TextStyle => "text style",
            Self::EffectStyle => "effect style",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something an alias can point at
pub trait IndexedValue {
    /// Stable identity; two aliases collide only if identities differ
    fn identity(&self) -> &str;
    /// Name to show users
    fn canonical_name(&self) -> &str;
}

/// A host variable or style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    pub kind: TokenKind,
}

impl IndexedValue for TokenEntry {
    fn identity(&self) -> &str {
        &self.id
    }

    fn canonical_name(&self) -> &str {
        &self.name
    }
}

impl From<&VariableName> for TokenEntry {
    fn from(v: &VariableName) -> Self {
        Self {
            id: v.id.clone().unwrap_or_else(|| format!("{}/{}", v.collection, v.name)),
            name: v.name.clone(),
            collection: Some(v.collection.clone()),
            kind: TokenKind::Variable,
        }
    }
}

impl TokenEntry {
    fn style(s: &StyleName, kind: TokenKind) -> Self {
        Self {
            id: s.id.clone().unwrap_or_else(|| format!("{}:{}", kind.as_str(), s.name)),
            name: s.name.clone(),
            collection: None,
            kind,
        }
    }
}

// =============================================================================
// Alias Map
// =============================================================================

/// An alias that was re-pointed at a different token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasCollision {
    pub alias: String,
    pub previous: String,
    pub replacement: String,
}

/// Alias -> value map that remembers first-insertion order of its keys
#[derive(Debug, Clone)]
pub struct AliasMap<T> {
    entries: HashMap<String, T>,
    order: Vec<String>,
    collisions: Vec<AliasCollision>,
}

impl<T> Default for AliasMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            collisions: Vec::new(),
        }
    }
}

impl<T: IndexedValue + Clone> AliasMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `alias`; returns true when this replaced a different value
    pub fn insert(&mut self, alias: impl Into<String>, value: T) -> bool {
        let alias = alias.into();
        match self.entries.get(&alias) {
            Some(existing) if existing.identity() != value.identity() => {
                tracing::warn!(
                    alias = %alias,
                    previous = existing.canonical_name(),
                    replacement = value.canonical_name(),
                    "alias collision; newest registration wins"
                );
                self.collisions.push(AliasCollision {
                    alias: alias.clone(),
                    previous: existing.canonical_name().to_string(),
                    replacement: value.canonical_name().to_string(),
                });
                self.entries.insert(alias, value);
                true
            }
            Some(_) => {
                self.entries.insert(alias, value);
                false
            }
            None => {
                self.order.push(alias.clone());
                self.entries.insert(alias, value);
                false
            }
        }
    }

    pub fn get(&self, alias: &str) -> Option<&T> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Aliases in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// First alias ending in `/segment` or `.segment`
    pub fn find_by_suffix(&self, segment: &str) -> Option<(&str, &T)> {
        let slash = format!("/{}", segment);
        let dot = format!(".{}", segment);
        self.keys()
            .find(|key| key.ends_with(&slash) || key.ends_with(&dot))
            .and_then(|key| self.entries.get(key).map(|v| (key, v)))
    }

    /// Canonical names of distinct values, sorted
    pub fn canonical_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = self
            .entries
            .values()
            .filter(|v| seen.insert(v.identity().to_string()))
            .map(|v| v.canonical_name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn collisions(&self) -> &[AliasCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Token Index
// =============================================================================

/// Fuzzy search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMatch {
    pub name: String,
    pub kind: TokenKind,
    pub score: i64,
}

/// Alias tables for one resolution session.
///
/// Build a fresh index each time the host's names are read; nothing here is
/// shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    variables: AliasMap<TokenEntry>,
    text_styles: AliasMap<TokenEntry>,
    effect_styles: AliasMap<TokenEntry>,
    /// final path segment -> variable aliases ending in it, in insertion order
    variable_suffixes: HashMap<String, Vec<String>>,
    /// sorted distinct canonical names per kind
    variable_names: Vec<String>,
    text_style_names: Vec<String>,
    effect_style_names: Vec<String>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index everything the host currently exposes
    pub fn build(source: &dyn NameSource) -> Self {
        let mut index = Self::new();
        for variable in source.variables() {
            index.insert_variable(&variable);
        }
        for style in source.text_styles() {
            index.insert_style(&style, TokenKind::TextStyle);
        }
        for style in source.effect_styles() {
            index.insert_style(&style, TokenKind::EffectStyle);
        }
        index.rebuild_suffix_index();
        index.refresh_names(TokenKind::Variable);
        index.refresh_names(TokenKind::TextStyle);
        index.refresh_names(TokenKind::EffectStyle);

        tracing::debug!(
            variable_aliases = index.variables.len(),
            text_style_aliases = index.text_styles.len(),
            effect_style_aliases = index.effect_styles.len(),
            collisions = index.collision_count(),
            "token index built"
        );
        index
    }

    pub fn add_variable(&mut self, variable: &VariableName) {
        self.insert_variable(variable);
        self.rebuild_suffix_index();
        self.refresh_names(TokenKind::Variable);
    }

    pub fn add_text_style(&mut self, style: &StyleName) {
        self.insert_style(style, TokenKind::TextStyle);
        self.refresh_names(TokenKind::TextStyle);
    }

    pub fn add_effect_style(&mut self, style: &StyleName) {
        self.insert_style(style, TokenKind::EffectStyle);
        self.refresh_names(TokenKind::EffectStyle);
    }

    fn insert_variable(&mut self, variable: &VariableName) {
        let entry = TokenEntry::from(variable);
        for alias in build_variable_aliases(&variable.name, &variable.collection) {
            self.variables.insert(alias, entry.clone());
        }
    }

    fn insert_style(&mut self, style: &StyleName, kind: TokenKind) {
        let entry = TokenEntry::style(style, kind);
        let map = match kind {
            TokenKind::TextStyle => &mut self.text_styles,
            TokenKind::EffectStyle => &mut self.effect_styles,
            TokenKind::Variable => &mut self.variables,
        };
        for alias in build_style_aliases(&style.name) {
            map.insert(alias, entry.clone());
        }
    }

    fn rebuild_suffix_index(&mut self) {
        self.variable_suffixes.clear();
        for key in self.variables.keys() {
            self.variable_suffixes
                .entry(final_segment(key).to_string())
                .or_default()
                .push(key.to_string());
        }
    }

    fn refresh_names(&mut self, kind: TokenKind) {
        let names = self.map(kind).canonical_names();
        match kind {
            TokenKind::Variable => self.variable_names = names,
            TokenKind::TextStyle => self.text_style_names = names,
            TokenKind::EffectStyle => self.effect_style_names = names,
        }
    }

    /// Sorted distinct canonical names of one kind
    pub fn names(&self, kind: TokenKind) -> &[String] {
        match kind {
            TokenKind::Variable => &self.variable_names,
            TokenKind::TextStyle => &self.text_style_names,
            TokenKind::EffectStyle => &self.effect_style_names,
        }
    }

    pub fn map(&self, kind: TokenKind) -> &AliasMap<TokenEntry> {
        match kind {
            TokenKind::Variable => &self.variables,
            TokenKind::TextStyle => &self.text_styles,
            TokenKind::EffectStyle => &self.effect_styles,
        }
    }

    /// First variable whose alias ends in `segment`
    pub fn variable_by_suffix(&self, segment: &str) -> Option<&TokenEntry> {
        self.variable_suffixes
            .get(segment)?
            .iter()
            .find_map(|key| self.variables.get(key))
    }

    pub fn collision_count(&self) -> usize {
        self.variables.collisions().len()
            + self.text_styles.collisions().len()
            + self.effect_styles.collisions().len()
    }

    /// Fuzzy search over canonical names of every kind, best first
    pub fn search(&self, query: &str, limit: usize) -> Vec<TokenMatch> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<TokenMatch> = Vec::new();

        for kind in [TokenKind::Variable, TokenKind::TextStyle, TokenKind::EffectStyle] {
            for name in self.names(kind) {
                if let Some(score) = matcher.fuzzy_match(name, query) {
                    results.push(TokenMatch { name: name.clone(), kind, score });
                }
            }
        }

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        results.truncate(limit);
        results
    }
}
