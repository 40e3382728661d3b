//! Token Resolution
//!
//! Resolves a symbolic token reference against a [`TokenIndex`] in three
//! tiers, stopping at the first hit:
//!
//! 1. exact lowercase lookup
//! 2. the reference under each common root for its kind (`semantic/x`, `semantic.x`, ...)
//! 3. final-segment match, for multi-segment references only
//!
//! A miss is a normal result carrying what was tried, what exists, and a
//! best-guess suggestion. Nothing here panics on any input string.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::aliases::{final_segment, is_multi_segment};
use super::index::{IndexedValue, TokenEntry, TokenIndex, TokenKind};
use crate::config::ResolverConfig;

/// Which tier produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Prefix,
    Suffix,
}

/// Outcome of a lookup; `value` is `None` on a miss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult<T> {
    pub value: Option<T>,
    pub tried_names: Vec<String>,
    pub available_names: Vec<String>,
    /// On a suffix hit, the matched canonical name; on a miss, the closest known name
    pub suggestion: Option<String>,
    pub tier: Option<MatchTier>,
}

impl<T> ResolutionResult<T> {
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// Resolved, but only by final segment
    pub fn is_low_confidence(&self) -> bool {
        self.tier == Some(MatchTier::Suffix)
    }
}

/// Resolve a variable reference with default settings
pub fn resolve_token(path: &str, index: &TokenIndex) -> ResolutionResult<TokenEntry> {
    TokenResolver::new(index).resolve(TokenKind::Variable, path)
}

/// Three-tier resolver over a borrowed index
#[derive(Debug, Clone)]
pub struct TokenResolver<'a> {
    index: &'a TokenIndex,
    config: ResolverConfig,
}

impl<'a> TokenResolver<'a> {
    pub fn new(index: &'a TokenIndex) -> Self {
        Self::with_config(index, ResolverConfig::default())
    }

    pub fn with_config(index: &'a TokenIndex, config: ResolverConfig) -> Self {
        Self { index, config }
    }

    pub fn resolve_variable(&self, path: &str) -> ResolutionResult<TokenEntry> {
        self.resolve(TokenKind::Variable, path)
    }

    pub fn resolve_text_style(&self, path: &str) -> ResolutionResult<TokenEntry> {
        self.resolve(TokenKind::TextStyle, path)
    }

    pub fn resolve_effect_style(&self, path: &str) -> ResolutionResult<TokenEntry> {
        self.resolve(TokenKind::EffectStyle, path)
    }

    pub fn resolve(&self, kind: TokenKind, path: &str) -> ResolutionResult<TokenEntry> {
        let map = self.index.map(kind);
        let query = path.trim().to_lowercase();
        let mut tried = Vec::new();

        // Tier 1
        tried.push(query.clone());
        if let Some(entry) = map.get(&query) {
            return self.hit(kind, entry, MatchTier::Exact, tried, None);
        }

        // Tier 2
        for root in kind.root_prefixes() {
            for sep in ['/', '.'] {
                let candidate = format!("{}{}{}", root, sep, query);
                let found = map.get(&candidate);
                tried.push(candidate);
                if let Some(entry) = found {
                    return self.hit(kind, entry, MatchTier::Prefix, tried, None);
                }
            }
        }

        // Tier 3
        if is_multi_segment(&query) {
            let segment = final_segment(&query);
            if !segment.is_empty() {
                tried.push(format!("*/{}", segment));
                let found = match kind {
                    TokenKind::Variable => self.index.variable_by_suffix(segment),
                    TokenKind::TextStyle | TokenKind::EffectStyle => {
                        map.find_by_suffix(segment).map(|(_, entry)| entry)
                    }
                };
                if let Some(entry) = found {
                    tracing::warn!(
                        reference = %path,
                        matched = %entry.canonical_name(),
                        kind = %kind,
                        "token resolved by final segment only"
                    );
                    let suggestion = Some(entry.canonical_name().to_string());
                    return self.hit(kind, entry, MatchTier::Suffix, tried, suggestion);
                }
            }
        }

        let known = self.index.names(kind);
        let suggestion = self.suggest(&query, known);
        tracing::debug!(reference = %path, kind = %kind, ?suggestion, "token not found");

        ResolutionResult {
            value: None,
            tried_names: tried,
            available_names: self.available(known),
            suggestion,
            tier: None,
        }
    }

    fn hit(
        &self,
        kind: TokenKind,
        entry: &TokenEntry,
        tier: MatchTier,
        tried: Vec<String>,
        suggestion: Option<String>,
    ) -> ResolutionResult<TokenEntry> {
        ResolutionResult {
            value: Some(entry.clone()),
            tried_names: tried,
            available_names: self.available(self.index.names(kind)),
            suggestion,
            tier: Some(tier),
        }
    }

    fn available(&self, names: &[String]) -> Vec<String> {
        names.iter().take(self.config.max_available_names).cloned().collect()
    }

    /// Highest-scoring known name strictly above the threshold; earliest wins ties
    fn suggest(&self, query: &str, known: &[String]) -> Option<String> {
        let mut best: Option<(&String, f64)> = None;
        for name in known {
            let score = similarity(query, name);
            if score <= self.config.suggestion_threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((name, score));
            }
        }
        best.map(|(name, _)| name.clone())
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '.' | '/' | '-' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Similarity in [0, 1] between two names, ignoring separators.
///
/// Containment scores the length ratio; otherwise the share of unique
/// characters in common over the larger character set. Empty input scores 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        let (la, lb) = (a.chars().count(), b.chars().count());
        return la.min(lb) as f64 / la.max(lb) as f64;
    }

    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let shared = set_a.intersection(&set_b).count();
    shared as f64 / set_a.len().max(set_b.len()) as f64
}
