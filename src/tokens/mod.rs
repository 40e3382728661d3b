//! Design-token lookup: alias generation, the per-session index, and the
//! tiered resolver.

pub mod aliases;
pub mod index;
pub mod resolver;
pub mod source;

pub use aliases::{build_style_aliases, build_variable_aliases};
pub use index::{AliasCollision, AliasMap, TokenEntry, TokenIndex, TokenKind, TokenMatch};
pub use resolver::{resolve_token, similarity, MatchTier, ResolutionResult, TokenResolver};
pub use source::{NameSource, StaticNameSource, StyleName, VariableName};
