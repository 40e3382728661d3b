//! Component Schemas
//!
//! Front half of a declarative UI-component pipeline: parse and validate
//! component schema documents, merge many documents into one, order
//! components so dependencies come first, and resolve design-token and icon
//! references with fuzzy fallbacks.
//!
//! ## Pipeline
//!
//! ```text
//! JSON documents
//!   ├── merge::merge_all ──► validate::SchemaValidator (per document)
//!   │                     └► cross-file duplicate ids
//!   ├── deps::resolve_dependencies ──► creation order | cycle
//!   └── resolution
//!         ├── tokens::TokenIndex + tokens::TokenResolver
//!         └── icons::IconResolver
//! ```
//!
//! Authoring errors never panic or short-circuit; they come back as
//! [`ValidationError`] lists inside a [`ParseResult`]. Missing tokens and
//! icons come back as inspectable results with suggestions.

pub mod config;
pub mod deps;
pub mod diagnostics;
pub mod error;
pub mod icons;
pub mod merge;
pub mod schema;
pub mod tokens;
pub mod validate;

pub use config::{PipelineConfig, ResolverConfig, ValidationLimits};
pub use deps::{resolve_dependencies, DependencyGraph, ResolveResult};
pub use diagnostics::{Diagnostics, ErrorCode, ValidationError};
pub use error::{Result, SchemaError};
pub use icons::{IconRef, IconResolveResult, IconResolver};
pub use merge::{merge_all, DocumentMerger};
pub use schema::{ChildNode, ComponentDefinition, ComponentSetDefinition, IconRegistry, Schema};
pub use tokens::{resolve_token, ResolutionResult, TokenIndex, TokenResolver};
pub use validate::{validate, ParseResult, SchemaValidator};
