//! End-to-end pipeline tests
//!
//! Documents in `tests/fixtures` run through validation, merge, dependency
//! ordering and resolution the way the CLI drives them.

use component_schemas::tokens::{build_variable_aliases, MatchTier, StaticNameSource, TokenKind};
use component_schemas::{
    merge_all, resolve_dependencies, resolve_token, validate, ErrorCode, IconResolver, ParseResult,
    TokenIndex, TokenResolver,
};

const CARD_BUTTON: &str = include_str!("fixtures/card_button.json");
const MUTUAL_CYCLE: &str = include_str!("fixtures/mutual_cycle.json");
const PRIMITIVES: &str = include_str!("fixtures/primitives.json");
const COMPOSITES: &str = include_str!("fixtures/composites.json");
const LUCIDE: &str = include_str!("fixtures/lucide.json");
const DUPLICATE_CARD: &str = include_str!("fixtures/duplicate_card.json");
const PADDING_CONFLICT: &str = include_str!("fixtures/padding_conflict.json");
const EMPTY_VARIANTS: &str = include_str!("fixtures/empty_variants.json");
const TOKENS: &str = include_str!("fixtures/tokens.json");

fn token_index() -> TokenIndex {
    let source = StaticNameSource::from_json_str(TOKENS).unwrap();
    TokenIndex::build(&source)
}

fn assert_valid(result: &ParseResult) {
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_invalid_json_single_error() {
    let result = validate("not valid json");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code(), ErrorCode::InvalidJson);
}

#[test]
fn test_fixture_schemas_are_valid() {
    for doc in [CARD_BUTTON, MUTUAL_CYCLE, PRIMITIVES, COMPOSITES, DUPLICATE_CARD] {
        let result = validate(doc);
        assert_valid(&result);
        assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    }
}

#[test]
fn test_padding_and_token_are_exclusive() {
    let result = validate(PADDING_CONFLICT);
    assert!(!result.valid);
    let error = result
        .errors
        .iter()
        .find(|e| e.code() == ErrorCode::MutuallyExclusive)
        .unwrap();
    assert!(error.message().contains("padding"));
    assert_eq!(error.path(), "components[0].layout.padding");
}

#[test]
fn test_empty_variants_rejected() {
    let result = validate(EMPTY_VARIANTS);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.message().contains("at least one variant")));
}

#[test]
fn test_revalidating_serialized_schema_is_stable() {
    let first = validate(CARD_BUTTON);
    assert_valid(&first);
    let json = serde_json::to_string(first.schema.as_ref().unwrap()).unwrap();

    let second = validate(&json);
    assert_valid(&second);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.schema, second.schema);
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn test_merge_schemas_and_registry() {
    let result = merge_all(&[PRIMITIVES, LUCIDE, COMPOSITES]);
    assert_valid(&result);

    let schema = result.schema.unwrap();
    let ids: Vec<&str> = schema.ids().collect();
    assert_eq!(ids, vec!["badge", "divider", "page", "card"]);
    assert_eq!(
        schema.organization.unwrap().page_name.as_deref(),
        Some("Primitives")
    );

    assert_eq!(result.registries.len(), 1);
    assert_eq!(result.registries[0].icon_count(), 4);
    assert!(result.registries[0].extracted_at_utc().is_some());
}

#[test]
fn test_cross_file_duplicate_either_order() {
    for docs in [[CARD_BUTTON, DUPLICATE_CARD], [DUPLICATE_CARD, CARD_BUTTON]] {
        let result = merge_all(&docs);
        assert!(!result.valid);
        assert!(result.schema.is_none());
        let dup = result
            .errors
            .iter()
            .find(|e| e.code() == ErrorCode::DuplicateId)
            .unwrap();
        assert!(dup.message().contains("\"card\""));
        assert!(dup.path().starts_with("[file 2]"));
    }
}

#[test]
fn test_errors_tagged_with_file() {
    let result = merge_all(&[CARD_BUTTON, PADDING_CONFLICT, "{"]);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.path() == "[file 2] components[0].layout.padding"));
    assert!(result
        .errors
        .iter()
        .any(|e| e.path() == "[file 3]" && e.code() == ErrorCode::InvalidJson));
}

// =============================================================================
// Dependency Ordering
// =============================================================================

#[test]
fn test_card_button_order() {
    let schema = validate(CARD_BUTTON).schema.unwrap();
    let result = resolve_dependencies(&schema);
    assert!(result.success);
    assert_eq!(result.order, vec!["button", "card"]);
}

#[test]
fn test_merged_order_puts_dependencies_first() {
    let schema = merge_all(&[PRIMITIVES, COMPOSITES]).schema.unwrap();
    let result = resolve_dependencies(&schema);
    assert!(result.success);
    assert_eq!(result.order, vec!["badge", "divider", "card", "page"]);
}

#[test]
fn test_mutual_cycle_reported_once() {
    let schema = validate(MUTUAL_CYCLE).schema.unwrap();
    let result = resolve_dependencies(&schema);
    assert!(!result.success);
    assert!(result.order.is_empty());
    let error = result.error.unwrap();
    assert!(error.contains("Circular"));
    assert!(error.contains("a -> b") || error.contains("b -> a"), "{}", error);
}

// =============================================================================
// Token Resolution
// =============================================================================

#[test]
fn test_spacing_aliases() {
    let aliases = build_variable_aliases("sm", "primitives/spacing");
    for expected in ["sm", "primitives/spacing/sm", "primitives/spacing.sm", "spacing/sm", "spacing.sm"] {
        assert!(aliases.iter().any(|a| a == expected), "missing {}", expected);
    }
}

#[test]
fn test_schema_tokens_resolve() {
    let index = token_index();
    let resolver = TokenResolver::new(&index);

    for path in ["spacing.lg", "spacing.md", "spacing.sm", "color/surface", "color/primary"] {
        let result = resolver.resolve_variable(path);
        assert!(result.is_resolved(), "{} unresolved: {:?}", path, result.tried_names);
    }
    assert!(resolver.resolve_text_style("heading/small").is_resolved());
    assert!(resolver.resolve_text_style("body").is_resolved());
    assert!(resolver.resolve_effect_style("shadow/card").is_resolved());
}

#[test]
fn test_bare_alias_collision_newest_wins() {
    let index = token_index();
    assert!(index.collision_count() > 0);

    let bare = resolve_token("sm", &index).value.unwrap();
    assert_eq!(bare.collection.as_deref(), Some("radius"));

    let qualified = resolve_token("spacing.sm", &index).value.unwrap();
    assert_eq!(qualified.collection.as_deref(), Some("primitives/spacing"));
}

#[test]
fn test_effect_style_suffix_match_is_flagged() {
    let index = token_index();
    let result = TokenResolver::new(&index).resolve(TokenKind::EffectStyle, "elevation/card");
    assert_eq!(result.tier, Some(MatchTier::Suffix));
    assert_eq!(result.suggestion.as_deref(), Some("Shadow/Card"));
    assert_eq!(result.value.unwrap().name, "Shadow/Card");
}

#[test]
fn test_resolve_token_never_panics() {
    let index = token_index();
    for path in ["", " ", "nope", "a.b.c.d", "://", "🎨", "color/"] {
        let result = resolve_token(path, &index);
        assert!(result.value.is_none(), "{:?} resolved unexpectedly", path);
        assert!(!result.tried_names.is_empty());
    }
}

#[test]
fn test_miss_reports_context() {
    let index = token_index();
    let result = resolve_token("colour/primaryy", &index);
    // final segment "primaryy" has no suffix match either
    assert!(result.value.is_none());
    assert!(result.available_names.contains(&"color/primary".to_string()));
    assert_eq!(result.suggestion.as_deref(), Some("color/primary"));
}

#[test]
fn test_token_search() {
    let index = token_index();
    let hits = index.search("surf", 5);
    assert_eq!(hits[0].name, "color/surface");
}

// =============================================================================
// Icon Resolution
// =============================================================================

#[test]
fn test_icon_did_you_mean() {
    let registries = merge_all(&[LUCIDE]).registries;
    let resolver = IconResolver::new(&registries);

    let result = resolver.resolve("lucide:sear");
    assert!(!result.is_resolved());
    let error = result.error.unwrap();
    assert!(error.contains("sear"));
    assert!(error.contains("search"));
}

#[test]
fn test_schema_icon_refs_resolve() {
    let result = merge_all(&[CARD_BUTTON, LUCIDE]);
    assert_valid(&result);
    let resolver = IconResolver::new(&result.registries);

    let icon = resolver.resolve("Lucide:X");
    assert_eq!(icon.component_key.as_deref(), Some("key-x"));
    assert_eq!(icon.library_display_name.as_deref(), Some("Lucide Icons"));
}

#[test]
fn test_icon_library_missing_lists_loaded() {
    let registries = merge_all(&[LUCIDE]).registries;
    let result = IconResolver::new(&registries).resolve("heroicons:search");
    let error = result.error.unwrap();
    assert!(error.contains("heroicons"));
    assert!(error.contains("lucide"));
}
