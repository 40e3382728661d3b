//! Icon References
//!
//! Parses `library:icon` references and resolves them against the icon
//! registries loaded alongside the component schemas.
//!
//! Lookups are case-insensitive on both the library namespace and the icon
//! name. A miss is a normal outcome carried in [`IconResolveResult::error`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::ResolverConfig;
use crate::schema::IconRegistry;

// =============================================================================
// Icon Reference Grammar
// =============================================================================

/// A parsed `library:icon` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRef {
    pub library: String,
    pub icon: String,
}

/// Why a reference string is not a valid `library:icon`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRefError {
    MissingSeparator,
    EmptyLibrary,
    EmptyIcon,
}

impl fmt::Display for IconRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "expected \"library:icon\" but found no ':'"),
            Self::EmptyLibrary => write!(f, "library name before ':' is empty"),
            Self::EmptyIcon => write!(f, "icon name after ':' is empty"),
        }
    }
}

impl std::error::Error for IconRefError {}

impl IconRef {
    /// Split on the first `:`; both sides must be non-empty after trimming
    pub fn parse(reference: &str) -> Result<Self, IconRefError> {
        let (library, icon) = reference
            .split_once(':')
            .ok_or(IconRefError::MissingSeparator)?;
        let library = library.trim();
        let icon = icon.trim();
        if library.is_empty() {
            return Err(IconRefError::EmptyLibrary);
        }
        if icon.is_empty() {
            return Err(IconRefError::EmptyIcon);
        }
        Ok(Self {
            library: library.to_string(),
            icon: icon.to_string(),
        })
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.icon)
    }
}

// =============================================================================
// Icon Resolution
// =============================================================================

/// Outcome of resolving an icon reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconResolveResult {
    pub component_key: Option<String>,
    pub library: String,
    pub icon_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IconResolveResult {
    pub fn is_resolved(&self) -> bool {
        self.component_key.is_some()
    }

    fn failure(library: &str, icon_name: &str, error: String) -> Self {
        Self {
            component_key: None,
            library: library.to_string(),
            icon_name: icon_name.to_string(),
            library_display_name: None,
            error: Some(error),
        }
    }
}

struct LoadedLibrary {
    registry: IconRegistry,
    /// lowercased icon name -> original icon name
    by_lower: HashMap<String, String>,
}

/// Resolves `library:icon` references against loaded registries
pub struct IconResolver {
    libraries: HashMap<String, LoadedLibrary>,
    /// Library namespaces in load order, for error messages
    load_order: Vec<String>,
    max_suggestions: usize,
}

impl IconResolver {
    pub fn new(registries: &[IconRegistry]) -> Self {
        Self::with_config(registries, &ResolverConfig::default())
    }

    pub fn with_config(registries: &[IconRegistry], config: &ResolverConfig) -> Self {
        let mut libraries = HashMap::with_capacity(registries.len());
        let mut load_order = Vec::with_capacity(registries.len());

        for registry in registries {
            let key = registry.library.trim().to_lowercase();
            let mut by_lower = HashMap::with_capacity(registry.icons.len());
            for name in registry.icons.keys() {
                if let Some(previous) = by_lower.insert(name.to_lowercase(), name.clone()) {
                    tracing::warn!(
                        library = %registry.library,
                        previous = %previous,
                        icon = %name,
                        "icon names differ only by case; later name wins"
                    );
                }
            }
            let loaded = LoadedLibrary {
                registry: registry.clone(),
                by_lower,
            };
            if libraries.insert(key.clone(), loaded).is_some() {
                tracing::warn!(library = %registry.library, "icon library loaded twice; later registry wins");
            } else {
                load_order.push(registry.library.clone());
            }
        }

        tracing::debug!(libraries = libraries.len(), "icon resolver ready");
        Self {
            libraries,
            load_order,
            max_suggestions: config.max_icon_suggestions,
        }
    }

    pub fn library_names(&self) -> &[String] {
        &self.load_order
    }

    pub fn resolve(&self, reference: &str) -> IconResolveResult {
        let parsed = match IconRef::parse(reference) {
            Ok(parsed) => parsed,
            Err(e) => {
                let (library, icon) = reference.split_once(':').unwrap_or(("", reference));
                return IconResolveResult::failure(
                    library.trim(),
                    icon.trim(),
                    format!("Invalid icon reference \"{}\": {}", reference, e),
                );
            }
        };

        let Some(loaded) = self.libraries.get(&parsed.library.to_lowercase()) else {
            let error = if self.load_order.is_empty() {
                format!(
                    "Icon library \"{}\" is not loaded (no icon libraries loaded)",
                    parsed.library
                )
            } else {
                format!(
                    "Icon library \"{}\" is not loaded. Loaded libraries: {}",
                    parsed.library,
                    self.load_order.join(", ")
                )
            };
            return IconResolveResult::failure(&parsed.library, &parsed.icon, error);
        };

        let display_name = Some(loaded.registry.figma_library_name.clone())
            .filter(|name| !name.is_empty());
        let query = parsed.icon.to_lowercase();

        if let Some(original) = loaded.by_lower.get(&query) {
            return IconResolveResult {
                component_key: loaded.registry.icons.get(original).cloned(),
                library: loaded.registry.library.clone(),
                icon_name: original.clone(),
                library_display_name: display_name,
                error: None,
            };
        }

        let suggestions = self.similar_icons(loaded, &query);
        let error = if suggestions.is_empty() {
            format!(
                "Icon \"{}\" not found in library \"{}\"",
                parsed.icon, loaded.registry.library
            )
        } else {
            format!(
                "Icon \"{}\" not found in library \"{}\". Did you mean: {}?",
                parsed.icon,
                loaded.registry.library,
                suggestions.join(", ")
            )
        };

        IconResolveResult {
            library_display_name: display_name,
            ..IconResolveResult::failure(&loaded.registry.library, &parsed.icon, error)
        }
    }

    /// Names containing the query or contained in it, closest length first
    fn similar_icons(&self, loaded: &LoadedLibrary, query: &str) -> Vec<String> {
        let mut candidates: Vec<&String> = loaded
            .by_lower
            .iter()
            .filter(|(lower, _)| lower.contains(query) || query.contains(lower.as_str()))
            .map(|(_, original)| original)
            .collect();

        // name tiebreak keeps the HashMap iteration order out of the result
        candidates.sort_by(|a, b| {
            a.len()
                .abs_diff(query.len())
                .cmp(&b.len().abs_diff(query.len()))
                .then_with(|| a.cmp(b))
        });

        candidates
            .into_iter()
            .take(self.max_suggestions)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lucide() -> IconRegistry {
        let icons: BTreeMap<String, String> = [
            ("search", "key-search"),
            ("search-x", "key-search-x"),
            ("ArrowRight", "key-arrow-right"),
            ("x", "key-x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        IconRegistry {
            library: "lucide".to_string(),
            figma_library_name: "Lucide Icons".to_string(),
            icons,
            file_key: None,
            extracted_at: None,
        }
    }

    #[test]
    fn test_case_variant_icon_names_later_wins() {
        let mut registry = lucide();
        registry.icons.insert("Search".to_string(), "key-search-upper".to_string());
        let resolver = IconResolver::new(&[registry]);

        // keys load in sorted order, so "search" follows "Search"
        let result = resolver.resolve("lucide:SEARCH");
        assert_eq!(result.component_key.as_deref(), Some("key-search"));
        assert_eq!(result.icon_name, "search");
    }

    #[test]
    fn test_parse_valid() {
        let r = IconRef::parse(" lucide : search ").unwrap();
        assert_eq!(r.library, "lucide");
        assert_eq!(r.icon, "search");
        assert_eq!(r.to_string(), "lucide:search");
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let r = IconRef::parse("lib:a:b").unwrap();
        assert_eq!(r.library, "lib");
        assert_eq!(r.icon, "a:b");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(IconRef::parse("search"), Err(IconRefError::MissingSeparator));
        assert_eq!(IconRef::parse(":search"), Err(IconRefError::EmptyLibrary));
        assert_eq!(IconRef::parse("lucide:"), Err(IconRefError::EmptyIcon));
        assert_eq!(IconRef::parse("  :  "), Err(IconRefError::EmptyLibrary));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let resolver = IconResolver::new(&[lucide()]);
        let result = resolver.resolve("Lucide:arrowright");
        assert_eq!(result.component_key.as_deref(), Some("key-arrow-right"));
        assert_eq!(result.icon_name, "ArrowRight");
        assert_eq!(result.library_display_name.as_deref(), Some("Lucide Icons"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_resolve_suggests_similar() {
        let resolver = IconResolver::new(&[lucide()]);
        let result = resolver.resolve("lucide:sear");
        assert!(!result.is_resolved());
        let error = result.error.unwrap();
        assert!(error.contains("sear"));
        assert!(error.contains("search"));
        // "search" (diff 2) ranks before "search-x" (diff 4)
        let search_at = error.find("search,").or_else(|| error.find("search?")).unwrap();
        assert!(search_at < error.find("search-x").unwrap());
    }

    #[test]
    fn test_resolve_unknown_library_lists_loaded() {
        let resolver = IconResolver::new(&[lucide()]);
        let result = resolver.resolve("material:home");
        let error = result.error.unwrap();
        assert!(error.contains("material"));
        assert!(error.contains("lucide"));
    }

    #[test]
    fn test_resolve_malformed_reference() {
        let resolver = IconResolver::new(&[lucide()]);
        let result = resolver.resolve("lucide");
        assert!(result.error.unwrap().contains("Invalid icon reference"));
    }

    #[test]
    fn test_suggestions_capped() {
        let config = ResolverConfig {
            max_icon_suggestions: 1,
            ..ResolverConfig::default()
        };
        let resolver = IconResolver::with_config(&[lucide()], &config);
        let error = resolver.resolve("lucide:searc").error.unwrap();
        assert!(error.contains("Did you mean: search?"));
    }
}
