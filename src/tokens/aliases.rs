//! Alias Generation
//!
//! The same variable or style is authored under many naming schemes:
//! slash paths, dot paths, with or without the collection prefix, with or
//! without a category root. Instead of choosing one canonical spelling we
//! index every plausible spelling.
//!
//! All aliases are lowercase. Output is deduplicated and keeps generation
//! order, so the first alias is always the bare name.

use std::collections::HashSet;

/// Category roots stripped from style names (`typography/body` -> `body`)
pub const STYLE_CATEGORY_PREFIXES: [&str; 10] = [
    "typography/",
    "typography.",
    "text/",
    "text.",
    "font/",
    "font.",
    "effects/",
    "effects.",
    "shadow/",
    "shadow.",
];

/// Ordered set of alias strings
#[derive(Default)]
struct AliasSet {
    seen: HashSet<String>,
    aliases: Vec<String>,
}

impl AliasSet {
    fn push(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if alias.is_empty() {
            return;
        }
        if self.seen.insert(alias.clone()) {
            self.aliases.push(alias);
        }
    }

    /// `name`, `prefix/name` and `prefix.name`
    fn push_prefixed(&mut self, prefix: &str, name: &str) {
        self.push(format!("{}/{}", prefix, name));
        self.push(format!("{}.{}", prefix, name));
    }

    fn into_vec(self) -> Vec<String> {
        self.aliases
    }
}

fn dots_to_slashes(s: &str) -> String {
    s.replace('.', "/")
}

fn slashes_to_dots(s: &str) -> String {
    s.replace('/', ".")
}

/// Aliases for a variable `name` living in `collection`.
///
/// For `sm` in `primitives/spacing` this yields `sm`, `primitives/spacing/sm`,
/// `primitives/spacing.sm`, `spacing/sm`, `spacing.sm` (among others).
pub fn build_variable_aliases(name: &str, collection: &str) -> Vec<String> {
    let name = name.trim().to_lowercase();
    let collection = collection.trim().to_lowercase();
    let mut set = AliasSet::default();

    let slash = dots_to_slashes(&name);
    let dot = slashes_to_dots(&name);
    let forms = [name.as_str(), slash.as_str(), dot.as_str()];

    for form in forms {
        set.push(form);
        if !collection.is_empty() {
            set.push_prefixed(&collection, form);
        }
    }

    // primitives/spacing -> spacing
    if let Some((_, last)) = collection.rsplit_once('/') {
        if !last.is_empty() {
            for form in forms {
                set.push_prefixed(last, form);
            }
        }
    }

    // name already carries its collection: spacing/sm in spacing
    if !collection.is_empty() {
        let stripped = name
            .strip_prefix(&format!("{}/", collection))
            .or_else(|| name.strip_prefix(&format!("{}.", collection)));
        if let Some(stripped) = stripped {
            set.push(stripped);
            set.push(dots_to_slashes(stripped));
            set.push(slashes_to_dots(stripped));
        }
    }

    set.into_vec()
}

/// Aliases for a text or effect style `name`
pub fn build_style_aliases(name: &str) -> Vec<String> {
    let name = name.trim().to_lowercase();
    let mut set = AliasSet::default();

    set.push(name.as_str());
    set.push(dots_to_slashes(&name));
    set.push(slashes_to_dots(&name));
    set.push(capitalize_first(&name));

    for prefix in STYLE_CATEGORY_PREFIXES {
        if let Some(stripped) = name.strip_prefix(prefix) {
            set.push(stripped);
            set.push(dots_to_slashes(stripped));
            set.push(slashes_to_dots(stripped));
        }
    }

    set.into_vec()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Last path segment after splitting on `.` or `/`
pub fn final_segment(path: &str) -> &str {
    path.rsplit(['.', '/']).next().unwrap_or(path)
}

/// Whether a path has more than one segment
pub fn is_multi_segment(path: &str) -> bool {
    path.contains(['.', '/'])
}
