//! Schema types and structures
//!
//! Typed view of a validated component document. These types are only ever
//! built from JSON that already passed [`crate::validate`], and serialize back
//! to JSON that validates identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A complete (possibly merged) component schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<ComponentDefinition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub component_sets: Vec<ComponentSetDefinition>,
}

impl Schema {
    /// All component and component set ids, components first
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.component_sets.iter().map(|s| s.id.as_str()))
    }

    pub fn definition_count(&self) -> usize {
        self.components.len() + self.component_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definition_count() == 0
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|existing| existing == id)
    }
}

/// Page/canvas organization settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_columns: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
}

/// A single component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub layout: LayoutProps,
    #[serde(flatten)]
    pub style: StyleProps,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildNode>,
}

/// A family of variants sharing one base definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub variant_props: Vec<String>,
    pub base: ComponentBase,
    pub variants: Vec<Variant>,
}

/// Layout, style and children shared by every variant of a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBase {
    pub layout: LayoutProps,
    #[serde(flatten)]
    pub style: StyleProps,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildNode>,
}

/// One member of a component set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub props: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutProps>,
    #[serde(flatten)]
    pub style: StyleProps,
}

impl Variant {
    /// Figma-style variant name: `size=md, state=hover`
    pub fn display_name(&self, variant_props: &[String]) -> String {
        variant_props
            .iter()
            .filter_map(|key| self.props.get(key).map(|v| format!("{}={}", key, v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A node inside a component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "lowercase")]
pub enum ChildNode {
    Frame(FrameNode),
    Text(TextNode),
    Instance(InstanceNode),
    Rectangle(ShapeNode),
    Ellipse(ShapeNode),
}

impl ChildNode {
    pub fn id(&self) -> Option<&str> {
        match self {
            ChildNode::Frame(n) => Some(&n.id),
            ChildNode::Text(n) => Some(&n.id),
            ChildNode::Instance(n) => n.id.as_deref(),
            ChildNode::Rectangle(n) | ChildNode::Ellipse(n) => Some(&n.id),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            ChildNode::Frame(_) => NodeType::Frame,
            ChildNode::Text(_) => NodeType::Text,
            ChildNode::Instance(_) => NodeType::Instance,
            ChildNode::Rectangle(_) => NodeType::Rectangle,
            ChildNode::Ellipse(_) => NodeType::Ellipse,
        }
    }

    /// Nested children (only frames have any)
    pub fn children(&self) -> &[ChildNode] {
        match self {
            ChildNode::Frame(n) => &n.children,
            _ => &[],
        }
    }
}

/// Discriminant of [`ChildNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Frame,
    Text,
    Instance,
    Rectangle,
    Ellipse,
}

impl NodeType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frame" => Some(Self::Frame),
            "text" => Some(Self::Text),
            "instance" => Some(Self::Instance),
            "rectangle" => Some(Self::Rectangle),
            "ellipse" => Some(Self::Ellipse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::Text => "text",
            Self::Instance => "instance",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
        }
    }

    pub const ALL: [NodeType; 5] = [
        NodeType::Frame,
        NodeType::Text,
        NodeType::Instance,
        NodeType::Rectangle,
        NodeType::Ellipse,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutProps>,
    #[serde(flatten)]
    pub style: StyleProps,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style_token: Option<String>,
    #[serde(flatten)]
    pub style: StyleProps,
}

/// Placement of another component, a library component, or an icon.
/// Exactly one of `ref`, `componentKey` and `iconRef` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub variant_props: BTreeMap<String, String>,
}

impl InstanceNode {
    pub fn target(&self) -> Option<InstanceTarget<'_>> {
        if let Some(r) = &self.reference {
            Some(InstanceTarget::Local(r))
        } else if let Some(k) = &self.component_key {
            Some(InstanceTarget::Library(k))
        } else {
            self.icon_ref.as_deref().map(InstanceTarget::Icon)
        }
    }
}

/// What an instance points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceTarget<'a> {
    /// Component or component set defined in this schema
    Local(&'a str),
    /// Published library component key
    Library(&'a str),
    /// `library:icon` reference
    Icon(&'a str),
}

/// Rectangle or ellipse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<SizeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<SizeValue>,
    #[serde(flatten)]
    pub style: StyleProps,
}

/// Auto-layout properties. Raw values and their `*Token` twins are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<LayoutDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<SizeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<SizeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_axis_align: Option<AxisAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_axis_align: Option<AxisAlign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    Horizontal,
    Vertical,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisAlign {
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Fixed size in pixels, or a sizing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Fixed(f64),
    Mode(SizeMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    Fill,
    Hug,
}

/// Visual style properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity_token: Option<String>,
}

// =============================================================================
// Icon Registry
// =============================================================================

/// Mapping of icon names to opaque component keys within one library namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconRegistry {
    /// Namespace used in `library:icon` references
    pub library: String,
    /// Display name of the published library
    #[serde(default, deserialize_with = "null_as_default")]
    pub figma_library_name: String,
    pub icons: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<String>,
}

impl IconRegistry {
    /// The extraction stamp, when present and RFC 3339
    pub fn extracted_at_utc(&self) -> Option<DateTime<Utc>> {
        self.extracted_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }
}

/// `null` reads as the field's default, same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_collections_read_as_empty() {
        let schema: Schema = serde_json::from_value(json!({
            "components": [{
                "id": "card",
                "name": "Card",
                "layout": {},
                "tags": null,
                "children": [
                    {"nodeType": "frame", "id": "body", "children": null},
                    {"nodeType": "instance", "ref": "button", "variantProps": null},
                ],
            }],
            "componentSets": null,
        }))
        .unwrap();
        let card = &schema.components[0];
        assert!(card.tags.is_empty());
        assert!(card.children[0].children().is_empty());
        match &card.children[1] {
            ChildNode::Instance(inst) => assert!(inst.variant_props.is_empty()),
            other => panic!("Expected Instance, got {:?}", other),
        }
        assert!(schema.component_sets.is_empty());

        let empty: Schema = serde_json::from_value(json!({"components": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_child_node_tagging() {
        let node: ChildNode = serde_json::from_value(json!({
            "nodeType": "instance",
            "ref": "button",
        }))
        .unwrap();
        match &node {
            ChildNode::Instance(inst) => {
                assert_eq!(inst.target(), Some(InstanceTarget::Local("button")));
            }
            other => panic!("Expected Instance, got {:?}", other),
        }
        assert_eq!(node.id(), None);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({"nodeType": "instance", "ref": "button"}));
    }

    #[test]
    fn test_size_value_untagged() {
        let fixed: SizeValue = serde_json::from_value(json!(120)).unwrap();
        assert_eq!(fixed, SizeValue::Fixed(120.0));
        let fill: SizeValue = serde_json::from_value(json!("fill")).unwrap();
        assert_eq!(fill, SizeValue::Mode(SizeMode::Fill));
    }

    #[test]
    fn test_flattened_style_roundtrip() {
        let component: ComponentDefinition = serde_json::from_value(json!({
            "id": "card",
            "name": "Card",
            "layout": {"direction": "vertical", "paddingToken": "spacing.md"},
            "fillToken": "color.surface",
            "opacity": 0.5,
        }))
        .unwrap();
        assert_eq!(component.style.fill_token.as_deref(), Some("color.surface"));
        assert_eq!(component.layout.padding_token.as_deref(), Some("spacing.md"));

        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["fillToken"], "color.surface");
        assert!(value.get("children").is_none());
    }

    #[test]
    fn test_variant_display_name_follows_prop_order() {
        let variant: Variant = serde_json::from_value(json!({
            "props": {"state": "hover", "size": "md"}
        }))
        .unwrap();
        let order = vec!["size".to_string(), "state".to_string()];
        assert_eq!(variant.display_name(&order), "size=md, state=hover");
    }

    #[test]
    fn test_registry_extracted_at() {
        let registry: IconRegistry = serde_json::from_value(json!({
            "library": "lucide",
            "figmaLibraryName": "Lucide Icons",
            "icons": {"search": "abc123"},
            "extractedAt": "2024-05-01T12:00:00Z",
        }))
        .unwrap();
        assert!(registry.extracted_at_utc().is_some());
        assert_eq!(registry.icon_count(), 1);
    }
}
