//! Configuration management for the schema pipeline
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (component-schemas.toml)
//! - Environment variables (COMPONENT_SCHEMAS__*)
//!
//! ## Example config file (component-schemas.toml):
//! ```toml
//! [limits]
//! max_depth = 50
//! max_children = 100
//! max_components = 500
//! max_variants = 100
//!
//! [resolver]
//! suggestion_threshold = 0.6
//! max_available_names = 50
//! max_icon_suggestions = 3
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Main configuration for the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Structural validation limits
    #[serde(default)]
    pub limits: ValidationLimits,

    /// Token and icon resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Resource limits enforced by the structural validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    /// Maximum nesting depth of child nodes
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum children under a single node
    #[serde(default = "default_max_children")]
    pub max_children: usize,

    /// Maximum components + component sets per schema
    #[serde(default = "default_max_components")]
    pub max_components: usize,

    /// Maximum variants per component set
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum similarity for a "did you mean" suggestion (exclusive)
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,

    /// How many known names to report on a miss
    #[serde(default = "default_max_available_names")]
    pub max_available_names: usize,

    /// How many icon names to suggest on a miss
    #[serde(default = "default_max_icon_suggestions")]
    pub max_icon_suggestions: usize,
}

// Default value functions
fn default_max_depth() -> usize {
    50
}

fn default_max_children() -> usize {
    100
}

fn default_max_components() -> usize {
    500
}

fn default_max_variants() -> usize {
    100
}

fn default_suggestion_threshold() -> f64 {
    0.6
}

fn default_max_available_names() -> usize {
    50
}

fn default_max_icon_suggestions() -> usize {
    3
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_children: default_max_children(),
            max_components: default_max_components(),
            max_variants: default_max_variants(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            suggestion_threshold: default_suggestion_threshold(),
            max_available_names: default_max_available_names(),
            max_icon_suggestions: default_max_icon_suggestions(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "component-schemas.toml",
            ".component-schemas.toml",
            "config/component-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "components", "component-schemas") {
            let xdg_config = config_dir.config_dir().join("component-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // COMPONENT_SCHEMAS__LIMITS__MAX_DEPTH=20
        builder = builder.add_source(
            Environment::with_prefix("COMPONENT_SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        for (name, value) in [
            ("limits.max_depth", limits.max_depth),
            ("limits.max_children", limits.max_children),
            ("limits.max_components", limits.max_components),
            ("limits.max_variants", limits.max_variants),
        ] {
            if value == 0 {
                return Err(SchemaError::InvalidConfig(format!("{} must be greater than 0", name)));
            }
        }

        let threshold = self.resolver.suggestion_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(SchemaError::InvalidConfig(format!(
                "resolver.suggestion_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
