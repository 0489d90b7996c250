//! Configuration schema definitions.
//!
//! This module defines the route table file format. All types derive Serde
//! traits for deserialization from TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for a route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteTableConfig {
    /// Prepended to generated URLs (e.g., "http://localhost").
    pub base_url: String,

    /// Namespace prepended to every `Controller@action` handler.
    pub controller_namespace: Option<String>,

    /// Global parameter constraints (placeholder name to regex).
    pub patterns: BTreeMap<String, String>,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Top-level routes, in dispatch order.
    pub routes: Vec<RouteConfig>,

    /// Route groups, registered after top-level routes.
    pub groups: Vec<GroupConfig>,

    /// CRUD resources, registered last.
    pub resources: Vec<ResourceConfig>,
}

impl Default for RouteTableConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            controller_namespace: None,
            patterns: BTreeMap::new(),
            observability: ObservabilityConfig::default(),
            routes: Vec::new(),
            groups: Vec::new(),
            resources: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP methods: `"GET|POST"` or `["GET", "POST"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MethodsConfig {
    One(String),
    Many(Vec<String>),
}

impl MethodsConfig {
    /// Individual method tokens as written (pipes split, case kept).
    pub fn tokens(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            MethodsConfig::One(methods) => vec![methods.as_str()],
            MethodsConfig::Many(methods) => methods.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .flat_map(|m| m.split('|'))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect()
    }
}

/// A single route definition.
///
/// Required fields are optional here so validation can report every
/// missing one instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    pub methods: Option<MethodsConfig>,

    /// Path template (e.g., "/user/{id}").
    pub path: Option<String>,

    /// `Controller@action` reference.
    pub handler: Option<String>,

    /// Unique route name, composed under any group name prefix.
    pub name: Option<String>,

    /// Per-route constraints, overriding global patterns.
    #[serde(rename = "where")]
    pub constraints: BTreeMap<String, String>,

    pub middleware: Vec<String>,
}

/// A route group; groups nest.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub middleware: Vec<String>,
    pub routes: Vec<RouteConfig>,
    pub groups: Vec<GroupConfig>,
    pub resources: Vec<ResourceConfig>,
}

/// A controller exposed through the CRUD route set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    pub path: String,
    pub controller: String,
}
