//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check base URL, methods and required route fields
//! - Check that every constraint compiles
//! - Check that groups can be told apart afterwards
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouteTableConfig → Result<(), Vec<ValidationError>>
//! - Runs before a router is built from the config

use std::collections::BTreeMap;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GroupConfig, RouteConfig, RouteTableConfig};
use crate::routing::pattern;
use crate::routing::KNOWN_METHODS;

/// A single semantic problem in a route table config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_url ({url}) is not an absolute URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{location}: missing field ({field})")]
    MissingField {
        location: String,
        field: &'static str,
    },

    #[error("{location}: methods must not be empty")]
    EmptyMethods { location: String },

    #[error("{location}: unknown HTTP method ({method})")]
    UnknownMethod { location: String, method: String },

    #[error("{location}: placeholder ({name}) appears more than once")]
    DuplicatePlaceholder { location: String, name: String },

    #[error("{location}: constraint for ({name}) is not a valid regex: {reason}")]
    InvalidConstraint {
        location: String,
        name: String,
        reason: String,
    },

    #[error("{location}: group requires a namespace or a name")]
    GroupMissingOption { location: String },

    #[error("{location}: {field} must not be empty")]
    EmptyResourceField {
        location: String,
        field: &'static str,
    },
}

/// Validate a route table config, collecting every error.
pub fn validate_config(config: &RouteTableConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(err) = Url::parse(&config.base_url) {
        errors.push(ValidationError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        });
    }

    check_constraints("patterns", &config.patterns, &mut errors);

    for (i, route) in config.routes.iter().enumerate() {
        check_route(&format!("routes[{}]", i), route, &mut errors);
    }
    for (i, group) in config.groups.iter().enumerate() {
        check_group(&format!("groups[{}]", i), group, &mut errors);
    }
    for (i, resource) in config.resources.iter().enumerate() {
        check_resource(&format!("resources[{}]", i), &resource.path, &resource.controller, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(location: &str, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    match &route.methods {
        None => errors.push(ValidationError::MissingField {
            location: location.to_string(),
            field: "methods",
        }),
        Some(methods) => {
            let tokens = methods.tokens();
            if tokens.is_empty() {
                errors.push(ValidationError::EmptyMethods {
                    location: location.to_string(),
                });
            }
            for method in tokens {
                if !KNOWN_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
                    errors.push(ValidationError::UnknownMethod {
                        location: location.to_string(),
                        method: method.to_string(),
                    });
                }
            }
        }
    }

    match &route.path {
        None => errors.push(ValidationError::MissingField {
            location: location.to_string(),
            field: "path",
        }),
        Some(path) => {
            if let Some(name) = pattern::duplicate_placeholder(path) {
                errors.push(ValidationError::DuplicatePlaceholder {
                    location: location.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }

    if route.handler.as_deref().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingField {
            location: location.to_string(),
            field: "handler",
        });
    }

    check_constraints(location, &route.constraints, errors);
}

fn check_group(location: &str, group: &GroupConfig, errors: &mut Vec<ValidationError>) {
    let named = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
    if !named(&group.namespace) && !named(&group.name) {
        errors.push(ValidationError::GroupMissingOption {
            location: location.to_string(),
        });
    }

    for (i, route) in group.routes.iter().enumerate() {
        check_route(&format!("{}.routes[{}]", location, i), route, errors);
    }
    for (i, nested) in group.groups.iter().enumerate() {
        check_group(&format!("{}.groups[{}]", location, i), nested, errors);
    }
    for (i, resource) in group.resources.iter().enumerate() {
        check_resource(
            &format!("{}.resources[{}]", location, i),
            &resource.path,
            &resource.controller,
            errors,
        );
    }
}

fn check_resource(location: &str, path: &str, controller: &str, errors: &mut Vec<ValidationError>) {
    if pattern::trim_slashes(path).is_empty() {
        errors.push(ValidationError::EmptyResourceField {
            location: location.to_string(),
            field: "path",
        });
    }
    if controller.trim().is_empty() {
        errors.push(ValidationError::EmptyResourceField {
            location: location.to_string(),
            field: "controller",
        });
    }
}

fn check_constraints(
    location: &str,
    constraints: &BTreeMap<String, String>,
    errors: &mut Vec<ValidationError>,
) {
    for (name, regex) in constraints {
        if let Err(err) = pattern::check_constraint(name, regex) {
            errors.push(ValidationError::InvalidConstraint {
                location: location.to_string(),
                name: name.clone(),
                reason: err.to_string(),
            });
        }
    }
}
