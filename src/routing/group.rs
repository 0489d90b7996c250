//! Route groups.
//!
//! # Responsibilities
//! - Carry the shared prefix, namespace, name prefix and middleware of a scope
//! - Compose nested scopes (inner options merge over outer ones)
//! - Report the routes a group contributed to the shared collection
//!
//! # Design Decisions
//! - A group must carry a namespace or name prefix; routes record both as
//!   options
//! - Membership is the registry range filled while the callback ran, so
//!   nested groups count and sibling groups with similar names do not
//! - Prefixes join with `/`, namespaces with `\`, name prefixes concatenate

use std::ops::Range;

use crate::routing::collection::RouteCollection;
use crate::routing::pattern::trim_slashes;
use crate::routing::route::Route;
use crate::routing::types::NAMESPACE_SEPARATOR;

/// Options applied to every route registered inside a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOptions {
    /// Path segment prepended to route paths.
    pub prefix: Option<String>,
    /// Prepended to `Controller@action` handler references.
    pub namespace: Option<String>,
    /// Prepended to route names.
    pub name: Option<String>,
    /// Middleware attached to each route.
    pub middleware: Vec<String>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        push_unique(&mut self.middleware, middleware.into());
        self
    }

    pub fn middleware_many<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for m in middleware {
            push_unique(&mut self.middleware, m.into());
        }
        self
    }

    /// True if the options can identify the group's routes afterwards.
    pub fn is_distinguishing(&self) -> bool {
        non_empty(&self.namespace).is_some() || non_empty(&self.name).is_some()
    }

    /// Effective options of a scope opened inside `outer`.
    pub fn merge_over(&self, outer: &GroupOptions) -> GroupOptions {
        let prefix = match (non_empty(&outer.prefix), non_empty(&self.prefix)) {
            (Some(outer), Some(inner)) => {
                Some(format!("{}/{}", trim_slashes(outer), trim_slashes(inner)))
            }
            (outer, inner) => inner.or(outer).map(str::to_string),
        };

        let namespace = match (non_empty(&outer.namespace), non_empty(&self.namespace)) {
            (Some(outer), Some(inner)) => Some(format!(
                "{}{}{}",
                outer.trim_end_matches(NAMESPACE_SEPARATOR),
                NAMESPACE_SEPARATOR,
                inner
            )),
            (outer, inner) => inner.or(outer).map(str::to_string),
        };

        let name = match (non_empty(&outer.name), non_empty(&self.name)) {
            (Some(outer), Some(inner)) => Some(format!("{}{}", outer, inner)),
            (outer, inner) => inner.or(outer).map(str::to_string),
        };

        let mut middleware = outer.middleware.clone();
        for m in &self.middleware {
            push_unique(&mut middleware, m.clone());
        }

        GroupOptions {
            prefix,
            namespace,
            name,
            middleware,
        }
    }

    /// Active prefix, empty when unset.
    pub fn prefix_str(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    /// Active namespace, empty when unset.
    pub fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    /// Active name prefix, empty when unset.
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// A registered group and the routes it contributed.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    options: GroupOptions,
    routes: Vec<usize>,
}

impl RouteGroup {
    /// A group owning the registry positions in `registered`.
    pub(crate) fn collect(options: GroupOptions, registered: Range<usize>) -> Self {
        Self {
            options,
            routes: registered.collect(),
        }
    }

    /// Effective options of the group scope.
    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    /// Registry positions of the group's routes.
    pub fn route_indices(&self) -> &[usize] {
        &self.routes
    }

    /// The group's routes, in registration order.
    pub fn routes<'c>(&'c self, collection: &'c RouteCollection) -> impl Iterator<Item = &'c Route> + 'c {
        self.routes
            .iter()
            .filter_map(move |index| collection.routes().get(*index))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguishing() {
        assert!(!GroupOptions::new().prefix("admin").is_distinguishing());
        assert!(!GroupOptions::new().namespace("").is_distinguishing());
        assert!(GroupOptions::new().namespace("Admin\\").is_distinguishing());
        assert!(GroupOptions::new().name("admin.").is_distinguishing());
    }

    #[test]
    fn test_merge_over_root() {
        let options = GroupOptions::new()
            .prefix("admin/")
            .namespace("Admin\\")
            .name("admin.")
            .middleware("Auth");
        assert_eq!(options.merge_over(&GroupOptions::default()), options);
    }

    #[test]
    fn test_nested_merge() {
        let outer = GroupOptions::new()
            .prefix("/api/")
            .namespace("Api\\")
            .name("api.")
            .middleware("Auth");
        let inner = GroupOptions::new()
            .prefix("v1")
            .namespace("V1")
            .name("v1.")
            .middleware_many(["Auth", "Throttle"]);

        let merged = inner.merge_over(&outer);
        assert_eq!(merged.prefix_str(), "api/v1");
        assert_eq!(merged.namespace_str(), "Api\\V1");
        assert_eq!(merged.name_str(), "api.v1.");
        assert_eq!(merged.middleware, vec!["Auth", "Throttle"]);
    }

    #[test]
    fn test_inner_inherits_unset_options() {
        let outer = GroupOptions::new().prefix("admin").namespace("Admin");
        let inner = GroupOptions::new().name("reports.");

        let merged = inner.merge_over(&outer);
        assert_eq!(merged.prefix_str(), "admin");
        assert_eq!(merged.namespace_str(), "Admin");
        assert_eq!(merged.name_str(), "reports.");
    }
}
