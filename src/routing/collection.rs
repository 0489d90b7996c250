//! Route registration.
//!
//! # Responsibilities
//! - Own the ordered route registry and its name index
//! - Compose active group options with per-route arguments
//! - Apply global parameter patterns and group middleware to new routes
//! - Run group callbacks inside a scoped option set
//!
//! # Design Decisions
//! - Registration order is dispatch order; nothing is re-sorted
//! - Names are checked against this collection only
//! - Builders borrow the collection, so fluent configuration happens before
//!   the collection is handed to a router or matcher

use std::collections::BTreeMap;

use serde_json::Value;

use crate::routing::group::{GroupOptions, RouteGroup};
use crate::routing::names::NameRegistry;
use crate::routing::pattern;
use crate::routing::resource::Resource;
use crate::routing::route::{Route, ALPHA_NUMERIC, ANYTHING, DIGITAL, NUMBER, SLUG, WORD};
use crate::routing::types::{
    Handler, IntoMethods, RouteError, RouteResult, OPTION_NAMESPACE, OPTION_NAME_PREFIX,
    OPTION_PREFIX,
};

/// Raw route arguments, validated by [`RouteCollection::make_route`].
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    pub methods: Option<Vec<String>>,
    pub path: Option<String>,
    pub handler: Option<Handler>,
    pub name: Option<String>,
}

impl RouteSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods(mut self, methods: impl IntoMethods) -> Self {
        self.methods = Some(methods.into_methods());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn handler(mut self, handler: impl Into<Handler>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Ordered route registry with group-aware registration.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
    names: NameRegistry,
    groups: Vec<RouteGroup>,
    /// Global constraints as raw regex fragments.
    patterns: Vec<(String, String)>,
    controller_namespace: Option<String>,
    base: GroupOptions,
    scopes: Vec<GroupOptions>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace prepended to every `Controller@action` handler.
    pub fn set_controller_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.controller_namespace = Some(namespace.into());
        self
    }

    pub fn controller_namespace(&self) -> Option<&str> {
        self.controller_namespace.as_deref()
    }

    /// All routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Groups registered so far, in the order their callbacks finished.
    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    pub fn global_patterns(&self) -> &[(String, String)] {
        &self.patterns
    }

    /// Options of the innermost open scope.
    pub fn active_options(&self) -> &GroupOptions {
        self.scopes.last().unwrap_or(&self.base)
    }

    fn active_options_mut(&mut self) -> &mut GroupOptions {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.base,
        }
    }

    /// Route registered under `name`.
    pub fn named_route(&self, name: &str) -> Option<&Route> {
        self.names.get(name).and_then(|index| self.routes.get(index))
    }

    pub fn has_named_route(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Index of every route with a non-empty name.
    pub fn named_routes(&self) -> BTreeMap<&str, &Route> {
        self.routes
            .iter()
            .filter_map(|route| {
                route
                    .name()
                    .filter(|name| !name.is_empty())
                    .map(|name| (name, route))
            })
            .collect()
    }

    /// Add a global constraint for routes built from now on.
    pub fn pattern(&mut self, name: impl Into<String>, regex: impl Into<String>) -> &mut Self {
        let name = name.into();
        let regex = regex.into();
        match self.patterns.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = regex,
            None => self.patterns.push((name, regex)),
        }
        self
    }

    /// Add several global constraints.
    pub fn patterns<I, K, V>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, regex) in patterns {
            self.pattern(name, regex);
        }
        self
    }

    /// Set the path prefix of the active scope.
    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.active_options_mut().prefix = Some(prefix.into());
        self
    }

    /// Set the handler namespace of the active scope.
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.active_options_mut().namespace = Some(namespace.into());
        self
    }

    /// Add middleware to the active scope.
    pub fn middleware(&mut self, middleware: impl Into<String>) -> &mut Self {
        let middleware = middleware.into();
        let scope = self.active_options_mut();
        if !scope.middleware.contains(&middleware) {
            scope.middleware.push(middleware);
        }
        self
    }

    /// Set the name prefix of the active scope.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.active_options_mut().name = Some(name.into());
        self
    }

    /// Register a route and return a builder for further configuration.
    pub fn map(
        &mut self,
        methods: impl IntoMethods,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        let methods = methods.into_methods();
        let path = self.resolve_path(path);
        if methods.is_empty() {
            return Err(RouteError::EmptyMethods(path));
        }
        if let Some(duplicate) = pattern::duplicate_placeholder(&path) {
            return Err(RouteError::DuplicatePlaceholder {
                name: duplicate.to_string(),
                path,
            });
        }

        let handler = self.resolve_handler(handler.into());
        let scope = self.active_options().clone();
        let index = self.routes.len();

        let mut route = Route::new(methods, path, handler);
        route
            .where_params(self.patterns.iter().map(|(n, r)| (n, r)))
            .middleware_many(scope.middleware.iter().cloned())
            .add_options([
                (OPTION_PREFIX, scope.prefix_str()),
                (OPTION_NAMESPACE, scope.namespace_str()),
                (OPTION_NAME_PREFIX, scope.name_str()),
            ]);
        route.regex()?;

        if let Some(name) = name {
            let name = format!("{}{}", scope.name_str(), name);
            self.names.claim(&name, index)?;
            route.set_name(name);
        }

        tracing::debug!(
            methods = ?route.methods(),
            path = %route.path(),
            name = route.name().unwrap_or_default(),
            handler = %route.handler(),
            "Route registered"
        );

        self.routes.push(route);
        Ok(RouteBuilder {
            route: &mut self.routes[index],
            index,
            names: &mut self.names,
        })
    }

    pub fn get(
        &mut self,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        self.map("GET", path, handler, name)
    }

    pub fn post(
        &mut self,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        self.map("POST", path, handler, name)
    }

    pub fn put(
        &mut self,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        self.map("PUT", path, handler, name)
    }

    pub fn patch(
        &mut self,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        self.map("PATCH", path, handler, name)
    }

    pub fn delete(
        &mut self,
        path: &str,
        handler: impl Into<Handler>,
        name: Option<&str>,
    ) -> RouteResult<RouteBuilder<'_>> {
        self.map("DELETE", path, handler, name)
    }

    /// Register a route from raw arguments.
    ///
    /// Fails with [`RouteError::MissingArgument`] when methods, path or
    /// handler is absent.
    pub fn make_route(&mut self, spec: RouteSpec) -> RouteResult<RouteBuilder<'_>> {
        let methods = spec.methods.ok_or(RouteError::MissingArgument("methods"))?;
        let path = spec.path.ok_or(RouteError::MissingArgument("path"))?;
        let handler = spec.handler.ok_or(RouteError::MissingArgument("callback"))?;
        self.map(methods, &path, handler, spec.name.as_deref())
    }

    /// Register routes inside a scope.
    ///
    /// `options` merge over the active scope for the duration of `routes`;
    /// the previous scope is restored afterwards, also on error. The
    /// returned group lists the routes recorded under its namespace and
    /// name prefix.
    pub fn group<F>(&mut self, options: GroupOptions, routes: F) -> RouteResult<&RouteGroup>
    where
        F: FnOnce(&mut RouteCollection) -> RouteResult<()>,
    {
        if !options.is_distinguishing() {
            return Err(RouteError::GroupMissingOption);
        }

        let scope = options.merge_over(self.active_options());
        tracing::debug!(
            prefix = scope.prefix_str(),
            namespace = scope.namespace_str(),
            name = scope.name_str(),
            depth = self.scopes.len() + 1,
            "Route group opened"
        );

        let start = self.routes.len();
        self.scopes.push(scope.clone());
        let registered = routes(self);
        self.scopes.pop();
        registered?;

        let group = RouteGroup::collect(scope, start..self.routes.len());
        tracing::debug!(routes = group.len(), "Route group closed");
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// Register the CRUD routes of [`Resource::web`].
    pub fn resource(&mut self, path: &str, controller: impl Into<String>) -> RouteResult<&mut Self> {
        self.add_resource(&Resource::web(path, controller))
    }

    /// Register every route of `resource`.
    pub fn add_resource(&mut self, resource: &Resource) -> RouteResult<&mut Self> {
        resource.map_routes(self)?;
        Ok(self)
    }

    fn resolve_path(&self, path: &str) -> String {
        let prefix = pattern::trim_slashes(self.active_options().prefix_str());
        if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", prefix, path.trim_start_matches('/'))
        }
    }

    fn resolve_handler(&self, handler: Handler) -> Handler {
        if !handler.is_action() {
            return handler;
        }
        let handler = handler.with_namespace(self.active_options().namespace_str());
        match &self.controller_namespace {
            Some(namespace) => handler.with_namespace(namespace),
            None => handler,
        }
    }
}

/// Fluent configuration of a freshly registered route.
#[derive(Debug)]
pub struct RouteBuilder<'c> {
    route: &'c mut Route,
    index: usize,
    names: &'c mut NameRegistry,
}

impl<'c> RouteBuilder<'c> {
    /// Constrain a placeholder; fails if the constraint does not compile.
    pub fn where_param(self, name: &str, regex: &str) -> RouteResult<Self> {
        self.route.try_where_param(name, regex)?;
        Ok(self)
    }

    pub fn where_params<I, K, V>(self, constraints: I) -> RouteResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, regex) in constraints {
            self.route.try_where_param(name.as_ref(), regex.as_ref())?;
        }
        Ok(self)
    }

    pub fn where_number(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, NUMBER)
    }

    pub fn where_digital(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, DIGITAL)
    }

    pub fn where_slug(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, SLUG)
    }

    pub fn where_word(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, WORD)
    }

    pub fn where_alpha_numeric(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, ALPHA_NUMERIC)
    }

    pub fn anything(self, name: &str) -> RouteResult<Self> {
        self.where_param(name, ANYTHING)
    }

    pub fn middleware(self, middleware: impl Into<String>) -> Self {
        self.route.middleware(middleware);
        self
    }

    pub fn middleware_many<I, S>(self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route.middleware_many(middleware);
        self
    }

    pub fn add_options<I, K, V>(self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.route.add_options(options);
        self
    }

    /// Append `suffix` to the route's name (or its group name prefix).
    ///
    /// Fails with [`RouteError::DuplicateName`] if the result is taken.
    pub fn name(self, suffix: &str) -> RouteResult<Self> {
        let base = match self.route.name() {
            Some(name) => name,
            None => self.route.option_str(OPTION_NAME_PREFIX).unwrap_or_default(),
        };
        let name = format!("{}{}", base, suffix);
        self.names.claim(&name, self.index)?;
        if let Some(previous) = self.route.name() {
            self.names.release(previous);
        }
        self.route.set_name(name);
        Ok(self)
    }

    pub fn route(&self) -> &Route {
        self.route
    }

    /// Registry position of the route.
    pub fn index(&self) -> usize {
        self.index
    }
}
