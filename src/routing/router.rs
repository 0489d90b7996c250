//! Route lookup, dispatch and URL generation.
//!
//! # Responsibilities
//! - Own a route collection and the base URL of the application
//! - Look up the first route matching a request
//! - Remember the route chosen by the last dispatch
//! - Generate URLs for named routes
//! - Build a route table from configuration
//!
//! # Design Decisions
//! - Registration goes through the collection (`Deref`), so a router can be
//!   filled in place with the same API
//! - Lookups are pure; only `dispatch` records state
//! - Explicit `None` on no match rather than a silent default

use std::ops::{Deref, DerefMut};

use crate::config::schema::{GroupConfig, RouteConfig, RouteTableConfig};
use crate::routing::collection::{RouteCollection, RouteSpec};
use crate::routing::group::GroupOptions;
use crate::routing::matcher::{Request, UrlMatcher};
use crate::routing::route::{Route, RouteMatch};
use crate::routing::types::{Handler, IntoMethods, Params, RouteError, RouteResult};

/// Route table bound to a base URL.
#[derive(Debug, Clone)]
pub struct Router {
    collection: RouteCollection,
    /// Stored without trailing slash.
    base_url: String,
    current: Option<usize>,
}

impl Router {
    /// Create an empty router.
    pub fn new(base_url: &str) -> Self {
        Self::from_collection(RouteCollection::new(), base_url)
    }

    /// Wrap an existing collection.
    pub fn from_collection(collection: RouteCollection, base_url: &str) -> Self {
        Self {
            collection,
            base_url: base_url.trim_end_matches('/').to_string(),
            current: None,
        }
    }

    /// Build a router from a validated configuration.
    ///
    /// Registration order: global patterns, top-level routes, groups (in
    /// declaration order, recursively), resources.
    pub fn from_config(config: &RouteTableConfig) -> RouteResult<Self> {
        let mut router = Router::new(&config.base_url);
        if let Some(namespace) = &config.controller_namespace {
            router.set_controller_namespace(namespace.as_str());
        }
        router.patterns(config.patterns.iter().map(|(n, r)| (n.as_str(), r.as_str())));

        for route in &config.routes {
            register_route(&mut router, route)?;
        }
        for group in &config.groups {
            register_group(&mut router, group)?;
        }
        for resource in &config.resources {
            router.resource(&resource.path, resource.controller.as_str())?;
        }

        tracing::info!(
            base_url = %router.base_url,
            routes = router.len(),
            groups = router.groups().len(),
            "Route table built"
        );
        Ok(router)
    }

    pub fn set_url(&mut self, base_url: &str) -> &mut Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection(&self) -> &RouteCollection {
        &self.collection
    }

    pub fn into_collection(self) -> RouteCollection {
        self.collection
    }

    /// First route accepting `method` and `path`, without recording it.
    pub fn match_route(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        UrlMatcher::match_request(&self.collection, &Request::new(method, path))
    }

    /// Match and record the route as current. A miss clears the current route.
    pub fn dispatch(&mut self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        let matched = UrlMatcher::match_request(&self.collection, &Request::new(method, path));
        self.current = matched.as_ref().and_then(|m| {
            self.collection
                .routes()
                .iter()
                .position(|route| std::ptr::eq(route, m.route()))
        });
        matched
    }

    /// Route chosen by the last successful `dispatch`.
    pub fn current_route(&self) -> Option<&Route> {
        self.current.and_then(|index| self.collection.routes().get(index))
    }

    /// True if a route is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.collection.has_named_route(name)
    }

    /// Route registered under `name`.
    pub fn route(&self, name: &str) -> RouteResult<&Route> {
        self.collection
            .named_route(name)
            .ok_or_else(|| RouteError::InvalidRouteName(name.to_string()))
    }

    /// Absolute URL of the named route, `base_url + "/" + path`.
    ///
    /// ```
    /// use route_table::routing::Router;
    ///
    /// let mut router = Router::new("http://localhost");
    /// router
    ///     .get("/user/{id}", "UserController@show", Some("user.show"))
    ///     .unwrap()
    ///     .where_number("id")
    ///     .unwrap();
    ///
    /// let url = router.generate("user.show", [("id", 7)]).unwrap();
    /// assert_eq!(url, "http://localhost/user/7");
    /// ```
    pub fn generate<I, K, V>(&self, name: &str, params: I) -> RouteResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let route = self.route(name)?;
        let params: Params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        let path = route.reverse(&params)?;
        Ok(format!("{}/{}", self.base_url, path))
    }
}

impl Deref for Router {
    type Target = RouteCollection;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

impl DerefMut for Router {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.collection
    }
}

fn register_route(collection: &mut RouteCollection, route: &RouteConfig) -> RouteResult<()> {
    let spec = RouteSpec {
        methods: route.methods.as_ref().map(|m| m.tokens().into_methods()),
        path: route.path.clone(),
        handler: route.handler.as_deref().map(Handler::from),
        name: route.name.clone(),
    };
    collection
        .make_route(spec)?
        .where_params(&route.constraints)?
        .middleware_many(route.middleware.iter().cloned());
    Ok(())
}

fn register_group(collection: &mut RouteCollection, group: &GroupConfig) -> RouteResult<()> {
    let options = GroupOptions {
        prefix: group.prefix.clone(),
        namespace: group.namespace.clone(),
        name: group.name.clone(),
        middleware: Vec::new(),
    }
    .middleware_many(group.middleware.iter().cloned());

    collection.group(options, |collection| {
        for route in &group.routes {
            register_route(collection, route)?;
        }
        for nested in &group.groups {
            register_group(collection, nested)?;
        }
        for resource in &group.resources {
            collection.resource(&resource.path, resource.controller.as_str())?;
        }
        Ok(())
    })?;
    Ok(())
}
