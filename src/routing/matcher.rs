//! Request matching.
//!
//! # Responsibilities
//! - Describe an incoming request as a (method, path) pair
//! - Match a request against a single route or an ordered route list
//! - Return the first matching route with its captured parameters
//!
//! # Design Decisions
//! - Method is compared exactly; path matching is case-insensitive
//! - First match wins, in registration order
//! - Query strings and surrounding slashes never affect the outcome

use std::fmt;

use crate::routing::collection::RouteCollection;
use crate::routing::route::{Route, RouteMatch};

/// A request as seen by the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
}

impl Request {
    /// Create a request. The method is compared as given.
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().trim().to_string(),
            path: path.into(),
        }
    }

    /// Parse a `"METHOD /path"` request line.
    ///
    /// A trailing protocol token (`HTTP/1.1`) is ignored. Returns `None`
    /// when either part is missing.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let method = parts.next()?;
        let path = parts.next()?;
        Some(Self::new(method, path))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Anything a request can be matched against.
pub trait Matcher {
    /// Returns the first route accepting the request, with its captures.
    fn find(&self, request: &Request) -> Option<RouteMatch<'_>>;
}

impl Matcher for Route {
    fn find(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.try_match(request.method(), request.path())
    }
}

impl Matcher for [Route] {
    fn find(&self, request: &Request) -> Option<RouteMatch<'_>> {
        for route in self {
            if let Some(matched) = route.find(request) {
                tracing::debug!(
                    request = %request,
                    route = route.label(),
                    handler = %route.handler(),
                    "Route matched"
                );
                return Some(matched);
            }
            tracing::trace!(request = %request, route = route.label(), "Route skipped");
        }
        tracing::debug!(request = %request, "No route matched");
        None
    }
}

impl Matcher for RouteCollection {
    fn find(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.routes().find(request)
    }
}

/// Entry point for matching requests against a collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlMatcher;

impl UrlMatcher {
    /// Scan `collection` in registration order.
    pub fn match_request<'c>(
        collection: &'c RouteCollection,
        request: &Request,
    ) -> Option<RouteMatch<'c>> {
        collection.find(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> RouteCollection {
        let mut routes = RouteCollection::new();
        routes.get("/", "SiteController@index", Some("home")).unwrap();
        routes
            .get("/user/{id}", "UserController@show", Some("user.show"))
            .unwrap()
            .where_number("id")
            .unwrap();
        routes
            .get("/user/{name}", "UserController@byName", Some("user.by_name"))
            .unwrap()
            .where_word("name")
            .unwrap();
        routes
    }

    #[test]
    fn test_request_parse() {
        let request = Request::parse("GET /user/1 HTTP/1.1").unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.path(), "/user/1");
        assert_eq!(request.to_string(), "GET /user/1");

        assert!(Request::parse("GET").is_none());
        assert!(Request::parse("").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let routes = collection();

        let matched = UrlMatcher::match_request(&routes, &Request::new("GET", "/user/5")).unwrap();
        assert_eq!(matched.route().name(), Some("user.show"));

        let matched = UrlMatcher::match_request(&routes, &Request::new("GET", "/user/bob")).unwrap();
        assert_eq!(matched.route().name(), Some("user.by_name"));
        assert_eq!(matched.param("name"), Some("bob"));
    }

    #[test]
    fn test_root_and_miss() {
        let routes = collection();

        let matched = routes.find(&Request::new("GET", "/")).unwrap();
        assert_eq!(matched.route().name(), Some("home"));
        assert!(matched.params().is_empty());

        assert!(routes.find(&Request::new("POST", "/")).is_none());
        assert!(routes.find(&Request::new("GET", "/nowhere/at/all")).is_none());
    }

    #[test]
    fn test_single_route_matcher() {
        let route = Route::new("GET|HEAD", "/ping", "PingController");
        assert!(route.find(&Request::new("HEAD", "/ping")).is_some());
        assert!(route.find(&Request::new("head", "/ping")).is_none());
        assert!(route.find(&Request::new("GET", "/pong")).is_none());
    }
}
