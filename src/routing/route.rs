//! Route definition and matching.
//!
//! # Responsibilities
//! - Hold one endpoint: methods, path template, handler, name, constraints,
//!   middleware and free-form options
//! - Register per-parameter constraints (`where_*` family)
//! - Match a (method, path) pair and extract named parameters
//! - Substitute parameter values back into the template
//!
//! # Design Decisions
//! - Matching takes `&self` and returns a `RouteMatch` value; a route is
//!   never mutated by dispatch
//! - The compiled pattern is cached and dropped whenever a constraint changes
//! - Method membership is exact; methods are uppercased at construction

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::routing::pattern;
use crate::routing::types::{
    Handler, IntoMethods, Options, Params, RouteError, RouteResult, OPTION_PATH, OPTION_PATTERN,
    OPTION_REQUEST_METHOD,
};

/// Integer segment.
pub const NUMBER: &str = "[0-9]+";
/// Digit segment (`\d`).
pub const DIGITAL: &str = r"\d+";
/// Lowercase slug.
pub const SLUG: &str = r"[a-z\-0-9]+";
/// Word characters.
pub const WORD: &str = r"\w+";
/// Letters, digits, dash and underscore.
pub const ALPHA_NUMERIC: &str = r"[a-z_\-0-9]+";
/// Anything, including slashes.
pub const ANYTHING: &str = ".*";

/// A single routable endpoint.
#[derive(Debug, Clone)]
pub struct Route {
    methods: Vec<String>,
    path: String,
    handler: Handler,
    name: Option<String>,
    /// Wrapped named captures, in the order they were first constrained.
    constraints: Vec<(String, String)>,
    middleware: Vec<String>,
    options: Options,
    compiled: OnceLock<Regex>,
}

impl Route {
    /// Create an unnamed route.
    pub fn new(
        methods: impl IntoMethods,
        path: impl Into<String>,
        handler: impl Into<Handler>,
    ) -> Self {
        Self {
            methods: methods.into_methods(),
            path: path.into(),
            handler: handler.into(),
            name: None,
            constraints: Vec::new(),
            middleware: Vec::new(),
            options: Options::new(),
            compiled: OnceLock::new(),
        }
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Constraint captures keyed by parameter name.
    pub fn constraints(&self) -> &[(String, String)] {
        &self.constraints
    }

    pub fn middlewares(&self) -> &[String] {
        &self.middleware
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// String option, `None` when absent or not a string.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Constrain a placeholder. A later call for the same name replaces it.
    pub fn where_param(&mut self, name: &str, regex: &str) -> &mut Self {
        let capture = pattern::wrap_constraint(name, regex);
        match self.constraints.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = capture,
            None => self.constraints.push((name.to_string(), capture)),
        }
        self.compiled = OnceLock::new();
        self
    }

    /// Like [`Route::where_param`], but a constraint that does not compile
    /// is rejected and leaves the route unchanged.
    pub fn try_where_param(&mut self, name: &str, regex: &str) -> RouteResult<&mut Self> {
        pattern::check_constraint(name, regex).map_err(|source| RouteError::InvalidPattern {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.where_param(name, regex))
    }

    /// Constrain several placeholders at once.
    pub fn where_params<I, K, V>(&mut self, constraints: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, regex) in constraints {
            self.where_param(name.as_ref(), regex.as_ref());
        }
        self
    }

    pub fn where_number(&mut self, name: &str) -> &mut Self {
        self.where_param(name, NUMBER)
    }

    pub fn where_digital(&mut self, name: &str) -> &mut Self {
        self.where_param(name, DIGITAL)
    }

    pub fn where_slug(&mut self, name: &str) -> &mut Self {
        self.where_param(name, SLUG)
    }

    pub fn where_word(&mut self, name: &str) -> &mut Self {
        self.where_param(name, WORD)
    }

    pub fn where_alpha_numeric(&mut self, name: &str) -> &mut Self {
        self.where_param(name, ALPHA_NUMERIC)
    }

    pub fn anything(&mut self, name: &str) -> &mut Self {
        self.where_param(name, ANYTHING)
    }

    /// Attach one middleware reference.
    pub fn middleware(&mut self, middleware: impl Into<String>) -> &mut Self {
        let middleware = middleware.into();
        if !self.middleware.contains(&middleware) {
            self.middleware.push(middleware);
        }
        self
    }

    /// Attach several middleware references, keeping order.
    pub fn middleware_many<I, S>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for m in middleware {
            self.middleware(m);
        }
        self
    }

    /// Merge options; existing keys are overwritten.
    pub fn add_options<I, K, V>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.options
            .extend(options.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Anchored pattern for this route (see [`pattern::generate_pattern`]).
    pub fn generate_pattern(&self) -> String {
        pattern::generate_pattern(&self.path, &self.constraints)
    }

    /// Compiled pattern, built on first use.
    pub fn regex(&self) -> RouteResult<&Regex> {
        if let Some(regex) = self.compiled.get() {
            return Ok(regex);
        }
        let regex =
            pattern::compile(&self.generate_pattern()).map_err(|source| RouteError::InvalidPattern {
                path: self.path.clone(),
                source,
            })?;
        Ok(self.compiled.get_or_init(|| regex))
    }

    /// True if `method` is one of this route's methods.
    pub fn match_methods(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Match a request path (query string and outer slashes ignored).
    ///
    /// Returns the named captures that took part in the match.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let regex = match self.regex() {
            Ok(regex) => regex,
            Err(err) => {
                tracing::warn!(path = %self.path, error = %err, "Route pattern failed to compile");
                return None;
            }
        };

        let captures = regex.captures(pattern::resolve_url(path))?;
        Some(
            regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Match method then path; the path is not examined if the method fails.
    pub fn try_match(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        if !self.match_methods(method) {
            return None;
        }
        let params = self.match_path(path)?;
        Some(RouteMatch {
            route: self,
            params,
            method: method.to_string(),
            path: pattern::resolve_url(path).to_string(),
        })
    }

    /// Fill the template with `params`, without leading slash.
    ///
    /// Optional placeholders without a value are dropped with the literal
    /// character before them, the one the pattern makes optional. Values
    /// must satisfy the placeholder's constraint.
    pub fn reverse(&self, params: &Params) -> RouteResult<String> {
        let mut url = String::new();
        let mut after_literal = false;

        for segment in pattern::segments(pattern::trim_slashes(&self.path)) {
            match segment {
                pattern::Segment::Literal(text) => {
                    url.push_str(text);
                    after_literal = true;
                    continue;
                }
                pattern::Segment::Placeholder { name, optional, .. } => match params.get(name) {
                    Some(value) => {
                        self.check_constraint(name, value)?;
                        url.push_str(value);
                    }
                    None if optional => {
                        if after_literal && self.constraints.iter().any(|(n, _)| n == name) {
                            url.pop();
                        }
                    }
                    None => {
                        return Err(RouteError::MissingParameter {
                            route: self.label().to_string(),
                            parameter: name.to_string(),
                        })
                    }
                },
            }
            after_literal = false;
        }

        Ok(url)
    }

    fn check_constraint(&self, name: &str, value: &str) -> RouteResult<()> {
        let Some((_, capture)) = self.constraints.iter().find(|(n, _)| n == name) else {
            return Ok(());
        };
        let regex = pattern::compile(&format!("^{}$", capture)).map_err(|source| {
            RouteError::InvalidPattern {
                path: self.path.clone(),
                source,
            }
        })?;
        if regex.is_match(value) {
            Ok(())
        } else {
            Err(RouteError::InvalidParameter {
                route: self.label().to_string(),
                parameter: name.to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Name if set, otherwise the path.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

/// Result of a successful match. Borrows the route; owns the captures.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    route: &'r Route,
    params: Params,
    method: String,
    path: String,
}

impl<'r> RouteMatch<'r> {
    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn handler(&self) -> &'r Handler {
        self.route.handler()
    }

    /// Captured parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The request method that matched.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path after query stripping and trimming.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The pattern the path matched against.
    pub fn pattern(&self) -> String {
        self.route.generate_pattern()
    }

    /// Route options plus the match diagnostics.
    pub fn options(&self) -> Options {
        let mut options = self.route.options().clone();
        options.insert(OPTION_REQUEST_METHOD.into(), self.method.clone().into());
        options.insert(OPTION_PATTERN.into(), self.pattern().into());
        options.insert(OPTION_PATH.into(), self.path.clone().into());
        options
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_route() -> Route {
        let mut route = Route::new("GET", "/user/{id}", "UserController@show");
        route.where_number("id");
        route
    }

    #[test]
    fn test_match_extracts_params() {
        let route = user_route();
        let matched = route.try_match("GET", "/user/42").unwrap();
        assert_eq!(matched.param("id"), Some("42"));
        assert_eq!(matched.params().len(), 1);
        assert_eq!(matched.path(), "user/42");

        assert!(route.try_match("GET", "/user/abc").is_none());
    }

    #[test]
    fn test_method_checked_first() {
        let route = user_route();
        assert!(route.try_match("POST", "/user/42").is_none());
        assert!(route.match_path("/user/42").is_some());
        assert!(!route.match_methods("get"));
    }

    #[test]
    fn test_query_and_slashes_ignored() {
        let route = user_route();
        let matched = route.try_match("GET", "//user/7/?tab=posts").unwrap();
        assert_eq!(matched.param("id"), Some("7"));
    }

    #[test]
    fn test_where_replaces_and_recompiles() {
        let mut route = user_route();
        assert!(route.match_path("user/abc").is_none());

        route.where_param("id", "[a-z]+");
        assert_eq!(route.constraints().len(), 1);
        assert!(route.match_path("user/abc").is_some());
        assert!(route.match_path("user/42").is_none());
    }

    #[test]
    fn test_where_variants() {
        let mut route = Route::new("GET", "/{a}/{b}/{c}/{d}/{e}", "C@a");
        route
            .where_digital("a")
            .where_slug("b")
            .where_word("c")
            .where_alpha_numeric("d")
            .anything("e");

        let matched = route.try_match("GET", "/12/my-post/word_1/ab_c-9/x/y/z").unwrap();
        assert_eq!(matched.param("a"), Some("12"));
        assert_eq!(matched.param("b"), Some("my-post"));
        assert_eq!(matched.param("c"), Some("word_1"));
        assert_eq!(matched.param("d"), Some("ab_c-9"));
        assert_eq!(matched.param("e"), Some("x/y/z"));
    }

    #[test]
    fn test_match_options() {
        let mut route = user_route();
        route.add_options([("prefix", "admin")]);

        let matched = route.try_match("GET", "/user/5?x=1").unwrap();
        let options = matched.options();
        assert_eq!(options["request_method"], "GET");
        assert_eq!(options["pattern"], "^user/(?P<id>[0-9]+)$");
        assert_eq!(options["path"], "user/5");
        assert_eq!(options["prefix"], "admin");
        assert!(route.option(OPTION_REQUEST_METHOD).is_none());
    }

    #[test]
    fn test_invalid_constraint_never_matches() {
        let mut route = Route::new("GET", "/files/{name}", "FileController@show");
        route.where_param("name", "[unclosed");
        assert!(route.regex().is_err());
        assert!(route.try_match("GET", "/files/a").is_none());
    }

    #[test]
    fn test_reverse() {
        let route = user_route();
        let params = Params::from([("id".to_string(), "7".to_string())]);
        assert_eq!(route.reverse(&params).unwrap(), "user/7");

        let err = route.reverse(&Params::new()).unwrap_err();
        assert!(matches!(err, RouteError::MissingParameter { parameter, .. } if parameter == "id"));

        let params = Params::from([("id".to_string(), "seven".to_string())]);
        let err = route.reverse(&params).unwrap_err();
        assert!(matches!(err, RouteError::InvalidParameter { value, .. } if value == "seven"));
    }

    #[test]
    fn test_reverse_optional() {
        let mut route = Route::new("GET", "/posts/{page?}", "PostController@index");
        route.where_number("page");
        assert_eq!(route.reverse(&Params::new()).unwrap(), "posts");

        let params = Params::from([("page".to_string(), "2".to_string())]);
        assert_eq!(route.reverse(&params).unwrap(), "posts/2");
    }

    #[test]
    fn test_reverse_optional_after_dot() {
        let mut route = Route::new("GET", "/file.{ext?}", "FileController@show");
        route.where_word("ext");
        assert_eq!(route.reverse(&Params::new()).unwrap(), "file");

        let params = Params::from([("ext".to_string(), "md".to_string())]);
        assert_eq!(route.reverse(&params).unwrap(), "file.md");
        assert!(route.match_path("/file").is_some());
    }

    #[test]
    fn test_reverse_optional_after_placeholder() {
        let mut route = Route::new("GET", "/{lang}{region?}", "HomeController@index");
        route.where_param("lang", "[a-z]{2}").where_param("region", "-[a-z]{2}");

        let params = Params::from([("lang".to_string(), "fr".to_string())]);
        assert_eq!(route.reverse(&params).unwrap(), "fr");
    }

    #[test]
    fn test_try_where_param_rejects_invalid() {
        let mut route = Route::new("GET", "/u/{user-id}", "UserController@show");
        let err = route.try_where_param("user-id", NUMBER).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
        assert!(route.constraints().is_empty());

        assert!(route.try_where_param("id", "[0-9").is_err());
        route.try_where_param("id", NUMBER).unwrap();
        assert_eq!(route.constraints().len(), 1);
    }

    #[test]
    fn test_middleware_dedup() {
        let mut route = user_route();
        route.middleware("Auth").middleware_many(["Auth", "Guard"]);
        assert_eq!(route.middlewares(), ["Auth", "Guard"]);
    }
}
