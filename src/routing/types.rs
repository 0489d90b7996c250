//! Shared routing types and error definitions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Captured path parameters, keyed by placeholder name.
pub type Params = HashMap<String, String>;

/// Arbitrary per-route metadata.
pub type Options = BTreeMap<String, serde_json::Value>;

/// Option key holding the group prefix active when the route was built.
pub const OPTION_PREFIX: &str = "prefix";
/// Option key holding the group namespace active when the route was built.
pub const OPTION_NAMESPACE: &str = "namespace";
/// Option key holding the group name prefix active when the route was built.
pub const OPTION_NAME_PREFIX: &str = "name_prefix";
/// Diagnostic key: the request method that matched.
pub const OPTION_REQUEST_METHOD: &str = "request_method";
/// Diagnostic key: the compiled pattern that matched.
pub const OPTION_PATTERN: &str = "pattern";
/// Diagnostic key: the resolved request path that matched.
pub const OPTION_PATH: &str = "path";

/// Separator between namespace segments in handler references.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Separator between controller and action in handler references.
pub const ACTION_SEPARATOR: char = '@';

/// HTTP verbs accepted when validating route definitions.
pub const KNOWN_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "CONNECT", "TRACE",
];

/// Errors raised while building a route table or generating URLs.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A raw route definition lacks a required argument.
    #[error("argument ({0}) for route must be specified")]
    MissingArgument(&'static str),

    /// A route was registered without any HTTP method.
    #[error("route ({0}) must accept at least one method")]
    EmptyMethods(String),

    /// A route name is already taken by another route.
    #[error("route name ({0}) already taken")]
    DuplicateName(String),

    /// A placeholder name appears more than once in one path.
    #[error("placeholder ({name}) appears more than once in path ({path})")]
    DuplicatePlaceholder { path: String, name: String },

    /// A route group has neither a namespace nor a name prefix.
    #[error("route group requires a namespace or a name option")]
    GroupMissingOption,

    /// No route is registered under the given name.
    #[error("invalid route name: {0}")]
    InvalidRouteName(String),

    /// URL generation lacks a value for a required placeholder.
    #[error("missing parameter ({parameter}) for route ({route})")]
    MissingParameter { route: String, parameter: String },

    /// A supplied value does not satisfy the placeholder constraint.
    #[error("value ({value}) for parameter ({parameter}) does not satisfy the constraint of route ({route})")]
    InvalidParameter {
        route: String,
        parameter: String,
        value: String,
    },

    /// The route pattern is not a valid regular expression.
    #[error("invalid pattern for path ({path}): {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Callable handler stored directly on a route.
pub type Callback = Arc<dyn Fn(&Params) -> String + Send + Sync>;

/// What a route dispatches to. Invocation belongs to the dispatcher.
#[derive(Clone)]
pub enum Handler {
    /// A `Controller@action` reference, resolved by the dispatcher.
    Action {
        controller: String,
        action: Option<String>,
    },
    /// A callable invoked with the captured parameters.
    Direct(Callback),
}

impl Handler {
    /// Parse a `Controller@action` reference.
    pub fn action(reference: &str) -> Self {
        match reference.split_once(ACTION_SEPARATOR) {
            Some((controller, action)) => Handler::Action {
                controller: controller.to_string(),
                action: Some(action.to_string()),
            },
            None => Handler::Action {
                controller: reference.to_string(),
                action: None,
            },
        }
    }

    /// Wrap a callable.
    pub fn direct<F>(f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        Handler::Direct(Arc::new(f))
    }

    /// Returns true for `Controller@action` references.
    pub fn is_action(&self) -> bool {
        matches!(self, Handler::Action { .. })
    }

    /// Prefix the controller with a namespace. Callables pass through.
    pub fn with_namespace(self, namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        match self {
            Handler::Action { controller, action } if !namespace.is_empty() => Handler::Action {
                controller: format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, controller),
                action,
            },
            other => other,
        }
    }
}

impl From<&str> for Handler {
    fn from(reference: &str) -> Self {
        Handler::action(reference)
    }
}

impl From<String> for Handler {
    fn from(reference: String) -> Self {
        Handler::action(&reference)
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action {
                controller,
                action: Some(action),
            } => write!(f, "{}{}{}", controller, ACTION_SEPARATOR, action),
            Handler::Action {
                controller,
                action: None,
            } => write!(f, "{}", controller),
            Handler::Direct(_) => write!(f, "<callable>"),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action { controller, action } => f
                .debug_struct("Action")
                .field("controller", controller)
                .field("action", action)
                .finish(),
            Handler::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

/// Conversion into a normalized method list.
///
/// Strings may be pipe-delimited (`"GET|POST"`). Methods are uppercased
/// and deduplicated, keeping first occurrence order.
pub trait IntoMethods {
    fn into_methods(self) -> Vec<String>;
}

fn push_methods(methods: &mut Vec<String>, raw: &str) {
    for method in raw.split('|').map(str::trim).filter(|m| !m.is_empty()) {
        let method = method.to_ascii_uppercase();
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
}

impl IntoMethods for &str {
    fn into_methods(self) -> Vec<String> {
        let mut methods = Vec::new();
        push_methods(&mut methods, self);
        methods
    }
}

impl IntoMethods for String {
    fn into_methods(self) -> Vec<String> {
        self.as_str().into_methods()
    }
}

impl<S: AsRef<str>> IntoMethods for Vec<S> {
    fn into_methods(self) -> Vec<String> {
        self.as_slice().into_methods()
    }
}

impl<S: AsRef<str>> IntoMethods for &[S] {
    fn into_methods(self) -> Vec<String> {
        let mut methods = Vec::new();
        for raw in self {
            push_methods(&mut methods, raw.as_ref());
        }
        methods
    }
}

impl<S: AsRef<str>, const N: usize> IntoMethods for [S; N] {
    fn into_methods(self) -> Vec<String> {
        self.as_slice().into_methods()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        match Handler::action("UserController@show") {
            Handler::Action { controller, action } => {
                assert_eq!(controller, "UserController");
                assert_eq!(action.as_deref(), Some("show"));
            }
            Handler::Direct(_) => panic!("expected action"),
        }

        let invokable = Handler::action("HomeController");
        assert_eq!(invokable.to_string(), "HomeController");
    }

    #[test]
    fn test_namespace_prefixing() {
        let handler = Handler::action("UserController@show").with_namespace("Admin\\");
        assert_eq!(handler.to_string(), "Admin\\UserController@show");

        let handler = Handler::action("UserController@show").with_namespace("");
        assert_eq!(handler.to_string(), "UserController@show");

        let callable = Handler::direct(|_| "Welcome!".to_string()).with_namespace("Admin");
        assert!(!callable.is_action());
    }

    #[test]
    fn test_method_normalization() {
        assert_eq!("get|Post".into_methods(), vec!["GET", "POST"]);
        assert_eq!(["GET", "GET|PUT"].into_methods(), vec!["GET", "PUT"]);
        assert!("".into_methods().is_empty());
        assert!(" | ".into_methods().is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = RouteError::DuplicateName("user.show".into());
        assert_eq!(err.to_string(), "route name (user.show) already taken");

        let err = RouteError::MissingArgument("path");
        assert_eq!(err.to_string(), "argument (path) for route must be specified");
    }
}
