//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     map / get / post / group / resource
//!     → collection.rs (compose prefix, namespace, name, middleware)
//!     → names.rs (claim unique name)
//!     → route.rs (constraints, cached pattern)
//!
//! Incoming Request (method, path):
//!     → router.rs / matcher.rs (scan in registration order)
//!     → route.rs (method check, then pattern match)
//!     → Return: RouteMatch (route + params) or None
//!
//! URL generation:
//!     name + params → router.rs → route.rs (reverse) → base_url/path
//! ```
//!
//! # Design Decisions
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)
//! - Patterns compiled once per route, when it is registered
//! - Name registry belongs to one collection

pub mod collection;
pub mod group;
pub mod matcher;
pub mod names;
pub mod pattern;
pub mod resource;
pub mod route;
pub mod router;
pub mod types;

pub use collection::{RouteBuilder, RouteCollection, RouteSpec};
pub use group::{GroupOptions, RouteGroup};
pub use matcher::{Matcher, Request, UrlMatcher};
pub use resource::Resource;
pub use route::{Route, RouteMatch};
pub use router::Router;
pub use types::{Handler, IntoMethods, Options, Params, RouteError, RouteResult, KNOWN_METHODS};
