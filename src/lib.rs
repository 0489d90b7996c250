//! HTTP route table.
//!
//! Routes map HTTP methods and path templates (`/user/{id}`) to handlers.
//! Groups share a path prefix, handler namespace, name prefix and
//! middleware. The router dispatches on first match and generates URLs
//! from route names.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::schema::RouteTableConfig;
pub use routing::{RouteCollection, RouteError, Router};
