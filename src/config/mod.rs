//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouteTableConfig (validated, immutable)
//!     → Router::from_config (global patterns, routes, groups, resources)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Registration order follows declaration order within each section

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::GroupConfig;
pub use schema::MethodsConfig;
pub use schema::ResourceConfig;
pub use schema::RouteConfig;
pub use schema::RouteTableConfig;
pub use validation::{validate_config, ValidationError};
