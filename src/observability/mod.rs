//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing (registration, group scopes, dispatch)
//!     → tracing events with key/value fields
//!     → logging.rs subscriber (installed by the binary)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted messages
//! - Registration logs at debug, per-route dispatch attempts at trace

pub mod logging;

pub use logging::init_logging;
