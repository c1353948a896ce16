//! Environment configuration.
//!
//! - `environment` - [`Environment`], [`Hook`] and [`HookErrorPolicy`]
//! - `service` - per-service config variants and [`ServiceKind`]
//! - `duration` - hook timeout strings ("30s", "500ms")
//! - `parser` - YAML loading and environment file discovery

mod duration;
mod environment;
mod parser;
mod service;

pub use duration::*;
pub use environment::*;
pub use parser::*;
pub use service::*;
