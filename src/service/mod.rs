//! Per-service adapters as seen by the orchestrator.
//!
//! This module provides the [`ServiceSwitcher`] trait every adapter implements,
//! the [`SwitchContext`] passed to each call, and the [`SwitcherRegistry`]
//! holding adapters by service name.
//!
//! # Example
//!
//! ```ignore
//! use envswitch::service::{ServiceSwitcher, SwitchContext};
//!
//! async fn snapshot(switcher: &dyn ServiceSwitcher) {
//!     let state = switcher.current_state(&SwitchContext::background()).await;
//!     println!("{} is at {:?}", switcher.name(), state);
//! }
//! ```

mod context;
mod registry;
mod types;

pub use context::*;
pub use registry::*;
pub use types::*;
