#![allow(unused_assignments)]

//! # envswitch
//!
//! A dependency-ordered switching engine for development environments: move a
//! set of services (cloud accounts, container runtimes, cluster contexts, SSH
//! profiles) to a new target state as one logical operation.
//!
//! ## Features
//!
//! - **Dependency Resolution**: `"from -> to"` constraints become parallel-safe levels, with cycle detection
//! - **Parallel Levels**: Services within a level can switch concurrently
//! - **Rollback**: Prior state is captured before each switch and restored on failure
//! - **Hooks**: Pre/post shell hooks behind a static command gate, each with its own timeout
//! - **Progress Reporting**: An observer callback after every completed level
//! - **Cancellation Support**: Timeouts and `CancellationToken` propagate into every adapter call
//!
//! ## Quick Start
//!
//! ```no_run
//! use envswitch::{EnvironmentSwitcher, Parser, SwitchOptions};
//!
//! # async fn example() -> Result<(), envswitch::Error> {
//! let parser = Parser::new();
//! let env = parser.load_environment(parser.find_environment_file("staging")?)?;
//!
//! let switcher = EnvironmentSwitcher::new();
//! // switcher.register(MyKubernetesSwitcher::default()).await;
//!
//! let options = SwitchOptions::default()
//!     .with_parallel(true)
//!     .with_rollback_on_error(true);
//! let result = switcher.switch_environment(&env, &options).await?;
//! println!("switched {:?} in {:?}", result.switched_services, result.duration);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! - Levels run strictly in order; a failed level stops every later level
//! - Within a parallel level all services run to completion before failures are evaluated
//! - Registration waits for in-flight switches (the registry is read-locked during a switch)
//! - The hook gate is a heuristic filter, not a security boundary: hooks still run through a shell

pub mod config;
pub mod dependency;
pub mod error;
pub mod hooks;
pub mod orchestrator;
pub mod service;

// Re-export commonly used types
pub use config::{Environment, Hook, HookErrorPolicy, Parser, ServiceConfig, ServiceKind, ServiceTarget};
pub use dependency::{DependencyResolver, ServiceGroup};
pub use error::{Error, Result};
pub use hooks::validate_hook_command;
pub use orchestrator::{EnvironmentSwitcher, SwitchOptions, SwitchProgress, SwitchResult};
pub use service::{ServiceState, ServiceSwitcher, SwitchContext};
