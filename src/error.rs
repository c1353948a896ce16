// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use crate::hooks::HookRejection;
use crate::orchestrator::SwitchResult;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Invalid environment: {0}")]
    #[diagnostic(
        code(envswitch::environment::validation),
        help("Run `envswitch validate` for detailed validation errors")
    )]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Environment not found: {0}")]
    #[diagnostic(
        code(envswitch::environment::not_found),
        help("List known environments with `envswitch list` or pass --from-file")
    )]
    EnvironmentNotFound(String),

    #[error("Invalid dependency format: {0} (expected format: 'service1 -> service2')")]
    #[diagnostic(code(envswitch::dependency::format))]
    InvalidDependency(String),

    #[error("Dependency source service '{0}' not found")]
    #[diagnostic(
        code(envswitch::dependency::unknown_source),
        help("Every dependency endpoint must name a service configured in the environment")
    )]
    DependencySourceNotFound(String),

    #[error("Dependency target service '{0}' not found")]
    #[diagnostic(
        code(envswitch::dependency::unknown_target),
        help("Every dependency endpoint must name a service configured in the environment")
    )]
    DependencyTargetNotFound(String),

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    #[diagnostic(
        code(envswitch::dependency::circular),
        help("Services cannot depend on each other in a cycle. Review the dependencies list")
    )]
    CircularDependency(Vec<String>),

    #[error("Hook '{hook}' rejected: {reason}")]
    #[diagnostic(
        code(envswitch::hook::rejected),
        help("Hooks may only contain plain commands: no chaining, substitution, pipes into shells or privileged execution")
    )]
    HookRejected {
        hook: String,
        #[source]
        reason: HookRejection,
    },

    #[error("Hook '{hook}' failed: {reason}")]
    #[diagnostic(code(envswitch::hook::failed))]
    HookFailed { hook: String, reason: String },

    #[error("Hook '{hook}' exceeded timeout of {timeout_ms}ms")]
    #[diagnostic(
        code(envswitch::hook::timeout),
        help("Raise the hook's `timeout` or make the command finish faster")
    )]
    HookTimeout { hook: String, timeout_ms: u128 },

    #[error("No switcher registered for service: {0}")]
    #[diagnostic(
        code(envswitch::service::not_registered),
        help("Register a switcher for '{0}' before switching, or remove it from the environment")
    )]
    NoSwitcherRegistered(String),

    #[error("Unknown service type: {0}")]
    #[diagnostic(
        code(envswitch::service::unknown_type),
        help("Supported service types: aws, gcp, azure, docker, kubernetes, ssh")
    )]
    UnknownServiceType(String),

    #[error("No configuration provided for service: {0}")]
    #[diagnostic(
        code(envswitch::service::missing_config),
        help("Add a '{0}:' block under the service entry in the environment file")
    )]
    MissingServiceConfig(String),

    #[error("Failed to get current state for {service}: {reason}")]
    StateCapture { service: String, reason: String },

    #[error("Failed to switch {service}: {reason}")]
    #[diagnostic(code(envswitch::service::switch_failed))]
    SwitchFailed { service: String, reason: String },

    #[error("Failed to roll back {service}: {reason}")]
    RollbackFailed { service: String, reason: String },

    #[error("Operation cancelled for service '{0}'")]
    Cancelled(String),

    #[error("Timed out before '{0}' could finish")]
    #[diagnostic(
        code(envswitch::switch::timeout),
        help("Raise the switch timeout or check why the service adapter is slow")
    )]
    Timeout(String),

    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<Error>),

    #[error("Environment switch aborted: {source}")]
    #[diagnostic(code(envswitch::switch::aborted))]
    SwitchAborted {
        source: Box<Error>,
        result: Box<SwitchResult>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The partial result recorded before a switch was aborted, if any.
    pub fn switch_result(&self) -> Option<&SwitchResult> {
        match self {
            Error::SwitchAborted { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::CircularDependency(path) => Some(format!(
                "Services cannot depend on each other in a cycle. Review the dependencies involving: {}",
                path.join(", ")
            )),
            Error::InvalidDependency(_) => Some(
                "Write dependencies as \"<from> -> <to>\", e.g. \"aws -> kubernetes\"".to_string(),
            ),
            Error::DependencySourceNotFound(name) | Error::DependencyTargetNotFound(name) => {
                Some(format!(
                    "Add '{}' to the environment's services or remove the dependency",
                    name
                ))
            }
            Error::HookRejected { .. } => Some(
                "Move complex logic into a script file and call the script from the hook".to_string(),
            ),
            Error::NoSwitcherRegistered(name) => Some(format!(
                "No adapter handles '{}'. Check the service name for typos",
                name
            )),
            Error::MissingServiceConfig(name) => Some(format!(
                "The '{}' entry needs a matching '{}:' configuration block",
                name, name
            )),
            Error::EnvironmentNotFound(_) => Some(
                "Environments are searched in ~/.gzh/dev-env/environments, ./environments and the current directory".to_string(),
            ),
            Error::Validation(_) => Some("Validate your environment with: envswitch validate".to_string()),
            Error::SwitchAborted { source, .. } => source.suggestion(),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
