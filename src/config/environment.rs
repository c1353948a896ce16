//! Environment definition: the target state for a whole switch.

use super::{parse_duration_string, ServiceConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Timeout applied to a hook that does not declare one.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// A complete development environment: per-service target configs, ordering
/// constraints between services, and hooks run around the switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,

    /// Ordering constraints of the form `"from -> to"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hooks: Vec<Hook>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_hooks: Vec<Hook>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a service entry (builder style, mostly for tests and programmatic use).
    pub fn with_service(mut self, name: impl Into<String>, config: impl Into<ServiceConfig>) -> Self {
        self.services.insert(name.into(), config.into());
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn with_pre_hook(mut self, hook: Hook) -> Self {
        self.pre_hooks.push(hook);
        self
    }

    pub fn with_post_hook(mut self, hook: Hook) -> Self {
        self.post_hooks.push(hook);
        self
    }

    /// Structural validation done before anything is resolved or executed.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("environment name is required".to_string()));
        }

        if self.services.is_empty() {
            return Err(Error::Validation(
                "at least one service must be configured".to_string(),
            ));
        }

        if self.dependencies.iter().any(|dep| dep.is_empty()) {
            return Err(Error::Validation("empty dependency string found".to_string()));
        }

        for hook in self.pre_hooks.iter().chain(&self.post_hooks) {
            if let Some(raw) = &hook.timeout {
                if parse_duration_string(raw).is_none() {
                    return Err(Error::Validation(format!(
                        "invalid timeout '{}' for hook '{}'",
                        raw, hook.command
                    )));
                }
            }
        }

        Ok(())
    }

    /// Configured service names, sorted.
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

/// What to do when a hook fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookErrorPolicy {
    /// Log the failure and carry on with the next hook.
    Continue,
    /// Abort the hook phase.
    #[default]
    Fail,
    /// Abort the hook phase (kept distinct so configs round-trip).
    Rollback,
    /// Any unrecognised policy string; treated as `Fail`.
    Other(String),
}

impl HookErrorPolicy {
    pub fn is_continue(&self) -> bool {
        matches!(self, HookErrorPolicy::Continue)
    }
}

impl From<String> for HookErrorPolicy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "continue" => HookErrorPolicy::Continue,
            "fail" | "" => HookErrorPolicy::Fail,
            "rollback" => HookErrorPolicy::Rollback,
            _ => HookErrorPolicy::Other(value),
        }
    }
}

impl From<HookErrorPolicy> for String {
    fn from(policy: HookErrorPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for HookErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookErrorPolicy::Continue => f.write_str("continue"),
            HookErrorPolicy::Fail => f.write_str("fail"),
            HookErrorPolicy::Rollback => f.write_str("rollback"),
            HookErrorPolicy::Other(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for HookErrorPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HookErrorPolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(HookErrorPolicy::from)
    }
}

/// A shell command run before or after the services are switched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub command: String,

    /// Timeout such as "30s", "500ms" or "2m". Defaults to 30 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "is_default_policy")]
    pub on_error: HookErrorPolicy,
}

fn is_default_policy(policy: &HookErrorPolicy) -> bool {
    *policy == HookErrorPolicy::default()
}

impl Hook {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
            on_error: HookErrorPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    pub fn with_on_error(mut self, policy: HookErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Effective timeout; unparseable values fall back to the default
    /// (`Environment::validate` rejects them up front).
    pub fn timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration_string)
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_HOOK_TIMEOUT)
    }
}
