use super::SwitchContext;
use crate::config::{ServiceKind, ServiceTarget};
use crate::error::Result;
use async_trait::async_trait;

/// Opaque snapshot returned by [`ServiceSwitcher::current_state`] and handed
/// back verbatim to [`ServiceSwitcher::rollback`].
pub type ServiceState = serde_json::Value;

/// Contract every per-service adapter (AWS profile, kube context, ...) implements.
///
/// Implementations should be stateless and thread-safe: in a parallel switch
/// several adapters run at once, and the same adapter may be shared by
/// concurrent switches.
///
/// # Required Methods
///
/// - [`name`](Self::name) - identifier used in environments and dependency constraints
/// - [`switch`](Self::switch) - move the service to the target configuration
/// - [`current_state`](Self::current_state) - capture what is active now
/// - [`rollback`](Self::rollback) - restore a captured state
#[async_trait]
pub trait ServiceSwitcher: Send + Sync {
    /// Stable service identifier, e.g. "aws" or "kubernetes".
    fn name(&self) -> &str;

    /// Which configuration variant this adapter consumes. Resolved once when
    /// the adapter is registered; defaults to parsing [`name`](Self::name).
    fn kind(&self) -> Option<ServiceKind> {
        self.name().parse().ok()
    }

    /// Switch the service to `target`. An error means the target state was
    /// not reached.
    #[must_use = "ignoring this result means the service may not have switched"]
    async fn switch(&self, ctx: &SwitchContext, target: &ServiceTarget) -> Result<()>;

    /// Capture the currently active state for later rollback.
    async fn current_state(&self, ctx: &SwitchContext) -> Result<ServiceState>;

    /// Restore a state previously returned by [`current_state`](Self::current_state).
    #[must_use = "ignoring this result means the service may not have been restored"]
    async fn rollback(&self, ctx: &SwitchContext, previous: &ServiceState) -> Result<()>;
}
