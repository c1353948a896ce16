use super::ServiceSwitcher;
use crate::config::ServiceKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// A registered adapter and the config variant it consumes.
#[derive(Clone)]
pub struct Registration {
    pub switcher: Arc<dyn ServiceSwitcher>,
    /// `None` when the adapter does not map to a known service type.
    pub kind: Option<ServiceKind>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("switcher", &self.switcher.name())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Type alias for the registry contents
pub type RegistryMap = HashMap<String, Registration>;

/// Adapters keyed by service name.
///
/// Switches hold a read guard for their whole duration, so registration
/// waits until no switch is in flight.
#[derive(Debug, Clone, Default)]
pub struct SwitcherRegistry {
    inner: Arc<RwLock<RegistryMap>>,
}

impl SwitcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(map: RegistryMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub(crate) fn registration(name: &str, switcher: Arc<dyn ServiceSwitcher>) -> (String, Registration) {
        let kind = switcher.kind();
        (name.to_string(), Registration { switcher, kind })
    }

    /// Register an adapter under its own name.
    pub async fn register<S>(&self, switcher: S)
    where
        S: ServiceSwitcher + 'static,
    {
        self.register_shared(Arc::new(switcher)).await;
    }

    /// Register an already shared adapter under its own name.
    pub async fn register_shared(&self, switcher: Arc<dyn ServiceSwitcher>) {
        let name = switcher.name().to_string();
        self.register_as(&name, switcher).await;
    }

    /// Register an adapter under an explicit service name.
    pub async fn register_as(&self, name: &str, switcher: Arc<dyn ServiceSwitcher>) {
        let (name, registration) = Self::registration(name, switcher);
        tracing::debug!(service = %name, kind = ?registration.kind, "Registering switcher");
        self.inner.write().await.insert(name, registration);
    }

    pub async fn unregister(&self, name: &str) -> bool {
        self.inner.write().await.remove(name).is_some()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.inner.read().await.contains_key(name)
    }

    /// Registered service names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Shared read access for the duration of a switch.
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, RegistryMap> {
        self.inner.read().await
    }
}
