use super::{EnvironmentSwitcher, ProgressCallback, SwitchProgress};
use crate::service::{ServiceSwitcher, SwitcherRegistry};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for constructing an `EnvironmentSwitcher` with a fluent API.
///
/// Unlike [`EnvironmentSwitcher::register`], building is synchronous: the
/// registry is assembled before any switch can hold it.
///
/// # Example
///
/// ```no_run
/// use envswitch::EnvironmentSwitcher;
///
/// let switcher = EnvironmentSwitcher::builder()
///     // .switcher(MyDockerSwitcher::default())
///     .progress_callback(|p| eprintln!("{}/{} {}", p.completed_services, p.total_services, p.status))
///     .build();
/// ```
#[derive(Default)]
pub struct EnvironmentSwitcherBuilder {
    switchers: Vec<(String, Arc<dyn ServiceSwitcher>)>,
    progress_callback: Option<ProgressCallback>,
    cancellation_token: Option<CancellationToken>,
}

impl EnvironmentSwitcherBuilder {
    /// Create a new builder with no switchers registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a switcher under its own name.
    pub fn switcher<S>(self, switcher: S) -> Self
    where
        S: ServiceSwitcher + 'static,
    {
        let shared: Arc<dyn ServiceSwitcher> = Arc::new(switcher);
        let name = shared.name().to_string();
        self.switcher_as(name, shared)
    }

    /// Register a switcher under an explicit service name.
    ///
    /// Later registrations for the same name replace earlier ones.
    pub fn switcher_as(mut self, name: impl Into<String>, switcher: Arc<dyn ServiceSwitcher>) -> Self {
        self.switchers.push((name.into(), switcher));
        self
    }

    pub fn progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SwitchProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Use an existing token as the parent of every switch, e.g. one cancelled
    /// from a Ctrl-C handler.
    ///
    /// If not set, a fresh token is created.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn build(self) -> EnvironmentSwitcher {
        let registry = SwitcherRegistry::from_map(
            self.switchers
                .into_iter()
                .map(|(name, switcher)| SwitcherRegistry::registration(&name, switcher))
                .collect(),
        );

        EnvironmentSwitcher::from_parts(
            registry,
            self.progress_callback,
            self.cancellation_token.unwrap_or_default(),
        )
    }
}
