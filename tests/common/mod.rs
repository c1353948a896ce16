//! Shared helpers for integration tests: a scriptable switcher and
//! environment builders.
#![allow(dead_code)]

use async_trait::async_trait;
use envswitch::config::{
    AwsConfig, AzureConfig, DockerConfig, GcpConfig, KubernetesConfig, SshConfig,
};
use envswitch::{
    Environment, Error, Result, ServiceKind, ServiceState, ServiceSwitcher, ServiceTarget,
    SwitchContext,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One capability call observed by a [`MockSwitcher`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    State(String),
    Switch(String, ServiceTarget),
    Rollback(String, ServiceState),
}

/// Call log and concurrency gauge shared by every mock in a test.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn captured(&self) -> Vec<String> {
        self.filter(|call| match call {
            Call::State(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn switched(&self) -> Vec<String> {
        self.filter(|call| match call {
            Call::Switch(name, _) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn rolled_back(&self) -> Vec<String> {
        let mut names = self.filter(|call| match call {
            Call::Rollback(name, _) => Some(name.clone()),
            _ => None,
        });
        names.sort();
        names
    }

    /// Highest number of `switch` calls observed running at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn filter(&self, f: impl Fn(&Call) -> Option<String>) -> Vec<String> {
        self.calls.lock().iter().filter_map(f).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A switcher whose behaviour is configured per test.
pub struct MockSwitcher {
    name: String,
    kind: Option<ServiceKind>,
    tracker: Tracker,
    delay: Option<Duration>,
    fail_switch: bool,
    fail_state: bool,
    fail_rollback: bool,
}

impl MockSwitcher {
    pub fn new(name: &str, tracker: &Tracker) -> Self {
        Self {
            name: name.to_string(),
            kind: name.parse().ok(),
            tracker: tracker.clone(),
            delay: None,
            fail_switch: false,
            fail_state: false,
            fail_rollback: false,
        }
    }

    pub fn with_kind(mut self, kind: ServiceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sleep this long inside `switch`, giving up early if the context is cancelled.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_switch(mut self) -> Self {
        self.fail_switch = true;
        self
    }

    pub fn failing_state(mut self) -> Self {
        self.fail_state = true;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }
}

#[async_trait]
impl ServiceSwitcher for MockSwitcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> Option<ServiceKind> {
        self.kind
    }

    async fn switch(&self, ctx: &SwitchContext, target: &ServiceTarget) -> Result<()> {
        self.tracker.record(Call::Switch(self.name.clone(), target.clone()));
        self.tracker.enter();

        let outcome = match self.delay {
            Some(delay) => {
                tokio::select! {
                    _ = ctx.cancelled() => Err(ctx.cancellation_error(&self.name)),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            None => Ok(()),
        };

        self.tracker.exit();
        outcome?;

        if self.fail_switch {
            return Err(Error::Parse(format!("{} refused the new configuration", self.name)));
        }
        Ok(())
    }

    async fn current_state(&self, _ctx: &SwitchContext) -> Result<ServiceState> {
        self.tracker.record(Call::State(self.name.clone()));
        if self.fail_state {
            return Err(Error::Parse(format!("{} state unavailable", self.name)));
        }
        Ok(serde_json::json!({ "service": self.name, "active": "previous" }))
    }

    async fn rollback(&self, _ctx: &SwitchContext, previous: &ServiceState) -> Result<()> {
        self.tracker
            .record(Call::Rollback(self.name.clone(), previous.clone()));
        if self.fail_rollback {
            return Err(Error::Parse(format!("{} could not restore", self.name)));
        }
        Ok(())
    }
}

/// A representative target for each service kind.
pub fn target(kind: ServiceKind) -> ServiceTarget {
    match kind {
        ServiceKind::Aws => ServiceTarget::Aws(AwsConfig {
            profile: "staging".to_string(),
            region: "us-west-2".to_string(),
            account_id: None,
        }),
        ServiceKind::Gcp => ServiceTarget::Gcp(GcpConfig {
            project: "staging-project".to_string(),
            account: None,
            region: None,
        }),
        ServiceKind::Azure => ServiceTarget::Azure(AzureConfig {
            subscription: "staging-sub".to_string(),
            tenant: None,
        }),
        ServiceKind::Docker => ServiceTarget::Docker(DockerConfig {
            context: "staging".to_string(),
        }),
        ServiceKind::Kubernetes => ServiceTarget::Kubernetes(KubernetesConfig {
            context: "staging-cluster".to_string(),
            namespace: Some("default".to_string()),
        }),
        ServiceKind::Ssh => ServiceTarget::Ssh(SshConfig {
            config: "~/.ssh/config.staging".to_string(),
        }),
    }
}

/// Environment with one entry per known service type named in `services`.
pub fn environment(services: &[&str], dependencies: &[&str]) -> Environment {
    let mut env = Environment::new("staging");
    for name in services {
        let kind: ServiceKind = name.parse().expect("test services are named after a kind");
        env = env.with_service(*name, target(kind));
    }
    for dep in dependencies {
        env = env.with_dependency(*dep);
    }
    env
}

/// Register a plain mock for every service of `env`.
pub async fn register_all(
    switcher: &envswitch::EnvironmentSwitcher,
    env: &Environment,
    tracker: &Tracker,
) {
    for name in env.services.keys() {
        switcher.register(MockSwitcher::new(name, tracker)).await;
    }
}
