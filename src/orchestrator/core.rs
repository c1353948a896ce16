use super::{
    EnvironmentSwitcherBuilder, ProgressCallback, SwitchError, SwitchOptions, SwitchProgress,
    SwitchResult,
};
use crate::config::Environment;
use crate::dependency::{DependencyResolver, ServiceGroup};
use crate::error::{Error, Result};
use crate::hooks::{HookPhase, HookRunner};
use crate::service::{RegistryMap, ServiceState, ServiceSwitcher, SwitchContext, SwitcherRegistry};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Drives a whole environment switch: resolves dependency levels, runs hooks,
/// switches services level by level and rolls back on failure.
///
/// # Concurrency Model
///
/// - All methods take `&self`; concurrent switches share the registry read lock.
/// - Registering a switcher takes the write lock, so it waits for in-flight switches.
/// - `cancel_operations()` cancels every switch running on this instance. In-flight
///   adapter calls are not dropped; they see the cancellation through their
///   [`SwitchContext`] and the orchestrator stops before the next service or level.
///
/// # Example
///
/// ```no_run
/// use envswitch::{Environment, EnvironmentSwitcher, SwitchOptions};
///
/// # async fn example(env: Environment) -> Result<(), envswitch::Error> {
/// let switcher = EnvironmentSwitcher::new();
/// // switcher.register(MyAwsSwitcher::default()).await;
///
/// let options = SwitchOptions::default().with_rollback_on_error(true);
/// let result = switcher.switch_environment(&env, &options).await?;
/// println!("switched: {:?}", result.switched_services);
/// # Ok(())
/// # }
/// ```
pub struct EnvironmentSwitcher {
    registry: SwitcherRegistry,
    hook_runner: HookRunner,
    progress_callback: RwLock<Option<ProgressCallback>>,
    /// Parent of every per-call token. Call `cancel_operations()` to stop all switches.
    cancellation_token: CancellationToken,
}

/// What happened to one service within a level.
struct ServiceOutcome {
    service: String,
    /// Set as soon as state was captured, even if the switch later failed.
    previous_state: Option<ServiceState>,
    error: Option<Error>,
}

impl ServiceOutcome {
    fn failed(service: &str, error: Error) -> Self {
        Self {
            service: service.to_string(),
            previous_state: None,
            error: Some(error),
        }
    }
}

impl Default for EnvironmentSwitcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentSwitcher {
    pub fn new() -> Self {
        Self::from_parts(SwitcherRegistry::new(), None, CancellationToken::new())
    }

    pub(super) fn from_parts(
        registry: SwitcherRegistry,
        progress_callback: Option<ProgressCallback>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            registry,
            hook_runner: HookRunner::new(),
            progress_callback: RwLock::new(progress_callback),
            cancellation_token,
        }
    }

    /// Create a builder for constructing a switcher with a fluent API.
    pub fn builder() -> EnvironmentSwitcherBuilder {
        EnvironmentSwitcherBuilder::new()
    }

    /// Register a switcher under its own name. Waits for in-flight switches.
    pub async fn register<S>(&self, switcher: S)
    where
        S: ServiceSwitcher + 'static,
    {
        self.registry.register(switcher).await;
    }

    /// Register a switcher under an explicit service name.
    pub async fn register_as(&self, name: &str, switcher: Arc<dyn ServiceSwitcher>) {
        self.registry.register_as(name, switcher).await;
    }

    pub fn registry(&self) -> &SwitcherRegistry {
        &self.registry
    }

    /// Names of every registered service, sorted.
    pub async fn available_services(&self) -> Vec<String> {
        self.registry.names().await
    }

    pub fn set_progress_callback<F>(&self, callback: F)
    where
        F: Fn(&SwitchProgress) + Send + Sync + 'static,
    {
        *self.progress_callback.write() = Some(Arc::new(callback));
    }

    pub fn clear_progress_callback(&self) {
        *self.progress_callback.write() = None;
    }

    /// Cancel all ongoing switches.
    pub fn cancel_operations(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Reset the cancellation token for new operations.
    pub fn reset_cancellation(&mut self) {
        self.cancellation_token = CancellationToken::new();
    }

    /// Switch every service of `env` to its target configuration.
    ///
    /// Validation, dependency resolution and pre-hook failures return before any
    /// service is touched. A failure in a level stops all later levels, rolls back
    /// every captured service when `rollback_on_error` is set, and returns
    /// [`Error::SwitchAborted`] carrying the partial [`SwitchResult`]. Post-hook
    /// failures are recorded in the result without failing the switch.
    pub async fn switch_environment(
        &self,
        env: &Environment,
        options: &SwitchOptions,
    ) -> Result<SwitchResult> {
        self.switch_environment_impl(env, options)
            .instrument(tracing::info_span!(
                "switch_environment",
                environment = %env.name,
                dry_run = options.dry_run,
                parallel = options.parallel
            ))
            .await
    }

    async fn switch_environment_impl(
        &self,
        env: &Environment,
        options: &SwitchOptions,
    ) -> Result<SwitchResult> {
        let started = Instant::now();
        let start_time = Utc::now();

        env.validate()?;
        let groups = DependencyResolver::for_environment(env).resolve()?;

        let mut ctx = SwitchContext::new(self.cancellation_token.child_token());
        if let Some(timeout) = options.timeout {
            ctx = ctx.with_deadline(tokio::time::Instant::now() + timeout);
        }

        // Held until the call returns so registration can't interleave with a switch
        let registry = self.registry.read().await;

        let mut result = SwitchResult::started();

        if let Err(e) = self
            .hook_runner
            .run_all(&env.pre_hooks, HookPhase::Pre, &ctx)
            .await
        {
            tracing::error!("Pre-hooks failed, no service was switched: {}", e);
            result.record_error(HookPhase::Pre.to_string(), &e);
            return Err(abort(e, result, started));
        }

        tracing::info!(
            "Switching to environment '{}' ({} services in {} levels)",
            env.name,
            env.services.len(),
            groups.len()
        );

        let total_services = env.services.len();
        let mut completed_services = 0;
        let mut previous_states: HashMap<String, ServiceState> = HashMap::new();

        for group in &groups {
            let error = if ctx.is_cancelled() {
                let e = ctx.cancellation_error(&format!("level {}", group.level));
                result.record_error(format!("level-{}", group.level), &e);
                Some(e)
            } else {
                self.switch_level(&registry, env, group, &ctx, options, &mut previous_states, &mut result)
                    .await
            };

            if let Some(error) = error {
                tracing::error!("Level {} failed: {}", group.level, error);
                if options.rollback_on_error {
                    self.rollback_services(&registry, &previous_states, &mut result)
                        .instrument(tracing::info_span!("rollback", services = previous_states.len()))
                        .await;
                }
                return Err(abort(error, result, started));
            }

            completed_services += group.services.len();
            tracing::info!(
                "Completed level {} ({}/{} services)",
                group.level,
                completed_services,
                total_services
            );
            self.report_progress(
                total_services,
                completed_services,
                group.level,
                start_time,
                started,
            );
        }

        if let Err(e) = self
            .hook_runner
            .run_all(&env.post_hooks, HookPhase::Post, &ctx)
            .await
        {
            tracing::warn!("Post-hooks failed after a successful switch: {}", e);
            result.record_error(HookPhase::Post.to_string(), &e);
        }

        result.duration = started.elapsed();
        tracing::info!(
            "Switched to environment '{}' in {:?}",
            env.name,
            result.duration
        );
        Ok(result)
    }

    /// Run one level and fold its outcomes into `result`. Returns the level's
    /// error (several failures are combined into [`Error::Multiple`]).
    #[allow(clippy::too_many_arguments)]
    async fn switch_level(
        &self,
        registry: &RegistryMap,
        env: &Environment,
        group: &ServiceGroup,
        ctx: &SwitchContext,
        options: &SwitchOptions,
        previous_states: &mut HashMap<String, ServiceState>,
        result: &mut SwitchResult,
    ) -> Option<Error> {
        let outcomes = if options.parallel && group.services.len() > 1 {
            // Siblings run to completion; failures are only evaluated after the barrier
            let futures: Vec<_> = group
                .services
                .iter()
                .map(|name| self.switch_service(registry, env, name, ctx, options))
                .collect();
            futures::future::join_all(futures).await
        } else {
            let mut outcomes = Vec::with_capacity(group.services.len());
            for name in &group.services {
                let outcome = self.switch_service(registry, env, name, ctx, options).await;
                let failed = outcome.error.is_some();
                outcomes.push(outcome);
                if failed {
                    break;
                }
            }
            outcomes
        };

        let mut errors = Vec::new();
        for outcome in outcomes {
            if let Some(state) = outcome.previous_state {
                previous_states.insert(outcome.service.clone(), state);
            }
            match outcome.error {
                None => result.switched_services.push(outcome.service),
                Some(e) => {
                    result.record_failure(&outcome.service, &e);
                    errors.push(e);
                }
            }
        }

        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Multiple(errors)),
        }
    }

    async fn switch_service(
        &self,
        registry: &RegistryMap,
        env: &Environment,
        name: &str,
        ctx: &SwitchContext,
        options: &SwitchOptions,
    ) -> ServiceOutcome {
        self.switch_service_impl(registry, env, name, ctx, options)
            .instrument(tracing::info_span!("switch_service", service.name = %name))
            .await
    }

    async fn switch_service_impl(
        &self,
        registry: &RegistryMap,
        env: &Environment,
        name: &str,
        ctx: &SwitchContext,
        options: &SwitchOptions,
    ) -> ServiceOutcome {
        if ctx.is_cancelled() {
            return ServiceOutcome::failed(name, ctx.cancellation_error(name));
        }

        let Some(registration) = registry.get(name) else {
            return ServiceOutcome::failed(name, Error::NoSwitcherRegistered(name.to_string()));
        };
        let Some(config) = env.services.get(name) else {
            return ServiceOutcome::failed(name, Error::MissingServiceConfig(name.to_string()));
        };
        let Some(kind) = registration.kind else {
            return ServiceOutcome::failed(name, Error::UnknownServiceType(name.to_string()));
        };
        let Some(target) = config.target(kind) else {
            return ServiceOutcome::failed(name, Error::MissingServiceConfig(name.to_string()));
        };

        let switcher = &registration.switcher;
        let previous_state = match switcher.current_state(ctx).await {
            Ok(state) => state,
            Err(e) => {
                return ServiceOutcome::failed(
                    name,
                    Error::StateCapture {
                        service: name.to_string(),
                        reason: e.to_string(),
                    },
                )
            }
        };
        tracing::debug!("Captured current state of '{}'", name);

        let error = if options.dry_run {
            tracing::info!("[dry-run] Would switch '{}' to {:?}", name, target);
            None
        } else {
            match switcher.switch(ctx, &target).await {
                Ok(()) => {
                    tracing::debug!("Switched '{}'", name);
                    None
                }
                Err(e) => Some(Error::SwitchFailed {
                    service: name.to_string(),
                    reason: e.to_string(),
                }),
            }
        };

        ServiceOutcome {
            service: name.to_string(),
            previous_state: Some(previous_state),
            error,
        }
    }

    /// Single best-effort sweep over every captured service, in no particular
    /// order. Failures are logged and combined into one `rollback` error record.
    async fn rollback_services(
        &self,
        registry: &RegistryMap,
        previous_states: &HashMap<String, ServiceState>,
        result: &mut SwitchResult,
    ) {
        tracing::warn!("Rolling back {} service(s)", previous_states.len());

        // A cancelled switch must still be able to restore what it captured
        let ctx = SwitchContext::background();
        let mut failures = Vec::new();

        for (name, state) in previous_states {
            let Some(registration) = registry.get(name) else {
                failures.push(format!("no switcher for {}", name));
                continue;
            };
            if let Err(e) = registration.switcher.rollback(&ctx, state).await {
                let error = Error::RollbackFailed {
                    service: name.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}", error);
                failures.push(error.to_string());
            } else {
                tracing::debug!("Rolled back '{}'", name);
            }
        }

        result.rollback_performed = true;
        if !failures.is_empty() {
            failures.sort();
            result
                .errors
                .push(SwitchError::new("rollback", failures.join("; ")));
        }
    }

    fn report_progress(
        &self,
        total_services: usize,
        completed_services: usize,
        level: usize,
        start_time: DateTime<Utc>,
        started: Instant,
    ) {
        // Clone out so the callback runs without the lock held
        let callback = self.progress_callback.read().clone();
        if let Some(callback) = callback {
            let progress = SwitchProgress::estimate(
                total_services,
                completed_services,
                format!("Completed group {}", level),
                start_time,
                started.elapsed(),
            );
            callback(&progress);
        }
    }
}

fn abort(error: Error, mut result: SwitchResult, started: Instant) -> Error {
    result.success = false;
    result.duration = started.elapsed();
    Error::SwitchAborted {
        source: Box::new(error),
        result: Box::new(result),
    }
}
