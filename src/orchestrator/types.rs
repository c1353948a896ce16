use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a switch should be carried out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchOptions {
    /// Capture state but never call `switch` on any adapter.
    pub dry_run: bool,
    /// Switch the services of one level concurrently.
    pub parallel: bool,
    /// Restore every captured service when a level fails.
    pub rollback_on_error: bool,
    /// Deadline for the whole call. `None` means no deadline; the switcher's
    /// own cancellation token still applies.
    pub timeout: Option<Duration>,
}

impl SwitchOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_rollback_on_error(mut self, rollback: bool) -> Self {
        self.rollback_on_error = rollback;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A timestamped error recorded during a switch.
///
/// `service` is either a service name or one of the pseudo-services
/// `pre-hook`, `post-hook`, `rollback` and `level-<n>` (cancellation between levels).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchError {
    pub service: String,
    pub error: String,
    pub time: DateTime<Utc>,
}

impl SwitchError {
    pub fn new(service: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            error: error.into(),
            time: Utc::now(),
        }
    }

    pub(crate) fn from_error(service: impl Into<String>, error: &Error) -> Self {
        Self::new(service, error.to_string())
    }
}

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.service, self.error)
    }
}

/// Outcome of one `switch_environment` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResult {
    pub success: bool,
    /// Services that switched (or would have, in a dry run), in execution order.
    pub switched_services: Vec<String>,
    pub failed_services: Vec<String>,
    pub rollback_performed: bool,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub errors: Vec<SwitchError>,
}

impl SwitchResult {
    pub(crate) fn started() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub(crate) fn record_error(&mut self, service: impl Into<String>, error: &Error) {
        self.errors.push(SwitchError::from_error(service, error));
    }

    pub(crate) fn record_failure(&mut self, service: &str, error: &Error) {
        self.failed_services.push(service.to_string());
        self.record_error(service, error);
    }

    /// Error records for a given service or pseudo-service.
    pub fn errors_for<'a>(&'a self, service: &'a str) -> impl Iterator<Item = &'a SwitchError> + 'a {
        self.errors.iter().filter(move |e| e.service == service)
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Snapshot handed to the progress callback after each completed level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchProgress {
    pub total_services: usize,
    pub completed_services: usize,
    pub status: String,
    pub start_time: DateTime<Utc>,
    /// Linear extrapolation from the elapsed time; `None` until something completed.
    pub estimated_end: Option<DateTime<Utc>>,
}

impl SwitchProgress {
    /// Build a snapshot, estimating the end as
    /// `start + elapsed * total / completed`.
    pub fn estimate(
        total_services: usize,
        completed_services: usize,
        status: impl Into<String>,
        start_time: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let estimated_end = (completed_services > 0).then(|| {
            let ratio = total_services as f64 / completed_services as f64;
            let projected = chrono::Duration::from_std(elapsed.mul_f64(ratio))
                .unwrap_or_else(|_| chrono::Duration::zero());
            start_time + projected
        });

        Self {
            total_services,
            completed_services,
            status: status.into(),
            start_time,
            estimated_end,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_services >= self.total_services
    }
}

/// Observer invoked synchronously after each completed level.
pub type ProgressCallback = Arc<dyn Fn(&SwitchProgress) + Send + Sync>;
