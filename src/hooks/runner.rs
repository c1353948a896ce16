//! Execution of lifecycle hooks around a switch.

use super::validate_hook_command;
use crate::config::Hook;
use crate::error::{Error, Result};
use crate::service::SwitchContext;
use std::fmt;
use std::process::Stdio;
use tracing::Instrument;

/// When a batch of hooks runs relative to the service switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Pre => f.write_str("pre-hook"),
            HookPhase::Post => f.write_str("post-hook"),
        }
    }
}

/// Runs hooks through the host shell after they pass the command gate.
#[derive(Debug, Clone, Default)]
pub struct HookRunner;

impl HookRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run every hook of a phase in order. Hooks are named `<phase>-<index>`.
    /// A failing hook with the `continue` policy is logged and skipped; any
    /// other policy stops the phase and returns that hook's error.
    pub async fn run_all(
        &self,
        hooks: &[Hook],
        phase: HookPhase,
        ctx: &SwitchContext,
    ) -> Result<()> {
        for (index, hook) in hooks.iter().enumerate() {
            let name = format!("{}-{}", phase, index);
            if let Err(e) = self.run(hook, &name, ctx).await {
                if hook.on_error.is_continue() {
                    tracing::warn!("Hook '{}' failed, continuing: {}", name, e);
                    continue;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Gate and execute a single hook under its timeout. The child process is
    /// killed if the context is cancelled or its deadline passes first.
    pub async fn run(&self, hook: &Hook, name: &str, ctx: &SwitchContext) -> Result<()> {
        validate_hook_command(&hook.command).map_err(|reason| Error::HookRejected {
            hook: name.to_string(),
            reason,
        })?;

        let timeout = hook.timeout();
        let mut command = shell_command(&hook.command);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = async {
            tokio::select! {
                biased;

                _ = ctx.cancelled() => Err(ctx.cancellation_error(name)),

                result = tokio::time::timeout(timeout, command.output()) => match result {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(e)) => Err(Error::HookFailed {
                        hook: name.to_string(),
                        reason: format!("failed to spawn: {}", e),
                    }),
                    Err(_elapsed) => Err(Error::HookTimeout {
                        hook: name.to_string(),
                        timeout_ms: timeout.as_millis(),
                    }),
                },
            }
        }
        .instrument(tracing::info_span!("hook", hook.name = %name))
        .await?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::HookFailed {
                hook: name.to_string(),
                reason: format!("{} (output: {})", output.status, combined.trim_end()),
            });
        }

        tracing::debug!("Hook '{}' completed", name);
        Ok(())
    }
}

fn shell_command(script: &str) -> tokio::process::Command {
    if cfg!(target_os = "windows") {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", script]);
        cmd
    } else {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }
}
