use crate::output::UserOutput;
use envswitch::{validate_hook_command, Error};

pub fn run_check_hook(command: &str, out: &dyn UserOutput) -> anyhow::Result<()> {
    validate_hook_command(command).map_err(|reason| Error::HookRejected {
        hook: "command".to_string(),
        reason,
    })?;

    out.success("Hook command accepted");
    Ok(())
}
