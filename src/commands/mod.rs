mod check_hook;
mod list;
mod plan;
mod validate;

pub use check_hook::run_check_hook;
pub use list::run_list;
pub use plan::run_plan;
pub use validate::run_validate;

use crate::cli::EnvSource;
use envswitch::config::format_duration;
use envswitch::{Environment, Error, Hook, Parser};
use std::path::PathBuf;

/// Resolve `--env` / `--from-file` to a file and load it.
fn load_environment(parser: &Parser, source: &EnvSource) -> envswitch::Result<(PathBuf, Environment)> {
    let path = match (&source.from_file, &source.env) {
        (Some(path), _) => path.clone(),
        (None, Some(name)) => parser.find_environment_file(name)?,
        (None, None) => {
            return Err(Error::Validation(
                "either --env or --from-file is required".to_string(),
            ))
        }
    };

    let env = parser.load_environment(&path)?;
    Ok((path, env))
}

fn describe_hook(name: &str, hook: &Hook) -> String {
    format!(
        "  {}: {} (timeout {}, on error: {})",
        name,
        hook.command,
        format_duration(hook.timeout()),
        hook.on_error
    )
}
