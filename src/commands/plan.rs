use super::{describe_hook, load_environment};
use crate::cli::EnvSource;
use crate::output::UserOutput;
use envswitch::hooks::HookPhase;
use envswitch::{DependencyResolver, Hook, Parser, ServiceGroup};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Plan<'a> {
    environment: &'a str,
    description: &'a str,
    levels: &'a [ServiceGroup],
    execution_order: Vec<&'a str>,
    pre_hooks: Vec<&'a str>,
    post_hooks: Vec<&'a str>,
}

pub fn run_plan(
    parser: &Parser,
    source: &EnvSource,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let (path, env) = load_environment(parser, source)?;
    env.validate()?;
    let levels = DependencyResolver::for_environment(&env).resolve()?;

    if json {
        let plan = Plan {
            environment: &env.name,
            description: &env.description,
            levels: &levels,
            execution_order: levels
                .iter()
                .flat_map(|group| group.services.iter().map(String::as_str))
                .collect(),
            pre_hooks: commands(&env.pre_hooks),
            post_hooks: commands(&env.post_hooks),
        };
        out.status(&serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    out.status(&format!("Environment: {} ({})", env.name, path.display()));
    if !env.description.is_empty() {
        out.status(&format!("  {}", env.description));
    }
    out.blank();

    print_hooks(HookPhase::Pre, &env.pre_hooks, out);
    for group in &levels {
        out.status(&format!("Level {}: {}", group.level, group.services.join(", ")));
    }
    print_hooks(HookPhase::Post, &env.post_hooks, out);

    out.blank();
    out.success(&format!(
        "{} services in {} levels",
        env.services.len(),
        levels.len()
    ));
    Ok(())
}

fn commands(hooks: &[Hook]) -> Vec<&str> {
    hooks.iter().map(|hook| hook.command.as_str()).collect()
}

fn print_hooks(phase: HookPhase, hooks: &[Hook], out: &dyn UserOutput) {
    if hooks.is_empty() {
        return;
    }
    out.status(&format!("{}s:", phase));
    for (index, hook) in hooks.iter().enumerate() {
        out.status(&describe_hook(&format!("{}-{}", phase, index), hook));
    }
}
