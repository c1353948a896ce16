use super::Environment;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Loads environment definitions from YAML.
pub struct Parser {
    search_paths: Vec<PathBuf>,
}

impl Parser {
    /// Parser searching `~/.gzh/dev-env/environments`, `./environments` and `.`.
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            search_paths.push(Self::default_environments_dir_in(&home));
        }
        search_paths.push(PathBuf::from("environments"));
        search_paths.push(PathBuf::from("."));
        Self { search_paths }
    }

    /// Parser searching only the given directories, in order.
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    fn default_environments_dir_in(home: &Path) -> PathBuf {
        home.join(".gzh").join("dev-env").join("environments")
    }

    /// The per-user environments directory, if a home directory is known.
    pub fn default_environments_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| Self::default_environments_dir_in(&home))
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find `<name>.yaml` / `<name>.yml` in the search paths.
    pub fn find_environment_file(&self, name: &str) -> Result<PathBuf> {
        for dir in &self.search_paths {
            for ext in EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", name, ext));
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(Error::EnvironmentNotFound(name.to_string()))
    }

    /// Load an environment from a file path.
    pub fn load_environment<P: AsRef<Path>>(&self, path: P) -> Result<Environment> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Parse(format!(
                "Failed to read environment file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_environment(&content)
    }

    /// Parse an environment from a YAML string. Only the name is checked here;
    /// full validation happens when switching.
    pub fn parse_environment(&self, content: &str) -> Result<Environment> {
        let env: Environment = serde_yaml::from_str(content).map_err(|e| {
            Error::Parse(format!("Failed to parse environment configuration: {}", e))
        })?;

        if env.name.is_empty() {
            return Err(Error::Validation("environment name is required".to_string()));
        }

        Ok(env)
    }

    /// Every parseable environment file in `dir`, sorted by name.
    /// Files that fail to parse are skipped.
    pub fn list_environments<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Environment>> {
        let mut environments = Vec::new();

        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            if !path.is_file() || !is_yaml {
                continue;
            }

            match self.load_environment(&path) {
                Ok(env) => environments.push(env),
                Err(e) => {
                    tracing::warn!("Skipping environment file '{}': {}", path.display(), e);
                }
            }
        }

        environments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(environments)
    }

    /// Serialize an environment back to YAML.
    pub fn to_yaml(&self, env: &Environment) -> Result<String> {
        Ok(serde_yaml::to_string(env)?)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HookErrorPolicy, ServiceKind};

    const PRODUCTION: &str = r#"
name: production
description: Production environment
services:
  aws:
    aws:
      profile: prod
      region: us-east-1
  kubernetes:
    kubernetes:
      context: prod-cluster
      namespace: default
dependencies:
  - aws -> kubernetes
preHooks:
  - command: echo switching
    timeout: 10s
    onError: continue
postHooks:
  - command: echo done
"#;

    #[test]
    fn test_parse_environment() {
        let env = Parser::new().parse_environment(PRODUCTION).unwrap();

        assert_eq!(env.name, "production");
        assert_eq!(env.description, "Production environment");
        assert_eq!(env.service_names(), vec!["aws", "kubernetes"]);
        assert_eq!(env.dependencies, vec!["aws -> kubernetes"]);
        assert_eq!(env.pre_hooks.len(), 1);
        assert_eq!(env.pre_hooks[0].on_error, HookErrorPolicy::Continue);
        assert_eq!(env.post_hooks[0].on_error, HookErrorPolicy::Fail);
        assert!(env.services["kubernetes"]
            .target(ServiceKind::Kubernetes)
            .is_some());
    }

    #[test]
    fn test_parse_requires_name() {
        let err = Parser::new()
            .parse_environment("description: nameless\n")
            .unwrap_err();
        assert!(err.to_string().contains("environment name is required"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = Parser::new().parse_environment("name: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let parser = Parser::new();
        let env = parser.parse_environment(PRODUCTION).unwrap();
        let yaml = parser.to_yaml(&env).unwrap();
        assert!(yaml.contains("preHooks"));
        assert_eq!(parser.parse_environment(&yaml).unwrap(), env);
    }

    #[test]
    fn test_find_environment_file() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("staging.yml"), "name: staging\n").unwrap();

        let parser = Parser::with_search_paths(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        let found = parser.find_environment_file("staging").unwrap();
        assert_eq!(found, second.path().join("staging.yml"));

        let missing = parser.find_environment_file("production").unwrap_err();
        assert!(matches!(missing, Error::EnvironmentNotFound(name) if name == "production"));
    }

    #[test]
    fn test_list_environments_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("prod.yaml"), PRODUCTION).unwrap();
        fs::write(dir.path().join("dev.yml"), "name: dev\n").unwrap();
        fs::write(dir.path().join("broken.yaml"), "name: [").unwrap();
        fs::write(dir.path().join("notes.txt"), "name: ignored\n").unwrap();

        let envs = Parser::new().list_environments(dir.path()).unwrap();
        let names: Vec<_> = envs.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["dev", "production"]);
    }
}
