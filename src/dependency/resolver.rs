use super::{Graph, ServiceGroup};
use crate::config::Environment;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Separator between the two endpoints of a dependency constraint.
pub const DEPENDENCY_SEPARATOR: &str = " -> ";

/// A parsed `"from -> to"` constraint: `from` must finish before `to` starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub from: String,
    pub to: String,
}

impl Dependency {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl FromStr for Dependency {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(DEPENDENCY_SEPARATOR).map(str::trim).collect();
        match parts.as_slice() {
            [from, to] if !from.is_empty() && !to.is_empty() => Ok(Dependency::new(*from, *to)),
            _ => Err(Error::InvalidDependency(raw.to_string())),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, DEPENDENCY_SEPARATOR, self.to)
    }
}

/// Turns an environment's services and dependency strings into execution levels.
///
/// The resolver only borrows its inputs and keeps no cache: every call
/// re-parses the constraints and rebuilds the graph.
#[derive(Debug, Clone)]
pub struct DependencyResolver<'a> {
    services: BTreeSet<&'a str>,
    dependencies: &'a [String],
}

impl<'a> DependencyResolver<'a> {
    pub fn new<I>(services: I, dependencies: &'a [String]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            services: services.into_iter().collect(),
            dependencies,
        }
    }

    pub fn for_environment(env: &'a Environment) -> Self {
        Self::new(env.services.keys().map(String::as_str), &env.dependencies)
    }

    /// Parse every constraint and check both endpoints are known services.
    pub fn parse_dependencies(&self) -> Result<Vec<Dependency>> {
        self.dependencies
            .iter()
            .map(|raw| {
                let dep: Dependency = raw.parse()?;
                if !self.services.contains(dep.from.as_str()) {
                    return Err(Error::DependencySourceNotFound(dep.from));
                }
                if !self.services.contains(dep.to.as_str()) {
                    return Err(Error::DependencyTargetNotFound(dep.to));
                }
                Ok(dep)
            })
            .collect()
    }

    /// Build the ordering graph over every known service.
    pub fn graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for service in &self.services {
            graph.add_node(*service);
        }
        for dep in self.parse_dependencies()? {
            graph.add_edge(dep.from, dep.to);
        }
        Ok(graph)
    }

    /// Resolve into ordered levels. Fails on malformed constraints, unknown
    /// endpoints and cycles (including `"x -> x"`).
    pub fn resolve(&self) -> Result<Vec<ServiceGroup>> {
        let groups = self.graph()?.levels()?;
        tracing::debug!(
            levels = groups.len(),
            services = self.services.len(),
            "Resolved dependency levels"
        );
        Ok(groups)
    }

    /// Flattened execution order: levels concatenated.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        Ok(self
            .resolve()?
            .into_iter()
            .flat_map(|group| group.services)
            .collect())
    }

    /// Groups of services that may run in parallel (the levels themselves).
    pub fn parallel_groups(&self) -> Result<Vec<ServiceGroup>> {
        self.resolve()
    }

    /// Check the constraints are satisfiable without keeping the result.
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }
}
