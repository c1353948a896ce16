use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A group of services with no unmet dependency at a given point in the
/// topological order. Everything in one level may be switched concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGroup {
    pub level: usize,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet
    White,
    /// On the current DFS path
    Gray,
    /// Fully explored
    Black,
}

/// Ordering graph between services.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeSet<String>,
    /// `edges[A] = [B, C]` means A must finish before B and C start
    edges: HashMap<String, Vec<String>>,
    /// `reverse[B] = [A]` means B waits for A
    reverse: HashMap<String, Vec<String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.edges.entry(name.clone()).or_default();
        self.reverse.entry(name.clone()).or_default();
        self.nodes.insert(name);
    }

    /// Add an ordering edge: `from` runs before `to`
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        self.add_node(from.clone());
        self.add_node(to.clone());

        self.edges.entry(from.clone()).or_default().push(to.clone());
        self.reverse.entry(to).or_default().push(from);
    }

    /// Services that must finish before `node` starts
    pub fn get_prerequisites(&self, node: &str) -> Vec<String> {
        self.reverse.get(node).cloned().unwrap_or_default()
    }

    /// Services that wait for `node`
    pub fn get_dependents(&self, node: &str) -> Vec<String> {
        self.edges.get(node).cloned().unwrap_or_default()
    }

    pub fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    /// Depth-first search with three-colour marking. Reaching a node that is
    /// still on the current path means a cycle; the error carries the path
    /// from that node around to the back edge that closed it.
    pub fn detect_cycle(&self) -> Result<()> {
        let mut colors: HashMap<&str, Color> =
            self.nodes.iter().map(|n| (n.as_str(), Color::White)).collect();
        let mut path = Vec::new();

        for node in &self.nodes {
            if colors[node.as_str()] == Color::White {
                if let Some(cycle) = self.visit(node, &mut colors, &mut path) {
                    return Err(Error::CircularDependency(cycle));
                }
            }
        }

        Ok(())
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        colors: &mut HashMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for next in self.edges.get(node).into_iter().flatten() {
            match colors.get(next.as_str()).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    let start = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.visit(next, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Level-wise Kahn sort. Each level holds every node whose prerequisites
    /// are all in earlier levels, sorted by name.
    pub fn levels(&self) -> Result<Vec<ServiceGroup>> {
        self.detect_cycle()?;

        let mut remaining: BTreeMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.reverse.get(n).map_or(0, Vec::len)))
            .collect();

        let mut groups = Vec::new();

        while !remaining.is_empty() {
            // BTreeMap iteration keeps each level sorted
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|(_, degree)| **degree == 0)
                .map(|(node, _)| *node)
                .collect();

            if ready.is_empty() {
                return Err(Error::CircularDependency(
                    remaining.keys().map(|n| n.to_string()).collect(),
                ));
            }

            for node in &ready {
                remaining.remove(node);
                for dependent in self.edges.get(*node).into_iter().flatten() {
                    if let Some(degree) = remaining.get_mut(dependent.as_str()) {
                        *degree = degree.saturating_sub(1);
                    }
                }
            }

            groups.push(ServiceGroup {
                level: groups.len(),
                services: ready.into_iter().map(str::to_string).collect(),
            });
        }

        Ok(groups)
    }

    /// Topological order: levels concatenated.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        Ok(self
            .levels()?
            .into_iter()
            .flat_map(|group| group.services)
            .collect())
    }

    /// Check if the graph has any cycles
    pub fn has_cycle(&self) -> bool {
        self.detect_cycle().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topological_sort() {
        let mut graph = Graph::new();
        graph.add_edge("c", "b");
        graph.add_edge("b", "a");

        let sorted = graph.topological_sort().unwrap();
        assert_eq!(sorted, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_circular_dependency() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        assert!(graph.has_cycle());
        match graph.detect_cycle() {
            Err(Error::CircularDependency(path)) => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected circular dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut graph = Graph::new();
        graph.add_edge("x", "x");

        match graph.levels() {
            Err(Error::CircularDependency(path)) => assert_eq!(path, vec!["x", "x"]),
            other => panic!("expected circular dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_reported_from_back_edge_target() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "b");

        match graph.detect_cycle() {
            Err(Error::CircularDependency(path)) => assert_eq!(path, vec!["b", "c", "b"]),
            other => panic!("expected circular dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_levels_sorted_and_numbered() {
        let mut graph = Graph::new();
        graph.add_node("zeta");
        graph.add_node("alpha");
        graph.add_edge("alpha", "omega");
        graph.add_edge("zeta", "omega");

        let groups = graph.levels().unwrap();
        assert_eq!(
            groups,
            vec![
                ServiceGroup {
                    level: 0,
                    services: vec!["alpha".into(), "zeta".into()],
                },
                ServiceGroup {
                    level: 1,
                    services: vec!["omega".into()],
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_edges_counted_once_per_occurrence() {
        let mut graph = Graph::new();
        graph.add_edge("a", "b");
        graph.add_edge("a", "b");

        let groups = graph.levels().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].services, vec!["b"]);
    }

    #[test]
    fn test_prerequisites_and_dependents() {
        let mut graph = Graph::new();
        graph.add_edge("aws", "kubernetes");
        graph.add_edge("docker", "kubernetes");

        let mut prereqs = graph.get_prerequisites("kubernetes");
        prereqs.sort();
        assert_eq!(prereqs, vec!["aws", "docker"]);
        assert_eq!(graph.get_dependents("aws"), vec!["kubernetes"]);
        assert!(graph.get_dependents("kubernetes").is_empty());
    }

    #[test]
    fn test_empty_graph_has_no_levels() {
        assert!(Graph::new().levels().unwrap().is_empty());
    }
}
