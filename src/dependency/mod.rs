//! Dependency resolution: constraint parsing, cycle detection and
//! level-wise topological ordering.

mod graph;
mod resolver;

pub use graph::*;
pub use resolver::*;
