//! Pre/post switch hooks: the command gate and the shell runner.

mod gate;
mod runner;

pub use gate::*;
pub use runner::*;
