mod builder;
mod core;
mod types;

pub use builder::*;
pub use core::*;
pub use types::*;
