use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envswitch")]
#[command(about = "envswitch - Inspect and validate dependency-ordered environment switches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where to load the environment from.
#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
pub struct EnvSource {
    /// Environment name, looked up in ~/.gzh/dev-env/environments, ./environments and .
    #[arg(short, long)]
    pub env: Option<String>,

    /// Path to an environment YAML file
    #[arg(short, long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the order services would switch in, level by level
    Plan {
        #[command(flatten)]
        source: EnvSource,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate an environment: structure, dependencies and hook commands
    Validate {
        #[command(flatten)]
        source: EnvSource,
    },
    /// List environments found in a directory
    List {
        /// Directory to scan (defaults to every search path)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Check a hook command against the command gate without running it
    CheckHook {
        /// The command string, as it would appear in a hook
        command: String,
    },
}
