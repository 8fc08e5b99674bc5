use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sandpit", about = "Scaffold throwaway sandbox projects")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Default, Args)]
pub struct NewArgs {
    /// Sandbox name (generated if omitted)
    pub name: Option<String>,
    /// Copy an existing directory or sandbox instead of initialising a new project
    #[arg(long, value_name = "SRC")]
    pub copy: Option<PathBuf>,
    /// Library to add after creation (repeatable)
    #[arg(long = "lib", value_name = "LIB")]
    pub libs: Vec<String>,
    /// Skip the project init command
    #[arg(long)]
    pub no_init: bool,
    /// Open the sandbox in an editor afterwards
    #[arg(long)]
    pub edit: bool,
    /// Seed for the generated name
    #[arg(long)]
    pub seed: Option<u64>,
    /// Directory to create the sandbox in
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Give up after this many generated names collide
    #[arg(long)]
    pub max_attempts: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new sandbox
    New(NewArgs),
    /// Print generated names without creating anything
    Name {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// How many names to print
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Text placed between words
        #[arg(long, default_value = "-")]
        separator: String,
        /// Uppercase the first letter of each word
        #[arg(long)]
        capitalize: bool,
        /// Leave off the numeric suffix
        #[arg(long)]
        no_numbers: bool,
    },
    /// List sandboxes, most recent first
    List {
        /// Directory to list instead of the configured root
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print shell integration wrapper
    ShellSetup {
        /// Emit a fish function instead of a POSIX one
        #[arg(long)]
        fish: bool,
    },
    /// Print version information
    Version,
}
