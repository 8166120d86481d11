use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "deckhand",
    about = "Deckhand: convert platform-neutral composition files into \
             Kubernetes or OpenShift artifacts",
    version
)]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file (default: ./deckhand.toml when present)
    #[arg(long, global = true, env = "DECKHAND_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a declaration into platform artifacts
    Convert {
        /// Declaration file (repeatable; only the first is converted)
        #[arg(short = 'f', long = "file", env = "DECKHAND_FILE", value_delimiter = ',')]
        files: Vec<PathBuf>,

        /// Target distribution: kubernetes or openshift
        #[arg(long, env = "DECKHAND_DISTRO")]
        distro: Option<String>,

        /// Output directory, or `-` for a multi-document stream on stdout
        #[arg(short = 'o', long, env = "DECKHAND_OUTPUT_DIR")]
        output_dir: Option<String>,

        /// Fail when the declaration has validation faults
        #[arg(long)]
        strict_validation: bool,

        /// Fail instead of overwriting when two objects map to the same file
        #[arg(long)]
        reject_collisions: bool,
    },

    /// Load and validate declarations without converting
    Validate {
        /// Declaration file (repeatable; only the first is validated)
        #[arg(short = 'f', long = "file", env = "DECKHAND_FILE", value_delimiter = ',')]
        files: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
