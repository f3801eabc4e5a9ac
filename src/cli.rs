use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moshforge")]
#[command(author, version, about = "Video datamoshing tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video and produce a datamoshed rendition
    Run {
        /// Source video URL
        #[arg(required = true)]
        url: String,

        /// Number of corruption passes
        #[arg(required = true)]
        glitch_count: u32,

        /// Bytes corrupted per pass
        #[arg(required = true)]
        glitch_strength: usize,

        /// Cookie file for sites that require a session
        cookies: Option<PathBuf>,

        /// Where to write the deliverable (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON run report instead of just the output path
        #[arg(long)]
        json: bool,
    },

    /// Datamosh an already-local media file
    Mosh {
        /// Input media file
        #[arg(required = true)]
        input: PathBuf,

        /// Number of corruption passes
        #[arg(required = true)]
        glitch_count: u32,

        /// Bytes corrupted per pass
        #[arg(required = true)]
        glitch_strength: usize,

        /// Where to write the deliverable (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON run report instead of just the output path
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
