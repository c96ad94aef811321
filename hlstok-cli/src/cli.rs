use clap::{Parser, Subcommand, ValueEnum};
use hls::Details;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hlstok",
    about = "Hlstok - tokenize HLS playlists and check them for protocol errors",
    version,
    author
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds for remote playlists
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tokenize playlists and report parse errors and rule violations
    Lint {
        /// Playlist files or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Which tokens to print
        #[arg(short, long)]
        details: Option<DetailsArg>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Skip the semantic rules, report tokenizer errors only
        #[arg(long)]
        no_rules: bool,

        /// Print the tokens only, without diagnostics or summary
        #[arg(long)]
        tokens_only: bool,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show configuration information
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// Compact JSON output, one document per line
    JsonCompact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonCompact => write!(f, "json-compact"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailsArg {
    /// Tags, URIs and comments
    ValidOnly,
    /// Everything except parse errors
    IncludeBlankLines,
    /// Every line
    Complete,
}

impl From<DetailsArg> for Details {
    fn from(details: DetailsArg) -> Self {
        match details {
            DetailsArg::ValidOnly => Details::ValidOnly,
            DetailsArg::IncludeBlankLines => Details::IncludeBlankLines,
            DetailsArg::Complete => Details::Complete,
        }
    }
}
