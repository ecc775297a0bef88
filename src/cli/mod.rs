// src/cli/mod.rs — CLI definition (clap derive)

pub mod eval;
pub mod score;
pub mod serve;
pub mod sets;
pub mod train;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "essaymark",
    about = "Automated essay scoring with writing feedback",
    version
)]
pub struct Cli {
    /// Essay text to score (default command when no subcommand given)
    #[arg(trailing_var_arg = true)]
    pub essay: Vec<String>,

    /// Essay set (1-8) the essay responds to
    #[arg(short = 's', long, default_value = "1")]
    pub set: u8,

    /// Read the essay from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Print extracted feature values alongside the score
    #[arg(long)]
    pub features: bool,

    /// Print the score only, without writing suggestions
    #[arg(long)]
    pub no_feedback: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the tree model from a corpus and save the artifacts
    Train {
        /// Corpus file (tab-separated); defaults to the configured path
        #[arg(long)]
        corpus: Option<String>,
        /// Cap on records taken from the corpus head
        #[arg(long)]
        limit: Option<usize>,
        /// Artifact output directory; defaults to the configured model dir
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Score sampled corpus essays against their grader scores
    Eval {
        /// Corpus file (tab-separated); defaults to the configured path
        #[arg(long)]
        corpus: Option<String>,
        /// Essays sampled per essay set
        #[arg(long, default_value = "2")]
        per_set: usize,
        /// Also print writing suggestions for each sampled essay
        #[arg(long)]
        feedback: bool,
    },
    /// List the registered essay sets and their score ranges
    Sets,
    /// Serve the scoring HTTP API
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },
}
