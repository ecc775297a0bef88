// src/main.rs — essaymark entry point

use clap::Parser;

use essaymark::cli::{Cli, Commands};
use essaymark::infra::config::Config;
use essaymark::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / ESSAYMARK_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        Some(Commands::Train {
            corpus,
            limit,
            output,
        }) => {
            return essaymark::cli::train::run_train(&config, corpus, limit, output).await;
        }
        Some(Commands::Eval {
            corpus,
            per_set,
            feedback,
        }) => {
            return essaymark::cli::eval::run_eval(&config, corpus, per_set, feedback);
        }
        Some(Commands::Sets) => {
            essaymark::cli::sets::run_sets();
            return Ok(());
        }
        Some(Commands::Serve { port }) => {
            return essaymark::cli::serve::run_serve(&config, port).await;
        }
        None => {}
    }

    // Default: score the essay given on the command line / stdin
    let essay = build_essay_input(&cli)?;
    essaymark::cli::score::run_score(&essay, cli.set, &config, cli.features, !cli.no_feedback)
}

/// Build the essay text from CLI args and/or stdin.
///
/// Supports three modes:
/// 1. `essaymark "essay text..."` — positional args only
/// 2. `essaymark --stdin < essay.txt` — explicit stdin read
/// 3. `cat essay.txt | essaymark` — auto-detected piped stdin; positional
///    args, if any, become the opening paragraph
fn build_essay_input(cli: &Cli) -> anyhow::Result<String> {
    use std::io::IsTerminal;

    let has_args = !cli.essay.is_empty();
    let stdin_is_pipe = !std::io::stdin().is_terminal();

    if cli.stdin || stdin_is_pipe {
        let content = read_stdin()?;
        if has_args {
            Ok(format!("{}\n\n{}", cli.essay.join(" "), content))
        } else {
            Ok(content)
        }
    } else if has_args {
        Ok(cli.essay.join(" "))
    } else {
        eprintln!("Usage: essaymark <essay text> or essaymark --stdin < essay.txt");
        eprintln!("Run essaymark --help for all options.");
        std::process::exit(1);
    }
}

/// Read the essay from stdin (for piped input).
fn read_stdin() -> anyhow::Result<String> {
    use std::io::Read;
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        anyhow::bail!("No input received on stdin");
    }
    Ok(buf)
}
