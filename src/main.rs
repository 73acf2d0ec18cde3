//! pagefold CLI: outline compression for page snapshots.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use pagefold::engine::{CompressConfig, Compressor};

#[derive(Parser)]
#[command(name = "pagefold", version, about = "Outline compression engine")]
struct Cli {
    /// Advisory cap on rendered output lines.
    #[arg(long, global = true, default_value = "200")]
    max_lines: usize,

    /// Minimum run length considered a foldable list.
    #[arg(long, global = true, default_value = "3")]
    min_group: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an outline document.
    Compress {
        /// Outline file to read; stdin when omitted.
        file: Option<PathBuf>,

        /// Emit the structured result (text, counts, folds) as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show pipeline statistics for an outline document.
    Stats {
        /// Outline file to read; stdin when omitted.
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let compressor = Compressor::new(CompressConfig {
        max_lines: cli.max_lines,
        min_group: cli.min_group,
    })
    .into_diagnostic()?;

    match cli.command {
        Commands::Compress { file, json } => {
            let text = read_input(file)?;
            let outline = compressor.compress(&text).into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outline).into_diagnostic()?
                );
            } else {
                print!("{}", outline.text);
            }
        }
        Commands::Stats { file } => {
            let text = read_input(file)?;
            let stats = compressor.stats(&text).into_diagnostic()?;
            println!("Original lines:     {}", stats.original_lines);
            println!("Rendered lines:     {}", stats.rendered_lines);
            println!("Retained nodes:     {}", stats.retained_nodes);
            println!("Wrappers removed:   {}", stats.wrappers_removed);
            println!("Wrappers collapsed: {}", stats.wrappers_collapsed);
            println!("List patterns:      {}", stats.patterns);
            println!("Folded elements:    {}", stats.folded_elements);
            println!(
                "Compression:        {:.1}%",
                stats.compression_ratio * 100.0
            );
        }
    }

    Ok(())
}

/// Read the outline from a file, or stdin when no file was given.
fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path).into_diagnostic(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()?;
            Ok(text)
        }
    }
}
