use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chemgraph::*;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "chemgraph",
    about = "Adjacency-list tools for chemical structures",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Adjacency-list file (stdin if omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    input: Option<PathBuf>,

    /// Label line for the output (defaults to the input's label)
    #[arg(short, long, global = true)]
    label: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, env = "CHEMGRAPH_LOG", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Re-emit the adjacency list with atoms renumbered from 1
    Normalize,

    /// Infer specific atom types from each atom's bonds
    Types,

    /// List resonance isomers
    Resonance {
        /// Follow repeated shifts and drop duplicates instead of listing one-step isomers
        #[arg(long)]
        all: bool,
    },

    /// Print the molecular formula
    Formula,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let text = read_input(cli.input.as_ref())?;
    let mut structure = Structure::from_adjacency_list(&text)?;
    let label = cli
        .label
        .unwrap_or_else(|| text.lines().next().unwrap_or_default().to_string());
    info!("read {} atoms and {} bonds", structure.atom_count(), structure.bond_count());

    match cli.command {
        Command::Normalize => print!("{}", structure.to_adjacency_list(&label)),
        Command::Types => {
            let report = structure.update_atom_types()?;
            info!("{} atom types changed", report.changes.len());
            if !report.conflicts.is_empty() {
                warn!("{} atom types conflict with their bonds", report.conflicts.len());
            }
            print!("{}", structure.to_adjacency_list(&label));
        }
        Command::Resonance { all } => {
            let isomers = if all {
                structure.resonance_isomers()?
            } else {
                structure.get_adjacent_resonance_isomers()?
            };
            info!("{} resonance isomers", isomers.len());
            for (i, isomer) in isomers.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", isomer.to_adjacency_list(&label));
            }
        }
        Command::Formula => println!("{}", structure.formula()?),
    }
    Ok(())
}
