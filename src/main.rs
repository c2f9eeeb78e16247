use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use morphogen_core::contract::{handle_evolve_request, EvolveRequest};
use morphogen_core::metrics::init_logging;
use morphogen_core::EvolutionConfig;
use morphogen_io::{import_genome, read_json_file, write_json_file};
use morphogen_lib::{surrogate_evaluator, RunOptions, Runner};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a multi-generation experiment against the surrogate evaluator
    Run {
        /// TOML config file; defaults are used when absent
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value_t = 50)]
        generations: u32,

        /// Output directory for history, checkpoints and artifacts
        #[arg(short, long, default_value = "runs/latest")]
        out: PathBuf,

        /// Overrides the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Continue from a checkpoint instead of starting fresh
        #[arg(long)]
        resume: Option<PathBuf>,

        #[arg(long, default_value_t = 10)]
        checkpoint_every: u32,

        /// Write the final population as an rkyv snapshot
        #[arg(long)]
        snapshot: bool,
    },
    /// Evolve one generation from a JSON request file
    Evolve {
        #[arg(short, long)]
        request: PathBuf,

        #[arg(short, long, default_value = "response.json")]
        output: PathBuf,
    },
    /// Parse a genome (JSON or HexDNA) and report what normalization repaired
    Inspect { genome: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    match args.command {
        Command::Run {
            config,
            generations,
            out,
            seed,
            resume,
            checkpoint_every,
            snapshot,
        } => {
            let options = RunOptions {
                generations,
                out_dir: out,
                checkpoint_every,
                snapshot,
            };
            let mut runner = match resume {
                Some(checkpoint) => Runner::resume(&checkpoint, options)?,
                None => {
                    let mut config = match config {
                        Some(path) => EvolutionConfig::load(&path)
                            .with_context(|| format!("loading config {}", path.display()))?,
                        None => EvolutionConfig::default(),
                    };
                    if seed.is_some() {
                        config.seed = seed;
                    }
                    Runner::start(config, options)?
                }
            };
            let summary = runner.execute(&surrogate_evaluator())?;
            println!(
                "Reached generation {} (seed {}), best fitness {}",
                summary.generation,
                runner.run().seed(),
                summary
                    .best_fitness
                    .map_or_else(|| "n/a".to_string(), |b| format!("{b:.4}"))
            );
            if let Some(id) = summary.champion_id {
                println!("Champion: {id}");
            }
            println!("Checkpoint: {}", summary.checkpoint.display());
        }
        Command::Evolve { request, output } => {
            let request: EvolveRequest = read_json_file(&request)?;
            let response = handle_evolve_request(request)?;
            write_json_file(&response, &output)?;
            println!(
                "Generation {} written to {} ({} genomes)",
                response.generation,
                output.display(),
                response.genomes.len()
            );
        }
        Command::Inspect { genome } => {
            let text = std::fs::read_to_string(&genome)
                .with_context(|| format!("reading {}", genome.display()))?;
            let (parsed, report) = import_genome(&text)?;
            println!(
                "{}: {} nodes, {} muscles, controller {:?}",
                parsed.id,
                parsed.node_count(),
                parsed.muscle_count(),
                parsed.controller_kind()
            );
            if report.is_clean() {
                println!("No repairs needed");
            } else {
                println!("Repairs: {report:?}");
            }
        }
    }

    Ok(())
}
