use clap::Parser;
use morphogen_io::history::{read_events, HistoryEvent};
use morphogen_data::PopulationStats;
use std::fmt::Write as _;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarize a Morphogen history log", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "runs/latest/history.jsonl")]
    history: String,

    #[arg(short, long, default_value = "report.md")]
    output: String,

    /// Rows in the fitness table
    #[arg(long, default_value_t = 20)]
    rows: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Analyzing Morphogen run history...");

    let events = read_events(&args.history)?;
    let mut seed = None;
    let mut checkpoints = 0;
    let mut generations: Vec<PopulationStats> = Vec::new();
    for event in events {
        match event {
            HistoryEvent::RunStarted { seed: s, .. } => seed = Some(s),
            HistoryEvent::Generation { stats, .. } => generations.push(stats),
            HistoryEvent::Checkpoint { .. } => checkpoints += 1,
        }
    }

    if generations.is_empty() {
        anyhow::bail!("no generation records in {}", args.history);
    }

    let best_ever = generations
        .iter()
        .filter(|s| s.best_fitness.is_finite())
        .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness));
    let last = &generations[generations.len() - 1];
    let stagnant = stagnant_tail(&generations);

    let mut report = String::from("# Morphogen Run Report\n\n");
    writeln!(report, "## Summary")?;
    if let Some(seed) = seed {
        writeln!(report, "- **Seed**: {seed}")?;
    }
    writeln!(report, "- **Generations Logged**: {}", generations.len())?;
    writeln!(report, "- **Checkpoints**: {checkpoints}")?;
    if let Some(best) = best_ever {
        writeln!(
            report,
            "- **Best Fitness**: {:.4} (generation {})",
            best.best_fitness, best.generation
        )?;
    }
    writeln!(report, "- **Final Average Fitness**: {:.4}", last.avg_fitness)?;
    writeln!(report, "- **Final Species Count**: {}", last.species_count)?;
    writeln!(
        report,
        "- **Final Body Size**: {:.2} nodes / {:.2} muscles",
        last.avg_nodes, last.avg_muscles
    )?;
    writeln!(report, "- **Generations Since Improvement**: {stagnant}")?;

    writeln!(report, "\n## Fitness Curve\n")?;
    writeln!(report, "| Generation | Best | Average | Median | Species | Connections |")?;
    writeln!(report, "|---|---|---|---|---|---|")?;
    let step = generations.len().div_ceil(args.rows.max(1)).max(1);
    for s in generations.iter().step_by(step) {
        writeln!(
            report,
            "| {} | {:.4} | {:.4} | {:.4} | {} | {:.1} |",
            s.generation, s.best_fitness, s.avg_fitness, s.median_fitness, s.species_count, s.avg_connections
        )?;
    }

    std::fs::write(&args.output, report)?;
    println!("Report written to {}", args.output);
    Ok(())
}

/// Generations at the end of the log without a new best score.
fn stagnant_tail(generations: &[PopulationStats]) -> usize {
    let mut best = f64::NEG_INFINITY;
    let mut since = 0;
    for s in generations {
        if s.best_fitness > best {
            best = s.best_fitness;
            since = 0;
        } else {
            since += 1;
        }
    }
    since
}
