//! Snapshot Inspector Binary
//!
//! Loads a .dmc frame snapshot and reports hulls, rankings,
//! dominance and sensitivity for one criterion.

use clap::Parser;
use colored::Colorize;
use dilemma::api::engine::Engine;

#[derive(Parser)]
#[command(about = "inspect a decision frame snapshot")]
struct Args {
    /// path to the .dmc snapshot
    path: std::path::PathBuf,
    /// criterion to report on, 0 for the aggregate
    #[arg(long, default_value_t = 1)]
    crit: i32,
    /// emit the report as json instead of text
    #[arg(long)]
    json: bool,
    /// include the value tornado
    #[arg(long)]
    tornado: bool,
}

fn main() -> anyhow::Result<()> {
    dilemma::init();
    let args = Args::parse();
    let (frame, skipped) = dilemma::save::dmc::load(&args.path)?;
    if skipped > 0 {
        log::warn!("{} statements no longer fit and were skipped", skipped);
    }
    let mut engine = Engine::init();
    let fx = engine.adopt(frame)?;
    engine.load(fx)?;
    let report = engine.report(args.crit)?;
    match args.json {
        true => println!("{}", serde_json::to_string_pretty(&report)?),
        false => narrate(&mut engine, &report, args.crit, args.tornado)?,
    }
    engine.unload()?;
    engine.dispose(fx)?;
    engine.exit()?;
    Ok(())
}

fn narrate(
    engine: &mut Engine,
    report: &dilemma::api::report::Report,
    crit: i32,
    tornado: bool,
) -> anyhow::Result<()> {
    println!(
        "{} {} ({}), criterion {}",
        "frame".bold(),
        report.frame.cyan(),
        report.kind,
        crit
    );
    for standing in report.standings.iter() {
        let bracket = format!(
            "[{:>6.3}, {:>6.3}, {:>6.3}]",
            standing.lo, standing.mid, standing.up
        );
        let label = format!("A{}", standing.alt);
        let lead = match standing.rank {
            1 => label.as_str().green().bold(),
            _ => label.as_str().normal(),
        };
        println!(
            "  {} rank {} {} mean {:.4} var {:.5}",
            lead, standing.rank, bracket, standing.mean, standing.variance
        );
    }
    println!("{}", "dominance".bold());
    for row in report.dominance.iter() {
        let line = row
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {}", line);
    }
    if tornado {
        println!("{}", "value tornado".bold());
        for (alt, row) in engine.get_v_tornado(crit, 0)?.iter().enumerate() {
            for (cons, (lo, up)) in row.iter().enumerate() {
                println!(
                    "  A{} V{}.{} {:>8.4} {:>8.4}",
                    alt + 1,
                    alt + 1,
                    cons + 1,
                    lo,
                    up
                );
            }
        }
    }
    Ok(())
}
