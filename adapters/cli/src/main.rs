#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Waypoint Defence headlessly.

mod placement;
mod report;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use waypoint_defence_core::LevelIndex;
use waypoint_defence_system_simulation::Simulation;
use waypoint_defence_world::query;

use placement::TowerPlacement;
use report::{Outcome, RunReport};

/// Headless runner for Waypoint Defence levels.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version)]
struct Cli {
    /// Log every spawn, shot and kill.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Simulates levels with scripted towers and prints a summary.
    Run(RunArgs),
    /// Validates a configuration and lists its levels.
    Levels(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// TOML configuration file; built-in levels are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// One-based level to start from.
    #[arg(short, long, default_value_t = 1)]
    level: usize,
    /// Maximum number of ticks to simulate.
    #[arg(short, long, default_value_t = 36_000)]
    ticks: u64,
    /// Overrides the random seed of the configuration.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Tower built at the start of every level, as KIND@X,Y.
    #[arg(long = "tower", value_name = "KIND@X,Y")]
    towers: Vec<TowerPlacement>,
    /// Continues with the next level whenever one is completed.
    #[arg(long)]
    auto_advance: bool,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        CliCommand::Run(args) => {
            let report = run(&args)?;
            println!("{report}");
        }
        CliCommand::Levels(args) => list_levels(&args)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_levels(args: &ConfigArgs) -> Result<()> {
    let config = settings::load(args.config.as_deref(), None)?;
    for (index, level) in config.levels.iter().enumerate() {
        let enemies: u32 = level.waves.iter().map(|wave| wave.count).sum();
        println!(
            "level {}: {} waypoints, {} waves, {} enemies",
            index + 1,
            level.path.len(),
            level.waves.len(),
            enemies
        );
    }
    Ok(())
}

fn run(args: &RunArgs) -> Result<RunReport> {
    let config = settings::load(args.config.config.as_deref(), args.seed)?;
    let mut simulation = Simulation::new(config).context("failed to start the simulation")?;
    println!("{}", query::welcome_banner(simulation.world()));

    let first_level = LevelIndex::new(args.level.saturating_sub(1));
    if first_level != LevelIndex::FIRST {
        // Forget the implicit start of the first level.
        let _ = simulation.drain_events();
        simulation
            .start_level(first_level)
            .with_context(|| format!("cannot start level {}", args.level))?;
    }
    place_towers(&mut simulation, &args.towers);

    let mut report = RunReport::default();
    report.record(&simulation.drain_events());
    while report.ticks < args.ticks {
        let events = simulation.tick();
        report.ticks += 1;
        report.record(&events);

        if simulation.defeated() {
            report.outcome = Outcome::Defeated;
            break;
        }
        if !simulation.waves_cleared() {
            continue;
        }
        if !simulation.level_complete() {
            report.outcome = Outcome::Victory;
            break;
        }
        if !args.auto_advance {
            report.outcome = Outcome::LevelComplete;
            break;
        }

        simulation
            .advance_level()
            .context("failed to advance to the next level")?;
        info!(level = simulation.level().get() + 1, "advancing");
        place_towers(&mut simulation, &args.towers);
        report.record(&simulation.drain_events());
    }

    let player = query::player(simulation.world());
    report.money = player.money();
    report.lives = player.lives();
    Ok(report)
}

fn place_towers(simulation: &mut Simulation, towers: &[TowerPlacement]) {
    for placement in towers {
        match simulation.place_tower(placement.kind, placement.position) {
            Ok(tower) => info!(
                tower = tower.get(),
                kind = ?placement.kind,
                x = placement.position.x,
                y = placement.position.y,
                "scripted tower built"
            ),
            Err(error) => warn!(kind = ?placement.kind, %error, "scripted tower skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_arguments_parse_towers() {
        let cli = parse(&[
            "waypoint-defence",
            "run",
            "--ticks",
            "120",
            "--tower",
            "basic@10,20",
            "--tower",
            "sniper@30,40",
            "--auto-advance",
        ]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.ticks, 120);
        assert_eq!(args.towers.len(), 2);
        assert!(args.auto_advance);
        assert_eq!(args.level, 1);
    }

    #[test]
    fn malformed_tower_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["waypoint-defence", "run", "--tower", "basic"]).is_err());
    }

    #[test]
    fn short_run_stops_at_the_tick_budget() {
        let cli = parse(&["waypoint-defence", "run", "--ticks", "90", "--seed", "3"]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        let report = run(&args).expect("run succeeds");
        assert_eq!(report.ticks, 90);
        assert_eq!(report.outcome, Outcome::OutOfTicks);
        assert_eq!(report.spawned, 1);
        assert_eq!(report.lives, 10);
    }

    #[test]
    fn undefended_final_level_is_survived_with_lives_lost() {
        let cli = parse(&["waypoint-defence", "run", "--level", "2", "--auto-advance"]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        let report = run(&args).expect("run succeeds");
        assert_eq!(report.levels_started, vec![LevelIndex::new(1)]);
        assert_eq!(report.escaped, 8);
        assert_eq!(report.outcome, Outcome::Victory);
        assert_eq!(report.lives, 2);
    }

    #[test]
    fn unknown_level_is_an_error() {
        let cli = parse(&["waypoint-defence", "run", "--level", "9"]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert!(run(&args).is_err());
    }
}
