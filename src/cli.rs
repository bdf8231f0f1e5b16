use std::path::PathBuf;
use std::thread;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::combat::DuelSimulator;
use crate::config::RunConfig;
use crate::data::rankings_io::write_report;
use crate::data::DataRegistry;
use crate::error::{MetarankError, Result};
use crate::parallel::Progress;
use crate::ranking::{RankingPipeline, RankingRequest, Scenario};

#[derive(Debug, Parser)]
#[command(name = "metarank")]
#[command(about = "Rank every eligible contestant of a cup across tactical scenarios", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DataArgs {
    /// YAML run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Game master JSON (overrides config and METARANK_GAMEMASTER)
    #[arg(long)]
    pub gamemaster: Option<PathBuf>,

    /// Prior rankings directory used for moveset seeding
    #[arg(long)]
    pub rankings: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the ranking pipeline and write every list
    Rank {
        /// Cup name
        #[arg(long)]
        cup: String,

        /// Combat-power cap (500, 1500, 2500, 10000)
        #[arg(long)]
        cap: u32,

        /// Scenario to run; repeat for several. Defaults to all five.
        #[arg(long = "scenario")]
        scenarios: Vec<Scenario>,

        /// Use the full custom-roster solver schedule
        #[arg(long)]
        custom: bool,

        #[command(flatten)]
        data: DataArgs,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Worker threads (0 = all cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Also export a CSV summary per list
        #[arg(long)]
        csv: bool,
    },

    /// Print the eligible roster for a cup and cap
    Roster {
        #[arg(long)]
        cup: String,

        #[arg(long)]
        cap: u32,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Print the scenario table
    Scenarios,
}

#[derive(Debug, Serialize)]
struct ScenarioRow {
    scenario: Scenario,
    shields: [u8; 2],
    energy_turns: [u32; 2],
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 2,
            };
        }
    };

    let outcome = match cli.command {
        Command::Rank {
            cup,
            cap,
            scenarios,
            custom,
            data,
            out,
            workers,
            csv,
        } => {
            let request = RankingRequest {
                cup,
                cap,
                scenarios: if scenarios.is_empty() {
                    Scenario::ALL.to_vec()
                } else {
                    scenarios
                },
                custom,
            };
            handle_rank(&request, &data, out, workers, csv)
        }
        Command::Roster { cup, cap, data } => handle_roster(&cup, cap, &data),
        Command::Scenarios => handle_scenarios(),
    };

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            exit_code(&err)
        }
    }
}

fn exit_code(err: &MetarankError) -> i32 {
    if err.is_usage_error() {
        2
    } else {
        1
    }
}

fn load_config(data: &DataArgs) -> Result<RunConfig> {
    let mut config = RunConfig::load(data.config.as_deref())?;
    if let Some(path) = &data.gamemaster {
        config.gamemaster_path = path.clone();
    }
    if let Some(dir) = &data.rankings {
        config.rankings_dir = Some(dir.clone());
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_rank(
    request: &RankingRequest,
    data: &DataArgs,
    out: Option<PathBuf>,
    workers: Option<usize>,
    csv: bool,
) -> Result<()> {
    let mut config = load_config(data)?;
    if let Some(out) = out {
        config.output_dir = out;
    }
    if let Some(workers) = workers {
        config.workers = workers;
    }
    config.export_csv |= csv;
    config.validate()?;

    let registry = DataRegistry::load(&config.gamemaster_path)?;
    let resolver = DuelSimulator::default();

    let (progress, events) = Progress::channel();
    let listener = thread::spawn(move || {
        for event in events {
            debug!(scenario = %event.scenario, done = event.done, total = event.total, "progress");
        }
    });

    let report = RankingPipeline::new(&registry, &resolver, &config)
        .with_progress(progress)
        .run(request);
    let _ = listener.join();

    let manifest = write_report(&config.output_dir, &report?, config.export_csv)?;
    print_json(&manifest)
}

fn handle_roster(cup: &str, cap: u32, data: &DataArgs) -> Result<()> {
    let config = load_config(data)?;
    let registry = DataRegistry::load(&config.gamemaster_path)?;
    let resolver = DuelSimulator::default();
    let roster = RankingPipeline::new(&registry, &resolver, &config)
        .build_roster(&RankingRequest::new(cup, cap))?;
    print_json(&roster.summaries())
}

fn handle_scenarios() -> Result<()> {
    let rows: Vec<ScenarioRow> = Scenario::ALL
        .into_iter()
        .map(|scenario| ScenarioRow {
            scenario,
            shields: scenario.shields(),
            energy_turns: scenario.energy_turns(),
        })
        .collect();
    print_json(&rows)
}
