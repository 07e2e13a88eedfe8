mod logic;
mod realtime;
mod scenario;
mod storage;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use dreamstory_game::{GameEngine, MemoryStorage};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use logic::{GameTester, GameplayStrategy, LogicTester, TesterAssets};
use realtime::{RealtimeOptions, run_realtime_session};
use scenario::{SCENARIO_KEYS, get_scenario, list_scenarios};
use storage::{BundledLoader, FileStorage};
use util::split_csv;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Headless scenario sweeps (fast, no pacing)
    Logic,
    /// One session paced by the real-time driver
    Realtime,
    /// Run both logic and real-time tests
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "dreamstory-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for Dream Story - logic sweeps and real-time runs")]
struct Args {
    /// Test mode: logic (fast), realtime (paced), or both
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario (logic mode only)
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Override the number of simulated days for every scenario
    #[arg(long)]
    days: Option<u32>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding `session.json` overrides
    #[arg(long)]
    config_dir: Option<PathBuf>,

    // Real-time options
    /// Game ticks to drive in real-time mode
    #[arg(long, default_value_t = 96)]
    realtime_ticks: u64,

    /// Wall-clock milliseconds per game tick in real-time mode
    #[arg(long, default_value_t = 25)]
    tick_ms: u64,

    /// Player strategy for the real-time session
    #[arg(long, value_enum, default_value_t = GameplayStrategy::Balanced)]
    strategy: GameplayStrategy,

    /// Keep the real-time save slot in this directory (in memory otherwise)
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let loader = build_loader(&args);
    let tester_assets =
        Arc::new(TesterAssets::from_loader(&loader).context("loading tester assets")?);
    let game_tester = GameTester::new(tester_assets, args.verbose);

    let mut all_results = run_logic_scenarios(&args, &scenarios, &seeds, &game_tester);
    all_results.extend(run_realtime(&args, loader, &seeds).await?);

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Dream Story Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.contains(&"all".to_string()) {
        scenarios.retain(|s| s != "all");
        for key in SCENARIO_KEYS {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(seeds_arg)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(!seeds.is_empty(), "at least one seed is required");
    Ok(seeds)
}

fn build_loader(args: &Args) -> BundledLoader {
    match &args.config_dir {
        Some(dir) => BundledLoader::with_config_dir(dir),
        None => BundledLoader::new(),
    }
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    logic_seeds: &[u64],
    game_tester: &GameTester,
) -> Vec<logic::ScenarioResult> {
    let mut results: Vec<logic::ScenarioResult> = Vec::new();
    if !matches!(args.mode, TestMode::Logic | TestMode::Both) {
        return results;
    }

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(game_tester.clone(), args.verbose);

    for scenario_name in scenarios {
        if let Some(mut scenario) = get_scenario(scenario_name) {
            if let Some(days) = args.days {
                scenario.plan = scenario.plan.with_days(days);
            }
            let scenario_results =
                logic_tester.run_scenario(&scenario, logic_seeds, args.iterations);
            results.extend(scenario_results);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

async fn run_realtime(
    args: &Args,
    loader: BundledLoader,
    seeds: &[u64],
) -> Result<Vec<logic::ScenarioResult>> {
    if !matches!(args.mode, TestMode::Realtime | TestMode::Both) {
        return Ok(Vec::new());
    }

    println!("{}", "⏱️  Running Real-time Session".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let options = RealtimeOptions {
        seed: seeds.first().copied().unwrap_or(1337),
        ticks: args.realtime_ticks,
        period: Duration::from_millis(args.tick_ms),
        strategy: args.strategy,
        verbose: args.verbose,
    };

    let result = if let Some(dir) = &args.save_dir {
        let storage = FileStorage::new(dir)
            .with_context(|| format!("opening save directory {}", dir.display()))?;
        run_realtime_session(&GameEngine::new(loader, storage), &options).await?
    } else {
        run_realtime_session(&GameEngine::new(loader, MemoryStorage::new()), &options).await?
    };
    Ok(vec![result])
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Dream Story Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
        }
    }

    if args.report != "json" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
