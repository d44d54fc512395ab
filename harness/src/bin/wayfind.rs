//! `wayfind`: run search problems from the command line.
//!
//! # Commands
//!
//! - `wayfind graph <FILE>`: path search on a `graph_problem.v1` file
//! - `wayfind and-or <FILE>`: AO* on an `and_or_problem.v1` file
//! - `wayfind csp <FILE>`: backtracking on a `csp_problem.v1` file
//! - `wayfind world <NAME>`: run a bundled sample world
//! - `wayfind verify <DIR>`: verify a bundle directory
//!
//! Run commands print the canonical run report to stdout. Logs go to
//! stderr, filtered by `RUST_LOG` (default `warn`) or `-v` flags.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use wayfind_harness::bundle_dir::{verify_bundle_dir, write_bundle_dir};
use wayfind_harness::problem::{ProblemKind, ProblemV1};
use wayfind_harness::runner::{run_problem, GraphAlgorithm, RunConfig, RunOutput};
use wayfind_harness::worlds::World;
use wayfind_search::csp::{Backtracking, CspOptions, ValueOrder, VariableOrder};
use wayfind_search::SearchPolicyV1;

#[derive(Parser)]
#[command(name = "wayfind")]
#[command(version)]
#[command(about = "Graph search, AND-OR search and constraint satisfaction")]
struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Path search on a graph problem file
    Graph {
        file: PathBuf,
        #[command(flatten)]
        algorithm: GraphArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// AO* on an AND-OR problem file
    AndOr {
        file: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Backtracking search on a CSP problem file
    Csp {
        file: PathBuf,
        #[command(flatten)]
        csp: CspArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run a bundled sample world
    World {
        /// One of: romania, maze, australia, queens, dinner
        name: World,
        #[command(flatten)]
        algorithm: GraphArgs,
        #[command(flatten)]
        csp: CspArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Verify a bundle directory written with --bundle-dir
    Verify { dir: PathBuf },
}

#[derive(Args)]
struct GraphArgs {
    /// bfs, ucs, dfs, iddfs, bidirectional, a-star or greedy
    #[arg(long, default_value_t = GraphAlgorithm::AStar)]
    strategy: GraphAlgorithm,
}

#[derive(Args)]
struct CspArgs {
    #[arg(long, value_enum, default_value_t = BacktrackingArg::Cbj)]
    backtracking: BacktrackingArg,
    #[arg(long, value_enum, default_value_t = VariableOrderArg::Mrv)]
    variable_order: VariableOrderArg,
    #[arg(long, value_enum, default_value_t = ValueOrderArg::Lcv)]
    value_order: ValueOrderArg,
}

#[derive(Args)]
struct RunArgs {
    /// Stop after this many expansions (value trials for CSPs)
    #[arg(long)]
    max_expansions: Option<u64>,
    /// Stop after generating this many nodes
    #[arg(long)]
    max_generated: Option<u64>,
    /// Depth limit for dfs and iddfs
    #[arg(long)]
    max_depth: Option<u32>,
    /// Wall-clock limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Record the expansion / assignment trace
    #[arg(long)]
    trace: bool,
    /// Also write a verifiable bundle to this directory
    #[arg(long)]
    bundle_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BacktrackingArg {
    Cbj,
    Chronological,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariableOrderArg {
    Mrv,
    Static,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueOrderArg {
    Lcv,
    Domain,
}

impl RunArgs {
    fn policy(&self) -> SearchPolicyV1 {
        SearchPolicyV1 {
            max_expansions: self.max_expansions,
            max_generated: self.max_generated,
            max_depth: self.max_depth,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            record_trace: self.trace,
        }
    }
}

impl CspArgs {
    fn options(&self) -> CspOptions {
        CspOptions {
            backtracking: match self.backtracking {
                BacktrackingArg::Cbj => Backtracking::ConflictDirected,
                BacktrackingArg::Chronological => Backtracking::Chronological,
            },
            variable_order: match self.variable_order {
                VariableOrderArg::Mrv => VariableOrder::Mrv,
                VariableOrderArg::Static => VariableOrder::Static,
            },
            value_order: match self.value_order {
                ValueOrderArg::Lcv => ValueOrder::Lcv,
                ValueOrderArg::Domain => ValueOrder::Domain,
            },
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Graph { file, algorithm, run } => {
            let problem = load(&file, ProblemKind::Graph)?;
            let config = RunConfig {
                graph_algorithm: algorithm.strategy,
                policy: run.policy(),
                ..RunConfig::default()
            };
            execute(&problem, &config, &run)
        }
        Command::AndOr { file, run } => {
            let problem = load(&file, ProblemKind::AndOr)?;
            let config = RunConfig {
                policy: run.policy(),
                ..RunConfig::default()
            };
            execute(&problem, &config, &run)
        }
        Command::Csp { file, csp, run } => {
            let problem = load(&file, ProblemKind::Csp)?;
            let config = RunConfig {
                csp: csp.options(),
                policy: run.policy(),
                ..RunConfig::default()
            };
            execute(&problem, &config, &run)
        }
        Command::World {
            name,
            algorithm,
            csp,
            run,
        } => {
            let problem = name.problem().with_context(|| format!("building world {name}"))?;
            let config = RunConfig {
                graph_algorithm: algorithm.strategy,
                csp: csp.options(),
                policy: run.policy(),
            };
            execute(&problem, &config, &run)
        }
        Command::Verify { dir } => {
            let bundle = verify_bundle_dir(&dir).with_context(|| format!("verifying {}", dir.display()))?;
            println!("ok {}", bundle.digest);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: &Path, kind: ProblemKind) -> anyhow::Result<ProblemV1> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let problem = ProblemV1::from_json(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    problem.expect_kind(kind)?;
    Ok(problem)
}

/// Exit status: 0 solved, 1 no solution, 2 budget exhausted.
fn execute(problem: &ProblemV1, config: &RunConfig, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let output = run_problem(problem, config)?;
    tracing::info!(status = output.status, report_digest = %output.report_digest(), "report ready");
    if let Some(dir) = &args.bundle_dir {
        write_output_bundle(&output, dir)?;
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output.report)?;
    writeln!(stdout)?;

    Ok(match output.status {
        "solved" => ExitCode::SUCCESS,
        "no_solution" => ExitCode::from(1),
        _ => ExitCode::from(2),
    })
}

fn write_output_bundle(output: &RunOutput, dir: &Path) -> anyhow::Result<()> {
    let bundle = output.to_bundle()?;
    write_bundle_dir(&bundle, dir).with_context(|| format!("writing bundle to {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), digest = %bundle.digest, "bundle written");
    Ok(())
}
