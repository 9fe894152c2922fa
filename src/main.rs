use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jet_golden::suite::{build_all, register_all};
use jet_golden::{run_tests, HarnessConfig, SuiteSpec};

#[derive(Parser, Debug)]
#[command(author, version, about = "golden-output test harness for the jet interpreter", long_about = None)]
struct Cli {
    #[command(flatten)]
    harness: HarnessArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct HarnessArgs {
    /// Target command (overrides JET_TEST_EXE; defaults to `jet`)
    #[arg(long, global = true)]
    exe: Option<String>,
    /// Extra argument passed to the target after the fixture path (repeatable)
    #[arg(long = "exe-arg", global = true, allow_hyphen_values = true)]
    exe_args: Vec<String>,
    /// Kill the target and fail the test after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Also fail tests whose target exits with a non-zero status
    #[arg(long, global = true, default_value_t = false)]
    fail_on_exit_code: bool,
    /// Directory suite names are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Suite as NAME (fixtures in ROOT/NAME) or NAME=DIR; defaults to atoms, let, functions, forms
    #[arg(long = "suite", global = true)]
    suites: Vec<String>,
    /// Log debug details to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the fixture tests (default)
    Run {
        /// Only run tests whose name contains this filter
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Print the registered test names without running them
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.harness.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run { filter: None });
    let args = cli.harness;

    let specs = suite_specs(&args)?;
    let suites = build_all(&specs).context("building test suites")?;
    let config = Arc::new(
        HarnessConfig::resolve(args.exe.as_deref())
            .with_extra_args(&args.exe_args)
            .with_timeout(args.timeout_ms.map(Duration::from_millis))
            .with_fail_on_nonzero_exit(args.fail_on_exit_code),
    );
    let tests = register_all(&suites, &config);

    match command {
        Commands::List => {
            let mut stdout = io::stdout().lock();
            for test in &tests {
                writeln!(stdout, "{}", test.full_name())?;
            }
            Ok(())
        }
        Commands::Run { filter } => {
            let mut stdout = io::stdout().lock();
            let report = run_tests(&tests, filter.as_deref(), args.verbose, &mut stdout)?;
            stdout.flush()?;
            if !report.success() {
                bail!(
                    "{} failed, {} could not run",
                    report.failed,
                    report.errored
                );
            }
            Ok(())
        }
    }
}

fn suite_specs(args: &HarnessArgs) -> Result<Vec<SuiteSpec>> {
    if args.suites.is_empty() {
        return Ok(SuiteSpec::defaults(&args.root));
    }
    args.suites
        .iter()
        .map(|s| SuiteSpec::parse(s, &args.root).map_err(anyhow::Error::msg))
        .collect()
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
