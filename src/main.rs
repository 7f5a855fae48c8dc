use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use scenario_report::config;
use scenario_report::events::{compile, parse_event_lines};
use scenario_report::model::ScenarioDetails;
use scenario_report::report::{CompilerOptions, derive_from};
use scenario_report::sink::{JsonFileSink, JsonWriterSink, ReportSink};

/// Scenario Report - compile per-scenario execution reports from lifecycle events
#[derive(Parser, Debug)]
#[command(
    name = "scenario-report",
    about = "Compile nested per-scenario execution reports from test lifecycle events",
    after_help = "ENVIRONMENT VARIABLES:\n\
        SCENARIO_REPORT_OUTPUT_DIR   Directory reports are written to\n\
        SCENARIO_REPORT_PRETTY       Pretty-print report JSON (true/false)\n\
        SCENARIO_REPORT_LOG          Default log filter (overridden by RUST_LOG)\n\
        SCENARIO_REPORT_STORY_TYPE   Value of userStory.type"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile one scenario report from a JSON-lines event file
    Compile {
        /// Event file, one JSON domain event per line
        #[arg(short, long)]
        events: PathBuf,

        /// Scenario name
        #[arg(short, long)]
        name: String,

        /// Story or feature the scenario belongs to
        #[arg(short, long)]
        category: String,

        /// Source location of the scenario
        #[arg(short, long, default_value = "")]
        path: String,

        /// Test runner name, recorded unless the events already name one
        #[arg(long)]
        runner: Option<String>,

        /// Output directory (default: SCENARIO_REPORT_OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Print the identifier derived from a name path
    Id {
        /// Name segments, outermost first (e.g., "Checkout" "Pay by card")
        #[arg(required = true)]
        segments: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Some(Commands::Compile {
            events,
            name,
            category,
            path,
            runner,
            output,
            stdout,
            compact,
        }) => {
            let text = std::fs::read_to_string(&events)
                .map_err(|e| format!("Failed to read events from {}: {}", events.display(), e))?;
            let mut parsed = parse_event_lines(&text)?;
            tracing::debug!(count = parsed.len(), file = %events.display(), "events parsed");

            if let Some(runner) = runner {
                parsed.insert(0, scenario_report::DomainEvent::ExecutedBy { name: runner });
            }

            let details = ScenarioDetails::new(name, category, path);
            let report = compile(details, CompilerOptions::default(), parsed)?;

            let pretty = !compact && config::get().output.pretty;
            if stdout {
                let mut sink = JsonWriterSink::new(std::io::stdout().lock(), pretty);
                sink.write(&report)?;
            } else {
                let dir = output.unwrap_or_else(config::output_dir);
                let mut sink = JsonFileSink::new(dir).pretty(pretty);
                sink.write(&report)?;

                println!("Compiled report: {}", sink.report_path(&report).display());
                println!(
                    "  Result: {}  Steps: {}",
                    report
                        .result
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "UNFINISHED".to_string()),
                    report.test_steps.len()
                );
            }
        }

        Some(Commands::Id { segments }) => {
            println!("{}", derive_from(&segments));
        }

        None => {
            println!("Scenario Report - compile per-scenario execution reports");
            println!();
            println!("Usage: scenario-report <COMMAND>");
            println!();
            println!("Commands:");
            println!("  compile  Compile one scenario report from a JSON-lines event file");
            println!("  id       Print the identifier derived from a name path");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the configured default filter
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
