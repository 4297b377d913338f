//! Drop simulator CLI.
//!
//! Estimate how many runs it takes to collect every wanted item.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                                # Three items at 1/3, two wanted
//!   cargo run --bin simulate -- -i 0.9 -i 0.1:wanted -n 60  # One rare wanted drop
//!   cargo run --bin simulate -- --seed 42                   # Reproducible run

use droprate::build_info::version_string;
use droprate::logging::init_logging;
use droprate::simulator::{run_simulation, SimConfig};
use droprate::{Category, ConfigError, SimError};
use std::env;
use std::process::ExitCode;

struct CliOptions {
    config: SimConfig,
    json: bool,
    csv_path: Option<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    init_logging(options.config.verbosity);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CliOptions) -> Result<(), SimError> {
    let config = &options.config;

    if config.verbosity > 0 {
        println!("╔═══════════════════════════════════════════════════════════════╗");
        println!("║                  DROP RATE SIMULATOR                          ║");
        println!("╚═══════════════════════════════════════════════════════════════╝");
        println!();
        println!("Configuration:");
        println!("  Items:          {}", config.categories.len());
        println!("  Max Runs:       {}", config.max_runs);
        println!("  Repetitions:    {}", config.repetitions);
        if config.parallel {
            println!("  Parallel:       chunks of {}", config.chunk_size);
        }
        if let Some(seed) = config.seed {
            println!("  Seed:           {}", seed);
        }
        println!();
        println!("Running simulation...");
        println!();
    }

    let report = run_simulation(config)?;

    println!("{}", report.to_text());

    if let Some(path) = &options.csv_path {
        std::fs::write(path, report.to_csv())?;
        println!("CSV saved to: {}", path);
    }

    if options.json {
        let filename = format!(
            "drop_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, report.to_json()?)?;
        println!("JSON report saved to: {}", filename);
    }

    Ok(())
}

/// `Ok(None)` means help or version was printed and there is nothing to run.
fn parse_args(args: &[String]) -> Result<Option<CliOptions>, SimError> {
    let mut config = SimConfig::default();
    let mut items: Vec<Category> = Vec::new();
    let mut json = false;
    let mut csv_path = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();

        match flag {
            "-n" | "--runs" => {
                config.max_runs = parse_number(flag, take_value(args, &mut i, flag)?)?;
            }
            "-r" | "--repetitions" => {
                config.repetitions = parse_number(flag, take_value(args, &mut i, flag)?)?;
            }
            "-s" | "--seed" => {
                config.seed = Some(parse_number(flag, take_value(args, &mut i, flag)?)?);
            }
            "-i" | "--item" => {
                items.push(Category::parse(take_value(args, &mut i, flag)?)?);
            }
            "-c" | "--config" => {
                // Flags given before --config are overwritten by the file
                config = SimConfig::from_json_file(take_value(args, &mut i, flag)?)?;
            }
            "--parallel" => config.parallel = true,
            "--chunk" => {
                config.chunk_size = parse_number(flag, take_value(args, &mut i, flag)?)?;
            }
            "--threads" => {
                config.threads = Some(parse_number(flag, take_value(args, &mut i, flag)?)?);
                config.parallel = true;
            }
            "--csv" => csv_path = Some(take_value(args, &mut i, flag)?.to_string()),
            "--json" => json = true,
            "--quick" => config.repetitions = SimConfig::quick().repetitions,
            "--precise" => {
                let precise = SimConfig::precise();
                config.repetitions = precise.repetitions;
                config.parallel = precise.parallel;
            }
            "-v" | "--verbose" => config.verbosity = 2,
            "-q" | "--quiet" => config.verbosity = 0,
            "-V" | "--version" => {
                println!("{}", version_string());
                return Ok(None);
            }
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            other => return Err(usage_error(other, "unknown argument")),
        }
        i += 1;
    }

    if !items.is_empty() {
        config.categories = items;
    }
    config.validate()?;

    Ok(Some(CliOptions {
        config,
        json,
        csv_path,
    }))
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, SimError> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| usage_error(flag, "requires a value"))
}

fn parse_number<T: std::str::FromStr>(flag: &str, text: &str) -> Result<T, SimError> {
    text.parse()
        .map_err(|_| usage_error(flag, &format!("expects a number, got '{text}'")))
}

fn usage_error(flag: &str, reason: &str) -> SimError {
    SimError::Config(ConfigError::InvalidArgument {
        flag: flag.to_string(),
        reason: reason.to_string(),
    })
}

fn print_help() {
    println!("Drop Rate Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -i, --item <SPEC>        Add an item: PROB[:wanted][:LABEL], e.g. 1/3:wanted:Sword");
    println!("                             (repeat for each item; probabilities must sum to 1)");
    println!("    -n, --runs <N>           Max runs per repetition (default: 50)");
    println!("    -r, --repetitions <N>    Independent repetitions (default: 10000)");
    println!("    -s, --seed <S>           Random seed for reproducibility");
    println!("    -c, --config <FILE>      Load a JSON config");
    println!("    --parallel               Spread repetitions across threads");
    println!("    --threads <N>            Worker threads (implies --parallel)");
    println!("    --chunk <N>              Repetitions per parallel chunk (default: 1024)");
    println!("    --csv <FILE>             Write run,exact,cumulative rows as CSV");
    println!("    --json                   Save JSON report");
    println!("    --quick                  Quick run (1000 repetitions)");
    println!("    --precise                Precise run (100000 repetitions, parallel)");
    println!("    -v, --verbose            Debug logging");
    println!("    -q, --quiet              Only the report");
    println!("    -V, --version            Show version");
    println!("    -h, --help               Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --bin simulate                                 # Default table");
    println!("    cargo run --bin simulate -- -i 0.9 -i 0.1:wanted -n 60   # One rare drop");
    println!("    cargo run --bin simulate -- --precise --seed 7           # Reproducible, parallel");
}
