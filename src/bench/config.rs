use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    List,
    Info,
    Shell,
    Check,
}

impl Mode {
    fn from_arg(s: &str) -> Self {
        match s {
            "list" => Mode::List,
            "info" => Mode::Info,
            "shell" => Mode::Shell,
            "check" => Mode::Check,
            _ => Mode::Run,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Csv,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub mode: Mode,
    pub config_path: PathBuf,
    pub strategies: Vec<String>,
    pub input: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

pub fn build_cli() -> Command {
    Command::new("bytescan-bench")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Benchmark SIMD find-first-byte strategies")
        .arg(
            Arg::new("mode")
                .help("What to do")
                .long_help(
                    "run - Benchmark every selected strategy (default)\n\
                     list - Print the strategy catalog with host support\n\
                     info - Print detected SIMD capabilities\n\
                     shell - Interactive config shell\n\
                     check - Cross-validate supported strategies against scalar",
                )
                .value_parser(["run", "list", "info", "shell", "check"])
                .default_value("run")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .help("Benchmark config file (JSON)")
                .long("config")
                .short('c')
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("strategy")
                .help("Only run this strategy; may be repeated")
                .long("strategy")
                .short('s')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("input")
                .help("Scan this file (memory-mapped) instead of generated text")
                .long("input")
                .short('i')
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .help("Append results to results.json")
                .long("json")
                .action(ArgAction::SetTrue)
                .conflicts_with("csv"),
        )
        .arg(
            Arg::new("csv")
                .help("Append results to results.csv")
                .long("csv")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
}

pub fn parse_cli_args() -> CliArgs {
    from_matches(&build_cli().get_matches())
}

pub fn try_parse_cli_args<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(from_matches(&build_cli().try_get_matches_from(args)?))
}

fn from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let mode = matches
        .get_one::<String>("mode")
        .map(|m| Mode::from_arg(m))
        .unwrap_or(Mode::Run);
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let strategies = matches
        .get_many::<String>("strategy")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let input = matches.get_one::<PathBuf>("input").cloned();
    let output_format = if matches.get_flag("json") {
        OutputFormat::Json
    } else if matches.get_flag("csv") {
        OutputFormat::Csv
    } else {
        OutputFormat::Human
    };

    CliArgs {
        mode,
        config_path,
        strategies,
        input,
        output_format,
        verbosity: matches.get_count("verbose"),
    }
}

/// Log filter directive for a `-v` count.
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
