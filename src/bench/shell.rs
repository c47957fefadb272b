use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use super::{build_harness, write_catalog, write_human};
use crate::catalog::Catalog;
use crate::config::{BenchConfig, DEFAULT_SCHEMA_FILE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Exit,
    ShowConfig,
    ShowSchema,
    /// Rewrite the config file with defaults, alongside its JSON Schema.
    Reload,
    List,
    /// Benchmark every supported strategy, or only the named one.
    Run(Option<String>),
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub const NAMES: [&'static str; 7] = [
        "help",
        "exit",
        "show_config",
        "show_schema",
        "reload",
        "list",
        "run",
    ];

    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return ShellCommand::Empty;
        };
        let arg = words.next().map(str::to_string);
        let extra = words.next().is_some();

        match (head, arg, extra) {
            ("help", None, _) => ShellCommand::Help,
            ("exit", None, _) => ShellCommand::Exit,
            ("show_config", None, _) => ShellCommand::ShowConfig,
            ("show_schema", None, _) => ShellCommand::ShowSchema,
            ("reload", None, _) => ShellCommand::Reload,
            ("list", None, _) => ShellCommand::List,
            ("run", arg, false) => ShellCommand::Run(arg),
            _ => ShellCommand::Unknown(line.trim().to_string()),
        }
    }
}

/// Line-oriented loop over a config file: inspect it, reset it to defaults,
/// and run benchmarks with it.
pub struct Shell<'c> {
    config_path: PathBuf,
    config: BenchConfig,
    catalog: &'c Catalog,
}

impl<'c> Shell<'c> {
    pub fn new(config_path: PathBuf, config: BenchConfig, catalog: &'c Catalog) -> Self {
        Self {
            config_path,
            config,
            catalog,
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Schema file written by `reload`, next to the config file.
    pub fn schema_path(&self) -> PathBuf {
        self.config_path.with_file_name(DEFAULT_SCHEMA_FILE)
    }

    /// Reads commands until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "Input Command ('help' for help): ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                return Ok(());
            };
            let command = ShellCommand::parse(&line?);
            debug!(?command, "shell command");
            if !self.execute(&command, &mut out)? {
                return Ok(());
            }
        }
    }

    /// Runs one command; returns `false` when the shell should stop.
    pub fn execute<W: Write>(&mut self, command: &ShellCommand, out: &mut W) -> Result<bool> {
        match command {
            ShellCommand::Help => {
                writeln!(out, "Commands:")?;
                for name in ShellCommand::NAMES {
                    writeln!(out, "{}", name)?;
                }
            }
            ShellCommand::Exit => return Ok(false),
            ShellCommand::ShowConfig => {
                writeln!(out, "Config: {}", self.config.to_json_pretty()?)?;
            }
            ShellCommand::ShowSchema => {
                writeln!(out, "Schema: {}", BenchConfig::schema_json()?)?;
            }
            ShellCommand::Reload => {
                let defaults = BenchConfig::default();
                defaults.save(&self.config_path)?;
                BenchConfig::save_schema(self.schema_path())?;
                self.config = defaults;
                writeln!(out, "Successful config update")?;
            }
            ShellCommand::List => write_catalog(self.catalog, out)?,
            ShellCommand::Run(name) => {
                let names: Vec<String> = name.iter().cloned().collect();
                match build_harness(self.config.clone(), self.catalog, &names) {
                    Ok(harness) => write_human(&harness.run(), &self.config, out)?,
                    Err(e) => {
                        warn!(error = %e, "shell run failed");
                        writeln!(out, "Error: {:#}", e)?;
                    }
                }
            }
            ShellCommand::Empty => {}
            ShellCommand::Unknown(_) => writeln!(out, "Unknown command. Repeat the entry.")?,
        }
        Ok(true)
    }
}
