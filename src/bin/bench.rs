use anyhow::{Context, Result};
use bytescan::bench::{self, log_level};
use bytescan::config;

fn main() -> Result<()> {
    let args = bench::parse_cli_args();

    tracing_subscriber::fmt()
        .with_env_filter(log_level(args.verbosity))
        .with_writer(std::io::stderr)
        .init();

    let config = config::init(&args.config_path)
        .with_context(|| format!("failed to load {}", args.config_path.display()))?;

    bench::run_mode(&args, config)
}
