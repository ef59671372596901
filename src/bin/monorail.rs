use clap::Parser;
use monorail::cli::{run_cli, Cli};
use monorail::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run_cli(cli, &mut stdout.lock())
}
