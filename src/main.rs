//! afcli: command-line client for the AnnoFab annotation service.
//! Entry point only; see `cli` and `subcommands/*`.

use afcli::cli::Cli;
use anyhow::Result;

fn main() -> Result<()> {
    // Initialize env_logger with a default filter of "afcli=info"
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("afcli=info"))
        .format_timestamp_millis()
        .init();
    let cli = <Cli as clap::Parser>::parse();
    cli.run()
}
