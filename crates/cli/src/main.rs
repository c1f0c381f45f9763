use anyhow::Result;
use clap::Parser;
use fontgraft_cli::Cli;

fn main() -> Result<()> {
    // Progress lines go through the log facade; show them by default.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Cli::parse().run()
}
