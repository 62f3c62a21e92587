mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;
mod http;

use anyhow::Result;
use clap::Parser;
use cli::{commands::LogFormat, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;
    cli.run()
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("iris_serve=info".parse()?);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
