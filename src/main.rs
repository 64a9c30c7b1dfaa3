mod analytics;
mod config;
mod logging;
mod models;
mod persistence;
mod run;

use anyhow::Result;

fn main() -> Result<()> {
    logging::setup_logging();

    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;
    run::as_cli(&args, &config)
}
