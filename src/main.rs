mod cli;
mod config;
mod db;
mod location;
mod models;
mod notify;
mod prayer_times;
mod shake;
mod tui;
mod utils;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use location::{acquire, find_city, ConfiguredProvider};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    if let Some(Commands::Location { action }) = &cli.command {
        return handlers::handle_location(&mut config, action);
    }

    // A --city override applies to this run only and is never saved.
    let mut run_config = config.clone();
    if let Some(name) = &cli.city {
        let city = find_city(name)
            .ok_or_else(|| anyhow!("Unknown city '{}'. See `shakr location list`", name))?;
        run_config.set_city(city);
    }
    let location = acquire(&mut ConfiguredProvider::new(run_config.location.clone()));

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let conn = db::open(&AppConfig::db_path()?)?;

    match cli.command {
        Some(Commands::Times) => handlers::handle_times(&conn, &run_config, &location.place)?,
        Some(Commands::Mark { prayer }) => {
            handlers::handle_mark(&conn, &run_config, &location.place, &prayer)?
        }
        Some(Commands::Status) => handlers::handle_status(&conn, &run_config, &location.place)?,
        Some(Commands::Shake {
            samples,
            interval_ms,
        }) => handlers::handle_shake(&conn, &run_config, &location.place, &samples, interval_ms)?,
        Some(Commands::Notifications) => {
            handlers::handle_notifications(&run_config, &location.place)?
        }
        Some(Commands::Location { .. }) => unreachable!(),

        // No subcommand → launch TUI
        None => tui::app::run(conn, run_config, location)?,
    }

    Ok(())
}
