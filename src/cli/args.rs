use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shakr", version, author, about = "Prayer times in the terminal; shake to log a prayer")]
pub struct Cli {
    /// Use a preset city for this run only (see `shakr location list`)
    #[arg(long)]
    pub city: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times, statuses and the countdown
    Times,
    /// Log a prayer as completed on the current prayer day
    Mark {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
    },
    /// Show the streak and today's logged prayers
    Status,
    /// Run a recorded accelerometer trace through the shake detector
    Shake {
        /// File with one `x,y,z` reading (in g) per line
        #[arg(long)]
        samples: PathBuf,
        /// Milliseconds between readings; defaults to `[shake] sample_interval_ms`
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Show or change the saved location
    Location {
        #[command(subcommand)]
        action: LocationCommands,
    },
    /// List the prayer notifications still due today
    Notifications,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// List the preset cities
    List,
    /// Save a location, by preset city or by coordinates
    Set {
        /// Preset city name
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        city: Option<String>,
        /// Latitude in degrees
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude in degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Display name for coordinates
        #[arg(long, requires = "lat")]
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_shake_with_city_override() {
        let cli = Cli::try_parse_from([
            "shakr", "--city", "Cairo", "shake", "--samples", "trace.csv", "--interval-ms", "50",
        ])
        .unwrap();
        assert_eq!(cli.city.as_deref(), Some("Cairo"));
        match cli.command {
            Some(Commands::Shake {
                samples,
                interval_ms,
            }) => {
                assert_eq!(samples, PathBuf::from("trace.csv"));
                assert_eq!(interval_ms, Some(50));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn location_set_takes_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "shakr", "location", "set", "--lat", "-33.87", "--lng", "151.21", "--name", "Home",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Location {
                action: LocationCommands::Set {
                    lat: Some(_),
                    lng: Some(_),
                    ..
                }
            })
        ));
    }

    #[test]
    fn city_conflicts_with_coordinates() {
        assert!(Cli::try_parse_from([
            "shakr", "location", "set", "--city", "Cairo", "--lat", "1", "--lng", "2",
        ])
        .is_err());
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["shakr"]).unwrap();
        assert!(cli.command.is_none());
    }
}
