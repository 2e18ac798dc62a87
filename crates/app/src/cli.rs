//! Command-line parsing for the `heatrisk` binary.
//!
//! Flags are translated into an `AppConfig` once, so commands never re-read
//! arguments or the environment.

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use risk_ingest::{ClientConfig, ForceMode, MAX_FORECAST_DAYS};
use zone_core::{DEFAULT_RADIUS_DEG, UserLocation};

#[derive(Debug, Parser)]
#[command(name = "heatrisk", about = "Heat-risk zone client with mock fallback")]
pub struct Cli {
    /// Prediction service root URL (defaults to $HEATRISK_API_URL).
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
    /// Health probe timeout in milliseconds.
    #[arg(long = "health-timeout-ms", value_name = "MS", global = true)]
    pub health_timeout_ms: Option<u64>,
    /// Data request timeout in milliseconds.
    #[arg(long = "request-timeout-ms", value_name = "MS", global = true)]
    pub request_timeout_ms: Option<u64>,
    /// Delay before mock data is served, in milliseconds.
    #[arg(long = "mock-delay-ms", value_name = "MS", global = true)]
    pub mock_delay_ms: Option<u64>,
    /// Override backend detection: auto, mock or live.
    #[arg(long = "force", value_name = "MODE", global = true)]
    pub force: Option<ForceMode>,
    /// Print Prometheus metrics to stderr when the command finishes.
    #[arg(long = "metrics", action = clap::ArgAction::SetTrue, global = true)]
    pub metrics: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe backend availability.
    Health,
    /// Fetch zones for a day and filter them around the user.
    Zones(ZonesArgs),
    /// Fetch the single-point prediction summary.
    Predict,
    /// Fetch a multi-day forecast.
    Forecast {
        /// Number of days to forecast (1-30).
        #[arg(long = "days", value_name = "N", default_value_t = 7)]
        days: u32,
    },
}

#[derive(Debug, Args)]
pub struct ZonesArgs {
    /// Base date (YYYY-MM-DD); defaults to today (UTC).
    #[arg(long = "date", value_name = "DATE")]
    pub date: Option<NaiveDate>,
    /// Days ahead of the base date.
    #[arg(long = "day", value_name = "N", default_value_t = 0)]
    pub day: u32,
    /// User latitude in degrees.
    #[arg(long = "lat", value_name = "DEG", requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// User longitude in degrees.
    #[arg(long = "lon", value_name = "DEG", requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Reported location accuracy in metres.
    #[arg(long = "accuracy", value_name = "M")]
    pub accuracy: Option<f64>,
    /// Proximity radius in degrees.
    #[arg(long = "radius", value_name = "DEG")]
    pub radius: Option<f64>,
}

#[derive(Clone, Debug, Default)]
/// Optional telemetry knobs.
pub struct TelemetryOptions {
    pub metrics: bool,
}

#[derive(Clone, Debug)]
pub enum Action {
    Health,
    Zones {
        date: NaiveDate,
        day: u32,
        location: Option<UserLocation>,
        radius_deg: f64,
    },
    Predict,
    Forecast {
        days: u32,
    },
}

#[derive(Clone, Debug)]
/// Validated configuration shared by every command.
pub struct AppConfig {
    pub client: ClientConfig,
    pub action: Action,
    pub telemetry: TelemetryOptions,
}

impl TryFrom<Cli> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: Cli) -> Result<Self> {
        let mut client = ClientConfig::default();
        if let Some(url) = args.api_url {
            client.base_url = url.trim_end_matches('/').to_string();
        }
        if !(client.base_url.starts_with("http://") || client.base_url.starts_with("https://")) {
            bail!("--api-url must be an http:// or https:// URL");
        }
        if let Some(ms) = args.health_timeout_ms {
            client.health_timeout = positive_millis(ms, "--health-timeout-ms")?;
        }
        if let Some(ms) = args.request_timeout_ms {
            client.request_timeout = positive_millis(ms, "--request-timeout-ms")?;
        }
        if let Some(ms) = args.mock_delay_ms {
            client.mock_delay = Duration::from_millis(ms);
        }
        if let Some(mode) = args.force {
            client.force_mode = mode;
        }

        let action = match args.command {
            Command::Health => Action::Health,
            Command::Predict => Action::Predict,
            Command::Forecast { days } => {
                if !(1..=MAX_FORECAST_DAYS).contains(&days) {
                    bail!("--days must be between 1 and {MAX_FORECAST_DAYS}");
                }
                Action::Forecast { days }
            }
            Command::Zones(zones) => zones_action(zones)?,
        };

        Ok(Self {
            client,
            action,
            telemetry: TelemetryOptions {
                metrics: args.metrics,
            },
        })
    }
}

fn zones_action(args: ZonesArgs) -> Result<Action> {
    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                bail!("--lat must be within [-90, 90]");
            }
            if !(-180.0..=180.0).contains(&lon) {
                bail!("--lon must be within [-180, 180]");
            }
            Some(UserLocation {
                latitude: lat,
                longitude: lon,
                accuracy: args.accuracy,
            })
        }
        _ => None,
    };

    let radius_deg = args.radius.unwrap_or(DEFAULT_RADIUS_DEG);
    if radius_deg.is_nan() || radius_deg <= 0.0 {
        bail!("--radius must be a positive number of degrees");
    }

    Ok(Action::Zones {
        date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        day: args.day,
        location,
        radius_deg,
    })
}

fn positive_millis(ms: u64, flag: &str) -> Result<Duration> {
    if ms == 0 {
        bail!("{flag} must be at least 1");
    }
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig> {
        let cli = Cli::try_parse_from(std::iter::once("heatrisk").chain(args.iter().copied()))?;
        AppConfig::try_from(cli)
    }

    #[test]
    fn zones_with_location() {
        let config = parse(&[
            "zones",
            "--api-url",
            "http://localhost:9000/",
            "--date",
            "2025-04-12",
            "--day",
            "3",
            "--lat",
            "13.75",
            "--lon",
            "100.5",
            "--force",
            "mock",
        ])
        .unwrap();
        assert_eq!(config.client.base_url, "http://localhost:9000");
        assert_eq!(config.client.force_mode, ForceMode::Mock);
        match config.action {
            Action::Zones {
                date,
                day,
                location,
                radius_deg,
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 12).unwrap());
                assert_eq!(day, 3);
                assert_eq!(location, Some(UserLocation::new(13.75, 100.5)));
                assert_eq!(radius_deg, DEFAULT_RADIUS_DEG);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(parse(&["zones", "--lat", "91", "--lon", "0"]).is_err());
        assert!(parse(&["zones", "--lat", "10"]).is_err());
        assert!(parse(&["zones", "--radius", "0"]).is_err());
        assert!(parse(&["forecast", "--days", "31"]).is_err());
        assert!(parse(&["health", "--health-timeout-ms", "0"]).is_err());
        assert!(parse(&["health", "--api-url", "ftp://x"]).is_err());
        assert!(parse(&["health", "--force", "maybe"]).is_err());
    }

    #[test]
    fn negative_coordinates_parse() {
        let config = parse(&["zones", "--lat", "-33.9", "--lon", "-70.6"]).unwrap();
        let Action::Zones { location, .. } = config.action else {
            panic!("expected zones action");
        };
        assert_eq!(location, Some(UserLocation::new(-33.9, -70.6)));
    }
}
