//! Command execution. Stands in for the presentation layer: it drives a
//! session and prints what a map screen would render as JSON on stdout.

use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use risk_ingest::{
    AvailabilityState, DataClient, DataSource, SessionState, Sourced, refresh_zones,
};
use serde::Serialize;
use tracing::info;
use zone_core::UserLocation;

use crate::cli::{Action, AppConfig};

#[derive(Serialize)]
struct SourcedOutput<'a, T: Serialize> {
    source: DataSource,
    data: &'a T,
}

impl<'a, T: Serialize> SourcedOutput<'a, T> {
    fn new(sourced: &'a Sourced<T>) -> Self {
        Self {
            source: sourced.source(),
            data: sourced.data(),
        }
    }
}

#[derive(Serialize)]
struct HealthOutput {
    available: bool,
    state: &'static str,
}

fn state_label(state: AvailabilityState) -> &'static str {
    match state {
        AvailabilityState::Unknown => "unknown",
        AvailabilityState::Available => "available",
        AvailabilityState::Unavailable => "unavailable",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Run the configured action on a single-threaded runtime.
pub(crate) fn execute(config: &AppConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;
    let client = DataClient::new(config.client.clone()).context("failed to build HTTP client")?;
    info!(
        url = %config.client.base_url,
        force = ?client.probe().force_mode(),
        "prediction client ready"
    );

    runtime.block_on(async {
        match &config.action {
            Action::Health => {
                let available = client.probe().check_availability().await;
                print_json(&HealthOutput {
                    available,
                    state: state_label(client.probe().state()),
                })
            }
            Action::Zones {
                date,
                day,
                location,
                radius_deg,
            } => run_zones(&client, *date, *day, *location, *radius_deg).await,
            Action::Predict => print_json(&client.fetch_prediction().await),
            Action::Forecast { days } => {
                let forecast = client.fetch_forecast(*days).await;
                if let Some(peak) = forecast.data().peak() {
                    info!(
                        date = %peak.date,
                        severity = peak.severity.label(),
                        probability = peak.probability,
                        "forecast peak"
                    );
                }
                print_json(&SourcedOutput::new(&forecast))
            }
        }
    })
}

async fn run_zones(
    client: &DataClient,
    date: NaiveDate,
    day: u32,
    location: Option<UserLocation>,
    radius_deg: f64,
) -> Result<()> {
    let state = Mutex::new(SessionState::new());
    {
        let mut session = lock(&state);
        session.set_radius_deg(radius_deg);
        if let Some(location) = location {
            if session.request_location() {
                session.resolve_location(location);
            }
        }
    }

    refresh_zones(client, &state, date, day).await;

    let session = lock(&state);
    if let Some(zone) = session.selected_zone() {
        info!(
            zone = zone.id(),
            name = %zone.properties().name,
            severity = zone.properties().severity.label(),
            "closest zone"
        );
    }
    print_json(&*session)
}

fn lock(state: &Mutex<SessionState>) -> std::sync::MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
