//! Per-session view state read by the presentation layer.
//!
//! Loads are stamped with a [`LoadTicket`]; only the most recently issued
//! ticket may write zones, so a slow response for an old day can never
//! overwrite a newer one.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use zone_core::{
    DEFAULT_RADIUS_DEG, HeatZone, Region, UserLocation, filter_nearby, select_closest,
};

use crate::client::DataClient;
use crate::sourced::{DataSource, Sourced};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Stamp handed out by [`SessionState::begin_load`].
pub struct LoadTicket {
    seq: u64,
    day: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer load was started after this ticket; the result was dropped.
    Stale,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    zones: Vec<HeatZone>,
    nearby_zones: Vec<HeatZone>,
    selected_zone_id: Option<String>,
    selected_day: u32,
    loading: bool,
    error: Option<String>,
    region: Region,
    source: Option<DataSource>,
    user_location: Option<UserLocation>,
    location_requested: bool,
    radius_deg: f64,
    #[serde(skip)]
    latest_seq: u64,
    #[serde(skip)]
    auto_selected: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            nearby_zones: Vec::new(),
            selected_zone_id: None,
            selected_day: 0,
            loading: false,
            error: None,
            region: Region::default(),
            source: None,
            user_location: None,
            location_requested: false,
            radius_deg: DEFAULT_RADIUS_DEG,
            latest_seq: 0,
            auto_selected: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones(&self) -> &[HeatZone] {
        &self.zones
    }

    pub fn nearby_zones(&self) -> &[HeatZone] {
        &self.nearby_zones
    }

    /// Selected zone, looked up by id in the current zone set.
    pub fn selected_zone(&self) -> Option<&HeatZone> {
        let id = self.selected_zone_id.as_deref()?;
        self.zones.iter().find(|zone| zone.id() == id)
    }

    pub fn selected_day(&self) -> u32 {
        self.selected_day
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// `true` only when the current zones came from the live backend.
    pub fn is_live(&self) -> bool {
        self.source == Some(DataSource::Live)
    }

    pub fn source(&self) -> Option<DataSource> {
        self.source
    }

    pub fn user_location(&self) -> Option<&UserLocation> {
        self.user_location.as_ref()
    }

    pub fn location_requested(&self) -> bool {
        self.location_requested
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    pub fn set_radius_deg(&mut self, radius_deg: f64) {
        self.radius_deg = radius_deg;
        self.refresh_nearby();
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Start a load for `day`. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self, day: u32) -> LoadTicket {
        self.latest_seq += 1;
        self.selected_day = day;
        self.loading = true;
        self.error = None;
        LoadTicket {
            seq: self.latest_seq,
            day,
        }
    }

    /// Replace the zone set wholesale if `ticket` is still current.
    pub fn apply_zones(
        &mut self,
        ticket: LoadTicket,
        zones: Sourced<Vec<HeatZone>>,
    ) -> ApplyOutcome {
        if ticket.seq != self.latest_seq {
            debug!(
                ticket = ticket.seq,
                latest = self.latest_seq,
                day = ticket.day,
                "dropping stale zone response"
            );
            return ApplyOutcome::Stale;
        }

        self.source = Some(zones.source());
        self.zones = zones.into_inner();
        self.loading = false;
        self.error = None;

        if self.selected_zone().is_none() {
            self.selected_zone_id = None;
        }
        self.refresh_nearby();
        self.try_auto_select();
        info!(
            day = ticket.day,
            zones = self.zones.len(),
            nearby = self.nearby_zones.len(),
            live = self.is_live(),
            "zones applied"
        );
        ApplyOutcome::Applied
    }

    /// Record a failed load if `ticket` is still current. Existing zones stay.
    pub fn fail_load(&mut self, ticket: LoadTicket, message: impl Into<String>) -> ApplyOutcome {
        if ticket.seq != self.latest_seq {
            return ApplyOutcome::Stale;
        }
        self.loading = false;
        self.error = Some(message.into());
        ApplyOutcome::Applied
    }

    /// One-shot latch around the host geolocation request. Returns `true`
    /// only the first time in a session (or after [`Self::clear_location`]).
    pub fn request_location(&mut self) -> bool {
        if self.location_requested {
            return false;
        }
        self.location_requested = true;
        true
    }

    /// Accept the host's resolved location. Only the first resolution is
    /// taken; duplicates are ignored so they cannot change the selection.
    pub fn resolve_location(&mut self, location: UserLocation) -> bool {
        if self.user_location.is_some() {
            debug!("ignoring duplicate location resolution");
            return false;
        }
        self.location_requested = true;
        self.user_location = Some(location);
        self.region = Region::around(&location);
        self.refresh_nearby();
        self.try_auto_select();
        true
    }

    /// Explicitly replace the user location. Does not re-run auto-selection.
    pub fn set_user_location(&mut self, location: UserLocation) {
        self.user_location = Some(location);
        self.region = Region::around(&location);
        self.refresh_nearby();
    }

    /// Forget the location and re-arm both the request and auto-select latches.
    pub fn clear_location(&mut self) {
        self.user_location = None;
        self.location_requested = false;
        self.auto_selected = false;
        self.refresh_nearby();
    }

    /// Select a zone by id. Unknown ids leave the selection untouched.
    pub fn select_zone(&mut self, id: &str) -> bool {
        if self.zones.iter().any(|zone| zone.id() == id) {
            self.selected_zone_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_zone_id = None;
    }

    fn refresh_nearby(&mut self) {
        self.nearby_zones =
            filter_nearby(&self.zones, self.user_location.as_ref(), self.radius_deg);
    }

    fn try_auto_select(&mut self) {
        if self.auto_selected {
            return;
        }
        let Some(closest) = select_closest(&self.zones, self.user_location.as_ref()) else {
            return;
        };
        info!(zone = closest.id(), "auto-selected closest zone");
        self.selected_zone_id = Some(closest.id().to_string());
        self.auto_selected = true;
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Load zones for `day_offset` into `state`, dropping the result if another
/// refresh was started while this one was in flight.
pub async fn refresh_zones(
    client: &DataClient,
    state: &Mutex<SessionState>,
    date: NaiveDate,
    day_offset: u32,
) -> ApplyOutcome {
    let ticket = lock(state).begin_load(day_offset);
    let zones = client.fetch_zones(date, day_offset).await;
    lock(state).apply_zones(ticket, zones)
}
