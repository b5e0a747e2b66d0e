use itertools::Itertools;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

use crate::geocoder::{GeocodeDispatcher, GeocodeResult, ReverseGeocoder};
use crate::gps_processor::{GpsProcessor, ProcessResult, RawData};
use crate::storage::Storage;
use crate::waypoint::{MapMarker, Waypoint};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }
}

/* Owns the recorded route.

   Location update -> distance filter -> (accepted) reverse geocode on a worker
   -> result applied here -> route appended -> whole route stored again.
   Geocode results are only applied on the owner's side, either at the start
   of the next location update or when explicitly asked to.
*/
pub struct RouteRecorder {
    storage: Arc<Storage>,
    gps_processor: GpsProcessor,
    geocode_dispatcher: GeocodeDispatcher,
    route: Vec<Waypoint>,
    is_tracking: bool,
    authorization_status: Option<AuthorizationStatus>,
}

impl RouteRecorder {
    pub fn new(storage: Arc<Storage>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let route = storage.get_locations().unwrap_or_default();
        let is_tracking = storage.get_is_tracking();
        info!(
            "[route_recorder] loaded {} waypoints, is_tracking: {}",
            route.len(),
            is_tracking
        );
        RouteRecorder {
            storage,
            gps_processor: GpsProcessor::new(),
            geocode_dispatcher: GeocodeDispatcher::new(geocoder),
            route,
            is_tracking,
            authorization_status: None,
        }
    }

    pub fn on_location_update(&mut self, raw_data_list: Vec<RawData>) -> Option<ProcessResult> {
        self.apply_geocode_results();
        if !self.is_tracking {
            return None;
        }
        // like the platform callback, only the freshest sample of a batch matters
        let curr_data = raw_data_list.into_iter().last()?;
        let process_result = self.gps_processor.preprocess(&curr_data);
        if process_result == ProcessResult::Accept {
            debug!(
                "[route_recorder] accepted location: lat={}, lng={}",
                curr_data.point.latitude, curr_data.point.longitude
            );
            self.geocode_dispatcher.request(curr_data.point);
        }
        Some(process_result)
    }

    fn append_waypoints(&mut self, results: Vec<GeocodeResult>) -> usize {
        let count = results.len();
        if count == 0 {
            return 0;
        }
        self.route.extend(
            results
                .into_iter()
                .map(|result| Waypoint::new(&result.point, result.address)),
        );
        self.storage.store_locations(&self.route);
        count
    }

    /// Applies geocode results that are already available. Returns the number
    /// of waypoints added.
    pub fn apply_geocode_results(&mut self) -> usize {
        let results = self.geocode_dispatcher.try_recv_all();
        self.append_waypoints(results)
    }

    /// Blocks until every pending geocode request has answered and applies
    /// the results.
    pub fn wait_for_geocoding(&mut self) -> usize {
        let results = self.geocode_dispatcher.wait_all();
        self.append_waypoints(results)
    }

    pub fn pending_geocoding(&self) -> usize {
        self.geocode_dispatcher.in_flight()
    }

    pub fn on_authorization_changed(&mut self, status: AuthorizationStatus) {
        info!("[route_recorder] authorization status: {}", status);
        self.authorization_status = Some(status);
        if status.is_authorized() {
            self.start_tracking();
        }
    }

    pub fn authorization_status(&self) -> Option<AuthorizationStatus> {
        self.authorization_status
    }

    fn set_tracking(&mut self, is_tracking: bool) {
        self.is_tracking = is_tracking;
        if let Err(error) = self.storage.set_is_tracking(is_tracking) {
            warn!("[route_recorder] failed to persist tracking state: {:?}", error);
        }
    }

    pub fn start_tracking(&mut self) {
        self.set_tracking(true);
    }

    // In-flight geocode requests are not cancelled, they still land in the route.
    pub fn stop_tracking(&mut self) {
        self.set_tracking(false);
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn reset_route(&mut self) {
        info!("[route_recorder] reset route, dropping {} waypoints", self.route.len());
        self.route.clear();
        self.gps_processor.reset();
        self.storage.reset_locations();
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.route
    }

    /// One marker per distinct coordinate, the first waypoint at a spot wins.
    pub fn map_markers(&self) -> Vec<MapMarker> {
        self.route
            .iter()
            .unique_by(|waypoint| (waypoint.latitude.to_bits(), waypoint.longitude.to_bits()))
            .map(MapMarker::from)
            .collect()
    }
}
