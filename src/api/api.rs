use std::fs::File;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::export_data;
use crate::geocoder::{NoopGeocoder, ReverseGeocoder};
use crate::gps_processor::RawData;
use crate::logs;
use crate::route_recorder::{AuthorizationStatus, RouteRecorder};
use crate::storage::Storage;
use crate::waypoint::{MapMarker, Waypoint};
use anyhow::Result;

struct MainState {
    cache_dir: String,
    storage: Arc<Storage>,
    route_recorder: Mutex<RouteRecorder>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

pub fn init(support_dir: String, cache_dir: String) -> Result<()> {
    init_with_geocoder(support_dir, cache_dir, Arc::new(NoopGeocoder {}))
}

pub fn init_with_geocoder(
    support_dir: String,
    cache_dir: String,
    geocoder: Arc<dyn ReverseGeocoder>,
) -> Result<()> {
    if MAIN_STATE.get().is_some() {
        warn!("`init` is called multiple times");
        return Ok(());
    }

    if let Err(error) = logs::init(&cache_dir) {
        // e.g. the host installed its own logger already
        eprintln!("failed to initialize logging: {error}");
    }

    let storage = Arc::new(Storage::init(support_dir)?);
    let route_recorder = RouteRecorder::new(storage.clone(), geocoder);
    let state = MainState {
        cache_dir,
        storage,
        route_recorder: Mutex::new(route_recorder),
    };
    if MAIN_STATE.set(state).is_err() {
        warn!("`init` raced with another `init`, keeping the first state");
    }
    info!("initialized");
    Ok(())
}

fn get() -> &'static MainState {
    MAIN_STATE.get().expect("main state is not initialized")
}

fn route_recorder() -> MutexGuard<'static, RouteRecorder> {
    get().route_recorder.lock().unwrap()
}

pub fn on_location_update(raw_data_list: Vec<RawData>) {
    route_recorder().on_location_update(raw_data_list);
}

pub fn on_authorization_changed(status: AuthorizationStatus) {
    route_recorder().on_authorization_changed(status);
}

pub fn start_tracking() {
    route_recorder().start_tracking();
}

pub fn stop_tracking() {
    route_recorder().stop_tracking();
}

pub fn is_tracking() -> bool {
    route_recorder().is_tracking()
}

pub fn reset_route() {
    route_recorder().reset_route();
}

/// Pulls in finished geocode results. Hosts call this from their UI loop so
/// markers show up without waiting for the next location update.
pub fn refresh() -> usize {
    route_recorder().apply_geocode_results()
}

pub fn wait_for_geocoding() -> usize {
    route_recorder().wait_for_geocoding()
}

pub fn list_waypoints() -> Vec<Waypoint> {
    route_recorder().waypoints().to_vec()
}

pub fn map_markers() -> Vec<MapMarker> {
    route_recorder().map_markers()
}

pub fn export_route_as_gpx(target_filepath: String) -> Result<()> {
    let waypoints = list_waypoints();
    let mut file = File::create(target_filepath)?;
    export_data::waypoints_to_gpx_file(&waypoints, &mut file)?;
    Ok(())
}

pub fn export_logs(target_file_path: String) -> Result<()> {
    let state = get();
    state.storage.flush()?;
    logs::export(&state.cache_dir, &target_file_path)
}
