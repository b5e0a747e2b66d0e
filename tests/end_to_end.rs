pub mod test_utils;

use route_tracker_core::{
    api::api, location_source::load_gpx, route_recorder::AuthorizationStatus,
};
use std::sync::Arc;
use tempdir::TempDir;
use test_utils::CoordinateGeocoder;

#[test]
fn basic() {
    let temp_dir = TempDir::new("end_to_end-basic").unwrap();
    println!("temp dir: {:?}", temp_dir.path());

    api::init_with_geocoder(
        test_utils::sub_folder(&temp_dir, "support/"),
        test_utils::sub_folder(&temp_dir, "cache/"),
        Arc::new(CoordinateGeocoder {}),
    )
    .unwrap();
    // a second call is a no-op
    api::init(
        test_utils::sub_folder(&temp_dir, "other_support/"),
        test_utils::sub_folder(&temp_dir, "other_cache/"),
    )
    .unwrap();

    api::on_authorization_changed(AuthorizationStatus::AuthorizedAlways);
    assert!(api::is_tracking());
    assert!(api::list_waypoints().is_empty());

    let gpx_path = test_utils::write_sample_gpx(&temp_dir);
    for raw_data in load_gpx(&gpx_path).unwrap() {
        api::on_location_update(vec![raw_data]);
    }
    api::wait_for_geocoding();
    assert_eq!(api::refresh(), 0);

    let markers = api::map_markers();
    assert_eq!(markers.len(), 2);
    assert!(markers
        .iter()
        .all(|marker| marker.title.as_deref().unwrap().ends_with(", Testville")));

    api::stop_tracking();
    api::on_location_update(vec![test_utils::raw_data(0.0, 0.0)]);
    api::wait_for_geocoding();
    assert_eq!(api::list_waypoints().len(), 2);

    let gpx_export_path = temp_dir.path().join("route.gpx");
    api::export_route_as_gpx(gpx_export_path.to_str().unwrap().to_string()).unwrap();
    assert_eq!(load_gpx_waypoint_count(gpx_export_path.to_str().unwrap()), 2);

    api::reset_route();
    assert!(api::list_waypoints().is_empty());
    assert!(api::map_markers().is_empty());

    let logs_path = temp_dir.path().join("logs.zip");
    api::export_logs(logs_path.to_str().unwrap().to_string()).unwrap();
    assert!(logs_path.exists());
}

fn load_gpx_waypoint_count(path: &str) -> usize {
    let file = std::fs::File::open(path).unwrap();
    gpx::read(std::io::BufReader::new(file))
        .unwrap()
        .waypoints
        .len()
}
