pub mod test_utils;

use route_tracker_core::{
    geocoder::{
        GeocodeDispatcher, NoopGeocoder, Place, PlaceListGeocoder, Placemark, ReverseGeocoder,
    },
    gps_processor::Point,
};
use std::fs;
use std::sync::Arc;
use tempdir::TempDir;
use test_utils::{CoordinateGeocoder, FailingGeocoder};

fn point(latitude: f64, longitude: f64) -> Point {
    Point {
        latitude,
        longitude,
    }
}

fn places() -> Vec<Place> {
    vec![
        Place {
            name: "Galata Tower".to_string(),
            locality: Some("Istanbul".to_string()),
            latitude: 41.0256,
            longitude: 28.9742,
        },
        Place {
            name: "Hagia Sophia".to_string(),
            locality: Some("Istanbul".to_string()),
            latitude: 41.0086,
            longitude: 28.9802,
        },
        Place {
            name: "Nowhere".to_string(),
            locality: None,
            latitude: 0.0,
            longitude: 0.0,
        },
    ]
}

#[test]
fn noop() {
    let geocoder = NoopGeocoder {};
    assert!(geocoder.reverse_geocode(&point(1.0, 2.0)).unwrap().is_empty());
}

#[test]
fn place_list_nearest_within_radius() {
    let geocoder = PlaceListGeocoder::new(places(), PlaceListGeocoder::DEFAULT_RADIUS_IN_M);

    assert_eq!(
        geocoder.reverse_geocode(&point(41.0090, 28.9800)).unwrap(),
        vec![Placemark {
            name: Some("Hagia Sophia".to_string()),
            locality: Some("Istanbul".to_string()),
        }]
    );
    assert_eq!(
        geocoder.reverse_geocode(&point(0.0001, 0.0)).unwrap(),
        vec![Placemark {
            name: Some("Nowhere".to_string()),
            locality: None,
        }]
    );
    // ~8km away from anything
    assert!(geocoder
        .reverse_geocode(&point(41.1, 28.9742))
        .unwrap()
        .is_empty());
}

#[test]
fn place_list_from_csv() {
    let temp_dir = TempDir::new("geocoder-csv").unwrap();
    let path = temp_dir.path().join("places.csv");
    fs::write(
        &path,
        "name,locality,latitude,longitude\n\
         Galata Tower,Istanbul,41.0256,28.9742\n\
         Lighthouse,,0.0,0.0\n",
    )
    .unwrap();

    let geocoder = PlaceListGeocoder::load_csv(&path, 500.0).unwrap();
    assert_eq!(
        geocoder.reverse_geocode(&point(41.0257, 28.9743)).unwrap(),
        vec![Placemark {
            name: Some("Galata Tower".to_string()),
            locality: Some("Istanbul".to_string()),
        }]
    );
    assert_eq!(
        geocoder.reverse_geocode(&point(0.0, 0.0)).unwrap(),
        vec![Placemark {
            name: Some("Lighthouse".to_string()),
            locality: None,
        }]
    );
}

#[test]
fn place_list_from_broken_csv() {
    let temp_dir = TempDir::new("geocoder-broken_csv").unwrap();
    let path = temp_dir.path().join("places.csv");
    fs::write(&path, "name,locality,latitude,longitude\nA,B,north,east\n").unwrap();
    assert!(PlaceListGeocoder::load_csv(&path, 500.0).is_err());
    assert!(PlaceListGeocoder::load_csv(temp_dir.path().join("missing.csv"), 500.0).is_err());
}

#[test]
fn dispatcher_delivers_every_request() {
    let mut dispatcher = GeocodeDispatcher::new(Arc::new(CoordinateGeocoder {}));
    assert_eq!(dispatcher.in_flight(), 0);
    assert!(dispatcher.wait_all().is_empty());

    for i in 0..10 {
        dispatcher.request(point(i as f64, 0.0));
    }
    assert_eq!(dispatcher.in_flight(), 10);

    let mut results = dispatcher.wait_all();
    assert_eq!(dispatcher.in_flight(), 0);
    assert_eq!(results.len(), 10);

    // completion order is not guaranteed
    results.sort_by(|a, b| a.point.latitude.total_cmp(&b.point.latitude));
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.point, point(i as f64, 0.0));
        assert_eq!(
            result.address,
            Some(format!("{:.4} {:.4}, Testville", i as f64, 0.0))
        );
    }
    assert!(dispatcher.try_recv_all().is_empty());
}

#[test]
fn dispatcher_swallows_failures() {
    let mut dispatcher = GeocodeDispatcher::new(Arc::new(FailingGeocoder {}));
    dispatcher.request(point(1.0, 2.0));
    let results = dispatcher.wait_all();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].point, point(1.0, 2.0));
    assert_eq!(results[0].address, None);
}

struct PanickingGeocoder {}

impl ReverseGeocoder for PanickingGeocoder {
    fn reverse_geocode(&self, _point: &Point) -> anyhow::Result<Vec<Placemark>> {
        panic!("geocoder bug");
    }
}

#[test]
fn dispatcher_survives_panics() {
    let mut dispatcher = GeocodeDispatcher::new(Arc::new(PanickingGeocoder {}));
    dispatcher.request(point(1.0, 2.0));
    let results = dispatcher.wait_all();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].address, None);
}
