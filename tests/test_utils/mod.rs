#![allow(dead_code)]

use anyhow::Result;
use route_tracker_core::{
    geocoder::{Placemark, ReverseGeocoder},
    gps_processor::{Point, RawData},
    storage::Storage,
};
use std::fs;
use std::sync::Arc;
use tempdir::TempDir;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn raw_data(latitude: f64, longitude: f64) -> RawData {
    RawData {
        point: Point {
            latitude,
            longitude,
        },
        timestamp_ms: None,
        accuracy: None,
        altitude: None,
        speed: None,
    }
}

pub fn sub_folder(temp_dir: &TempDir, sub: &str) -> String {
    let path = temp_dir.path().join(sub);
    fs::create_dir_all(&path).unwrap();
    path.into_os_string().into_string().unwrap()
}

pub fn open_storage(temp_dir: &TempDir) -> Arc<Storage> {
    Arc::new(Storage::init(sub_folder(temp_dir, "support/")).unwrap())
}

/// Names every coordinate after its rounded position.
pub struct CoordinateGeocoder {}

impl ReverseGeocoder for CoordinateGeocoder {
    fn reverse_geocode(&self, point: &Point) -> Result<Vec<Placemark>> {
        Ok(vec![Placemark {
            name: Some(format!("{:.4} {:.4}", point.latitude, point.longitude)),
            locality: Some("Testville".to_string()),
        }])
    }
}

pub struct FailingGeocoder {}

impl ReverseGeocoder for FailingGeocoder {
    fn reverse_geocode(&self, _point: &Point) -> Result<Vec<Placemark>> {
        Err(anyhow::anyhow!("network is unreachable"))
    }
}

// Roughly 111 m per step along the equator.
pub const STEP_IN_DEGREE: f64 = 0.001;

pub fn walk_east(steps: usize) -> Vec<RawData> {
    (0..steps)
        .map(|i| raw_data(0.0, i as f64 * STEP_IN_DEGREE))
        .collect()
}

pub const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>walk</name>
    <trkseg>
      <trkpt lat="31.2304" lon="121.4737">
        <ele>4.5</ele>
        <time>2024-06-13T08:00:00Z</time>
        <hdop>3.5</hdop>
      </trkpt>
      <trkpt lat="31.2305" lon="121.4737">
        <time>2024-06-13T08:00:05Z</time>
      </trkpt>
      <trkpt lat="31.2320" lon="121.4737">
        <time>2024-06-13T08:00:30Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

pub fn write_sample_gpx(temp_dir: &TempDir) -> String {
    let path = temp_dir.path().join("sample.gpx");
    fs::write(&path, SAMPLE_GPX).unwrap();
    path.into_os_string().into_string().unwrap()
}
