use serde::{Deserialize, Serialize};

use crate::gps_processor::Point;

/// One recorded point of the route. The address stays `None` when reverse
/// geocoding failed or found nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl Waypoint {
    pub fn new(point: &Point, address: Option<String>) -> Self {
        Waypoint {
            latitude: point.latitude,
            longitude: point.longitude,
            address,
        }
    }

    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub title: Option<String>,
}

impl From<&Waypoint> for MapMarker {
    fn from(waypoint: &Waypoint) -> Self {
        MapMarker {
            latitude: waypoint.latitude,
            longitude: waypoint.longitude,
            title: waypoint.address.clone(),
        }
    }
}
