use anyhow::Result;
use itertools::Itertools;
use serde::Deserialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use crate::gps_processor::Point;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placemark {
    pub name: Option<String>,
    pub locality: Option<String>,
}

/// Turns a coordinate into placemarks. Implemented by the host platform, the
/// crate only ships offline implementations.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse_geocode(&self, point: &Point) -> Result<Vec<Placemark>>;
}

/// Label for the first placemark: its name and locality joined by ", ",
/// skipping the missing parts.
pub fn format_address(placemarks: &[Placemark]) -> Option<String> {
    let placemark = placemarks.first()?;
    Some(
        [&placemark.name, &placemark.locality]
            .into_iter()
            .flatten()
            .join(", "),
    )
}

pub struct NoopGeocoder {}

impl ReverseGeocoder for NoopGeocoder {
    fn reverse_geocode(&self, _point: &Point) -> Result<Vec<Placemark>> {
        Ok(Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Place {
    pub name: String,
    pub locality: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Offline geocoder over a fixed list of named places, answering with the
/// closest place inside `radius_in_m`.
pub struct PlaceListGeocoder {
    places: Vec<Place>,
    radius_in_m: f64,
}

impl PlaceListGeocoder {
    pub const DEFAULT_RADIUS_IN_M: f64 = 1000.0;

    pub fn new(places: Vec<Place>, radius_in_m: f64) -> Self {
        PlaceListGeocoder {
            places,
            radius_in_m,
        }
    }

    // csv with a header row: name,locality,latitude,longitude
    pub fn load_csv<P: AsRef<Path>>(path: P, radius_in_m: f64) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut places = Vec::new();
        for place in reader.deserialize() {
            let place: Place = place?;
            places.push(place);
        }
        info!("loaded {} places for geocoding", places.len());
        Ok(Self::new(places, radius_in_m))
    }
}

impl ReverseGeocoder for PlaceListGeocoder {
    fn reverse_geocode(&self, point: &Point) -> Result<Vec<Placemark>> {
        let nearest = self
            .places
            .iter()
            .map(|place| (place.point().haversine_distance(point), place))
            .filter(|(distance, _)| *distance <= self.radius_in_m)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));
        Ok(match nearest {
            None => Vec::new(),
            Some((_, place)) => vec![Placemark {
                name: Some(place.name.clone()),
                locality: place.locality.clone(),
            }],
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeocodeResult {
    pub point: Point,
    pub address: Option<String>,
}

/* Runs every request on its own worker thread: fire-and-forget, no retry,
   no cancellation. Results come back over a channel so that only the owner
   of the route ever mutates it.
*/
pub struct GeocodeDispatcher {
    geocoder: Arc<dyn ReverseGeocoder>,
    sender: mpsc::Sender<GeocodeResult>,
    receiver: mpsc::Receiver<GeocodeResult>,
    in_flight: usize,
}

fn geocode_address(geocoder: &dyn ReverseGeocoder, point: &Point) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| geocoder.reverse_geocode(point))) {
        Ok(Ok(placemarks)) => format_address(&placemarks),
        Ok(Err(error)) => {
            warn!("[geocoder] reverse geocoding failed: {:?}", error);
            None
        }
        Err(_) => {
            error!("[geocoder] reverse geocoder panicked");
            None
        }
    }
}

impl GeocodeDispatcher {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let (sender, receiver) = mpsc::channel();
        GeocodeDispatcher {
            geocoder,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn request(&mut self, point: Point) {
        let geocoder = self.geocoder.clone();
        let sender = self.sender.clone();
        let thread_point = point.clone();
        let spawned = thread::Builder::new()
            .name("geocoder".to_string())
            .spawn(move || {
                let address = geocode_address(geocoder.as_ref(), &thread_point);
                // the receiver only goes away together with the dispatcher
                let _ = sender.send(GeocodeResult {
                    point: thread_point,
                    address,
                });
            });
        self.in_flight += 1;
        if let Err(error) = spawned {
            warn!("[geocoder] failed to spawn worker: {}", error);
            let _ = self.sender.send(GeocodeResult {
                point,
                address: None,
            });
        }
    }

    /// Results that are already available, without blocking.
    pub fn try_recv_all(&mut self) -> Vec<GeocodeResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            self.in_flight -= 1;
            results.push(result);
        }
        results
    }

    /// Blocks until every outstanding request has answered.
    pub fn wait_all(&mut self) -> Vec<GeocodeResult> {
        let mut results = Vec::new();
        while self.in_flight > 0 {
            match self.receiver.recv() {
                Ok(result) => {
                    self.in_flight -= 1;
                    results.push(result);
                }
                Err(_) => break,
            }
        }
        results
    }
}
