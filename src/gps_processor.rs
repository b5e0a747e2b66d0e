// mean earth radius
const EARTH_RADIUS_IN_M: f64 = 6_371_000.0;

pub const DISTANCE_THRESHOLD_IN_M: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    /// Finite, latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn haversine_distance(&self, other: &Point) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        // rounding can push `a` past 1 for near antipodal points
        let c = 2.0 * a.min(1.0).sqrt().asin();
        EARTH_RADIUS_IN_M * c
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawData {
    pub point: Point,
    pub timestamp_ms: Option<i64>,
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ProcessResult {
    Accept = 0,
    Ignore = -1,
}

impl From<i8> for ProcessResult {
    fn from(i: i8) -> Self {
        match i {
            0 => ProcessResult::Accept,
            -1 => ProcessResult::Ignore,
            _ => panic!("invalid `ProcessResult`"),
        }
    }
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }
}

/// Distance filter for incoming location updates.
///
/// A sample is accepted when nothing has been accepted yet, or when it is
/// strictly more than `DISTANCE_THRESHOLD_IN_M` away from the last accepted
/// one. There is no smoothing and no outlier rejection, a single hard
/// threshold decides. Samples with invalid coordinates are always ignored and
/// never become the reference.
pub struct GpsProcessor {
    last_point: Option<Point>,
}

impl GpsProcessor {
    pub fn new() -> Self {
        GpsProcessor { last_point: None }
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.last_point.as_ref()
    }

    pub fn preprocess(&mut self, curr_data: &RawData) -> ProcessResult {
        if !curr_data.point.is_valid() {
            warn!(
                "[gps_processor] ignoring invalid location: lat={}, lng={}",
                curr_data.point.latitude, curr_data.point.longitude
            );
            return ProcessResult::Ignore;
        }
        let result = match &self.last_point {
            None => ProcessResult::Accept,
            Some(last_point) => {
                let distance = curr_data.point.haversine_distance(last_point);
                if distance > DISTANCE_THRESHOLD_IN_M {
                    ProcessResult::Accept
                } else {
                    ProcessResult::Ignore
                }
            }
        };
        if result == ProcessResult::Accept {
            self.last_point = Some(curr_data.point.clone());
        }
        result
    }

    pub fn reset(&mut self) {
        self.last_point = None;
    }
}
