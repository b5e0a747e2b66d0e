use anyhow::Result;
use chrono::{DateTime, Utc};
use gpx::read;
use std::collections::VecDeque;
use std::{fs::File, io::BufReader};

use crate::gps_processor::{Point, RawData};

/// Something that delivers location updates in batches, the way the platform
/// location service calls back with one or more fresh samples.
pub trait LocationSource {
    fn next_batch(&mut self) -> Option<Vec<RawData>>;
}

/// Replays recorded samples, one sample per batch.
pub struct ReplaySource {
    pending: VecDeque<RawData>,
}

impl ReplaySource {
    pub fn new(raw_data_list: Vec<RawData>) -> Self {
        ReplaySource {
            pending: raw_data_list.into(),
        }
    }

    pub fn from_gpx(file_path: &str) -> Result<Self> {
        Ok(Self::new(load_gpx(file_path)?))
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl LocationSource for ReplaySource {
    fn next_batch(&mut self) -> Option<Vec<RawData>> {
        self.pending.pop_front().map(|raw_data| vec![raw_data])
    }
}

pub fn load_gpx(file_path: &str) -> Result<Vec<RawData>> {
    let gpx_data = read(BufReader::new(File::open(file_path)?))?;
    let mut raw_data_list = Vec::new();
    for point in gpx_data
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
    {
        let timestamp = match &point.time {
            Some(time) => Some(DateTime::<Utc>::from(DateTime::parse_from_rfc3339(
                &time.format()?,
            )?)),
            None => None,
        };
        raw_data_list.push(RawData {
            point: Point {
                latitude: point.point().y(),
                longitude: point.point().x(),
            },
            timestamp_ms: timestamp.map(|x| x.timestamp_millis()),
            accuracy: point.hdop.map(|hdop| hdop as f32),
            altitude: point.elevation.map(|value| value as f32),
            speed: point.speed.map(|value| value as f32),
        });
    }
    debug!("loaded {} gps points from {}", raw_data_list.len(), file_path);
    Ok(raw_data_list)
}
