use anyhow::Result;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Waypoint as GpxWaypoint};
use std::io::Write;

use crate::waypoint::Waypoint;

pub const CREATOR: &str = "route_tracker_core";

pub fn waypoints_to_gpx(waypoints: &[Waypoint]) -> Gpx {
    let waypoints = waypoints
        .iter()
        .map(|waypoint| {
            // geo point is (x: lng, y: lat)
            let mut gpx_waypoint = GpxWaypoint::new(Point::new(waypoint.longitude, waypoint.latitude));
            gpx_waypoint.name = waypoint.address.clone();
            gpx_waypoint
        })
        .collect();
    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        metadata: None,
        waypoints,
        tracks: vec![],
        routes: vec![],
    }
}

pub fn waypoints_to_gpx_file<W: Write>(waypoints: &[Waypoint], writer: &mut W) -> Result<()> {
    let gpx = waypoints_to_gpx(waypoints);
    gpx::write(&gpx, writer)?;
    Ok(())
}
