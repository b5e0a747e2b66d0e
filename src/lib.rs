#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod export_data;
pub mod geocoder;
pub mod gps_processor;
pub mod location_source;
mod logs;
pub mod preference_db;
pub mod route_recorder;
pub mod storage;
mod utils;
pub mod waypoint;
