use anyhow::{bail, Result};
use clap::Parser;
use route_tracker_core::{
    export_data,
    geocoder::{NoopGeocoder, PlaceListGeocoder, ReverseGeocoder},
    gps_processor::{Point, ProcessResult},
    location_source::{LocationSource, ReplaySource},
    route_recorder::RouteRecorder,
    storage::Storage,
    waypoint::Waypoint,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::{fs::File, path::PathBuf, sync::Arc};

/// Replays recorded GPS tracks through the route recorder, as if they were
/// live location updates.
#[derive(Parser, Debug)]
#[command(name = "route_replay", version)]
struct Cli {
    /// Directory holding the preference store
    support_dir: PathBuf,

    /// GPX files to replay, in order
    #[arg(required_unless_present_any = ["dump", "insert"])]
    gpx_files: Vec<PathBuf>,

    /// Print the stored route as raw JSON and exit
    #[arg(long)]
    dump: bool,

    /// Append one waypoint to the stored route without replaying, the way a
    /// location delivered in the background is kept
    #[arg(
        long,
        num_args = 2,
        value_names = ["LAT", "LON"],
        allow_negative_numbers = true
    )]
    insert: Option<Vec<f64>>,

    /// CSV of named places (name,locality,latitude,longitude) used for
    /// offline reverse geocoding
    #[arg(long)]
    places: Option<PathBuf>,

    /// Search radius for `--places`, in meters
    #[arg(long, default_value_t = PlaceListGeocoder::DEFAULT_RADIUS_IN_M)]
    radius: f64,

    /// Clear the stored route before replaying
    #[arg(long)]
    reset: bool,

    /// Write the recorded waypoints to this GPX file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    std::fs::create_dir_all(&cli.support_dir)?;
    let support_dir = cli.support_dir.to_string_lossy().to_string();
    let storage = Arc::new(Storage::init(support_dir)?);
    if cli.dump {
        match storage.get_raw_locations()? {
            Some(json) => println!("{}", json),
            None => log::info!("no stored route"),
        }
        return Ok(());
    }
    if let Some(coordinates) = &cli.insert {
        let point = Point {
            latitude: coordinates[0],
            longitude: coordinates[1],
        };
        if !point.is_valid() {
            bail!("invalid coordinates: {}, {}", point.latitude, point.longitude);
        }
        storage.insert_location(&Waypoint::new(&point, None));
        return Ok(());
    }

    let geocoder: Arc<dyn ReverseGeocoder> = match &cli.places {
        Some(path) => Arc::new(PlaceListGeocoder::load_csv(path, cli.radius)?),
        None => Arc::new(NoopGeocoder {}),
    };

    let mut route_recorder = RouteRecorder::new(storage, geocoder);
    if cli.reset {
        route_recorder.reset_route();
    }
    // a previous session may have left tracking switched off
    route_recorder.start_tracking();

    let mut accepted = 0;
    let mut ignored = 0;
    for gpx_file in &cli.gpx_files {
        let mut source = ReplaySource::from_gpx(&gpx_file.to_string_lossy())?;
        log::info!(
            "replaying {} points from {}",
            source.remaining(),
            gpx_file.display()
        );
        while let Some(batch) = source.next_batch() {
            match route_recorder.on_location_update(batch) {
                Some(ProcessResult::Accept) => accepted += 1,
                Some(ProcessResult::Ignore) => ignored += 1,
                None => (),
            }
        }
    }
    route_recorder.wait_for_geocoding();
    log::info!("accepted: {}, ignored: {}", accepted, ignored);

    for marker in route_recorder.map_markers() {
        println!(
            "{:.6},{:.6},{}",
            marker.latitude,
            marker.longitude,
            marker.title.unwrap_or_default()
        );
    }

    if let Some(path) = &cli.export {
        let mut file = File::create(path)?;
        export_data::waypoints_to_gpx_file(route_recorder.waypoints(), &mut file)?;
        log::info!("exported route to {}", path.display());
    }
    Ok(())
}
