use anyhow::Result;
use std::sync::Mutex;

use crate::preference_db::{PreferenceDb, Setting};
use crate::waypoint::Waypoint;

pub const LOCATIONS_KEY: &str = "LocationsStorageKey";

/* The whole route lives in one slot of the preference store as a JSON array.
   There is no incremental write: every store rewrites the full history. This
   layer never returns errors for route data, failures are logged and turned
   into "nothing stored".
*/
pub struct Storage {
    preference_db: Mutex<PreferenceDb>,
}

impl Storage {
    pub fn init(support_dir: String) -> Result<Self> {
        let preference_db = PreferenceDb::open(&support_dir)?;
        Ok(Storage {
            preference_db: Mutex::new(preference_db),
        })
    }

    fn encode(locations: &[Waypoint]) -> Result<String> {
        // NaN would be written as `null` and make the whole slot unreadable
        if let Some(invalid) = locations.iter().find(|x| !x.point().is_valid()) {
            bail!(
                "invalid waypoint: lat={}, lng={}",
                invalid.latitude,
                invalid.longitude
            );
        }
        Ok(serde_json::to_string(locations)?)
    }

    fn decode(json: &str) -> Result<Vec<Waypoint>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn store_locations(&self, locations: &[Waypoint]) {
        let f = || -> Result<()> {
            let json = Self::encode(locations)?;
            let mut preference_db = self.preference_db.lock().unwrap();
            preference_db.set_string(LOCATIONS_KEY, &json)
        };
        match f() {
            Ok(()) => debug!("[storage] stored {} locations", locations.len()),
            Err(error) => error!("[storage] failed to store locations: {:?}", error),
        }
    }

    pub fn get_locations(&self) -> Option<Vec<Waypoint>> {
        let preference_db = self.preference_db.lock().unwrap();
        let json = match preference_db.get_string(LOCATIONS_KEY) {
            Ok(json) => json?,
            Err(error) => {
                error!("[storage] failed to read locations: {:?}", error);
                return None;
            }
        };
        drop(preference_db);

        match Self::decode(&json) {
            Ok(locations) => Some(locations),
            Err(error) => {
                warn!("[storage] stored locations are malformed: {}", error);
                None
            }
        }
    }

    // Used when a location arrives while nothing owns the in-memory route.
    // Appending to a route that was never stored is a no-op.
    pub fn insert_location(&self, location: &Waypoint) {
        match self.get_locations() {
            None => {
                info!("[storage] no stored route, skip inserting location");
            }
            Some(mut locations) => {
                locations.push(location.clone());
                self.store_locations(&locations);
            }
        }
    }

    pub fn reset_locations(&self) {
        let mut preference_db = self.preference_db.lock().unwrap();
        match preference_db.remove(LOCATIONS_KEY) {
            Ok(removed) => debug!("[storage] reset locations, removed: {}", removed),
            Err(error) => error!("[storage] failed to reset locations: {:?}", error),
        }
    }

    pub fn get_is_tracking(&self) -> bool {
        let preference_db = self.preference_db.lock().unwrap();
        preference_db.get_setting_with_default(Setting::IsTracking, true)
    }

    pub fn set_is_tracking(&self, is_tracking: bool) -> Result<()> {
        let mut preference_db = self.preference_db.lock().unwrap();
        preference_db.set_setting(Setting::IsTracking, is_tracking)
    }

    // Direct access to the raw slot, for tools that need to inspect or seed it.
    #[doc(hidden)]
    pub fn get_raw_locations(&self) -> Result<Option<String>> {
        let preference_db = self.preference_db.lock().unwrap();
        preference_db.get_string(LOCATIONS_KEY)
    }

    #[doc(hidden)]
    pub fn set_raw_locations(&self, json: &str) -> Result<()> {
        let mut preference_db = self.preference_db.lock().unwrap();
        preference_db.set_string(LOCATIONS_KEY, json)
    }

    pub fn flush(&self) -> Result<()> {
        debug!("[storage] flushing");
        let preference_db = self.preference_db.lock().unwrap();
        preference_db.flush()
    }
}
