use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::cmp::Ordering;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use crate::utils;

/* A small string key-value store, the local "preferences" of the app.

`preference` holds one row per key. Values are plain text, callers are
responsible for any encoding (the route is stored as a JSON string). Every
write is a whole-value overwrite in its own transaction, the last writer wins.
*/

pub const DB_FILE_NAME: &str = "preferences.db";

#[allow(clippy::type_complexity)]
fn open_db_and_run_migration(
    support_dir: &str,
    file_name: &str,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<Connection> {
    debug!("open and run migration for {}", file_name);
    let mut conn = Connection::open(Path::new(support_dir).join(file_name))?;
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)? as usize;
    let target_version = migrations.len();
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, f) in migrations.iter().enumerate().skip(version) {
                info!("running migration for version: {}", i + 1);
                f(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version as i32)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(conn)
}

pub struct PreferenceDb {
    conn: Connection,
}

impl PreferenceDb {
    pub fn open(support_dir: &str) -> Result<PreferenceDb> {
        let conn = open_db_and_run_migration(
            support_dir,
            DB_FILE_NAME,
            &[&|tx| {
                let sql = "
                CREATE TABLE preference (
                    key               TEXT    PRIMARY KEY
                                              NOT NULL
                                              UNIQUE,
                    value             TEXT
                );
                ";
                for s in sql_split::split(sql) {
                    tx.execute(&s, ())?;
                }
                Ok(())
            }],
        )?;
        Ok(PreferenceDb { conn })
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut query = self
            .conn
            .prepare_cached("SELECT value FROM preference WHERE key = ?1;")?;
        // a row with a NULL value is treated the same as a missing row
        let value: Option<Option<String>> = query.query_row([key], |row| row.get(0)).optional()?;
        Ok(value.flatten())
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let sql = "INSERT OR REPLACE INTO preference (key, value) VALUES (?1, ?2);";
        tx.execute(sql, (key, value))?;
        tx.commit()?;
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let changes = tx.execute("DELETE FROM preference WHERE key = ?1;", (key,))?;
        tx.commit()?;
        Ok(changes > 0)
    }

    fn get_setting<T: FromStr>(&self, setting: Setting) -> Result<Option<T>>
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_string(setting.to_db_key())? {
            None => Ok(None),
            Some(s) => {
                let v = FromStr::from_str(&s)?;
                Ok(Some(v))
            }
        }
    }

    pub fn get_setting_with_default<T: FromStr>(&self, setting: Setting, default: T) -> T
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_setting(setting) {
            Ok(v) => v,
            Err(error) => {
                warn!(
                    "[preference_db.get_setting_with_default] setting:{:?}, error:{}",
                    setting, error
                );
                None
            }
        }
        .unwrap_or(default)
    }

    pub fn set_setting<T: ToString>(&mut self, setting: Setting, value: T) -> Result<()> {
        self.set_string(setting.to_db_key(), &value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Setting {
    IsTracking,
}

impl Setting {
    fn to_db_key(self) -> &'static str {
        match self {
            Self::IsTracking => "IS_TRACKING",
        }
    }
}
