/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! accumulation of OpenSky state vector snapshots into a retention-window bounded point store,
//! from which we derive one trajectory (GeoJSON LineString) per aircraft.
//!
//! A run is a single synchronous pass:
//! fetch -> normalize -> load store -> merge -> evict -> build trajectories -> persist both files.
//! Trajectories are always recomputed from the surviving points, they are never updated incrementally.
//! This costs O(points in window) per run but keeps the trajectory output from drifting away from the store.
//!
//! Note there is no locking of the persisted files. Runs have to be serialized by whatever schedules them,
//! overlapping load-merge-save cycles would lose updates.

use std::{path::{Path,PathBuf}, time::Duration};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize,Deserializer};
use tracing_subscriber::EnvFilter;

pub mod errors;
pub use errors::{OdinOpenSkyError,RejectReason,Result};

pub mod datetime;
pub mod fs;
use crate::datetime::{deserialize_duration,serialize_duration};

pub mod normalizer;
pub use normalizer::{normalize,normalize_all,StateRecord,Normalized};

pub mod point_store;
pub use point_store::PointStore;

pub mod trajectory;
pub use trajectory::{Trajectory,build_trajectories};

pub mod provider;
pub use provider::{SnapshotProvider,OpenSkyProvider,FileSnapshotProvider,StaticSnapshotProvider,Snapshot};

pub mod accumulator;
pub use accumulator::{Accumulator,RunConfig,RunSummary};

pub const OPENSKY_STATES_URL: &str = "https://opensky-network.org/api/states/all";

/// one observed aircraft position at one instant.
/// Persisted field names are the ones of the flight point store files
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Point {
    #[serde(rename="icao24")]
    pub aircraft_id: String,

    #[serde(default,deserialize_with="de_string_or_null")]
    pub callsign: String, // trimmed, empty if not reported

    #[serde(default,deserialize_with="de_string_or_null")]
    pub origin_country: String,

    #[serde(default)]
    pub time_position: Option<i64>, // epoch seconds

    #[serde(default,deserialize_with="de_string_or_null")]
    pub timestamp_iso: String,

    #[serde(rename="lon")]
    pub longitude: f64, // degrees

    #[serde(rename="lat")]
    pub latitude: f64, // degrees

    #[serde(default)]
    pub altitude: Option<f64>, // meters

    #[serde(default,skip_serializing_if="Option::is_none")]
    pub velocity: Option<f64>, // m/s

    #[serde(default,skip_serializing_if="Option::is_none")]
    pub heading: Option<f64>, // true track in degrees
}

impl Point {
    /// the instant that orders and ages this point: `time_position` if set, otherwise the parsed `timestamp_iso`.
    /// None means the age of the point is unknown
    pub fn resolved_time (&self)->Option<DateTime<Utc>> {
        match self.time_position {
            Some(secs) => datetime::from_epoch_secs(secs),
            None => datetime::parse_iso( &self.timestamp_iso)
        }
    }

    pub fn has_valid_coordinates (&self)->bool {
        self.longitude.is_finite() && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

fn de_string_or_null <'a,D>(deserializer: D) -> std::result::Result<String,D::Error> where D: Deserializer<'a> {
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok( s.unwrap_or_default())
}

/* #region configuration ***********************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64
}

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// the RON configuration for OpenSky accumulation. All fields have defaults
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct OpenSkyConfig {
    pub url: String,
    pub bbox: Option<BoundingBox>,
    pub credentials: Option<Credentials>,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub request_timeout: Duration,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub retention: Duration, // how long we keep points

    pub points_file: PathBuf,
    pub trajectories_file: PathBuf,
}

impl Default for OpenSkyConfig {
    fn default()->Self {
        OpenSkyConfig {
            url: OPENSKY_STATES_URL.to_string(),
            bbox: None,
            credentials: None,
            request_timeout: Duration::from_secs(30),
            retention: Duration::from_secs(24 * 3600),
            points_file: PathBuf::from("flight_points.json"),
            trajectories_file: PathBuf::from("flight_trajectories.geojson"),
        }
    }
}

impl OpenSkyConfig {
    pub fn run_config (&self)->RunConfig {
        RunConfig {
            retention: self.retention,
            points_path: self.points_file.clone(),
            trajectories_path: self.trajectories_file.clone(),
        }
    }
}

pub fn load_config (path: impl AsRef<Path>)->Result<OpenSkyConfig> {
    let ron = std::fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str(&ron)? )
}

/* #endregion configuration */

/// install a fmt subscriber that honors RUST_LOG (defaulting to `info`)
pub fn init_tracing () {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"));
    // this only fails if there already is a global subscriber
    let _ = tracing_subscriber::fmt().with_env_filter( filter).try_init();
}
