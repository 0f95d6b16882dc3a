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

//! the persisted, retention-window bounded collection of [`Point`]s
//!
//! The store is a snapshot, not a log: it is read wholesale at the start of a run and replaced
//! wholesale at the end. Absent or corrupt store files reset the history instead of failing the run,
//! continuous runs refill it within one retention window.

use std::path::{Path,PathBuf};
use chrono::{DateTime,Utc};
use serde_json::Value;
use tracing::{debug,warn};

use crate::{Point, datetime, fs::{self,StagedFile}, errors::Result};

#[derive(Debug)]
pub struct PointStore {
    path: PathBuf,
    points: Vec<Point>,
    n_loaded: usize,
    n_dropped_on_load: usize, // malformed entries we could not repair
}

impl PointStore {
    /// an empty store that has not been read from `path`
    pub fn new (path: impl AsRef<Path>)->Self {
        PointStore { path: path.as_ref().to_path_buf(), points: Vec::new(), n_loaded: 0, n_dropped_on_load: 0 }
    }

    /// read the store from `path`. This never fails - a missing or unparsable file yields an empty store
    pub fn load (path: impl AsRef<Path>)->Self {
        let mut store = PointStore::new( path);

        match fs::read_if_exists( &store.path) {
            Ok(Some(bytes)) => {
                let (points, n_dropped) = parse_points( &bytes, &store.path);
                store.n_loaded = points.len();
                store.n_dropped_on_load = n_dropped;
                store.points = points;
            }
            Ok(None) => debug!("no point store {:?} yet, starting empty", store.path),
            Err(e) => warn!("point store {:?} not readable ({}), starting empty", store.path, e),
        }

        store
    }

    pub fn path (&self)->&Path { self.path.as_path() }
    pub fn points (&self)->&[Point] { self.points.as_slice() }
    pub fn len (&self)->usize { self.points.len() }
    pub fn is_empty (&self)->bool { self.points.is_empty() }

    pub fn n_loaded (&self)->usize { self.n_loaded }
    pub fn n_dropped_on_load (&self)->usize { self.n_dropped_on_load }

    pub fn merge_in (&mut self, incoming: Vec<Point>) {
        let existing = std::mem::take( &mut self.points);
        self.points = merge( existing, incoming);
    }

    /// drop all points outside of `[cutoff,now]`, returning how many were removed
    pub fn evict (&mut self, cutoff: &DateTime<Utc>, now: &DateTime<Utc>)->usize {
        let n_before = self.points.len();
        let points = std::mem::take( &mut self.points);
        self.points = evict( points, cutoff, now);
        n_before - self.points.len()
    }

    /// the serialized store contents. An empty store is still a well-formed (empty) array
    pub fn to_json (&self)->Result<Vec<u8>> {
        Ok( serde_json::to_vec_pretty( &self.points)? )
    }

    /// write the serialized store to a temp file that replaces the store file once committed
    pub fn stage (&self)->Result<StagedFile> {
        fs::stage( &self.path, &self.to_json()?)
    }

    /// replace the persisted store with our current points
    pub fn save (&self)->Result<()> {
        fs::write_atomic( &self.path, &self.to_json()?)
    }
}

/// all existing and incoming points, in that order. We do not de-duplicate by content - repeated
/// observations (even identical ones) are all kept until they age out of the window
pub fn merge (mut existing: Vec<Point>, incoming: Vec<Point>)->Vec<Point> {
    existing.extend( incoming);
    existing
}

/// keep exactly the points whose resolved time is within `[cutoff,now]`. Points without a resolvable
/// time are dropped since we can't tell how old they are, and so are points from the future (feed clock skew).
/// Order of survivors is preserved
pub fn evict (points: Vec<Point>, cutoff: &DateTime<Utc>, now: &DateTime<Utc>)->Vec<Point> {
    points.into_iter()
        .filter( |p| is_within( p, cutoff, now))
        .collect()
}

pub fn is_within (p: &Point, cutoff: &DateTime<Utc>, now: &DateTime<Utc>)->bool {
    match p.resolved_time() {
        Some(t) if t > *now => {
            debug!("dropping point of {} from the future ({})", p.aircraft_id, p.timestamp_iso);
            false
        }
        Some(t) => t >= *cutoff,
        None => {
            debug!("dropping point of {} with unparseable timestamp '{}'", p.aircraft_id, p.timestamp_iso);
            false
        }
    }
}

/// parse a store file, dropping entries that are not valid points and repairing missing `timestamp_iso`
/// values from `time_position`. Returns the points and the number of dropped entries
fn parse_points (bytes: &[u8], path: &Path)->(Vec<Point>,usize) {
    let entries = match serde_json::from_slice::<Value>( bytes) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("point store {:?} is not an array of points, resetting it", path);
            return (Vec::new(), 0)
        }
        Err(e) => {
            warn!("point store {:?} corrupt ({}), resetting it", path, e);
            return (Vec::new(), 0)
        }
    };

    let mut points = Vec::with_capacity( entries.len());
    let mut n_dropped = 0;

    for entry in entries {
        match serde_json::from_value::<Point>( entry) {
            Ok(mut p) => {
                repair( &mut p);
                points.push(p);
            }
            Err(e) => {
                debug!("dropping malformed store entry: {}", e);
                n_dropped += 1;
            }
        }
    }

    if n_dropped > 0 {
        warn!("dropped {} malformed entries from point store {:?}", n_dropped, path);
    }

    (points, n_dropped)
}

fn repair (p: &mut Point) {
    p.callsign = p.callsign.trim().to_string();

    if p.timestamp_iso.trim().is_empty() {
        if let Some(iso) = p.time_position.and_then( datetime::iso_from_epoch_secs) {
            p.timestamp_iso = iso;
        }
    }
}
