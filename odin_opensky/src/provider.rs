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

//! snapshot providers - where the raw state vectors of a run come from

use std::path::{Path,PathBuf};
use reqwest::{blocking::Client, header::ACCEPT};
use serde_json::Value;
use tracing::{debug,info};

use crate::{OpenSkyConfig, BoundingBox, Credentials, StateRecord, errors::{Result,provider_error}};

/// one fetched batch of state vectors
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Snapshot {
    pub time: Option<i64>, // epoch seconds reported by the feed
    pub states: Vec<StateRecord>,
}

/// the source of snapshots. A failing fetch is the only error that aborts an accumulation run
pub trait SnapshotProvider {
    fn fetch (&self)->Result<Snapshot>;
}

/// parse a states response `{"time": <secs>, "states": [[..],..] | null}`.
/// Null states mean there were no aircraft in the queried area
pub fn parse_snapshot (bytes: &[u8])->Result<Snapshot> {
    let mut obj = match serde_json::from_slice::<Value>( bytes) {
        Ok(Value::Object(obj)) => obj,
        Ok(_) => return Err( provider_error!("snapshot is not a JSON object")),
        Err(e) => return Err( provider_error!("malformed snapshot: {}", e))
    };

    let time = obj.get("time").and_then( |v| v.as_i64());
    let states = match obj.remove("states") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(states)) => states.into_iter().map( |s| match s {
            Value::Array(fields) => fields,
            _ => Vec::new() // not a state vector, gets rejected by the normalizer for lack of an id
        }).collect(),
        Some(_) => return Err( provider_error!("snapshot states are not an array"))
    };

    Ok( Snapshot { time, states } )
}

/// live OpenSky REST API provider (synchronous, one request per fetch)
pub struct OpenSkyProvider {
    client: Client,
    url: String,
    bbox: Option<BoundingBox>,
    credentials: Option<Credentials>,
}

impl OpenSkyProvider {
    pub fn new (config: &OpenSkyConfig)->Result<Self> {
        let client = Client::builder()
            .timeout( config.request_timeout)
            .build()?;

        Ok( OpenSkyProvider {
            client,
            url: config.url.clone(),
            bbox: config.bbox,
            credentials: config.credentials.clone()
        })
    }

    /// the unparsed response body
    pub fn fetch_raw (&self)->Result<Vec<u8>> {
        let mut req = self.client.get( self.url.as_str())
            .header( ACCEPT, "application/json");

        if let Some(bbox) = &self.bbox {
            req = req.query( &[("lamin", bbox.south), ("lomin", bbox.west), ("lamax", bbox.north), ("lomax", bbox.east)]);
        }
        if let Some(cred) = &self.credentials {
            req = req.basic_auth( cred.user.as_str(), Some( cred.password.as_str()));
        }

        info!("fetching live aircraft states from {}", self.url);
        let response = req.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err( provider_error!("{} returned status {}", self.url, status))
        }

        let bytes = response.bytes()?;
        debug!("received {} bytes", bytes.len());
        Ok( bytes.to_vec())
    }
}

impl SnapshotProvider for OpenSkyProvider {
    fn fetch (&self)->Result<Snapshot> {
        parse_snapshot( &self.fetch_raw()?)
    }
}

/// replays a states response that was saved to a file (e.g. by `get_opensky`)
pub struct FileSnapshotProvider {
    path: PathBuf
}

impl FileSnapshotProvider {
    pub fn new (path: impl AsRef<Path>)->Self {
        FileSnapshotProvider { path: path.as_ref().to_path_buf() }
    }
}

impl SnapshotProvider for FileSnapshotProvider {
    fn fetch (&self)->Result<Snapshot> {
        let bytes = std::fs::read( &self.path)
            .map_err( |e| provider_error!("cannot read snapshot {:?}: {}", self.path, e))?;
        parse_snapshot( &bytes)
    }
}

/// a fixed in-memory snapshot
pub struct StaticSnapshotProvider {
    snapshot: Snapshot
}

impl StaticSnapshotProvider {
    pub fn new (states: Vec<StateRecord>)->Self {
        StaticSnapshotProvider { snapshot: Snapshot { time: None, states } }
    }
}

impl SnapshotProvider for StaticSnapshotProvider {
    fn fetch (&self)->Result<Snapshot> {
        Ok( self.snapshot.clone() )
    }
}
