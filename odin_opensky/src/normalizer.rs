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

//! conversion of raw OpenSky state vectors into [`Point`]s
//!
//! state vectors are positional JSON arrays:
//! `[icao24, callsign, origin_country, time_position, last_contact, longitude, latitude,
//!   baro_altitude, on_ground, velocity, true_track, vertical_rate, sensors, geo_altitude, ...]`

use chrono::{DateTime,Utc};
use serde_json::Value;
use tracing::debug;

use crate::{Point, datetime, errors::RejectReason};

/// one raw state vector as it comes from the feed
pub type StateRecord = Vec<Value>;

const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const TIME_POSITION: usize = 3;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;
const GEO_ALTITUDE: usize = 13;

type NResult<T> = std::result::Result<T,RejectReason>;

/// the outcome of normalizing a whole snapshot
#[derive(Debug,Default)]
pub struct Normalized {
    pub points: Vec<Point>,
    pub n_rejected: usize,
}

/// turn a single state vector into a Point.
/// `now` is the run clock, used as `timestamp_iso` for records without `time_position`
pub fn normalize (record: &[Value], now: &DateTime<Utc>)->NResult<Point> {
    let aircraft_id = get_id( record)?;

    let longitude = get_f64( record, LONGITUDE, "longitude")?.ok_or( RejectReason::MissingPosition)?;
    let latitude = get_f64( record, LATITUDE, "latitude")?.ok_or( RejectReason::MissingPosition)?;

    let callsign = get_string( record, CALLSIGN, "callsign")?.map( |s| s.trim().to_string()).unwrap_or_default();
    let origin_country = get_string( record, ORIGIN_COUNTRY, "origin_country")?.map( |s| s.to_string()).unwrap_or_default();

    let time_position = get_i64( record, TIME_POSITION, "time_position")?;
    let timestamp_iso = match time_position {
        Some(secs) => datetime::iso_from_epoch_secs(secs).ok_or( RejectReason::MalformedField("time_position"))?,
        None => datetime::iso_string(now)
    };

    let altitude = match get_f64( record, BARO_ALTITUDE, "baro_altitude")? {
        Some(alt) => Some(alt),
        None => get_f64( record, GEO_ALTITUDE, "geo_altitude")?
    };
    let velocity = get_f64( record, VELOCITY, "velocity")?;
    let heading = get_f64( record, TRUE_TRACK, "true_track")?;

    Ok( Point { aircraft_id, callsign, origin_country, time_position, timestamp_iso, longitude, latitude, altitude, velocity, heading } )
}

/// normalize all records of a snapshot, counting (not failing on) the ones we have to reject
pub fn normalize_all (records: &[StateRecord], now: &DateTime<Utc>)->Normalized {
    let mut normalized = Normalized { points: Vec::with_capacity( records.len()), n_rejected: 0 };

    for record in records {
        match normalize( record, now) {
            Ok(p) => normalized.points.push(p),
            Err(reason) => {
                debug!("rejected state record {:?}: {}", record.get(ICAO24), reason);
                normalized.n_rejected += 1;
            }
        }
    }

    normalized
}

//--- field accessors. Missing trailing fields are treated like explicit nulls

fn field (record: &[Value], idx: usize)->Option<&Value> {
    match record.get(idx) {
        Some(Value::Null) | None => None,
        v => v
    }
}

fn get_id (record: &[Value])->NResult<String> {
    match get_string( record, ICAO24, "icao24")? {
        Some(s) if !s.trim().is_empty() => Ok( s.trim().to_lowercase()),
        _ => Err( RejectReason::MissingIdentifier)
    }
}

fn get_string<'a> (record: &'a [Value], idx: usize, name: &'static str)->NResult<Option<&'a str>> {
    match field( record, idx) {
        None => Ok(None),
        Some(Value::String(s)) => Ok( Some(s.as_str())),
        Some(_) => Err( RejectReason::MalformedField(name))
    }
}

fn get_f64 (record: &[Value], idx: usize, name: &'static str)->NResult<Option<f64>> {
    match field( record, idx) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_f64()
            .filter( |v| v.is_finite())
            .map( Some)
            .ok_or( RejectReason::MalformedField(name)),
        Some(_) => Err( RejectReason::MalformedField(name))
    }
}

fn get_i64 (record: &[Value], idx: usize, name: &'static str)->NResult<Option<i64>> {
    match field( record, idx) {
        None => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok( Some(i))
            } else if let Some(f) = n.as_f64() && f.is_finite() && f.abs() < i64::MAX as f64 {
                Ok( Some(f.trunc() as i64))
            } else {
                Err( RejectReason::MalformedField(name))
            }
        }
        Some(_) => Err( RejectReason::MalformedField(name))
    }
}
