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

//! time conversion helpers shared by normalizer, store and trajectory builder

use std::time::Duration;
use chrono::{DateTime,NaiveDateTime,Utc};
use serde::{Deserialize,Deserializer,Serializer};
use parse_duration::parse;

/// the canonical `timestamp_iso` format. Second resolution and a fixed width make
/// lexicographic order of these strings identical to chronological order
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// legacy stores have naive (offset-less) timestamps, some with fractional seconds
const NAIVE_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn iso_string (dt: &DateTime<Utc>)->String {
    dt.format(ISO_FORMAT).to_string()
}

/// None if `secs` is outside of what chrono can represent
pub fn iso_from_epoch_secs (secs: i64)->Option<String> {
    DateTime::from_timestamp( secs, 0).map( |dt| iso_string(&dt))
}

pub fn from_epoch_secs (secs: i64)->Option<DateTime<Utc>> {
    DateTime::from_timestamp( secs, 0)
}

/// accepts RFC3339 with any offset and naive ISO-8601 date-times (taken as UTC)
pub fn parse_iso (s: &str)->Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() { return None }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        Some( dt.to_utc())
    } else {
        NaiveDateTime::parse_from_str( s, NAIVE_ISO_FORMAT).ok().map( |ndt| ndt.and_utc())
    }
}

/// truncate to full seconds so that run timestamps compare consistently with the canonical ISO strings
pub fn truncate_to_secs (dt: &DateTime<Utc>)->DateTime<Utc> {
    DateTime::from_timestamp( dt.timestamp(), 0).unwrap_or(*dt)
}

//--- serde support for textual durations in configs ("24h", "30s")

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &format!("{}s", dur.as_secs()))
}

/// clap value parser for duration arguments
pub fn parse_duration_arg (s: &str)->Result<Duration,String> {
    parse(s).map_err( |e| format!("invalid duration '{s}': {e:?}"))
}
