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

//! derivation of per-aircraft trajectories from the surviving store points, and their GeoJSON output

use std::{cmp::Ordering, collections::BTreeMap, path::Path};
use geojson::{Feature,FeatureCollection,Geometry,JsonObject,JsonValue};

use crate::{Point, fs::{self,StagedFile}, errors::Result};

/// an ordered polyline of at least two positions of the same aircraft
#[derive(Debug,Clone,PartialEq)]
pub struct Trajectory {
    pub aircraft_id: String,
    pub callsign: Option<String>, // last reported non-empty callsign
    pub coordinates: Vec<[f64;2]>, // [lon,lat] degrees, in time order
    pub start: String, // timestamp_iso of first position
    pub end: String,   // timestamp_iso of last position
}

impl Trajectory {
    pub fn len (&self)->usize { self.coordinates.len() }

    pub fn to_feature (&self)->Feature {
        let coords: Vec<Vec<f64>> = self.coordinates.iter().map( |c| c.to_vec()).collect();

        let mut props = JsonObject::new();
        props.insert( "icao24".to_string(), JsonValue::from( self.aircraft_id.as_str()));
        if let Some(cs) = &self.callsign {
            props.insert( "callsign".to_string(), JsonValue::from( cs.as_str()));
        }
        props.insert( "n_points".to_string(), JsonValue::from( self.coordinates.len()));
        props.insert( "start".to_string(), JsonValue::from( self.start.as_str()));
        props.insert( "end".to_string(), JsonValue::from( self.end.as_str()));

        Feature {
            bbox: None,
            geometry: Some( Geometry::new( geojson::Value::LineString(coords))),
            id: None,
            properties: Some(props),
            foreign_members: None,
        }
    }
}

/// group points by aircraft, order each group by time, drop positions with out-of-range coordinates and
/// emit a trajectory for each aircraft that still has at least two positions.
/// The result is ordered by aircraft id and does not depend on the order of `points`
pub fn build_trajectories (points: &[Point])->Vec<Trajectory> {
    let mut groups: BTreeMap<&str,Vec<&Point>> = BTreeMap::new();
    for p in points {
        groups.entry( p.aircraft_id.as_str()).or_default().push(p);
    }

    groups.into_iter()
        .filter_map( |(id,group)| build_trajectory( id, group))
        .collect()
}

fn build_trajectory (aircraft_id: &str, mut group: Vec<&Point>)->Option<Trajectory> {
    // epoch seconds only if every point has them, otherwise the ISO strings (which sort chronologically)
    let by_time_position = group.iter().all( |p| p.time_position.is_some());
    group.sort_by( |a,b| cmp_points( a, b, by_time_position));
    group.retain( |p| p.has_valid_coordinates());

    if group.len() < 2 { return None }

    let coordinates: Vec<[f64;2]> = group.iter().map( |p| [p.longitude, p.latitude]).collect();
    let callsign = group.iter().rev()
        .map( |p| p.callsign.as_str())
        .find( |cs| !cs.is_empty())
        .map( |cs| cs.to_string());
    let start = group.first()?.timestamp_iso.clone();
    let end = group.last()?.timestamp_iso.clone();

    Some( Trajectory { aircraft_id: aircraft_id.to_string(), callsign, coordinates, start, end } )
}

/// a total order so that the sort result is independent of input order. Ties on time are broken by
/// the remaining point fields
fn cmp_points (a: &Point, b: &Point, by_time_position: bool)->Ordering {
    let by_time = if by_time_position {
        a.time_position.cmp( &b.time_position)
    } else {
        a.timestamp_iso.cmp( &b.timestamp_iso)
    };

    by_time
        .then_with( || a.timestamp_iso.cmp( &b.timestamp_iso))
        .then_with( || a.longitude.total_cmp( &b.longitude))
        .then_with( || a.latitude.total_cmp( &b.latitude))
        .then_with( || cmp_opt_f64( a.altitude, b.altitude))
        .then_with( || a.callsign.cmp( &b.callsign))
        .then_with( || a.origin_country.cmp( &b.origin_country))
        .then_with( || cmp_opt_f64( a.velocity, b.velocity))
        .then_with( || cmp_opt_f64( a.heading, b.heading))
}

fn cmp_opt_f64 (a: Option<f64>, b: Option<f64>)->Ordering {
    match (a,b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp( &b.is_some())
    }
}

/* #region GeoJSON output ******************************************************************************/

pub fn to_feature_collection (trajectories: &[Trajectory])->FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: trajectories.iter().map( |t| t.to_feature()).collect(),
        foreign_members: None,
    }
}

/// the serialized trajectory container. No trajectories still make a valid, empty FeatureCollection
pub fn to_geojson (trajectories: &[Trajectory])->Result<Vec<u8>> {
    Ok( serde_json::to_vec_pretty( &to_feature_collection( trajectories))? )
}

pub fn stage_trajectories (path: impl AsRef<Path>, trajectories: &[Trajectory])->Result<StagedFile> {
    fs::stage( path, &to_geojson( trajectories)?)
}

pub fn save_trajectories (path: impl AsRef<Path>, trajectories: &[Trajectory])->Result<()> {
    fs::write_atomic( path, &to_geojson( trajectories)?)
}

/* #endregion GeoJSON output */
