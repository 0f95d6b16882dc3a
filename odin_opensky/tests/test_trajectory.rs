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
#![allow(unused)]

use std::fs;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use odin_opensky::{Point, build_trajectories, datetime::iso_from_epoch_secs, trajectory::{to_geojson,save_trajectories}};

fn point (id: &str, cs: &str, t: Option<i64>, iso: &str, lon: f64, lat: f64)->Point {
    Point {
        aircraft_id: id.to_string(),
        callsign: cs.to_string(),
        origin_country: "Testland".to_string(),
        time_position: t,
        timestamp_iso: t.and_then( iso_from_epoch_secs).unwrap_or( iso.to_string()),
        longitude: lon,
        latitude: lat,
        altitude: None,
        velocity: None,
        heading: None
    }
}

fn tp (id: &str, t: i64, lon: f64, lat: f64)->Point { point( id, "", Some(t), "", lon, lat) }

#[test]
fn test_single_point_has_no_trajectory () {
    let trajectories = build_trajectories( &[ tp("a1", 10, 1.0, 2.0) ]);
    assert!( trajectories.is_empty());
}

#[test]
fn test_two_points_in_time_order () {
    let trajectories = build_trajectories( &[ tp("a1", 20, 1.5, 2.5), tp("a1", 10, 1.0, 2.0) ]);
    assert_eq!( trajectories.len(), 1);

    let t = &trajectories[0];
    assert_eq!( t.aircraft_id, "a1");
    assert_eq!( t.coordinates, vec![ [1.0,2.0], [1.5,2.5] ]);
    assert_eq!( t.start, "1970-01-01T00:00:10Z");
    assert_eq!( t.end, "1970-01-01T00:00:20Z");
}

#[test]
fn test_invalid_coordinates_are_skipped () {
    let points = vec![
        tp("a1", 10, 1.0, 2.0),
        tp("a1", 20, 1.0, 95.0),
        tp("a1", 30, 181.0, 2.0),
        tp("b2", 10, 1.0, 100.0),
        tp("b2", 20, 1.0, 100.0),
        tp("c3", 10, -180.0, -90.0),
        tp("c3", 20, 180.0, 90.0),
    ];
    let trajectories = build_trajectories( &points);

    // a1 is left with a single valid point, b2 has none
    assert_eq!( trajectories.len(), 1);
    assert_eq!( trajectories[0].aircraft_id, "c3");
    assert_eq!( trajectories[0].coordinates, vec![ [-180.0,-90.0], [180.0,90.0] ]);
}

#[test]
fn test_iso_fallback_ordering () {
    // one point without time_position switches the whole group to timestamp_iso ordering
    let points = vec![
        point("a1", "", Some(30), "", 3.0, 3.0),
        point("a1", "", None, "1970-01-01T00:00:20Z", 2.0, 2.0),
        point("a1", "", Some(10), "", 1.0, 1.0),
    ];
    let trajectories = build_trajectories( &points);
    assert_eq!( trajectories[0].coordinates, vec![ [1.0,1.0], [2.0,2.0], [3.0,3.0] ]);
}

#[test]
fn test_callsign_is_last_non_empty () {
    let points = vec![
        point("a1", "FIRST", Some(10), "", 1.0, 1.0),
        point("a1", "LAST", Some(20), "", 2.0, 2.0),
        point("a1", "", Some(30), "", 3.0, 3.0),
    ];
    let trajectories = build_trajectories( &points);
    assert_eq!( trajectories[0].callsign.as_deref(), Some("LAST"));

    let no_cs = build_trajectories( &[ tp("b2", 1, 1.0, 1.0), tp("b2", 2, 2.0, 2.0) ]);
    assert_eq!( no_cs[0].callsign, None);
}

#[test]
fn test_order_independence () {
    let mut points: Vec<Point> = Vec::new();
    for i in 0..40 {
        let id = ["a1","b2","c3","d4"][i % 4];
        points.push( tp( id, (i / 2) as i64, i as f64 * 0.1, 45.0 - i as f64 * 0.1));
    }
    // same-instant duplicates and a same-instant conflicting report
    points.push( tp("a1", 4, 0.4, 44.6));
    points.push( tp("a1", 4, 9.9, 9.9));
    points.push( point("b2", "CS", None, "1970-01-01T00:00:07Z", 5.0, 5.0));

    let expected = to_geojson( &build_trajectories( &points)).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        points.shuffle( &mut rng);
        let result = to_geojson( &build_trajectories( &points)).unwrap();
        assert_eq!( result, expected);
    }

    points.reverse();
    assert_eq!( to_geojson( &build_trajectories( &points)).unwrap(), expected);
}

#[test]
fn test_geojson_output () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_trajectories.geojson");

    let trajectories = build_trajectories( &[ tp("b2", 10, 1.0, 2.0), tp("b2", 20, 1.5, 2.5), point("a1", "X", Some(5), "", 0.0, 0.0), tp("a1", 6, 0.5, 0.5) ]);
    save_trajectories( &path, &trajectories).unwrap();

    let fc: geojson::FeatureCollection = serde_json::from_str( &fs::read_to_string( &path).unwrap()).unwrap();
    assert_eq!( fc.features.len(), 2);

    let f = &fc.features[0];
    assert_eq!( f.property("icao24").and_then( |v| v.as_str()), Some("a1"));
    assert_eq!( f.property("callsign").and_then( |v| v.as_str()), Some("X"));
    assert_eq!( f.property("n_points").and_then( |v| v.as_u64()), Some(2));
    match &f.geometry.as_ref().unwrap().value {
        geojson::Value::LineString(coords) => assert_eq!( coords, &vec![ vec![0.0,0.0], vec![0.5,0.5] ]),
        other => panic!("not a LineString: {other:?}")
    }
}

#[test]
fn test_empty_geojson_is_well_formed () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_trajectories.geojson");
    save_trajectories( &path, &[]).unwrap();

    let value: serde_json::Value = serde_json::from_str( &fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!( value, serde_json::json!({"type": "FeatureCollection", "features": []}));
}
