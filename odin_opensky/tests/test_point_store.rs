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
use chrono::{DateTime,TimeZone,Utc};
use odin_opensky::{Point, PointStore, datetime::iso_from_epoch_secs, point_store::{merge,evict}};

fn point (id: &str, t: Option<i64>, iso: &str, lon: f64, lat: f64)->Point {
    Point {
        aircraft_id: id.to_string(),
        callsign: String::new(),
        origin_country: "Testland".to_string(),
        time_position: t,
        timestamp_iso: t.and_then( iso_from_epoch_secs).unwrap_or( iso.to_string()),
        longitude: lon,
        latitude: lat,
        altitude: Some(1000.0),
        velocity: None,
        heading: None
    }
}

fn at (secs: i64)->DateTime<Utc> { Utc.timestamp_opt( secs, 0).unwrap() }

#[test]
fn test_merge_keeps_duplicates () {
    let existing = vec![ point("a1", Some(10), "", 1.0, 2.0) ];
    let incoming = vec![ point("a1", Some(10), "", 1.0, 2.0), point("b2", Some(20), "", 3.0, 4.0) ];

    let merged = merge( existing, incoming);
    assert_eq!( merged.len(), 3);
    assert_eq!( merged[0], merged[1]);
    assert_eq!( merged[2].aircraft_id, "b2");
}

#[test]
fn test_evict_window () {
    let points = vec![
        point("a1", Some(100), "", 1.0, 2.0),
        point("a1", Some(99), "", 1.0, 2.0),
        point("b2", None, "1970-01-01T00:01:40Z", 1.0, 2.0), // 100
        point("b2", None, "1970-01-01T00:01:39", 1.0, 2.0),  // 99, legacy format
        point("c3", None, "not a time", 1.0, 2.0),
        point("c3", None, "", 1.0, 2.0),
        point("d4", Some(500), "", 1.0, 2.0), // at now
    ];
    let cutoff = at(100);
    let now = at(500);

    let survivors = evict( points.clone(), &cutoff, &now);
    assert_eq!( survivors, vec![ points[0].clone(), points[2].clone(), points[6].clone() ]);

    for p in &survivors {
        let t = p.resolved_time().unwrap();
        assert!( t >= cutoff && t <= now);
    }
}

#[test]
fn test_evict_future_points () {
    let now = 100_000;
    let points = vec![
        point("a1", Some(now + 7200), "", 1.0, 2.0),
        point("a1", Some(now + 1), "", 1.0, 2.0),
        point("b2", None, "1970-01-02T03:46:41Z", 1.0, 2.0), // now + 1
        point("b2", None, "1970-01-02T03:46:40Z", 1.0, 2.0), // now
        point("c3", Some(now - 60), "", 1.0, 2.0),
    ];

    let survivors = evict( points.clone(), &at(now - 3600), &at(now));
    assert_eq!( survivors, vec![ points[3].clone(), points[4].clone() ]);

    let mut store = PointStore::new("flight_points.json");
    store.merge_in( points);
    assert_eq!( store.evict( &at(now - 3600), &at(now)), 3);
    assert!( store.points().iter().all( |p| p.resolved_time().unwrap() <= at(now)));
}

#[test]
fn test_evict_is_idempotent () {
    let points: Vec<Point> = (0..50).map( |i| point( if i % 2 == 0 {"a1"} else {"b2"}, Some(i * 10), "", 1.0, 2.0)).collect();
    let cutoff = at(250);
    let now = at(1000);

    let once = evict( points, &cutoff, &now);
    let twice = evict( once.clone(), &cutoff, &now);
    assert_eq!( once.len(), 25);
    assert_eq!( once, twice);
}

#[test]
fn test_load_missing_store_is_empty () {
    let dir = tempfile::tempdir().unwrap();
    let store = PointStore::load( dir.path().join("flight_points.json"));
    assert!( store.is_empty());
}

#[test]
fn test_load_corrupt_store_is_empty () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_points.json");

    for contents in ["[{\"icao24\": \"a1\", \"lon\": ", "{\"points\": []}", "", "42"] {
        fs::write( &path, contents).unwrap();
        let store = PointStore::load( &path);
        assert!( store.is_empty(), "store not empty for {contents:?}");
    }
}

#[test]
fn test_load_repairs_entries () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_points.json");
    fs::write( &path, r#"[
        {"icao24": "a1", "callsign": "ABC ", "origin_country": null, "time_position": 1753227401, "lon": 1.0, "lat": 2.0, "altitude": null},
        {"icao24": "a1", "callsign": null, "origin_country": "X", "time_position": null, "timestamp_iso": "2025-07-22T23:36:50.123456", "lon": 1.5, "lat": 2.5, "altitude": 300.0},
        {"icao24": "a1", "lat": 2.5},
        {"callsign": "NOID", "lon": 1.0, "lat": 2.0},
        "junk"
    ]"#).unwrap();

    let store = PointStore::load( &path);
    assert_eq!( store.len(), 2);
    assert_eq!( store.n_dropped_on_load(), 3);

    let p0 = &store.points()[0];
    assert_eq!( p0.callsign, "ABC");
    assert_eq!( p0.origin_country, "");
    assert_eq!( p0.timestamp_iso, "2025-07-22T23:36:41Z");

    let p1 = &store.points()[1];
    assert_eq!( p1.callsign, "");
    assert_eq!( p1.resolved_time().unwrap().timestamp(), 1753227410);
}

#[test]
fn test_save_and_reload () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/flight_points.json");

    let mut store = PointStore::new( &path);
    store.merge_in( vec![ point("a1", Some(10), "", 1.0, 2.0), point("a1", None, "1970-01-01T00:00:20Z", 1.5, 2.5) ]);
    store.save().unwrap();

    let reloaded = PointStore::load( &path);
    assert_eq!( reloaded.points(), store.points());
}

#[test]
fn test_save_empty_store_replaces_old_file () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_points.json");

    let mut store = PointStore::new( &path);
    store.merge_in( vec![ point("a1", Some(10), "", 1.0, 2.0) ]);
    store.save().unwrap();

    assert_eq!( store.evict( &at(1000), &at(2000)), 1);
    store.save().unwrap();

    let contents = fs::read_to_string( &path).unwrap();
    let value: serde_json::Value = serde_json::from_str( &contents).unwrap();
    assert_eq!( value, serde_json::json!([]));
}

#[test]
fn test_saved_field_layout () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight_points.json");

    let mut p = point("a1", None, "1970-01-01T00:00:20Z", 1.0, 2.0);
    p.altitude = None;
    let mut store = PointStore::new( &path);
    store.merge_in( vec![p]);
    store.save().unwrap();

    let value: serde_json::Value = serde_json::from_str( &fs::read_to_string( &path).unwrap()).unwrap();
    let entry = value[0].as_object().unwrap();
    assert_eq!( entry["icao24"], "a1");
    assert!( entry["time_position"].is_null()); // written as null
    assert!( entry["altitude"].is_null());
    assert!( !entry.contains_key("velocity")); // omitted
    assert!( !entry.contains_key("heading"));
}
