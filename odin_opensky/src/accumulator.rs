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

//! one accumulation run: fetch -> normalize -> load -> merge -> evict -> build trajectories -> persist

use std::{fmt, path::PathBuf, time::Duration};
use chrono::{DateTime,TimeDelta,Utc};
use tracing::info;

use crate::{
    datetime, fs, normalizer::normalize_all, point_store::PointStore, provider::SnapshotProvider,
    trajectory::{build_trajectories,stage_trajectories}, errors::{Result,op_failed}
};

/// the explicit parameters of a run
#[derive(Debug,Clone)]
pub struct RunConfig {
    pub retention: Duration,
    pub points_path: PathBuf,
    pub trajectories_path: PathBuf,
}

/// what happened during a run
#[derive(Debug,Clone,PartialEq)]
pub struct RunSummary {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub n_received: usize,     // raw records in snapshot
    pub n_rejected: usize,     // records that could not be normalized
    pub n_accepted: usize,     // new points merged into the store
    pub n_loaded: usize,       // points read from the persisted store
    pub n_evicted: usize,      // points dropped because they were outside of [cutoff,now]
    pub n_stored: usize,       // points persisted at the end of the run
    pub n_trajectories: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "run at {}: received {} states ({} rejected), loaded {}, added {}, evicted {}, stored {} points, {} trajectories",
            datetime::iso_string(&self.now), self.n_received, self.n_rejected, self.n_loaded, self.n_accepted,
            self.n_evicted, self.n_stored, self.n_trajectories)
    }
}

pub struct Accumulator {
    config: RunConfig
}

impl Accumulator {
    pub fn new (config: RunConfig)->Self {
        Accumulator { config }
    }

    pub fn config (&self)->&RunConfig { &self.config }

    /// run with the current wall clock time
    pub fn run (&self, provider: &dyn SnapshotProvider)->Result<RunSummary> {
        self.run_at( provider, Utc::now())
    }

    /// run with a given clock. `now` is used for every cutoff and fallback timestamp in this run.
    /// If the provider fails neither the point store nor the trajectory file is touched
    pub fn run_at (&self, provider: &dyn SnapshotProvider, now: DateTime<Utc>)->Result<RunSummary> {
        let now = datetime::truncate_to_secs( &now);
        let cutoff = self.cutoff( &now)?;

        let snapshot = provider.fetch()?;
        let n_received = snapshot.states.len();
        let normalized = normalize_all( &snapshot.states, &now);
        let n_accepted = normalized.points.len();
        if normalized.n_rejected > 0 {
            info!("rejected {} of {} state records", normalized.n_rejected, n_received);
        }

        let mut store = PointStore::load( &self.config.points_path);
        let n_loaded = store.len();
        store.merge_in( normalized.points);
        let n_evicted = store.evict( &cutoff, &now);

        let trajectories = build_trajectories( store.points());

        // both files are written to temp files first so that we never persist one without the other
        let staged = vec![
            store.stage()?,
            stage_trajectories( &self.config.trajectories_path, &trajectories)?
        ];
        fs::commit( staged)?;

        let summary = RunSummary {
            now, cutoff, n_received, n_rejected: normalized.n_rejected, n_accepted, n_loaded, n_evicted,
            n_stored: store.len(),
            n_trajectories: trajectories.len()
        };
        info!("{}", summary);

        if summary.n_trajectories == 0 {
            info!("no trajectories yet (not enough points within retention window)");
        }

        Ok(summary)
    }

    fn cutoff (&self, now: &DateTime<Utc>)->Result<DateTime<Utc>> {
        let retention = TimeDelta::from_std( self.config.retention)
            .map_err( |e| op_failed!("invalid retention window {:?}: {}", self.config.retention, e))?;
        Ok( now.checked_sub_signed( retention).unwrap_or( DateTime::<Utc>::MIN_UTC))
    }
}
