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

use std::{path::PathBuf, time::Duration};
use anyhow::Result;
use clap::Parser;
use odin_opensky::{
    init_tracing, load_config, datetime::parse_duration_arg, Accumulator, OpenSkyConfig,
    SnapshotProvider, OpenSkyProvider, FileSnapshotProvider
};

/// performs one accumulation run: fetch the current OpenSky states, merge them into the point store,
/// evict points outside the retention window and regenerate the trajectory file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// RON config file (defaults are used if not set)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// retention window, e.g. "24h" or "90min"
    #[arg(short,long, value_parser = parse_duration_arg)]
    pub retention: Option<Duration>,

    /// point store file
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// trajectory GeoJSON output file
    #[arg(long)]
    pub trajectories: Option<PathBuf>,

    /// replay a saved states response instead of fetching from the network
    #[arg(short,long)]
    pub snapshot: Option<PathBuf>,
}

fn main()->Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config( path)?,
        None => OpenSkyConfig::default()
    };
    if let Some(retention) = args.retention { config.retention = retention; }
    if let Some(path) = &args.points { config.points_file = path.clone(); }
    if let Some(path) = &args.trajectories { config.trajectories_file = path.clone(); }

    let provider: Box<dyn SnapshotProvider> = match &args.snapshot {
        Some(path) => Box::new( FileSnapshotProvider::new( path)),
        None => Box::new( OpenSkyProvider::new( &config)?)
    };

    let accumulator = Accumulator::new( config.run_config());
    let summary = accumulator.run( provider.as_ref())?;

    println!("{summary}");
    Ok(())
}
