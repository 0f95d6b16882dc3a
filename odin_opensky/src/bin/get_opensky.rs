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

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use odin_opensky::{init_tracing, load_config, fs::write_atomic, provider::parse_snapshot, OpenSkyConfig, OpenSkyProvider};

/// retrieve one raw OpenSky states snapshot and store it for later replay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// RON config file (defaults are used if not set)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// where to store the snapshot
    #[arg(default_value = "opensky_states.json")]
    pub output: PathBuf,
}

fn main()->Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config( path)?,
        None => OpenSkyConfig::default()
    };

    let provider = OpenSkyProvider::new( &config)?;
    let bytes = provider.fetch_raw()?;
    let snapshot = parse_snapshot( &bytes)?; // don't store what we could not replay

    write_atomic( &args.output, &bytes)?;
    println!("saved {} states to {:?}", snapshot.states.len(), args.output);
    Ok(())
}
