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

//! file helpers for wholesale (snapshot) replacement of persisted containers

use std::{fs, io::{self,Write}, path::{Path,PathBuf}};
use tempfile::NamedTempFile;
use tracing::{error,warn};

use crate::errors::{Result,op_failed};

/// contents that are written to a temp file next to their target but not yet visible under `path`
pub struct StagedFile {
    temp: NamedTempFile,
    path: PathBuf
}

/// the previous state of a commit target
struct Backup {
    path: PathBuf,
    backup: Option<PathBuf>, // None if there was no previous file
    replaced: bool, // the staged file has been renamed into place
}

/// write `contents` to a temp file in the directory of `path`. Nothing is replaced until [`commit`]
pub fn stage (path: impl AsRef<Path>, contents: &[u8])->Result<StagedFile> {
    let path = path.as_ref();
    let dir = parent_dir( path);
    ensure_dir( &dir)?;

    let mut temp = NamedTempFile::new_in( &dir)?; // same file system so that the rename is atomic
    temp.write_all( contents)?;

    // temp files are owner-only, the replacement should keep the access rights of what it replaces
    if let Ok(meta) = fs::metadata( path) && meta.is_file() {
        temp.as_file().set_permissions( meta.permissions())?;
    }
    temp.as_file().sync_all()?;

    Ok( StagedFile { temp, path: path.to_path_buf() } )
}

/// rename all staged files into place, all or nothing: existing targets are moved aside to `<name>.bak`
/// first and restored if any of the staged files cannot be renamed into place
pub fn commit (staged: Vec<StagedFile>)->Result<()> {
    let mut backups: Vec<Backup> = Vec::with_capacity( staged.len());

    for s in &staged {
        match backup( &s.path) {
            Ok(b) => backups.push(b),
            Err(e) => {
                restore( &backups);
                return Err(e)
            }
        }
    }

    for (i, StagedFile { temp, path }) in staged.into_iter().enumerate() {
        if let Err(e) = temp.persist( &path) {
            restore( &backups);
            return Err( e.into())
        }
        backups[i].replaced = true;
    }

    for b in &backups {
        if let Some(bak) = &b.backup && let Err(e) = fs::remove_file( bak) {
            warn!("failed to remove backup {:?}: {}", bak, e);
        }
    }
    Ok(())
}

fn backup (path: &Path)->Result<Backup> {
    match fs::metadata( path) {
        Ok(meta) if meta.is_file() => {
            let bak = backup_path( path);
            fs::rename( path, &bak)?;
            Ok( Backup { path: path.to_path_buf(), backup: Some(bak), replaced: false } )
        }
        Ok(_) => Err( op_failed!("{:?} is not a regular file", path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok( Backup { path: path.to_path_buf(), backup: None, replaced: false } )
        }
        Err(e) => Err( e.into())
    }
}

/// put targets back into the state they had before the commit started
fn restore (backups: &[Backup]) {
    for b in backups.iter().rev() {
        let res = match &b.backup {
            Some(bak) => fs::rename( bak, &b.path),
            None if b.replaced => fs::remove_file( &b.path),
            None => Ok(())
        };
        if let Err(e) = res {
            error!("failed to restore {:?}: {}", b.path, e);
        }
    }
}

fn backup_path (path: &Path)->PathBuf {
    let mut name = path.file_name().map( |n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name( name)
}

/// replace the file at `path` with `contents` without ever exposing a partially written file
pub fn write_atomic (path: impl AsRef<Path>, contents: &[u8])->Result<()> {
    commit( vec![ stage( path, contents)?] )
}

/// the contents of the file at `path`, or None if there is no such file
pub fn read_if_exists (path: impl AsRef<Path>)->io::Result<Option<Vec<u8>>> {
    match fs::read( path.as_ref()) {
        Ok(bytes) => Ok( Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
    }
}

pub fn ensure_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn parent_dir (path: &Path)->PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from(".")
    }
}
