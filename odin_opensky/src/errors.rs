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

use thiserror::Error;

pub type Result<T> = std::result::Result<T,OdinOpenSkyError>;

#[derive(Error,Debug)]
pub enum OdinOpenSkyError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("reqwest error {0}")]
    ReqwestError( #[from] reqwest::Error),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("config RON error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("persist error {0}")]
    PersistError( #[from] tempfile::PersistError),

    #[error("snapshot provider failed {0}")]
    ProviderError(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl OdinOpenSkyError {
    /// provider failures are the only errors that abort a run before anything gets persisted
    pub fn is_provider_failure (&self)->bool {
        matches!( self, OdinOpenSkyError::ProviderError(_) | OdinOpenSkyError::ReqwestError(_))
    }
}

/// why a single raw state record did not make it into a [`crate::Point`].
/// Rejections are counted and logged, they never fail a run
#[derive(Error,Debug,Clone,PartialEq)]
pub enum RejectReason {
    #[error("record has no longitude/latitude")]
    MissingPosition,

    #[error("record has no aircraft identifier")]
    MissingIdentifier,

    #[error("malformed record field '{0}'")]
    MalformedField(&'static str),
}

macro_rules! provider_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinOpenSkyError::ProviderError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use provider_error;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinOpenSkyError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
