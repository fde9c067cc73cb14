/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! The errors that can occur when a spatial tree is building or answering
//! queries. Most errors are floated up from `PointStore` as that's the i/o
//! layer.

use pointstore::errors::PointStoreError;
use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type SylvaResult<T> = Result<T, SylvaError>;

/// Error type for sylva. Mostly this is a wrapper around `PointStoreError`,
/// as the data access is where most errors happen.
#[derive(Debug)]
pub enum SylvaError {
    /// Unable to retrieve some data point mid-query
    PointStore(PointStoreError),
    /// A caller-supplied parameter made the call meaningless, the message
    /// names the parameter
    InvalidArgument(&'static str),
    /// A directory entry referenced a page outside the arena
    PageFault {
        /// The page that could not be resolved
        page: usize,
    },
    /// IO error when opening files
    IoError(io::Error),
}

impl fmt::Display for SylvaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SylvaError::IoError(ref e) => write!(f, "{}", e),
            SylvaError::PointStore(ref e) => write!(f, "{}", e),
            SylvaError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            SylvaError::PageFault { page } => {
                write!(f, "a directory entry referenced unknown page {}", page)
            }
        }
    }
}

impl Error for SylvaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SylvaError::IoError(ref e) => Some(e),
            SylvaError::PointStore(ref e) => Some(e),
            SylvaError::InvalidArgument(..) => None,
            SylvaError::PageFault { .. } => None,
        }
    }
}

impl From<PointStoreError> for SylvaError {
    fn from(err: PointStoreError) -> Self {
        SylvaError::PointStore(err)
    }
}

impl From<io::Error> for SylvaError {
    fn from(err: io::Error) -> Self {
        SylvaError::IoError(err)
    }
}

impl From<SylvaError> for io::Error {
    fn from(err: SylvaError) -> Self {
        match err {
            SylvaError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, Box::new(e)),
        }
    }
}
