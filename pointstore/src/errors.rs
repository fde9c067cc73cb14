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

//! The errors that can occur when a point store is loading or serving points
use std::error::Error;
use std::fmt;
use std::io;

///
pub type PointStoreResult<T> = Result<T, PointStoreError>;

/// Error type for the point store
#[derive(Debug)]
pub enum PointStoreError {
    /// Unable to retrieve some data point (given by index) in a store (store name)
    DataAccessError {
        /// Index of access error
        index: usize,
        /// Store that had the access error
        store_name: String,
    },
    /// A point or query had the wrong number of coordinates for this store
    DimensionMismatch {
        /// The dimension the store serves
        expected: usize,
        /// The dimension we got
        actual: usize,
    },
    /// IO error when opening files
    IoError(io::Error),
    /// Parsing error when loading a CSV or YAML file
    ParsingError(ParsingError),
}

impl fmt::Display for PointStoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PointStoreError::IoError(ref e) => write!(f, "{}", e),
            PointStoreError::ParsingError(ref e) => write!(f, "{}", e),
            PointStoreError::DataAccessError { index, store_name } => {
                write!(
                    f,
                    "there was an issue grabbing point {} from store {}",
                    index, store_name
                )
            }
            PointStoreError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "the store serves points of dimension {}, but got {}",
                    expected, actual
                )
            }
        }
    }
}

impl Error for PointStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PointStoreError::IoError(ref e) => Some(e),
            PointStoreError::ParsingError(ref e) => Some(e),
            PointStoreError::DataAccessError { .. } => None,
            PointStoreError::DimensionMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for PointStoreError {
    fn from(err: io::Error) -> Self {
        PointStoreError::IoError(err)
    }
}

impl From<ParsingError> for PointStoreError {
    fn from(err: ParsingError) -> Self {
        PointStoreError::ParsingError(err)
    }
}

impl From<PointStoreError> for io::Error {
    fn from(err: PointStoreError) -> Self {
        match err {
            PointStoreError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, Box::new(e)),
        }
    }
}

/// A parsing error occurred while doing something with text
#[derive(Debug)]
pub enum ParsingError {
    /// Yaml was messed up
    MalformedYamlError {
        /// The file that was messed up
        file_name: String,
        /// The value that was messed up
        field: String,
    },
    /// A needed field was missing from the file.
    MissingYamlError {
        /// The file
        file_name: String,
        /// The missing field
        field: String,
    },
    /// An error reading the CSV
    CSVReadError {
        /// The file that the error occurred in
        file_name: String,
        /// The line that was messed up
        line_number: usize,
        /// The column name that was messed up
        key: String,
    },
    /// Something else happened parsing a string
    RegularParsingError(&'static str),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParsingError::MalformedYamlError { .. } => {
                write!(f, "there is a error reading a yaml entry")
            }
            ParsingError::MissingYamlError { .. } => write!(f, "not all message fields set"),
            ParsingError::CSVReadError { .. } => write!(f, "issue reading a CSV entry"),
            ParsingError::RegularParsingError(..) => write!(f, "Error parsing a string"),
        }
    }
}

impl Error for ParsingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
