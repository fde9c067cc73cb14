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

//! Loaders that build a point store from files on disk.

use std::fs::{read_to_string, File};
use std::path::Path;

use csv::ReaderBuilder;
use log::info;
use yaml_rust::YamlLoader;

use crate::base_traits::PointStore;
use crate::data_sources::DataRam;
use crate::distances::Metric;
use crate::errors::*;

/// Reads a headerless CSV where every row is one point and every column one
/// coordinate. All rows must have the same width.
pub fn ram_from_csv<P: AsRef<Path>, M: Metric>(path: P) -> PointStoreResult<DataRam<M>> {
    let file_name = path.as_ref().to_string_lossy().to_string();
    let file = File::open(path.as_ref())?;
    let mut rdr = ReaderBuilder::new().has_headers(false).from_reader(file);

    let mut data: Vec<f64> = Vec::new();
    let mut dim = 0;
    for (line_number, result) in rdr.records().enumerate() {
        let record = result.map_err(|_| ParsingError::CSVReadError {
            file_name: file_name.clone(),
            line_number,
            key: "unable to read record".to_string(),
        })?;
        if dim == 0 {
            dim = record.len();
        } else if record.len() != dim {
            return Err(ParsingError::CSVReadError {
                file_name,
                line_number,
                key: format!("expected {} columns, got {}", dim, record.len()),
            }
            .into());
        }
        for (column, field) in record.iter().enumerate() {
            let val = field.trim().parse::<f64>().map_err(|_| {
                ParsingError::CSVReadError {
                    file_name: file_name.clone(),
                    line_number,
                    key: format!("unable to read f64 from column {}", column),
                }
            })?;
            data.push(val);
        }
    }
    if dim == 0 {
        return Err(ParsingError::RegularParsingError("no rows in csv file").into());
    }
    info!("loaded {} points of dimension {} from {}", data.len() / dim, dim, file_name);
    DataRam::new(data, dim)
}

/// Given a yaml file on disk, it builds a point store. Minimal example below.
/// ```yaml
/// ---
/// data_path: POINTS_CSV
/// data_dim: 2
/// ```
/// `data_path` is resolved relative to the yaml file; `data_dim` is an
/// optional cross-check against the CSV width.
pub fn ram_from_yaml<P: AsRef<Path>, M: Metric>(path: P) -> PointStoreResult<DataRam<M>> {
    let config = read_to_string(&path)
        .unwrap_or_else(|_| panic!("Unable to read config file {:?}", &path.as_ref()));
    let file_name = path.as_ref().to_string_lossy().to_string();
    let params = &YamlLoader::load_from_str(&config).unwrap()[0];

    let data_path = params["data_path"]
        .as_str()
        .ok_or_else(|| ParsingError::MissingYamlError {
            file_name: file_name.clone(),
            field: "data_path".to_string(),
        })?;
    let data_path = match path.as_ref().parent() {
        Some(dir) if !Path::new(data_path).is_absolute() => dir.join(data_path),
        _ => Path::new(data_path).to_path_buf(),
    };

    let store = ram_from_csv::<_, M>(&data_path)?;
    if let Some(data_dim) = params["data_dim"].as_i64() {
        if store.dim() != data_dim as usize {
            return Err(ParsingError::MalformedYamlError {
                file_name,
                field: "data_dim".to_string(),
            }
            .into());
        }
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_traits::PointStore;
    use crate::distances::L2;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn csv_round_trip() {
        let dir = TempDir::new("pointstore_loaders").unwrap();
        let csv_path = dir.path().join("points.csv");
        let mut f = File::create(&csv_path).unwrap();
        writeln!(f, "0.0,0.0").unwrap();
        writeln!(f, "1.0,0.0").unwrap();
        writeln!(f, "0.0,1.0").unwrap();
        drop(f);

        let store = ram_from_csv::<_, L2>(&csv_path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.dim(), 2);
        assert_eq!(store.point(1).unwrap(), &[1.0, 0.0]);
    }

    #[test]
    fn csv_rejects_ragged_rows() {
        let dir = TempDir::new("pointstore_loaders").unwrap();
        let csv_path = dir.path().join("ragged.csv");
        let mut f = File::create(&csv_path).unwrap();
        writeln!(f, "0.0,0.0").unwrap();
        writeln!(f, "1.0").unwrap();
        drop(f);

        assert!(ram_from_csv::<_, L2>(&csv_path).is_err());
    }

    #[test]
    fn yaml_config_checks_dim() {
        let dir = TempDir::new("pointstore_loaders").unwrap();
        let csv_path = dir.path().join("points.csv");
        let mut f = File::create(&csv_path).unwrap();
        writeln!(f, "0.5,1.5,2.5").unwrap();
        drop(f);

        let yaml_path = dir.path().join("config.yml");
        let mut f = File::create(&yaml_path).unwrap();
        writeln!(f, "---").unwrap();
        writeln!(f, "data_path: points.csv").unwrap();
        writeln!(f, "data_dim: 3").unwrap();
        drop(f);

        let store = ram_from_yaml::<_, L2>(&yaml_path).unwrap();
        assert_eq!(store.dim(), 3);

        let bad_yaml = dir.path().join("bad.yml");
        let mut f = File::create(&bad_yaml).unwrap();
        writeln!(f, "---").unwrap();
        writeln!(f, "data_path: points.csv").unwrap();
        writeln!(f, "data_dim: 2").unwrap();
        drop(f);
        assert!(ram_from_yaml::<_, L2>(&bad_yaml).is_err());
    }
}
