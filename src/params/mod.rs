// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for the gain solver.
//!
//! These can be built in code, or read from a toml or json "argument file";
//! any parameter not present takes its default value.

mod error;

pub use error::ParamsError;

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INVERSE_FLOOR;

const PARAM_FILE_TYPES: &str = "toml, json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// J^H.J entries (or determinants) with magnitudes at or below this value
    /// are treated as singular; the affected gains get a null update.
    pub inverse_floor: f64,

    /// The number of worker threads to use. If this is `None`, rayon's global
    /// thread pool is used.
    pub num_threads: Option<usize>,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            inverse_floor: DEFAULT_INVERSE_FLOOR,
            num_threads: None,
        }
    }
}

impl SolverParams {
    /// Check that the parameters are sensible.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.inverse_floor.is_finite() || self.inverse_floor < 0.0 {
            return Err(ParamsError::InvalidFloor(self.inverse_floor));
        }
        if self.num_threads == Some(0) {
            return Err(ParamsError::ZeroThreads);
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<SolverParams, ParamsError> {
        let params: SolverParams = toml::from_str(s).map_err(|err| ParamsError::TomlDecode {
            file: "<string>".to_string(),
            err,
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_str(s: &str) -> Result<SolverParams, ParamsError> {
        let params: SolverParams =
            serde_json::from_str(s).map_err(|err| ParamsError::JsonDecode {
                file: "<string>".to_string(),
                err,
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a file. The file's extension determines how its
    /// contents are decoded.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<SolverParams, ParamsError> {
        let file = file.as_ref();
        debug!("Attempting to read solver parameters from {}", file.display());
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let contents = match ext.as_deref() {
            Some("toml") | Some("json") => std::fs::read_to_string(file)?,
            _ => {
                return Err(ParamsError::UnrecognisedFileType {
                    file: file.to_path_buf(),
                    supported: PARAM_FILE_TYPES,
                })
            }
        };

        let params: SolverParams = match ext.as_deref() {
            Some("toml") => {
                toml::from_str(&contents).map_err(|err| ParamsError::TomlDecode {
                    file: file.display().to_string(),
                    err,
                })?
            }
            _ => serde_json::from_str(&contents).map_err(|err| ParamsError::JsonDecode {
                file: file.display().to_string(),
                err,
            })?,
        };
        params.validate()?;
        debug!("Parameters from file: {params:?}");
        Ok(params)
    }
}
