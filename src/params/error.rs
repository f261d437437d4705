// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("The inverse floor must be finite and non-negative, but got {0}")]
    InvalidFloor(f64),

    #[error("The number of threads was 0; this is not permitted")]
    ZeroThreads,

    #[error("Parameter file '{file}' doesn't have a recognised extension; supported: {supported}")]
    UnrecognisedFileType {
        file: PathBuf,
        supported: &'static str,
    },

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    TomlDecode { file: String, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    JsonDecode { file: String, err: serde_json::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
