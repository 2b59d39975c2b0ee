// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! TOML-backed runners config file: the unit `register`/`unregister` edit
//! and `run` loads wholesale at startup.

use runner_core::RunnersFile;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub fn load(path: &Path) -> Result<RunnersFile, ConfigError> {
    if !path.exists() {
        return Ok(RunnersFile::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn save(path: &Path, file: &RunnersFile) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }
    let serialized = toml::to_string_pretty(file)?;
    std::fs::write(path, serialized).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
