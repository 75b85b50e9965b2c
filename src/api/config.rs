//! Loading option sets from JSON files and `KEY=VALUE` strings

use super::{BuildOptions, TransformOptions};
use crate::error::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use std::path::Path;

fn load<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read build options from a JSON file. Missing fields take their defaults.
pub fn load_build_options(path: impl AsRef<Path>) -> ConfigResult<BuildOptions> {
    load(path.as_ref())
}

/// Read transform options from a JSON file
pub fn load_transform_options(path: impl AsRef<Path>) -> ConfigResult<TransformOptions> {
    load(path.as_ref())
}

/// Split a `KEY=VALUE` argument at its first `=`
pub fn parse_key_value(arg: &str) -> ConfigResult<(String, String)> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| ConfigError::MissingEquals(arg.to_string()))
}
