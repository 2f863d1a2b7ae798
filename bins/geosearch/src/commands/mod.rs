//! CLI command implementations

pub mod config;
pub mod extent;
pub mod search;

use anyhow::Context;
use geosearch_cli::output::Status;
use geosearch_core::Error as CoreError;
use geosearch_geo::{Extent, Position};
use std::path::Path;

/// Parses `lon,lat`.
pub fn parse_position(value: &str) -> Result<Position, CoreError> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| CoreError::validation(format!("not a lon,lat pair: {value:?}")))?;
    match parts.as_slice() {
        [lon, lat] => Ok([*lon, *lat]),
        _ => Err(CoreError::validation(format!("not a lon,lat pair: {value:?}"))),
    }
}

/// Parses `min_lon,min_lat,max_lon,max_lat`.
pub fn parse_extent(value: &str) -> Result<Extent, CoreError> {
    value.parse::<Extent>().map_err(|e| {
        CoreError::validation(e.to_string())
            .with_suggestion("Give the extent as min_lon,min_lat,max_lon,max_lat")
    })
}

/// Writes `content` to `path`, or to stdout without a path.
pub fn emit(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            Status::success(&format!("Wrote {}", path.display()));
            Ok(())
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
