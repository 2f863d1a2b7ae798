//! Extent command

use super::{parse_extent, parse_position};
use crate::OutputFormat;
use anyhow::Result;
use clap::Subcommand;
use geosearch_core::config::Config;
use geosearch_geo::{extent_from_viewport, fix_extent, shrink_extent, Extent, Viewport, DEFAULT_PADDING};
use serde_json::json;

#[derive(Subcommand, Debug)]
pub enum ExtentCommand {
    /// Move longitudes beyond the datum border back into [-180, 180]
    Fix {
        /// min_lon,min_lat,max_lon,max_lat
        #[arg(allow_hyphen_values = true)]
        extent: String,
    },

    /// Inset every side by a fraction of its span
    Shrink {
        /// min_lon,min_lat,max_lon,max_lat
        #[arg(allow_hyphen_values = true)]
        extent: String,

        /// Fraction of the span removed on each side
        #[arg(short, long, default_value_t = DEFAULT_PADDING)]
        padding: f64,
    },

    /// Visible extent of a map view
    Viewport {
        /// Map center as lon,lat (defaults to the configured center)
        #[arg(long, allow_hyphen_values = true)]
        center: Option<String>,

        /// Zoom level (defaults to the configured zoom)
        #[arg(short, long)]
        zoom: Option<f64>,

        /// Map width in pixels
        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        /// Map height in pixels
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// Pixels covered by the side panel (defaults to the configured offset)
        #[arg(long)]
        offset: Option<f64>,
    },
}

pub fn compute(command: &ExtentCommand, config: &Config) -> Result<Extent> {
    let extent = match command {
        ExtentCommand::Fix { extent } => fix_extent(parse_extent(extent)?),
        ExtentCommand::Shrink { extent, padding } => shrink_extent(parse_extent(extent)?, *padding),
        ExtentCommand::Viewport {
            center,
            zoom,
            width,
            height,
            offset,
        } => {
            let map = &config.schema.map;
            let center = match center {
                Some(center) => parse_position(center)?,
                None => map.center,
            };
            let view = Viewport::new(center, zoom.unwrap_or(map.zoom), [*width, *height]);
            extent_from_viewport(&view, offset.unwrap_or(map.offset_width))
        }
    };
    Ok(extent)
}

pub fn run(command: ExtentCommand, config: &Config, format: OutputFormat) -> Result<()> {
    let extent = compute(&command, config)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "extent": extent.to_array() })),
        OutputFormat::Text | OutputFormat::Csv => println!("{extent}"),
    }
    Ok(())
}
