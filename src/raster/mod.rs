//! Raster sources for tile-served layers.
//!
//! Slicing an image into tiles is the job of an external tile server. This
//! module only opens a raster, works out where it sits on the globe and
//! produces the handle (a tile URL template plus extent) a layer needs.

pub mod geotiff;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::geoutil::Bounds;
use crate::layer::RasterLayerOptions;

pub use geotiff::{read_geotiff_metadata, GeoTiffMetadata, GeoTiffProvider};

/// Coordinate reference systems a raster can be placed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Crs {
    /// Longitude/latitude degrees (EPSG:4326)
    Geographic,
    /// Spherical Mercator metres (EPSG:3857)
    WebMercator,
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Geographic => f.write_str("EPSG:4326"),
            Crs::WebMercator => f.write_str("EPSG:3857"),
        }
    }
}

/// A tile-serving handle for one raster file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterSource {
    /// Raster file the tiles are cut from
    pub path: PathBuf,
    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders
    pub tile_url: String,
    /// Extent in degrees
    pub bounds: Bounds,
    /// `[lat, lon]` center of the extent
    pub center: [f64; 2],
    /// Zoom level at which the whole raster is in view
    pub default_zoom: u8,
    /// Native CRS of the file
    pub crs: Crs,
    pub width: u32,
    pub height: u32,
}

/// Opens raster files and turns them into tile sources.
///
/// Implementations stand in for the tile server; the map facade only relies
/// on this trait so tests and hosts can plug in their own.
pub trait RasterProvider: fmt::Debug {
    fn open(&self, path: &Path, options: &RasterLayerOptions) -> Result<RasterSource>;
}
