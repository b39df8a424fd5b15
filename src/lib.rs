//! # carbonarr
//!
//! Compose interactive web maps from basemaps, GeoJSON, shapefiles and
//! GeoTIFF rasters.
//!
//! The crate builds the display tree a map renderer draws. It does not render
//! tiles itself: tile layers carry URL templates, vector layers carry GeoJSON
//! feature collections and raster layers carry a handle to an external tile
//! server.
//!
//! ## Key Features
//!
//! - **Named basemaps**: a static catalog of common tile providers
//! - **Vector layers**: GeoJSON files and shapefiles, converted to GeoJSON
//! - **Raster layers**: GeoTIFF georeferencing, with the viewport fitted to the raster
//! - **Layer control**: a toggle listing every layer
//!
//! ```no_run
//! use carbonarr::{Map, RasterLayerOptions, VectorLayerOptions};
//!
//! # fn main() -> carbonarr::Result<()> {
//! let mut map = Map::default();
//! map.add_basemap("Esri.WorldImagery")?;
//! map.add_vector_layer("rivers.shp", "rivers", VectorLayerOptions::default())?;
//! map.add_raster_layer("dem.tif", "dem", RasterLayerOptions::default().with_palette("terrain"))?;
//! map.add_layers_control(None)?;
//! println!("{}", map.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod basemaps;
pub mod config;
pub mod error;
pub mod geoutil;
pub mod layer;
pub mod logging;
pub mod map;
pub mod raster;
pub mod vector_loader;
pub mod widget;

pub use config::{Config, LayerSpec};
pub use error::{CarbonarrError, Result};
pub use layer::{
    Control, ControlPosition, JsonObject, Layer, RasterLayer, RasterLayerOptions, TileLayer,
    TileLayerOptions, VectorLayer, VectorLayerOptions,
};
pub use logging::{init_tracing, log_error, log_operation_end, log_operation_start};
pub use map::{BasemapSource, Map};
pub use raster::{GeoTiffProvider, RasterProvider, RasterSource};
pub use widget::MapWidget;
