//! Basemap catalog for background tile layers.
//!
//! Provides a read-only, process-wide table of tile providers keyed by dotted
//! names such as `OpenStreetMap.Mapnik` or `Esri.WorldImagery`.

pub mod catalog;
pub mod provider;

pub use catalog::{get, names, resolve};
pub use provider::Basemap;
