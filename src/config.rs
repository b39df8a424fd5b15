//! Configuration management for carbonarr.
//!
//! Configuration is layered with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON recipe file
//! 4. Default values (lowest priority)
//!
//! A recipe file describes the initial viewport and the layers to add, in order.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CarbonarrError, Result};
use crate::geoutil;
use crate::layer::{JsonObject, RasterLayerOptions, TileLayerOptions, VectorLayerOptions};
use crate::raster::GeoTiffProvider;

/// Highest zoom level accepted for the initial viewport
pub const MAX_ZOOM: f64 = 24.0;

/// Command-line arguments for carbonarr tools
#[derive(Parser, Debug)]
#[command(name = "carbonarr")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a JSON map recipe
    pub recipe: Option<PathBuf>,

    /// Tile server endpoint used for raster layers
    #[arg(short, long, env = "CARBONARR_TILE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CARBONARR_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Initial viewport and widget options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// `[lat, lon]`
    #[serde(default = "default_center")]
    pub center: [f64; 2],

    #[serde(default = "default_zoom")]
    pub zoom: f64,

    #[serde(default)]
    pub scroll_wheel_zoom: bool,

    /// Passed to the renderer unchanged
    #[serde(default)]
    pub options: JsonObject,
}

/// Raster tile server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileServerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// One step of a map recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Basemap {
        name: String,
    },
    Tile {
        url: String,
        name: String,
        #[serde(default)]
        options: TileLayerOptions,
    },
    Vector {
        path: PathBuf,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        options: VectorLayerOptions,
    },
    Raster {
        path: PathBuf,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        options: RasterLayerOptions,
    },
    LayersControl {
        #[serde(default)]
        position: Option<String>,
    },
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub tile_server: TileServerConfig,

    /// Layers and controls to add, in order
    #[serde(default)]
    pub layers: Vec<LayerSpec>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::load_with_args(Args::parse())
    }

    /// Same as [`Config::load`] with already-parsed arguments
    pub fn load_with_args(args: Args) -> Result<Self> {
        let mut config = match &args.recipe {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(endpoint) = args.endpoint {
            config.tile_server.endpoint = endpoint;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON recipe file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CarbonarrError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Raster provider pointing at the configured endpoint
    pub fn raster_provider(&self) -> GeoTiffProvider {
        GeoTiffProvider::new(self.tile_server.endpoint.clone())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        geoutil::validate_center(self.map.center).map_err(|e| CarbonarrError::Config {
            message: e.to_string(),
        })?;

        if !(0.0..=MAX_ZOOM).contains(&self.map.zoom) {
            return Err(CarbonarrError::Config {
                message: format!(
                    "Zoom must be between 0 and {}, got {}",
                    MAX_ZOOM, self.map.zoom
                ),
            });
        }

        let endpoint = &self.tile_server.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(CarbonarrError::Config {
                message: format!("Tile server endpoint must be an http(s) URL: {}", endpoint),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(CarbonarrError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            tile_server: TileServerConfig::default(),
            layers: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            scroll_wheel_zoom: false,
            options: JsonObject::new(),
        }
    }
}

impl Default for TileServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

// Default value functions for serde
fn default_center() -> [f64; 2] {
    [27.48, 77.3]
}

fn default_zoom() -> f64 {
    12.0
}

fn default_endpoint() -> String {
    GeoTiffProvider::DEFAULT_ENDPOINT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
