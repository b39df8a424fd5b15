//! Layer and control values held by the display tree.
//!
//! Every layer variant carries a name (not required to be unique), its data
//! source and an options struct. Options are validated before a layer is
//! inserted, so an invalid option never reaches the display tree.

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CarbonarrError, Result};
use crate::raster::RasterSource;

/// Free-form JSON options passed through to the renderer unchanged
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Corner of the map a control is anchored to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl ControlPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::TopRight => "topright",
            ControlPosition::TopLeft => "topleft",
            ControlPosition::BottomRight => "bottomright",
            ControlPosition::BottomLeft => "bottomleft",
        }
    }

    /// Parse a position name, accepting any letter case
    pub fn parse_position(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "topright" => Ok(ControlPosition::TopRight),
            "topleft" => Ok(ControlPosition::TopLeft),
            "bottomright" => Ok(ControlPosition::BottomRight),
            "bottomleft" => Ok(ControlPosition::BottomLeft),
            _ => Err(CarbonarrError::invalid_argument(
                "position",
                format!(
                    "Unknown control position: {}. Must be one of: topright, topleft, bottomright, bottomleft",
                    s
                ),
            )),
        }
    }
}

impl FromStr for ControlPosition {
    type Err = CarbonarrError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ControlPosition::parse_position(s)
    }
}

impl fmt::Display for ControlPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control listing the map's layers with visibility toggles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayersControl {
    pub position: ControlPosition,
}

/// Map controls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    LayersControl(LayersControl),
}

impl Control {
    pub fn position(&self) -> ControlPosition {
        match self {
            Control::LayersControl(control) => control.position,
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn validate_opacity(param: &str, opacity: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(CarbonarrError::invalid_argument(
            param,
            format!("Opacity must be between 0 and 1, got {}", opacity),
        ));
    }
    Ok(())
}

/// Options for tile layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    /// Attribution text shown by the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,

    #[serde(default = "default_visible")]
    pub visible: bool,

    /// Any other renderer option, kept verbatim
    #[serde(flatten, default)]
    pub extra: JsonObject,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            attribution: None,
            opacity: default_opacity(),
            min_zoom: None,
            max_zoom: None,
            visible: default_visible(),
            extra: JsonObject::new(),
        }
    }
}

impl TileLayerOptions {
    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_opacity("opacity", self.opacity)?;

        if let (Some(min), Some(max)) = (self.min_zoom, self.max_zoom) {
            if min > max {
                return Err(CarbonarrError::invalid_argument(
                    "min_zoom",
                    format!("min_zoom ({}) must be <= max_zoom ({})", min, max),
                ));
            }
        }

        Ok(())
    }
}

/// Options for vector layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorLayerOptions {
    /// Leaflet path style, e.g. `{"color": "red", "fillOpacity": 0.4}`
    #[serde(default)]
    pub style: JsonObject,

    /// Style applied while the pointer hovers a feature
    #[serde(default)]
    pub hover_style: JsonObject,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Default for VectorLayerOptions {
    fn default() -> Self {
        Self {
            style: JsonObject::new(),
            hover_style: JsonObject::new(),
            visible: default_visible(),
        }
    }
}

impl VectorLayerOptions {
    pub fn with_style(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (param, style) in [("style", &self.style), ("hover_style", &self.hover_style)] {
            for key in ["opacity", "fillOpacity"] {
                if let Some(value) = style.get(key) {
                    let opacity = value.as_f64().ok_or_else(|| {
                        CarbonarrError::invalid_argument(
                            param,
                            format!("{} must be a number, got {}", key, value),
                        )
                    })?;
                    validate_opacity(param, opacity)?;
                }
            }
        }
        Ok(())
    }
}

/// Options for raster layers, forwarded to the tile server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterLayerOptions {
    /// One-based band index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<u32>,

    /// Colormap name, e.g. `viridis`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmin: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmax: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<f64>,

    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for RasterLayerOptions {
    fn default() -> Self {
        Self {
            band: None,
            palette: None,
            vmin: None,
            vmax: None,
            nodata: None,
            opacity: default_opacity(),
        }
    }
}

impl RasterLayerOptions {
    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    pub fn with_range(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }

    pub fn with_band(mut self, band: u32) -> Self {
        self.band = Some(band);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_opacity("opacity", self.opacity)?;

        if self.band == Some(0) {
            return Err(CarbonarrError::invalid_argument(
                "band",
                "Band indices start at 1",
            ));
        }

        if let Some(palette) = &self.palette {
            let valid = !palette.is_empty()
                && palette
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                return Err(CarbonarrError::invalid_argument(
                    "palette",
                    format!("Invalid palette name: {:?}", palette),
                ));
            }
        }

        if let (Some(vmin), Some(vmax)) = (self.vmin, self.vmax) {
            if vmin >= vmax {
                return Err(CarbonarrError::invalid_argument(
                    "vmin",
                    format!("vmin ({}) must be < vmax ({})", vmin, vmax),
                ));
            }
        }

        Ok(())
    }
}

/// A layer rendered from image tiles fetched by URL template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub options: TileLayerOptions,
}

impl TileLayer {
    pub fn new(url: impl Into<String>, name: impl Into<String>, options: TileLayerOptions) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            options,
        }
    }
}

/// A layer drawn from a GeoJSON feature collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayer {
    pub name: String,
    pub data: FeatureCollection,
    pub options: VectorLayerOptions,
}

impl VectorLayer {
    pub fn feature_count(&self) -> usize {
        self.data.features.len()
    }
}

/// A layer served as tiles from a georeferenced raster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterLayer {
    pub name: String,
    pub source: RasterSource,
    pub options: RasterLayerOptions,
}

/// Any layer the display tree can hold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Tile(TileLayer),
    Vector(VectorLayer),
    Raster(RasterLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::Tile(layer) => &layer.name,
            Layer::Vector(layer) => &layer.name,
            Layer::Raster(layer) => &layer.name,
        }
    }

    /// Short variant label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Tile(_) => "tile",
            Layer::Vector(_) => "vector",
            Layer::Raster(_) => "raster",
        }
    }

    pub fn as_tile(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tile(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match self {
            Layer::Vector(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_raster(&self) -> Option<&RasterLayer> {
        match self {
            Layer::Raster(layer) => Some(layer),
            _ => None,
        }
    }

    /// Validate the options of whichever variant this is
    pub fn validate(&self) -> Result<()> {
        match self {
            Layer::Tile(layer) => layer.options.validate(),
            Layer::Vector(layer) => layer.options.validate(),
            Layer::Raster(layer) => layer.options.validate(),
        }
    }
}

impl From<TileLayer> for Layer {
    fn from(layer: TileLayer) -> Self {
        Layer::Tile(layer)
    }
}

impl From<VectorLayer> for Layer {
    fn from(layer: VectorLayer) -> Self {
        Layer::Vector(layer)
    }
}

impl From<RasterLayer> for Layer {
    fn from(layer: RasterLayer) -> Self {
        Layer::Raster(layer)
    }
}
