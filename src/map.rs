//! The map composition facade.
//!
//! [`Map`] owns a [`MapWidget`] display tree and turns paths, URLs and
//! basemap names into layers. Every `add_*` method does all of its fallible
//! work first and touches the display tree only once it has a complete layer,
//! so a failed call leaves the tree exactly as it was.

use geojson::FeatureCollection;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::basemaps;
use crate::config::{Config, LayerSpec};
use crate::error::Result;
use crate::layer::{
    Control, ControlPosition, JsonObject, Layer, LayersControl, RasterLayer, RasterLayerOptions,
    TileLayer, TileLayerOptions, VectorLayer, VectorLayerOptions,
};
use crate::logging::{
    log_error, log_layer_added, log_operation_end, log_operation_start, log_timed_operation,
};
use crate::raster::{GeoTiffProvider, RasterProvider};
use crate::vector_loader;
use crate::widget::MapWidget;

/// Either a catalog name or a ready-made layer
#[derive(Debug, Clone)]
pub enum BasemapSource {
    Name(String),
    Layer(Layer),
}

impl From<&str> for BasemapSource {
    fn from(name: &str) -> Self {
        BasemapSource::Name(name.to_string())
    }
}

impl From<String> for BasemapSource {
    fn from(name: String) -> Self {
        BasemapSource::Name(name)
    }
}

impl From<Layer> for BasemapSource {
    fn from(layer: Layer) -> Self {
        BasemapSource::Layer(layer)
    }
}

impl From<TileLayer> for BasemapSource {
    fn from(layer: TileLayer) -> Self {
        BasemapSource::Layer(layer.into())
    }
}

/// Log a failure at the facade boundary and hand it back
fn logged<T>(result: Result<T>, context: &str) -> Result<T> {
    result.map_err(|e| {
        log_error(&e, context);
        e
    })
}

/// Layer name for a file-backed layer without an explicit one
fn name_from_path(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// An interactive map with helpers to compose basemaps and data layers
#[derive(Debug)]
pub struct Map {
    widget: MapWidget,
    raster_provider: Box<dyn RasterProvider>,
}

impl Map {
    pub const DEFAULT_CENTER: [f64; 2] = [27.48, 77.3];
    pub const DEFAULT_ZOOM: f64 = 12.0;

    /// Create a map centered on `[lat, lon]`; `options` go to the renderer unchanged
    pub fn new(center: [f64; 2], zoom: f64, options: JsonObject) -> Self {
        Self {
            widget: MapWidget::new(center, zoom, options),
            raster_provider: Box::new(GeoTiffProvider::default()),
        }
    }

    /// Replace the provider used by [`Map::add_raster_layer`]
    pub fn with_raster_provider(mut self, provider: impl RasterProvider + 'static) -> Self {
        self.raster_provider = Box::new(provider);
        self
    }

    /// Build a map from a configuration and apply its recipe in order
    pub fn from_config(config: &Config) -> Result<Self> {
        let start = Instant::now();
        log_operation_start(
            "compose_map",
            Some(&format!("{} recipe steps", config.layers.len())),
        );

        let mut map = Map::new(config.map.center, config.map.zoom, config.map.options.clone())
            .with_raster_provider(config.raster_provider());
        map.widget.set_scroll_wheel_zoom(config.map.scroll_wheel_zoom);

        let result = config.layers.iter().try_for_each(|spec| map.apply(spec));
        log_operation_end("compose_map", start, result.is_ok());
        result?;

        Ok(map)
    }

    /// Apply one recipe step
    pub fn apply(&mut self, spec: &LayerSpec) -> Result<()> {
        match spec {
            LayerSpec::Basemap { name } => self.add_basemap(name.as_str()),
            LayerSpec::Tile { url, name, options } => {
                self.add_tile_layer(url, name, options.clone())
            }
            LayerSpec::Vector {
                path,
                name,
                options,
            } => {
                let name = name
                    .clone()
                    .unwrap_or_else(|| name_from_path(path, "geojson"));
                self.add_vector_layer(path, &name, options.clone())
            }
            LayerSpec::Raster {
                path,
                name,
                options,
            } => {
                let name = name
                    .clone()
                    .unwrap_or_else(|| name_from_path(path, "raster"));
                self.add_raster_layer(path, &name, options.clone())
            }
            LayerSpec::LayersControl { position } => self.add_layers_control(position.as_deref()),
        }
    }

    /// Validate a layer and append it to the display tree
    fn insert(&mut self, layer: Layer, detail: Option<&str>) -> Result<()> {
        layer.validate()?;
        let (kind, name) = (layer.kind(), layer.name().to_string());
        self.widget.push_layer(layer);
        log_layer_added(kind, &name, self.widget.layers().len(), detail);
        Ok(())
    }

    /// Add a tile layer from a URL template. The URL is not checked.
    pub fn add_tile_layer(&mut self, url: &str, name: &str, options: TileLayerOptions) -> Result<()> {
        let layer = TileLayer::new(url, name, options);
        logged(self.insert(layer.into(), Some(url)), "add_tile_layer")
    }

    /// Add a basemap by catalog name, or insert a ready-made layer as-is
    pub fn add_basemap(&mut self, basemap: impl Into<BasemapSource>) -> Result<()> {
        match basemap.into() {
            BasemapSource::Name(name) => {
                let provider = logged(basemaps::resolve(&name), "add_basemap")?;
                let options = TileLayerOptions::default()
                    .with_attribution(provider.attribution)
                    .with_max_zoom(provider.max_zoom);
                debug!(basemap = %name, "Resolved basemap");
                self.add_tile_layer(&provider.build_url(), &name, options)
            }
            BasemapSource::Layer(layer) => logged(self.insert(layer, None), "add_basemap"),
        }
    }

    /// Add a layer toggle control; `None` places it at the top right
    pub fn add_layers_control(&mut self, position: Option<&str>) -> Result<()> {
        let position = match position {
            Some(position) => logged(
                ControlPosition::parse_position(position),
                "add_layers_control",
            )?,
            None => ControlPosition::default(),
        };

        self.widget
            .push_control(Control::LayersControl(LayersControl { position }));
        debug!(position = %position, "Layers control added");
        Ok(())
    }

    /// Add a vector layer from a GeoJSON file or a shapefile
    pub fn add_vector_layer(
        &mut self,
        path: impl AsRef<Path>,
        name: &str,
        options: VectorLayerOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = logged(
            log_timed_operation("load_vector", path, || vector_loader::load_vector(path)),
            "add_vector_layer",
        )?;
        self.add_geojson(data, name, options)
    }

    /// Add a GeoJSON file regardless of its extension.
    ///
    /// Without a name the layer is named after the file stem.
    pub fn add_geojson_layer(
        &mut self,
        path: impl AsRef<Path>,
        name: Option<&str>,
        options: VectorLayerOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = logged(
            log_timed_operation("load_geojson", path, || vector_loader::load_geojson(path)),
            "add_geojson_layer",
        )?;
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| name_from_path(path, "geojson"));
        self.add_geojson(data, &name, options)
    }

    /// Add a shapefile, converted to a feature collection.
    ///
    /// Without a name the layer is named after the file stem.
    pub fn add_shapefile_layer(
        &mut self,
        path: impl AsRef<Path>,
        name: Option<&str>,
        options: VectorLayerOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = logged(
            log_timed_operation("load_shapefile", path, || {
                vector_loader::load_shapefile(path)
            }),
            "add_shapefile_layer",
        )?;
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| name_from_path(path, "shapefile"));
        self.add_geojson(data, &name, options)
    }

    /// Add an in-memory feature collection
    pub fn add_geojson(
        &mut self,
        data: FeatureCollection,
        name: &str,
        options: VectorLayerOptions,
    ) -> Result<()> {
        let layer = VectorLayer {
            name: name.to_string(),
            data,
            options,
        };
        let detail = format!("{} features", layer.feature_count());
        logged(self.insert(layer.into(), Some(&detail)), "add_geojson")
    }

    /// Add a raster layer and move the viewport onto it.
    ///
    /// The viewport always changes: the map recenters on the raster, zooms
    /// to its default level and enables scroll-wheel zoom.
    pub fn add_raster_layer(
        &mut self,
        path: impl AsRef<Path>,
        name: &str,
        options: RasterLayerOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        logged(options.validate(), "add_raster_layer")?;
        let provider = &self.raster_provider;
        let source = logged(
            log_timed_operation("open_raster", path, || provider.open(path, &options)),
            "add_raster_layer",
        )?;

        let (center, zoom) = (source.center, source.default_zoom);
        let layer = RasterLayer {
            name: name.to_string(),
            source,
            options,
        };
        logged(self.insert(layer.into(), Some(&path.display().to_string())), "add_raster_layer")?;

        self.widget.set_view(center, zoom as f64);
        self.widget.set_scroll_wheel_zoom(true);
        debug!(
            center_lat = center[0],
            center_lon = center[1],
            zoom = zoom,
            "Viewport moved to raster"
        );
        Ok(())
    }

    pub fn widget(&self) -> &MapWidget {
        &self.widget
    }

    pub fn center(&self) -> [f64; 2] {
        self.widget.center()
    }

    pub fn zoom(&self) -> f64 {
        self.widget.zoom()
    }

    pub fn layers(&self) -> &[Layer] {
        self.widget.layers()
    }

    pub fn controls(&self) -> &[Control] {
        self.widget.controls()
    }

    pub fn layer_count(&self) -> usize {
        self.widget.layers().len()
    }

    /// Validate and serialize the display tree for a host renderer
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.widget.validate()?;
        self.widget.to_json()
    }
}

impl Default for Map {
    fn default() -> Self {
        Map::new(Self::DEFAULT_CENTER, Self::DEFAULT_ZOOM, JsonObject::new())
    }
}
