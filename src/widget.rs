//! The map display tree.
//!
//! `MapWidget` is the state a host renderer draws: a viewport plus the
//! ordered layers and controls. It serializes to JSON for hand-off.

use serde::Serialize;

use crate::error::Result;
use crate::geoutil;
use crate::layer::{Control, JsonObject, Layer};

/// Viewport, layers and controls of one map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapWidget {
    /// `[lat, lon]`
    center: [f64; 2],
    zoom: f64,
    scroll_wheel_zoom: bool,
    layers: Vec<Layer>,
    controls: Vec<Control>,
    /// Renderer options passed through verbatim
    options: JsonObject,
}

impl MapWidget {
    pub fn new(center: [f64; 2], zoom: f64, options: JsonObject) -> Self {
        Self {
            center,
            zoom,
            scroll_wheel_zoom: false,
            layers: Vec::new(),
            controls: Vec::new(),
            options,
        }
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll_wheel_zoom(&self) -> bool {
        self.scroll_wheel_zoom
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn push_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    /// Move the viewport
    pub fn set_view(&mut self, center: [f64; 2], zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    pub fn set_scroll_wheel_zoom(&mut self, enabled: bool) {
        self.scroll_wheel_zoom = enabled;
    }

    /// Check that the viewport is usable
    pub fn validate(&self) -> Result<()> {
        geoutil::validate_center(self.center)?;
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    /// Serialize the display tree for a host renderer
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{ControlPosition, LayersControl, TileLayer, TileLayerOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_widget_serialization() {
        let mut options = JsonObject::new();
        options.insert("basemap_visible".to_string(), json!(false));
        let mut widget = MapWidget::new([27.48, 77.3], 12.0, options);

        widget.push_layer(
            TileLayer::new(
                "https://tile.example.com/{z}/{x}/{y}.png",
                "example",
                TileLayerOptions::default(),
            )
            .into(),
        );
        widget.push_control(Control::LayersControl(LayersControl {
            position: ControlPosition::BottomLeft,
        }));

        let json = widget.to_json().unwrap();
        assert_eq!(
            json,
            json!({
                "center": [27.48, 77.3],
                "zoom": 12.0,
                "scroll_wheel_zoom": false,
                "layers": [{
                    "type": "tile",
                    "name": "example",
                    "url": "https://tile.example.com/{z}/{x}/{y}.png",
                    "options": {"opacity": 1.0, "visible": true}
                }],
                "controls": [{"type": "layers_control", "position": "bottomleft"}],
                "options": {"basemap_visible": false}
            })
        );
    }

    #[test]
    fn test_set_view_keeps_duplicate_layers() {
        let mut widget = MapWidget::new([0.0, 0.0], 2.0, JsonObject::new());
        widget.set_view([10.0, 20.0], 7.0);
        widget.set_scroll_wheel_zoom(true);
        assert_eq!(widget.center(), [10.0, 20.0]);
        assert_eq!(widget.zoom(), 7.0);
        assert!(widget.scroll_wheel_zoom());

        for _ in 0..2 {
            widget.push_layer(
                TileLayer::new("u", "same", TileLayerOptions::default()).into(),
            );
        }
        let names: Vec<_> = widget.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["same", "same"]);
    }

    #[test]
    fn test_validate() {
        assert!(MapWidget::new([27.48, 77.3], 12.0, JsonObject::new())
            .validate()
            .is_ok());
        assert!(MapWidget::new([95.0, 77.3], 12.0, JsonObject::new())
            .validate()
            .is_err());
    }
}
