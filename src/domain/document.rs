use crate::domain::model::{BaseLayer, Coordinate, MapLayer, MarkerLayer, TileOverlay};
use crate::utils::error::{MapError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerControl {
    pub collapsed: bool,
}

impl Default for LayerControl {
    fn default() -> Self {
        Self { collapsed: true }
    }
}

/// Everything one rendered map page contains.
///
/// Built once per run: each pipeline stage adds layers or markup through
/// `&mut self`, and [`crate::core::render::render_html`] turns the finished
/// document into a page. Overlay layers keep their registration order, which
/// is also their order in the layer control.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    title: String,
    center: Coordinate,
    zoom: u8,
    base_layer: BaseLayer,
    layers: Vec<MapLayer>,
    layer_control: LayerControl,
    #[serde(skip)]
    head_fragments: Vec<String>,
    #[serde(skip)]
    body_fragments: Vec<String>,
}

impl MapDocument {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self {
            title: "dp_map".to_string(),
            center,
            zoom,
            base_layer: BaseLayer::default(),
            layers: Vec::new(),
            layer_control: LayerControl::default(),
            head_fragments: Vec::new(),
            body_fragments: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_base_layer(mut self, base_layer: BaseLayer) -> Self {
        self.base_layer = base_layer;
        self
    }

    fn push_layer(&mut self, layer: MapLayer) -> Result<()> {
        if self.layers.iter().any(|l| l.name() == layer.name()) {
            return Err(MapError::DuplicateLayerError {
                name: layer.name().to_string(),
            });
        }
        tracing::debug!("Registered layer '{}'", layer.name());
        self.layers.push(layer);
        Ok(())
    }

    pub fn add_marker_layer(&mut self, layer: MarkerLayer) -> Result<()> {
        self.push_layer(MapLayer::Markers(layer))
    }

    pub fn add_tile_overlay(&mut self, overlay: TileOverlay) -> Result<()> {
        self.push_layer(MapLayer::Tiles(overlay))
    }

    /// Raw markup appended to `<body>` after the map container.
    pub fn add_body_html(&mut self, html: impl Into<String>) {
        self.body_fragments.push(html.into());
    }

    /// Raw markup appended to `<head>` after the library stylesheets.
    pub fn add_head_html(&mut self, html: impl Into<String>) {
        self.head_fragments.push(html.into());
    }

    pub fn set_layer_control(&mut self, control: LayerControl) {
        self.layer_control = control;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(MapLayer::name).collect()
    }

    pub fn marker_layer(&self, name: &str) -> Option<&MarkerLayer> {
        self.layers.iter().find_map(|l| match l {
            MapLayer::Markers(layer) if layer.name == name => Some(layer),
            _ => None,
        })
    }

    pub fn layer_control(&self) -> LayerControl {
        self.layer_control
    }

    pub fn head_fragments(&self) -> &[String] {
        &self.head_fragments
    }

    pub fn body_fragments(&self) -> &[String] {
        &self.body_fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(name: &str) -> TileOverlay {
        TileOverlay {
            name: name.to_string(),
            url: "https://example.com/{z}/{x}/{y}.png".to_string(),
            attribution: "test".to_string(),
            opacity: 0.7,
            overlay: true,
            visible: true,
        }
    }

    #[test]
    fn test_layers_keep_registration_order() {
        let mut doc = MapDocument::new(Coordinate::new(31.9111, 131.4239), 15);
        doc.add_marker_layer(MarkerLayer::new("避難所")).unwrap();
        doc.add_marker_layer(MarkerLayer::new("AED")).unwrap();
        doc.add_tile_overlay(overlay("洪水ハザードエリア")).unwrap();

        assert_eq!(doc.layer_names(), vec!["避難所", "AED", "洪水ハザードエリア"]);
        assert!(doc.marker_layer("AED").is_some());
        assert!(doc.marker_layer("洪水ハザードエリア").is_none());
    }

    #[test]
    fn test_duplicate_layer_name_is_rejected() {
        let mut doc = MapDocument::new(Coordinate::new(0.0, 0.0), 3);
        doc.add_marker_layer(MarkerLayer::new("AED")).unwrap();

        let err = doc.add_tile_overlay(overlay("AED")).unwrap_err();
        assert!(matches!(err, MapError::DuplicateLayerError { ref name } if name == "AED"));
        assert_eq!(doc.layers().len(), 1);
    }

    #[test]
    fn test_fragments_are_split_by_target() {
        let mut doc = MapDocument::new(Coordinate::new(0.0, 0.0), 3);
        doc.add_body_html("<div>legend</div>");
        doc.add_head_html("<style></style>");
        doc.add_body_html("<div>license</div>");

        assert_eq!(doc.body_fragments(), ["<div>legend</div>", "<div>license</div>"]);
        assert_eq!(doc.head_fragments(), ["<style></style>"]);
    }
}
