use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One CSV row, keyed by header label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, String>,
}

impl RawRecord {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            data: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Trimmed cell text; blank cells count as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Cell text or the empty string.
    pub fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Shelter,
    Aed,
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKind::Shelter => write!(f, "shelter"),
            DatasetKind::Aed => write!(f, "aed"),
        }
    }
}

/// Where one point dataset comes from and which layer it lands in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub kind: DatasetKind,
    pub layer_name: String,
    pub url: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    pub marker_color: Option<String>,
    pub marker_icon: Option<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// Rows fetched for one [`DatasetSource`], in file order.
#[derive(Debug, Clone)]
pub struct ExtractedDataset {
    pub source: DatasetSource,
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    pub coordinate: Coordinate,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Display text for the capacity cell; `None` when the cell is blank.
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AedRecord {
    pub coordinate: Coordinate,
    pub name: String,
    pub address: String,
    pub install_location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub position: Coordinate,
    pub tooltip: String,
    pub popup: String,
    pub popup_max_width: u32,
    pub color: String,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub name: String,
    pub visible: bool,
    pub markers: Vec<MarkerDescriptor>,
}

impl MarkerLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            markers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileOverlay {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub overlay: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_opacity() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

/// The non-toggleable basemap under every overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_max_zoom() -> u8 {
    19
}

impl Default for BaseLayer {
    fn default() -> Self {
        Self {
            name: "openstreetmap".to_string(),
            url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            max_zoom: default_max_zoom(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapLayer {
    Markers(MarkerLayer),
    Tiles(TileOverlay),
}

impl MapLayer {
    pub fn name(&self) -> &str {
        match self {
            MapLayer::Markers(layer) => &layer.name,
            MapLayer::Tiles(layer) => &layer.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub layer_name: String,
    pub rows_read: usize,
    pub markers_placed: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub document: crate::domain::document::MapDocument,
    pub stats: Vec<DatasetStats>,
}
