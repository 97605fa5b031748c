use crate::core::chrome::DEFAULT_LEGEND_IMAGE;
use crate::core::hazard::default_hazard_layers;
use crate::core::ConfigProvider;
use crate::domain::model::{BaseLayer, Coordinate, DatasetKind, DatasetSource, TileOverlay};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// 宮崎市 designated evacuation shelters (UTF-8).
pub const SHELTER_CSV_URL: &str = "https://data.bodik.jp/dataset/d169e872-ffe1-4ce7-8bf7-f6550d89d119/resource/ed5a87de-9b3c-443a-ab6e-41b87a55baac/download/siteihinanjo20240401.csv";
/// 宮崎市 AED installations (Shift_JIS).
pub const AED_CSV_URL: &str = "https://data.bodik.jp/dataset/5b8584bf-9044-499e-8d85-084e32a90334/resource/9401f2d1-bcf7-40e3-b7ac-294228bb06d4/download/aed202403.csv";

const MAX_ZOOM: u8 = 22;

/// Run configuration. Every section is optional; an empty file reproduces
/// the 宮崎市 map with its two datasets and two hazard overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub map: MapSection,
    pub base_layer: BaseLayer,
    pub http: HttpConfig,
    pub datasets: Vec<DatasetSource>,
    pub hazard_layers: Vec<TileOverlay>,
    pub chrome: ChromeConfig,
    pub output: OutputConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            map: MapSection::default(),
            base_layer: BaseLayer::default(),
            http: HttpConfig::default(),
            datasets: default_datasets(),
            hazard_layers: default_hazard_layers(),
            chrome: ChromeConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub title: String,
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub escape_popup_text: bool,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            title: "dp_map".to_string(),
            // 宮崎市中心部
            center: [31.9111, 131.4239],
            zoom: 15,
            escape_popup_text: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    pub legend_image: String,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            legend_image: DEFAULT_LEGEND_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_name: "dp_map.html".to_string(),
        }
    }
}

fn default_datasets() -> Vec<DatasetSource> {
    vec![
        DatasetSource {
            kind: DatasetKind::Shelter,
            layer_name: "避難所".to_string(),
            url: SHELTER_CSV_URL.to_string(),
            encoding: "utf-8".to_string(),
            marker_color: None,
            marker_icon: None,
        },
        DatasetSource {
            kind: DatasetKind::Aed,
            layer_name: "AED".to_string(),
            url: AED_CSV_URL.to_string(),
            encoding: "shift_jis".to_string(),
            marker_color: None,
            marker_icon: None,
        },
    ]
}

impl MapConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_range("map.center[0]", self.map.center[0], -90.0, 90.0)?;
        validation::validate_range("map.center[1]", self.map.center[1], -180.0, 180.0)?;
        validation::validate_range("map.zoom", self.map.zoom, 0, MAX_ZOOM)?;

        validation::validate_non_empty_string("base_layer.name", &self.base_layer.name)?;
        validation::validate_non_empty_string("base_layer.url", &self.base_layer.url)?;

        validation::validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;

        let mut names = HashSet::new();
        for (i, dataset) in self.datasets.iter().enumerate() {
            validation::validate_non_empty_string(&format!("datasets[{}].layer_name", i), &dataset.layer_name)?;
            validation::validate_url(&format!("datasets[{}].url", i), &dataset.url)?;
            validation::validate_encoding_label(&format!("datasets[{}].encoding", i), &dataset.encoding)?;
            if !names.insert(dataset.layer_name.as_str()) {
                return Err(duplicate_name(&format!("datasets[{}].layer_name", i), &dataset.layer_name));
            }
        }

        for (i, overlay) in self.hazard_layers.iter().enumerate() {
            validation::validate_non_empty_string(&format!("hazard_layers[{}].name", i), &overlay.name)?;
            validation::validate_range(&format!("hazard_layers[{}].opacity", i), overlay.opacity, 0.0, 1.0)?;
            if !names.insert(overlay.name.as_str()) {
                return Err(duplicate_name(&format!("hazard_layers[{}].name", i), &overlay.name));
            }
        }

        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_file_name("output.file_name", &self.output.file_name)?;

        Ok(())
    }

    pub fn output_file(&self) -> String {
        Path::new(&self.output.directory)
            .join(&self.output.file_name)
            .to_string_lossy()
            .into_owned()
    }
}

fn duplicate_name(field: &str, name: &str) -> MapError {
    MapError::ConfigValidationError {
        field: field.to_string(),
        message: format!("layer name '{}' is used more than once", name),
    }
}

impl ConfigProvider for MapConfig {
    fn title(&self) -> &str {
        &self.map.title
    }

    fn center(&self) -> Coordinate {
        Coordinate::new(self.map.center[0], self.map.center[1])
    }

    fn zoom(&self) -> u8 {
        self.map.zoom
    }

    fn base_layer(&self) -> &BaseLayer {
        &self.base_layer
    }

    fn datasets(&self) -> &[DatasetSource] {
        &self.datasets
    }

    fn hazard_layers(&self) -> &[TileOverlay] {
        &self.hazard_layers
    }

    fn legend_image(&self) -> &str {
        &self.chrome.legend_image
    }

    fn escape_popup_text(&self) -> bool {
        self.map.escape_popup_text
    }

    fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    fn output_path(&self) -> &str {
        &self.output.directory
    }

    fn output_file_name(&self) -> &str {
        &self.output.file_name
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
