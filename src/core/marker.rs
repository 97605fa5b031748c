use crate::core::row_filter::{check_row, RowOutcome};
use crate::domain::model::{
    AedRecord, Coordinate, DatasetKind, DatasetSource, DatasetStats, ExtractedDataset, MarkerDescriptor,
    MarkerLayer, RawRecord, ShelterRecord,
};
use crate::utils::error::{MapError, Result};
use std::borrow::Cow;

/// Header labels used by the municipal open data CSVs.
pub mod columns {
    pub const LATITUDE: &str = "緯度";
    pub const LONGITUDE: &str = "経度";
    pub const NAME: &str = "名称";
    pub const ADDRESS: &str = "住所";
    pub const PHONE: &str = "電話番号";
    pub const CAPACITY: &str = "想定収容人数";
    pub const INSTALL_LOCATION: &str = "設置位置";
}

const POPUP_MAX_WIDTH_PX: u32 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub color: String,
    pub glyph: String,
}

impl MarkerStyle {
    fn new(color: &str, glyph: &str) -> Self {
        Self {
            color: color.to_string(),
            glyph: glyph.to_string(),
        }
    }

    pub fn for_kind(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Shelter => Self::new("blue", "info-sign"),
            DatasetKind::Aed => Self::new("orange", "heart"),
        }
    }

    /// The kind's style with any per-dataset overrides from the configuration.
    pub fn for_source(source: &DatasetSource) -> Self {
        let mut style = Self::for_kind(source.kind);
        if let Some(color) = &source.marker_color {
            style.color = color.clone();
        }
        if let Some(glyph) = &source.marker_icon {
            style.glyph = glyph.clone();
        }
        style
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRow {
    pub label: &'static str,
    pub value: String,
    pub suffix: &'static str,
}

impl PopupRow {
    fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
            suffix: "",
        }
    }
}

/// A record type that can be placed on the map as a marker.
pub trait MapFeature: Sized {
    /// Columns that must exist in the CSV header, besides latitude and longitude.
    const REQUIRED_COLUMNS: &'static [&'static str];

    fn from_row(coordinate: Coordinate, record: &RawRecord) -> Self;
    fn coordinate(&self) -> Coordinate;
    fn name(&self) -> &str;
    fn popup_rows(&self) -> Vec<PopupRow>;
}

/// `100.0` from spreadsheet exports becomes `100`; other text such as
/// `約100` or `1,200` is shown as written.
fn capacity_text(value: &str) -> String {
    if let Ok(n) = value.parse::<u32>() {
        return n.to_string();
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
            (n as u32).to_string()
        }
        _ => value.to_string(),
    }
}

impl MapFeature for ShelterRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        columns::NAME,
        columns::ADDRESS,
        columns::PHONE,
        columns::CAPACITY,
    ];

    fn from_row(coordinate: Coordinate, record: &RawRecord) -> Self {
        Self {
            coordinate,
            name: record.text(columns::NAME),
            address: record.text(columns::ADDRESS),
            phone: record.text(columns::PHONE),
            capacity: record.get(columns::CAPACITY).map(capacity_text),
        }
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn popup_rows(&self) -> Vec<PopupRow> {
        let mut rows = vec![
            PopupRow::new("住所", &self.address),
            PopupRow::new("電話", &self.phone),
        ];
        if let Some(capacity) = &self.capacity {
            rows.push(PopupRow {
                label: "想定収容人数",
                value: capacity.clone(),
                suffix: "人",
            });
        }
        rows
    }
}

impl MapFeature for AedRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &[columns::NAME, columns::ADDRESS, columns::INSTALL_LOCATION];

    fn from_row(coordinate: Coordinate, record: &RawRecord) -> Self {
        Self {
            coordinate,
            name: record.text(columns::NAME),
            address: record.text(columns::ADDRESS),
            install_location: record.text(columns::INSTALL_LOCATION),
        }
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn popup_rows(&self) -> Vec<PopupRow> {
        vec![
            PopupRow::new("住所", &self.address),
            PopupRow::new("設置位置", &self.install_location),
        ]
    }
}

pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(&['&', '<', '>', '"', '\''][..]) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

pub fn build_popup<F: MapFeature>(feature: &F, escape: bool) -> String {
    let field = |value: &str| -> String {
        if escape {
            escape_html(value).into_owned()
        } else {
            value.to_string()
        }
    };

    let mut popup = format!(
        "<div style=\"width: 200px; font-size:12px;\">\n    <b style=\"font-size: 14px; display: block\">{}</b><br>\n",
        field(feature.name())
    );
    for row in feature.popup_rows() {
        popup.push_str(&format!(
            "    <b>{}：</b>{}{}<br>\n",
            row.label,
            field(&row.value),
            row.suffix
        ));
    }
    popup.push_str("</div>");
    popup
}

pub fn build_marker<F: MapFeature>(feature: &F, style: &MarkerStyle, escape: bool) -> MarkerDescriptor {
    MarkerDescriptor {
        position: feature.coordinate(),
        tooltip: feature.name().to_string(),
        popup: build_popup(feature, escape),
        popup_max_width: POPUP_MAX_WIDTH_PX,
        color: style.color.clone(),
        glyph: style.glyph.clone(),
    }
}

fn ensure_columns(dataset: &ExtractedDataset, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = [columns::LATITUDE, columns::LONGITUDE]
        .iter()
        .chain(required)
        .filter(|column| !dataset.headers.iter().any(|h| h == *column))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MapError::ProcessingError {
            message: format!(
                "{} dataset from {} has no column(s): {}",
                dataset.source.kind,
                dataset.source.url,
                missing.join(", ")
            ),
        })
    }
}

fn build_layer_of<F: MapFeature>(dataset: &ExtractedDataset, escape: bool) -> Result<(MarkerLayer, DatasetStats)> {
    ensure_columns(dataset, F::REQUIRED_COLUMNS)?;

    let style = MarkerStyle::for_source(&dataset.source);
    let mut layer = MarkerLayer::new(dataset.source.layer_name.clone());
    let mut rows_skipped = 0;

    for (index, record) in dataset.records.iter().enumerate() {
        match check_row(record, columns::LATITUDE, columns::LONGITUDE) {
            RowOutcome::Valid { coordinate, record } => {
                let feature = F::from_row(coordinate, record);
                layer.markers.push(build_marker(&feature, &style, escape));
            }
            RowOutcome::Skip(reason) => {
                rows_skipped += 1;
                tracing::debug!(
                    "Skipping {} row {}: {}",
                    dataset.source.layer_name,
                    index + 1,
                    reason
                );
            }
        }
    }

    let stats = DatasetStats {
        layer_name: layer.name.clone(),
        rows_read: dataset.records.len(),
        markers_placed: layer.markers.len(),
        rows_skipped,
    };
    Ok((layer, stats))
}

/// Turns one fetched dataset into its marker layer.
///
/// Rows without a usable coordinate are dropped and counted; a missing
/// column in the header is an error.
pub fn build_marker_layer(dataset: &ExtractedDataset, escape: bool) -> Result<(MarkerLayer, DatasetStats)> {
    match dataset.source.kind {
        DatasetKind::Shelter => build_layer_of::<ShelterRecord>(dataset, escape),
        DatasetKind::Aed => build_layer_of::<AedRecord>(dataset, escape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHELTER_HEADERS: [&str; 6] = ["緯度", "経度", "名称", "住所", "電話番号", "想定収容人数"];

    fn shelter_source() -> DatasetSource {
        DatasetSource {
            kind: DatasetKind::Shelter,
            layer_name: "避難所".to_string(),
            url: "https://example.com/shelters.csv".to_string(),
            encoding: "utf-8".to_string(),
            marker_color: None,
            marker_icon: None,
        }
    }

    fn shelter_row(cells: [&str; 6]) -> RawRecord {
        RawRecord::from_pairs(SHELTER_HEADERS.into_iter().zip(cells))
    }

    fn shelter_dataset(rows: Vec<RawRecord>) -> ExtractedDataset {
        ExtractedDataset {
            source: shelter_source(),
            headers: SHELTER_HEADERS.iter().map(|h| h.to_string()).collect(),
            records: rows,
        }
    }

    #[test]
    fn test_shelter_row_becomes_marker() {
        let dataset = shelter_dataset(vec![shelter_row([
            "31.9000",
            "131.4200",
            "Test Shelter",
            "1 Main St",
            "000-0000",
            "100",
        ])]);

        let (layer, stats) = build_marker_layer(&dataset, true).unwrap();

        assert_eq!(layer.name, "避難所");
        assert_eq!(layer.markers.len(), 1);
        let marker = &layer.markers[0];
        assert_eq!(marker.position, Coordinate::new(31.9, 131.42));
        assert_eq!(marker.tooltip, "Test Shelter");
        assert!(marker.popup.contains("Test Shelter"));
        assert!(marker.popup.contains("1 Main St"));
        assert!(marker.popup.contains("000-0000"));
        assert!(marker.popup.contains("100人"));
        assert_eq!(marker.color, "blue");
        assert_eq!(marker.glyph, "info-sign");
        assert_eq!(
            stats,
            DatasetStats {
                layer_name: "避難所".to_string(),
                rows_read: 1,
                markers_placed: 1,
                rows_skipped: 0,
            }
        );
    }

    #[test]
    fn test_nan_row_is_skipped_and_later_rows_still_processed() {
        let dataset = shelter_dataset(vec![
            shelter_row(["NaN", "131.42", "Broken", "", "", ""]),
            shelter_row(["31.91", "131.43", "Second", "2 Main St", "111-1111", "50"]),
            shelter_row(["", "131.44", "No Lat", "", "", ""]),
            shelter_row(["31.92", "131.45", "Third", "3 Main St", "222-2222", "75"]),
        ]);

        let (layer, stats) = build_marker_layer(&dataset, true).unwrap();

        let tooltips: Vec<_> = layer.markers.iter().map(|m| m.tooltip.as_str()).collect();
        assert_eq!(tooltips, vec!["Second", "Third"]);
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_skipped, 2);
    }

    #[test]
    fn test_zero_valid_rows_gives_empty_layer() {
        let dataset = shelter_dataset(vec![shelter_row(["abc", "def", "x", "", "", ""])]);
        let (layer, stats) = build_marker_layer(&dataset, true).unwrap();
        assert_eq!(layer.name, "避難所");
        assert!(layer.markers.is_empty());
        assert_eq!(stats.markers_placed, 0);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut dataset = shelter_dataset(vec![]);
        dataset.headers.retain(|h| h != "電話番号");
        let err = build_marker_layer(&dataset, true).unwrap_err();
        assert!(matches!(err, MapError::ProcessingError { ref message } if message.contains("電話番号")));
    }

    #[test]
    fn test_capacity_row_omitted_when_absent() {
        let record = ShelterRecord {
            coordinate: Coordinate::new(31.9, 131.42),
            name: "A".to_string(),
            address: "B".to_string(),
            phone: "C".to_string(),
            capacity: None,
        };
        let popup = build_popup(&record, true);
        assert!(!popup.contains("想定収容人数"));
        assert!(popup.contains("<b>電話：</b>C<br>"));
    }

    #[test]
    fn test_capacity_text_normalizes_integral_floats() {
        assert_eq!(capacity_text("100"), "100");
        assert_eq!(capacity_text("100.0"), "100");
        assert_eq!(capacity_text("12.5"), "12.5");
        assert_eq!(capacity_text("約100"), "約100");
        assert_eq!(capacity_text("1,200"), "1,200");
    }

    #[test]
    fn test_non_numeric_capacity_is_still_shown() {
        let record = RawRecord::from_pairs([
            ("緯度", "31.9"),
            ("経度", "131.42"),
            ("名称", "A"),
            ("住所", "B"),
            ("電話番号", "C"),
            ("想定収容人数", " 約100 "),
        ]);
        let shelter = ShelterRecord::from_row(Coordinate::new(31.9, 131.42), &record);
        assert_eq!(shelter.capacity.as_deref(), Some("約100"));
        assert!(build_popup(&shelter, true).contains("<b>想定収容人数：</b>約100人<br>"));

        let blank = RawRecord::from_pairs([("想定収容人数", "  ")]);
        let shelter = ShelterRecord::from_row(Coordinate::new(31.9, 131.42), &blank);
        assert_eq!(shelter.capacity, None);
    }

    #[test]
    fn test_aed_popup_and_style() {
        let record = AedRecord {
            coordinate: Coordinate::new(31.91, 131.42),
            name: "宮崎市役所".to_string(),
            address: "宮崎市橘通西1-1-1".to_string(),
            install_location: "1階ロビー".to_string(),
        };
        let marker = build_marker(&record, &MarkerStyle::for_kind(DatasetKind::Aed), true);
        assert_eq!(marker.color, "orange");
        assert_eq!(marker.glyph, "heart");
        assert!(marker.popup.contains("<b>設置位置：</b>1階ロビー<br>"));
        assert!(!marker.popup.contains("電話"));
    }

    #[test]
    fn test_popup_escaping_can_be_disabled() {
        let record = AedRecord {
            coordinate: Coordinate::new(0.0, 0.0),
            name: "<i>Lobby</i>".to_string(),
            address: "A & B".to_string(),
            install_location: String::new(),
        };
        let escaped = build_popup(&record, true);
        assert!(escaped.contains("&lt;i&gt;Lobby&lt;/i&gt;"));
        assert!(escaped.contains("A &amp; B"));

        let raw = build_popup(&record, false);
        assert!(raw.contains("<i>Lobby</i>"));
        assert!(raw.contains("A & B"));
    }

    #[test]
    fn test_source_overrides_style() {
        let mut source = shelter_source();
        source.marker_color = Some("green".to_string());
        let style = MarkerStyle::for_source(&source);
        assert_eq!(style, MarkerStyle::new("green", "info-sign"));
    }
}
