use crate::domain::document::MapDocument;
use crate::domain::model::TileOverlay;
use crate::utils::error::Result;

pub const GSI_ATTRIBUTION: &str = "国土地理院";
pub const HAZARD_OPACITY: f64 = 0.7;

/// Flood inundation depth, assumed maximum scale (L2).
pub const FLOOD_TILE_URL: &str = "https://disaportaldata.gsi.go.jp/raster/01_flood_l2_shinsuishin_data/{z}/{x}/{y}.png";
/// Tsunami inundation, Miyazaki prefecture (code 45).
pub const TSUNAMI_TILE_URL: &str =
    "https://disaportaldata.gsi.go.jp/raster/04_tsunami_newlegend_pref_data/45/{z}/{x}/{y}.png";

fn gsi_overlay(name: &str, url: &str) -> TileOverlay {
    TileOverlay {
        name: name.to_string(),
        url: url.to_string(),
        attribution: GSI_ATTRIBUTION.to_string(),
        opacity: HAZARD_OPACITY,
        overlay: true,
        visible: true,
    }
}

pub fn default_hazard_layers() -> Vec<TileOverlay> {
    vec![
        gsi_overlay("洪水ハザードエリア", FLOOD_TILE_URL),
        gsi_overlay("津波ハザードエリア", TSUNAMI_TILE_URL),
    ]
}

/// Adds each hazard overlay to the document, in order.
///
/// Tile templates are passed through untouched; the browser resolves
/// `{z}/{x}/{y}` when it draws the map.
pub fn register_hazard_layers(document: &mut MapDocument, overlays: &[TileOverlay]) -> Result<()> {
    for overlay in overlays {
        tracing::debug!(
            "Hazard layer '{}' at opacity {} from {}",
            overlay.name,
            overlay.opacity,
            overlay.url
        );
        document.add_tile_overlay(overlay.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinate, MapLayer};

    #[test]
    fn test_default_layers_are_visible_overlays() {
        let mut doc = MapDocument::new(Coordinate::new(31.9111, 131.4239), 15);
        register_hazard_layers(&mut doc, &default_hazard_layers()).unwrap();

        assert_eq!(doc.layer_names(), vec!["洪水ハザードエリア", "津波ハザードエリア"]);
        for layer in doc.layers() {
            let MapLayer::Tiles(tiles) = layer else {
                panic!("expected a tile layer");
            };
            assert!(tiles.overlay);
            assert!(tiles.visible);
            assert_eq!(tiles.opacity, 0.7);
            assert_eq!(tiles.attribution, "国土地理院");
            assert!(tiles.url.ends_with("{z}/{x}/{y}.png"));
        }
    }

    #[test]
    fn test_registering_twice_fails_on_duplicate_name() {
        let mut doc = MapDocument::new(Coordinate::new(0.0, 0.0), 3);
        let layers = default_hazard_layers();
        register_hazard_layers(&mut doc, &layers).unwrap();
        assert!(register_hazard_layers(&mut doc, &layers).is_err());
    }
}
