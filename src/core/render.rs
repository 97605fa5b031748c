use crate::core::marker::escape_html;
use crate::domain::document::MapDocument;
use crate::utils::error::Result;

const LIBRARY_HEAD: &str = r#"    <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.0/css/bootstrap-glyphicons.css" />
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
    <style>
        html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
        #map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }
    </style>
"#;

// Builds the Leaflet objects from `mapData`. Tooltips go in as text nodes,
// popups as markup.
const BOOTSTRAP_SCRIPT: &str = r#"
        const map = L.map('map', {
            center: [mapData.center.latitude, mapData.center.longitude],
            zoom: mapData.zoom,
        });

        const base = L.tileLayer(mapData.base_layer.url, {
            attribution: mapData.base_layer.attribution,
            maxZoom: mapData.base_layer.max_zoom,
        }).addTo(map);

        const baseLayers = {};
        baseLayers[mapData.base_layer.name] = base;
        const overlays = {};

        for (const layer of mapData.layers) {
            let group;
            if (layer.kind === 'markers') {
                group = L.featureGroup();
                for (const m of layer.markers) {
                    const tooltip = document.createElement('span');
                    tooltip.textContent = m.tooltip;
                    L.marker([m.position.latitude, m.position.longitude], {
                        icon: L.AwesomeMarkers.icon({
                            icon: m.glyph,
                            prefix: 'glyphicon',
                            markerColor: m.color,
                            iconColor: 'white',
                        }),
                    })
                        .bindTooltip(tooltip)
                        .bindPopup(m.popup, { maxWidth: m.popup_max_width })
                        .addTo(group);
                }
            } else {
                group = L.tileLayer(layer.url, {
                    attribution: layer.attribution,
                    opacity: layer.opacity,
                });
            }

            if (layer.visible) {
                group.addTo(map);
            }
            if (layer.kind === 'tiles' && !layer.overlay) {
                baseLayers[layer.name] = group;
            } else {
                overlays[layer.name] = group;
            }
        }

        L.control.layers(baseLayers, overlays, {
            collapsed: mapData.layer_control.collapsed,
        }).addTo(map);
"#;

/// The document as a JSON literal that is safe inside a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, so they are rewritten as
/// `\u` escapes; no markup in the data can open or close a tag or comment.
pub fn embed_json(document: &MapDocument) -> Result<String> {
    let json = serde_json::to_string(document)?;
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            _ => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Renders the finished document as a standalone HTML page.
///
/// Output depends only on the document, so identical input gives
/// byte-identical pages.
pub fn render_html(document: &MapDocument) -> Result<String> {
    let data = embed_json(document)?;

    let mut html = String::with_capacity(data.len() + 8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\" />\n");
    html.push_str(&format!("    <title>{}</title>\n", escape_html(document.title())));
    html.push_str(LIBRARY_HEAD);
    for fragment in document.head_fragments() {
        html.push_str(fragment);
        html.push('\n');
    }
    html.push_str("</head>\n<body>\n    <div id=\"map\"></div>\n");
    for fragment in document.body_fragments() {
        html.push_str(fragment);
        html.push('\n');
    }
    html.push_str("    <script>\n        const mapData = ");
    html.push_str(&data);
    html.push_str(";\n");
    html.push_str(BOOTSTRAP_SCRIPT);
    html.push_str("    </script>\n</body>\n</html>\n");

    tracing::debug!("Rendered {} bytes of HTML", html.len());
    Ok(html)
}
