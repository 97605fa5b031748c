//! Static page furniture layered over the map: the hazard legend, the
//! license/attribution panel, and the layer-control styling.

use crate::domain::document::MapDocument;

pub const DEFAULT_LEGEND_IMAGE: &str = "static/shinsui_legend3.png";

const LEGEND_TEMPLATE: &str = r#"
<div style="
    position: absolute;
    bottom: 20px; left: 20px;
    width: 180px;
    background-color: rgba(255, 255, 255, 0.7);
    padding: 10px;
    font-size: 12px;
    border: 1px solid black;
    z-index:9999;">
    <b>凡例</b><br>
    <img src="{legend_image}">
</div>
"#;

// Required by CC BY 4.0; keep the wording as published.
pub const LICENSE_HTML: &str = r#"
    <div style="position: absolute; bottom: 0px; right: 10px; background-color: rgba(255, 255, 255, 0.7);
                padding: 8px; font-size: 8px; z-index: 1000;">
        <a href="https://creativecommons.org/licenses/by/4.0/" target="_blank">
            <img style="margin-bottom: 10px;" src="https://licensebuttons.net/l/by/4.0/88x31.png" alt="CC BY 4.0">
        </a>
        <p>この地図のデータは <a href="https://data.bodik.jp/dataset/452017_hinanjo" target="_blank">宮崎市避難所データ</a> を使用し、CC BY 4.0 ライセンスのもとで提供されています。</p>
        <p>この地図のデータは <a href="https://data.bodik.jp/dataset/452017_aed" target="_blank">AED設置場所一覧</a> を使用し、CC BY 4.0 ライセンスのもとで提供されています。</p>
        <p>この地図のデータは <a href="https://disaportal.gsi.go.jp/hazardmapportal/hazardmap/copyright/opendata.html#l2shinsuishin" target="_blank">国土地理院ハザードマップ</a> を使用し、CC BY 4.0 ライセンスのもとで提供されています。</p>
    </div>
    "#;

pub const LAYER_CONTROL_CSS: &str = r#"
<style>
    .leaflet-control-layers {
        font-size: 16px !important;
        padding: 20px !important;
        width: 200px !important;
        height: 170px !important;
        background-color: rgba(0, 0, 0, 0.8) !important;
        border-radius: 8px !important;
        box-shadow: 0 2px 4px rgba(0, 0, 0, 0.3) !important;
        color: white !important;
    }
    .leaflet-control-layers-toggle {
        width: 50px !important;
        height: 50px !important;
    }
    .leaflet-control-layers-list {
        font-size: 14px !important;
    }
</style>
"#;

pub fn legend_html(legend_image: &str) -> String {
    LEGEND_TEMPLATE.replace("{legend_image}", legend_image)
}

/// Appends the legend and license panels to the body and the control CSS to the head.
pub fn inject_chrome(document: &mut MapDocument, legend_image: &str) {
    document.add_body_html(legend_html(legend_image));
    document.add_body_html(LICENSE_HTML);
    document.add_head_html(LAYER_CONTROL_CSS);
}
