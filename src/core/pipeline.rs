use crate::core::chrome::inject_chrome;
use crate::core::fetcher::CsvFetcher;
use crate::core::hazard::register_hazard_layers;
use crate::core::marker::build_marker_layer;
use crate::core::render::render_html;
use crate::core::{ConfigProvider, ExtractedDataset, Pipeline, Storage, TransformResult};
use crate::domain::document::{LayerControl, MapDocument};
use crate::utils::error::Result;
use crate::utils::validation::validate_encoding_label;

/// Shelters and AEDs as markers, hazard tiles as overlays, one HTML page out.
pub struct HazardMapPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: CsvFetcher,
}

impl<S: Storage, C: ConfigProvider> HazardMapPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = CsvFetcher::new(config.http_timeout())?;
        Ok(Self {
            storage,
            config,
            fetcher,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for HazardMapPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<ExtractedDataset>> {
        let mut datasets = Vec::with_capacity(self.config.datasets().len());

        for (i, source) in self.config.datasets().iter().enumerate() {
            let encoding = validate_encoding_label(&format!("datasets[{}].encoding", i), &source.encoding)?;
            tracing::info!(
                "Fetching {} dataset '{}' ({})",
                source.kind,
                source.layer_name,
                encoding.name()
            );

            let table = self.fetcher.fetch(&source.url, encoding).await?;
            tracing::info!("'{}': {} rows", source.layer_name, table.records.len());

            datasets.push(ExtractedDataset {
                source: source.clone(),
                headers: table.headers,
                records: table.records,
            });
        }

        Ok(datasets)
    }

    async fn transform(&self, data: Vec<ExtractedDataset>) -> Result<TransformResult> {
        let mut document = MapDocument::new(self.config.center(), self.config.zoom())
            .with_title(self.config.title())
            .with_base_layer(self.config.base_layer().clone());
        let mut stats = Vec::with_capacity(data.len());

        for dataset in &data {
            let (layer, dataset_stats) = build_marker_layer(dataset, self.config.escape_popup_text())?;
            if dataset_stats.rows_skipped > 0 {
                tracing::warn!(
                    "'{}': skipped {} of {} rows without usable coordinates",
                    dataset_stats.layer_name,
                    dataset_stats.rows_skipped,
                    dataset_stats.rows_read
                );
            }
            tracing::info!(
                "'{}': placed {} markers",
                dataset_stats.layer_name,
                dataset_stats.markers_placed
            );
            document.add_marker_layer(layer)?;
            stats.push(dataset_stats);
        }

        register_hazard_layers(&mut document, self.config.hazard_layers())?;
        inject_chrome(&mut document, self.config.legend_image());
        document.set_layer_control(LayerControl { collapsed: false });

        Ok(TransformResult { document, stats })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let html = render_html(&result.document)?;
        let path = self
            .storage
            .write_file(self.config.output_file_name(), html.as_bytes())
            .await?;
        tracing::debug!("Wrote {} bytes to {}", html.len(), path);
        Ok(path)
    }
}
