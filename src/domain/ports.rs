use crate::domain::model::{BaseLayer, Coordinate, DatasetSource, ExtractedDataset, TileOverlay, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn title(&self) -> &str;
    fn center(&self) -> Coordinate;
    fn zoom(&self) -> u8;
    fn base_layer(&self) -> &BaseLayer;
    fn datasets(&self) -> &[DatasetSource];
    fn hazard_layers(&self) -> &[TileOverlay];
    fn legend_image(&self) -> &str;
    fn escape_popup_text(&self) -> bool;
    fn http_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn output_file_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ExtractedDataset>>;
    async fn transform(&self, data: Vec<ExtractedDataset>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
