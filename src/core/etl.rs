use crate::core::Pipeline;
use crate::domain::model::DatasetStats;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// What one successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub stats: Vec<DatasetStats>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut monitor = RunMonitor::new(self.monitor_enabled);
        tracing::info!("Starting map build");

        let datasets = self.pipeline.extract().await?;
        let rows: usize = datasets.iter().map(|d| d.records.len()).sum();
        tracing::info!("Extracted {} rows from {} datasets", rows, datasets.len());
        monitor.finish_phase("extract");

        let result = self.pipeline.transform(datasets).await?;
        let markers: usize = result.stats.iter().map(|s| s.markers_placed).sum();
        tracing::info!(
            "Built {} layers with {} markers",
            result.document.layers().len(),
            markers
        );
        monitor.finish_phase("transform");

        let stats = result.stats.clone();
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Map saved to: {}", output_path);
        monitor.finish_phase("load");

        monitor.log_final_stats();
        Ok(RunReport { output_path, stats })
    }
}
