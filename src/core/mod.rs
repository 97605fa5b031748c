pub mod chrome;
pub mod etl;
pub mod fetcher;
pub mod hazard;
pub mod marker;
pub mod pipeline;
pub mod render;
pub mod row_filter;

pub use crate::domain::model::{ExtractedDataset, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
