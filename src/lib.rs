pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use config::{cli::LocalStorage, map_config::MapConfig};
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::HazardMapPipeline,
};
pub use domain::document::MapDocument;
pub use utils::error::{MapError, Result};
