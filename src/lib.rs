pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod normalize;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::SchemaFetcher, storage::LocalStorage};
pub use config::HarvestConfig;
pub use crate::core::{cache::CachedSchemaSource, harvester::AttributeHarvester};
pub use domain::model::{Documentation, ExtractionMode, FieldDocs, HarvestReport, LayerRef};
pub use utils::error::{HarvestError, Result};
