#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::HarvestConfig;

use crate::domain::model::LayerRef;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;

/// Layer names from any configuration source, checked for emptiness.
pub fn layer_refs<C: ConfigProvider + ?Sized>(config: &C) -> Result<Vec<LayerRef>> {
    config
        .layers()
        .iter()
        .map(|layer| LayerRef::new(layer.trim()))
        .collect()
}
