use crate::config::toml_config::{HarvestConfig, OutputConfig};
use crate::domain::model::ExtractionMode;
use crate::utils::error::{HarvestError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wfs-harvest")]
#[command(about = "Extract attribute names and documentation from WFS DescribeFeatureType schemas")]
pub struct CliConfig {
    /// WFS endpoint, without DescribeFeatureType parameters
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Layers to harvest, e.g. app:Parks,app:Lakes
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<String>,

    #[arg(long, value_enum)]
    pub mode: Option<ExtractionMode>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for the JSON report (stdout when absent)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Request timeout applied to every fetch
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Reuse fetched schemas for repeated layers
    #[arg(long)]
    pub cache: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入設定檔 (若有)，再以命令列參數覆蓋
    pub fn resolve(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => {
                let endpoint = self
                    .endpoint
                    .clone()
                    .ok_or_else(|| HarvestError::MissingConfigError {
                        field: "--endpoint".to_string(),
                    })?;
                HarvestConfig::new(endpoint, Vec::new())
            }
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut HarvestConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        if !self.layers.is_empty() {
            config.harvest.layers = self.layers.clone();
        }
        if let Some(mode) = self.mode {
            config.harvest.mode = Some(mode);
        }
        if let Some(timeout) = self.timeout_seconds {
            config.service.timeout_seconds = Some(timeout);
        }
        if self.cache {
            config.harvest.cache = Some(true);
        }
        if let Some(path) = &self.output {
            match config.output.as_mut() {
                Some(output) => output.path = path.clone(),
                None => {
                    config.output = Some(OutputConfig {
                        path: path.clone(),
                        filename: None,
                        pretty: None,
                    })
                }
            }
        }
    }
}
