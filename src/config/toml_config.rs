use crate::domain::model::ExtractionMode;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HarvestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REPORT_FILENAME: &str = "attributes.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub service: ServiceConfig,
    pub harvest: HarvestSection,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestSection {
    #[serde(default)]
    pub layers: Vec<String>,
    pub mode: Option<ExtractionMode>,
    pub cache: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub filename: Option<String>,
    pub pretty: Option<bool>,
}

impl HarvestConfig {
    pub fn new(endpoint: impl Into<String>, layers: Vec<String>) -> Self {
        Self {
            service: ServiceConfig {
                endpoint: endpoint.into(),
                timeout_seconds: None,
            },
            harvest: HarvestSection {
                layers,
                ..Default::default()
            },
            output: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarvestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| HarvestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WFS_ENDPOINT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_endpoint("service.endpoint", &self.service.endpoint)?;
        validation::validate_layers("harvest.layers", &self.harvest.layers)?;

        if let Some(timeout) = self.service.timeout_seconds {
            validation::validate_range("service.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path)?;
            if let Some(filename) = &output.filename {
                validation::validate_non_empty_string("output.filename", filename)?;
            }
        }

        Ok(())
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.service.timeout_seconds
    }

    pub fn cache_enabled(&self) -> bool {
        self.harvest.cache.unwrap_or(false)
    }

    pub fn report_filename(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|o| o.filename.as_deref())
            .unwrap_or(DEFAULT_REPORT_FILENAME)
    }

    pub fn pretty_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(true)
    }
}

impl ConfigProvider for HarvestConfig {
    fn endpoint(&self) -> &str {
        &self.service.endpoint
    }

    fn layers(&self) -> &[String] {
        &self.harvest.layers
    }

    fn mode(&self) -> ExtractionMode {
        self.harvest.mode.unwrap_or_default()
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.path.as_str())
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
