use crate::utils::error::{HarvestError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 欄位名稱 -> 說明文字，保留宣告順序
pub type FieldDocs = IndexMap<String, String>;

/// Removes a `prefix:` qualifier, keeping everything after the last `:`.
pub fn strip_prefix(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// A feature type identifier as exposed by the service, e.g. `app:Parks`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerRef(String);

impl LayerRef {
    pub fn new(layer: impl Into<String>) -> Result<Self> {
        let layer = layer.into();
        if layer.trim().is_empty() {
            return Err(HarvestError::InvalidConfigValueError {
                field: "layer".to_string(),
                value: layer,
                reason: "Layer name cannot be empty".to_string(),
            });
        }
        Ok(Self(layer))
    }

    pub fn qualified(&self) -> &str {
        &self.0
    }

    pub fn local_name(&self) -> &str {
        strip_prefix(&self.0)
    }
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameOrigin {
    /// Read from the `type` attribute of the layer's element declaration.
    Declared,
    /// No usable declaration; guessed as `<localName>Type`.
    Convention,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub origin: TypeNameOrigin,
}

impl TypeName {
    pub const CONVENTION_SUFFIX: &'static str = "Type";

    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: TypeNameOrigin::Declared,
        }
    }

    pub fn by_convention(local_name: &str) -> Self {
        Self {
            name: format!("{}{}", local_name, Self::CONVENTION_SUFFIX),
            origin: TypeNameOrigin::Convention,
        }
    }

    pub fn local_name(&self) -> &str {
        strip_prefix(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExtractionMode {
    /// Field names only.
    #[default]
    Simple,
    /// Field names with their annotation text.
    Documented,
}

/// Why Documented mode produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    Transport(String),
    Parse(String),
    TypeNotFound { type_name: String },
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Transport(reason) => write!(f, "transport failure: {}", reason),
            Unavailable::Parse(reason) => write!(f, "unparseable schema: {}", reason),
            Unavailable::TypeNotFound { type_name } => {
                write!(f, "complexType '{}' not found", type_name)
            }
        }
    }
}

/// Outcome of Documented mode. Failures are values here, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Documentation {
    Resolved(FieldDocs),
    Unavailable(Unavailable),
}

impl Documentation {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Documentation::Resolved(_))
    }

    pub fn reason(&self) -> Option<&Unavailable> {
        match self {
            Documentation::Resolved(_) => None,
            Documentation::Unavailable(reason) => Some(reason),
        }
    }

    /// The mapping, or an empty one when nothing could be resolved.
    pub fn into_fields(self) -> FieldDocs {
        match self {
            Documentation::Resolved(fields) => fields,
            Documentation::Unavailable(_) => FieldDocs::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerReport {
    pub layer: LayerRef,
    pub mode: ExtractionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<FieldDocs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    pub endpoint: String,
    pub harvested_at: DateTime<Utc>,
    pub layers: Vec<LayerReport>,
}

impl HarvestReport {
    pub fn failed_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.error.is_some()).count()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_last_prefix() {
        assert_eq!(LayerRef::new("app:Parks").unwrap().local_name(), "Parks");
        assert_eq!(LayerRef::new("Parks").unwrap().local_name(), "Parks");
        assert_eq!(LayerRef::new("a:b:Parks").unwrap().local_name(), "Parks");
        assert_eq!(strip_prefix("app:"), "");
    }

    #[test]
    fn test_empty_layer_is_rejected() {
        assert!(LayerRef::new("").is_err());
        assert!(LayerRef::new("   ").is_err());
    }

    #[test]
    fn test_convention_type_name() {
        let type_name = TypeName::by_convention("Parks");
        assert_eq!(type_name.name, "ParksType");
        assert_eq!(type_name.origin, TypeNameOrigin::Convention);
        assert_eq!(TypeName::declared("app:ParksType").local_name(), "ParksType");
    }

    #[test]
    fn test_unavailable_documentation_is_empty_mapping() {
        let docs = Documentation::Unavailable(Unavailable::TypeNotFound {
            type_name: "ParksType".to_string(),
        });
        assert!(!docs.is_resolved());
        assert!(docs.into_fields().is_empty());
    }

    #[test]
    fn test_report_to_json() {
        let mut documentation = FieldDocs::new();
        documentation.insert("name".to_string(), "Official name".to_string());
        documentation.insert("depth".to_string(), String::new());
        let report = HarvestReport {
            endpoint: "https://example.org/wfs".to_string(),
            harvested_at: Utc::now(),
            layers: vec![LayerReport {
                layer: LayerRef::new("app:Lakes").unwrap(),
                mode: ExtractionMode::Documented,
                fields: None,
                documentation: Some(documentation),
                error: None,
            }],
        };

        let compact = report.to_json(false).unwrap();
        assert!(!compact.contains('\n'));
        // 保留欄位宣告順序
        assert!(compact.contains(r#""documentation":{"name":"Official name","depth":""}"#));

        let pretty = report.to_json(true).unwrap();
        let parsed: HarvestReport = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed.layers[0].layer.qualified(), "app:Lakes");
        assert_eq!(parsed.failed_layers(), 0);
    }

    #[test]
    fn test_layer_report_serialization_skips_absent_parts() {
        let report = LayerReport {
            layer: LayerRef::new("app:Parks").unwrap(),
            mode: ExtractionMode::Simple,
            fields: Some(vec!["id".to_string()]),
            documentation: None,
            error: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"layer": "app:Parks", "mode": "simple", "fields": ["id"]})
        );
    }
}
