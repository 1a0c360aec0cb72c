use crate::core::resolver;
use crate::domain::model::{
    Documentation, ExtractionMode, HarvestReport, LayerRef, LayerReport, Unavailable,
};
use crate::domain::ports::SchemaSource;
use crate::utils::error::{HarvestError, Result};

/// Fetch + resolve for one service endpoint.
pub struct AttributeHarvester<S: SchemaSource> {
    source: S,
}

impl<S: SchemaSource> AttributeHarvester<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Field names of `layer`. Transport and parse failures propagate.
    pub async fn list_field_names(&self, endpoint: &str, layer: &LayerRef) -> Result<Vec<String>> {
        let doc = self.source.fetch_schema(endpoint, layer).await?;
        resolver::list_field_names(&doc, layer)
    }

    /// Field documentation of `layer`. Every failure is folded into
    /// [`Documentation::Unavailable`].
    pub async fn field_documentation(&self, endpoint: &str, layer: &LayerRef) -> Documentation {
        match self.source.fetch_schema(endpoint, layer).await {
            Ok(doc) => resolver::field_documentation(&doc, layer),
            Err(e) => {
                tracing::warn!("Property descriptions could not be fetched for layer {}: {}", layer, e);
                Documentation::Unavailable(match e {
                    HarvestError::ParseError(inner) => Unavailable::Parse(inner.to_string()),
                    other => Unavailable::Transport(other.to_string()),
                })
            }
        }
    }

    /// Runs every layer in order; a failing layer is recorded and skipped.
    pub async fn harvest(
        &self,
        endpoint: &str,
        layers: &[LayerRef],
        mode: ExtractionMode,
    ) -> HarvestReport {
        tracing::info!("🚀 Harvesting {} layer(s) from {}", layers.len(), endpoint);
        let mut reports = Vec::with_capacity(layers.len());

        for layer in layers {
            let report = match mode {
                ExtractionMode::Simple => match self.list_field_names(endpoint, layer).await {
                    Ok(fields) => {
                        tracing::debug!("Layer {}: {} field(s)", layer, fields.len());
                        LayerReport {
                            layer: layer.clone(),
                            mode,
                            fields: Some(fields),
                            documentation: None,
                            error: None,
                        }
                    }
                    Err(e) => {
                        tracing::error!("❌ Layer {} skipped: {}", layer, e);
                        LayerReport {
                            layer: layer.clone(),
                            mode,
                            fields: None,
                            documentation: None,
                            error: Some(e.to_string()),
                        }
                    }
                },
                ExtractionMode::Documented => {
                    let docs = self.field_documentation(endpoint, layer).await;
                    // 找不到型別只是沒有說明，不算失敗
                    let error = match docs.reason() {
                        Some(reason @ (Unavailable::Transport(_) | Unavailable::Parse(_))) => {
                            tracing::error!("❌ Layer {} skipped: {}", layer, reason);
                            Some(reason.to_string())
                        }
                        Some(Unavailable::TypeNotFound { type_name }) => {
                            tracing::warn!(
                                "Layer {}: complexType '{}' not found, no descriptions",
                                layer,
                                type_name
                            );
                            None
                        }
                        None => None,
                    };
                    LayerReport {
                        layer: layer.clone(),
                        mode,
                        fields: None,
                        documentation: Some(docs.into_fields()),
                        error,
                    }
                }
            };
            reports.push(report);
        }

        let report = HarvestReport {
            endpoint: endpoint.to_string(),
            harvested_at: chrono::Utc::now(),
            layers: reports,
        };
        tracing::info!(
            "✅ Harvest finished: {} layer(s), {} failed",
            report.layers.len(),
            report.failed_layers()
        );
        report
    }
}
