use crate::domain::model::{ExtractionMode, LayerRef};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything that can hand back a raw DescribeFeatureType document.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_schema(&self, endpoint: &str, layer: &LayerRef) -> Result<String>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn layers(&self) -> &[String];
    fn mode(&self) -> ExtractionMode;
    fn output_path(&self) -> Option<&str>;
}
