use crate::domain::model::LayerRef;
use crate::domain::ports::SchemaSource;
use crate::normalize::html::html_to_text;
use crate::utils::error::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

pub const WFS_VERSION: &str = "2.0.0";

/// Appends the DescribeFeatureType parameters to `endpoint`, keeping any
/// query parameters it already carries.
pub fn describe_feature_type_url(endpoint: &str, layer: &LayerRef) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("SERVICE", "WFS")
        .append_pair("REQUEST", "DescribeFeatureType")
        .append_pair("VERSION", WFS_VERSION)
        .append_pair("TYPENAME", layer.qualified());
    Ok(url)
}

/// Fetches schema documents over HTTP. One GET per call, no retry.
#[derive(Debug, Clone, Default)]
pub struct SchemaFetcher {
    client: Client,
}

impl SchemaFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Timeouts and proxies are configured on the client by the caller.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SchemaSource for SchemaFetcher {
    async fn fetch_schema(&self, endpoint: &str, layer: &LayerRef) -> Result<String> {
        let url = describe_feature_type_url(endpoint, layer)?;
        tracing::debug!("DescribeFeatureType URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("DescribeFeatureType response status: {}", status);

        if !status.is_success() {
            return Err(HarvestError::TransportError {
                layer: layer.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Downloads a technical description page and renders it as markdown.
///
/// Returns `None` on any failure or when the response is not HTML; the
/// reason is logged together with `identifier`.
pub async fn fetch_html_as_markdown(client: &Client, url: &str, identifier: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Request error occurred: {}. ID:{}", e, identifier);
            return None;
        }
    };

    let response = match response.error_for_status() {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("HTTP error occurred: {}. ID:{}", e, identifier);
            return None;
        }
    };

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Could not read response body: {}. ID:{}", e, identifier);
            return None;
        }
    };

    let markdown = html_to_text(&body, &content_type);
    if markdown.is_none() {
        tracing::warn!(
            "URL did not return HTML. Content-Type is '{}'. ID:{}",
            content_type,
            identifier
        );
    }
    markdown
}
