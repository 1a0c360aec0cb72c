use crate::utils::error::{HarvestError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Service base URL: absolute http(s), with a host, and without the
/// request parameters added per DescribeFeatureType call.
pub fn validate_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    let invalid = |reason: String| HarvestError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: endpoint.to_string(),
        reason,
    };

    if endpoint.trim().is_empty() {
        return Err(invalid("WFS endpoint cannot be empty".to_string()));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| invalid(format!("WFS endpoint is not an absolute URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "Unsupported scheme '{}' for a WFS endpoint, expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid("WFS endpoint has no host".to_string()));
    }

    // 每次請求都會附加這些參數，重複會讓伺服器無所適從
    if let Some((key, _)) = url.query_pairs().find(|(key, _)| {
        ["REQUEST", "TYPENAME", "TYPENAMES"]
            .iter()
            .any(|reserved| key.eq_ignore_ascii_case(reserved))
    }) {
        return Err(invalid(format!(
            "Remove the '{}' parameter, it is added to every DescribeFeatureType request",
            key
        )));
    }

    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(HarvestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(HarvestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HarvestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(HarvestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 圖層清單不可為空，且每個名稱都要有內容
pub fn validate_layers(field_name: &str, layers: &[String]) -> Result<()> {
    if layers.is_empty() {
        return Err(HarvestError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    for layer in layers {
        validate_non_empty_string(field_name, layer)?;
    }
    Ok(())
}
