use crate::domain::model::LayerRef;
use crate::domain::ports::SchemaSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type CacheKey = (String, String);

/// Memoizes successful schema fetches per `(endpoint, layer)`.
///
/// The service gives no freshness signal, so entries live until
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear) is called.
pub struct CachedSchemaSource<S: SchemaSource> {
    inner: S,
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl<S: SchemaSource> CachedSchemaSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(endpoint: &str, layer: &LayerRef) -> CacheKey {
        (endpoint.to_string(), layer.qualified().to_string())
    }

    /// 鎖被毒化時沿用內部資料；快取內容只是 HTTP 回應的副本
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Schema cache lock was poisoned, recovering entries");
            poisoned.into_inner()
        })
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn invalidate(&self, endpoint: &str, layer: &LayerRef) -> bool {
        self.entries().remove(&Self::key(endpoint, layer)).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<S: SchemaSource> SchemaSource for CachedSchemaSource<S> {
    async fn fetch_schema(&self, endpoint: &str, layer: &LayerRef) -> Result<String> {
        let key = Self::key(endpoint, layer);
        if let Some(doc) = self.lookup(&key) {
            tracing::debug!("Schema cache hit for {} @ {}", layer, endpoint);
            return Ok(doc);
        }

        // 鎖不跨 await；失敗的回應不快取
        let doc = self.inner.fetch_schema(endpoint, layer).await?;
        self.entries().insert(key, doc.clone());
        Ok(doc)
    }
}
