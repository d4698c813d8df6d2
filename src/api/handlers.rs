//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheRegistry, MemoryStore, GLOBAL_TAG};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, NamespaceStats, SetRequest,
    SetResponse, StatsResponse, TagRemoveRequest, TagRemoveResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Namespaces served by this process
    pub registry: Arc<CacheRegistry>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: CacheRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Every namespace shares one in-memory backend sized from the Config.
    pub fn from_config(config: &Config) -> Self {
        let store = MemoryStore::with_default_ttl(config.max_entries, Some(config.default_ttl));
        Self::new(CacheRegistry::with_memory_store(Arc::new(store), config.cache))
    }
}

/// Handler for PUT /:namespace/set
pub async fn set_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.registry.namespace(&namespace).await;
    cache.set(&req.key, &req.value, req.expire, req.tags).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /:namespace/get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.registry.namespace(&namespace).await;
    let hit = cache
        .get(&key)
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, hit.value, hit.ttl_ms)))
}

/// Handler for DELETE /:namespace/del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.registry.namespace(&namespace).await;
    let scope = cache.unset(&key).await?;

    Ok(Json(DeleteResponse::new(key, scope)))
}

/// Handler for POST /:namespace/tagrm
///
/// An empty or missing body invalidates the whole namespace.
pub async fn tagrm_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    body: Option<Json<TagRemoveRequest>>,
) -> Json<TagRemoveResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let cache = state.registry.namespace(&namespace).await;

    let instant = cache.tagrm(req.tag.as_deref(), req.delay, req.flush).await;
    let tag = req
        .tag
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| GLOBAL_TAG.to_string());

    Json(TagRemoveResponse { tag, instant })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.registry.memory_store().stats().await;

    let mut namespaces = Vec::new();
    for name in state.registry.namespaces().await {
        if let Some(cache) = state.registry.get(&name).await {
            let lookups = cache.stats().await;
            namespaces.push(NamespaceStats {
                namespace: name,
                hit_rate: lookups.hit_rate(),
                lookups,
            });
        }
    }

    Json(StatsResponse::new(store, namespaces))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
