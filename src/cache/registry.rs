//! Cache Registry Module
//!
//! Owns the cache instances of an application, one per namespace.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{normalize_namespace, Backend, CacheInstance, Keeper, MemoryStore};
use crate::config::CacheOptions;

// == Cache Registry ==
/// Hands out a single shared instance per namespace, so each namespace has
/// exactly one tag state and one sync task.
#[derive(Debug)]
pub struct CacheRegistry {
    instances: RwLock<HashMap<String, Arc<CacheInstance>>>,
    /// Backend for instances acquired without one
    default_backend: Arc<MemoryStore>,
    /// Options for instances acquired through `namespace`
    default_options: CacheOptions,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::default()), CacheOptions::default())
    }

    pub fn with_memory_store(
        default_backend: Arc<MemoryStore>,
        default_options: CacheOptions,
    ) -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            default_backend,
            default_options,
        }
    }

    // == Acquire ==
    /// Returns the instance registered for `namespace`, creating it first if
    /// needed.
    ///
    /// The namespace is trimmed and lowercased. When an instance already
    /// exists, the other arguments are ignored. Without a backend the
    /// registry's shared in-memory store is used.
    pub async fn acquire(
        &self,
        namespace: &str,
        backend: Option<Arc<dyn Backend>>,
        keeper: Option<Arc<dyn Keeper>>,
        options: CacheOptions,
    ) -> Arc<CacheInstance> {
        let name = normalize_namespace(namespace);
        if let Some(instance) = self.instances.read().await.get(&name) {
            return instance.clone();
        }

        let mut instances = self.instances.write().await;
        if let Some(instance) = instances.get(&name) {
            // created by a concurrent caller between the two locks
            return instance.clone();
        }

        let backend: Arc<dyn Backend> = match backend {
            Some(backend) => backend,
            None => self.default_backend.clone(),
        };
        let instance = Arc::new(CacheInstance::new(&name, backend, keeper, options));
        instances.insert(name.clone(), instance.clone());
        debug!("Registered cache namespace '{}'", name);
        instance
    }

    /// Acquires `namespace` on the default backend, without a keeper.
    pub async fn namespace(&self, namespace: &str) -> Arc<CacheInstance> {
        self.acquire(namespace, None, None, self.default_options).await
    }

    /// Instance for `namespace`, if one was acquired.
    pub async fn get(&self, namespace: &str) -> Option<Arc<CacheInstance>> {
        self.instances
            .read()
            .await
            .get(&normalize_namespace(namespace))
            .cloned()
    }

    // == Dispose ==
    /// Unregisters `namespace` and shuts its instance down.
    ///
    /// Returns whether the namespace was registered.
    pub async fn dispose(&self, namespace: &str) -> bool {
        let removed = self
            .instances
            .write()
            .await
            .remove(&normalize_namespace(namespace));

        match removed {
            Some(instance) => {
                instance.shutdown().await;
                true
            }
            None => false,
        }
    }

    /// Shuts every registered instance down and empties the registry.
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<CacheInstance>> =
            self.instances.write().await.drain().map(|(_, instance)| instance).collect();

        info!("Shutting down {} cache namespaces", drained.len());
        for instance in drained {
            instance.shutdown().await;
        }
    }

    /// Registered namespace names, sorted.
    pub async fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn memory_store(&self) -> &Arc<MemoryStore> {
        &self.default_backend
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
