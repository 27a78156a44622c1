//! Per-session asset registry
//!
//! Maps asset ids to their descriptor and load handle. Entries are added
//! during initialisation and never removed; at most one load is issued per id.

use crate::{
    AssetDescriptor, AssetError, AssetId, LoadError, LoadHandle, Renderable, RenderableLoader,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Descriptor plus the handle of its load.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    descriptor: AssetDescriptor,
    handle: LoadHandle<Renderable>,
}

impl RegistryEntry {
    pub fn id(&self) -> &AssetId {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> &LoadHandle<Renderable> {
        &self.handle
    }
}

pub struct AssetRegistry {
    loader: Arc<dyn RenderableLoader>,
    load_timeout: Duration,
    entries: BTreeMap<AssetId, RegistryEntry>,
}

impl AssetRegistry {
    pub fn new(loader: Arc<dyn RenderableLoader>, load_timeout: Duration) -> Self {
        Self {
            loader,
            load_timeout,
            entries: BTreeMap::new(),
        }
    }

    /// Start loading `descriptor` and return its pending handle.
    ///
    /// The load runs on the current tokio runtime and fails with
    /// [`LoadError::TimedOut`] if it takes longer than the registry's timeout.
    /// An id that is already registered returns its existing handle.
    pub fn load(&mut self, descriptor: AssetDescriptor) -> LoadHandle<Renderable> {
        if let Some(entry) = self.entries.get(&descriptor.id) {
            tracing::debug!(asset = %descriptor.id, "asset already registered");
            return entry.handle.clone();
        }

        let (completer, handle) = LoadHandle::pending();
        let loader = Arc::clone(&self.loader);
        let timeout = self.load_timeout;
        let id = descriptor.id.clone();
        let source = descriptor.source.clone();

        tracing::debug!(asset = %id, %source, "issuing load");
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, loader.load(&source)).await {
                Ok(result) => result,
                Err(_) => Err(LoadError::TimedOut(timeout)),
            };
            match &result {
                Ok(renderable) => {
                    tracing::debug!(asset = %id, bytes = renderable.len(), "load finished")
                }
                Err(err) => tracing::debug!(asset = %id, error = %err, "load failed"),
            }
            completer.complete(result);
        });

        self.insert(descriptor, handle)
    }

    /// Register a descriptor with a handle produced elsewhere.
    ///
    /// Same idempotence as [`AssetRegistry::load`]: an existing entry wins.
    pub fn register(
        &mut self,
        descriptor: AssetDescriptor,
        handle: LoadHandle<Renderable>,
    ) -> LoadHandle<Renderable> {
        if let Some(entry) = self.entries.get(&descriptor.id) {
            tracing::debug!(asset = %descriptor.id, "asset already registered");
            return entry.handle.clone();
        }
        self.insert(descriptor, handle)
    }

    fn insert(
        &mut self,
        descriptor: AssetDescriptor,
        handle: LoadHandle<Renderable>,
    ) -> LoadHandle<Renderable> {
        let id = descriptor.id.clone();
        self.entries.insert(
            id,
            RegistryEntry {
                descriptor,
                handle: handle.clone(),
            },
        );
        handle
    }

    pub fn get(&self, id: &AssetId) -> Result<&RegistryEntry, AssetError> {
        self.entries
            .get(id)
            .ok_or_else(|| AssetError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.contains_key(id)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
