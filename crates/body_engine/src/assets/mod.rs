//! Model assets and the cache that resolves them by name
//!
//! A model asset is shared and immutable. Every body that shows it gets its
//! own [`ModelInstance`], which owns any per-body state such as animation
//! progress and is the source of the body's collision mesh.

pub mod model;
pub mod mesh_model;

pub use model::{ModelAsset, ModelInstance};
pub use mesh_model::{Animation, MeshModel, MeshModelInstance};

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Model lookup errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// No asset is registered under this name
    #[error("Model not found: {0}")]
    NotFound(String),
}

/// Name-indexed registry of model assets
#[derive(Debug, Default)]
pub struct ModelCache {
    models: HashMap<String, Arc<dyn ModelAsset>>,
}

impl ModelCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset under its own name, replacing any previous one
    pub fn insert(&mut self, model: Arc<dyn ModelAsset>) {
        let name = model.name().to_string();
        if self.models.insert(name.clone(), model).is_some() {
            log::info!("Replaced model '{}' in cache", name);
        }
    }

    /// Resolve a model by name
    pub fn find_model(&self, name: &str) -> Result<Arc<dyn ModelAsset>, ModelError> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }

    /// True if a model is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if no models are registered
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_registered_model() {
        let mut cache = ModelCache::new();
        cache.insert(Arc::new(MeshModel::cube("crate", 1.0)));

        let model = cache.find_model("crate").unwrap();
        assert_eq!(model.name(), "crate");
        assert!(cache.contains("crate"));
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let cache = ModelCache::new();
        match cache.find_model("missing") {
            Err(ModelError::NotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
