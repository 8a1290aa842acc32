//! Configuration for a diagram engine

use crate::catalog::Catalog;

/// Configuration options for a [`Diagram`](crate::Diagram)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Layer ladder and shape library
    pub catalog: Catalog,

    /// Display name given to layers created for a component that had none
    pub default_layer_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            default_layer_name: "Layer".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the name for synthesized layers
    pub fn with_default_layer_name(mut self, name: impl Into<String>) -> Self {
        self.default_layer_name = name.into();
        self
    }
}
