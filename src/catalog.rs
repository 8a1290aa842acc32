//! Layer template ladder and shape library
//!
//! The catalog is read-only configuration handed to a diagram at
//! construction. It can be loaded from TOML; the built-in ladder is
//! `2x2 (4) -> 4x2 (8) -> 3x3 (9) -> 4x3 (12) -> 4x8 (32)`, where a
//! template named `layer<R>x<C>` has `R` rows and `C` columns.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::position::MAX_COLUMNS;
use crate::scene::SourceKind;

/// Errors that can occur when loading or validating a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("catalog defines no layer templates")]
    Empty,
    #[error("layer template '{name}' has invalid dimensions {columns}x{rows}")]
    InvalidDimensions { name: String, columns: u8, rows: u8 },
    #[error("duplicate layer template '{name}'")]
    Duplicate { name: String },
}

/// Grid dimensions for one layer template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerTemplate {
    pub name: String,
    pub columns: u8,
    pub rows: u8,
}

impl LayerTemplate {
    pub fn new(name: impl Into<String>, columns: u8, rows: u8) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Number of grid cells
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Layer templates ordered by ascending capacity
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    templates: Vec<LayerTemplate>,
}

impl LayerCatalog {
    /// Build a ladder from templates in any order.
    ///
    /// Templates of equal capacity keep their given order.
    pub fn new(mut templates: Vec<LayerTemplate>) -> Result<Self, CatalogError> {
        check_templates(&templates)?;
        templates.sort_by_key(LayerTemplate::capacity);
        Ok(Self { templates })
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Option<&LayerTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// The smallest template, used for synthesized layers
    pub fn smallest(&self) -> &LayerTemplate {
        &self.templates[0]
    }

    /// The largest template on the ladder
    pub fn largest(&self) -> &LayerTemplate {
        &self.templates[self.templates.len() - 1]
    }

    /// Smallest template holding at least `count` shapes, or the largest
    /// template when nothing is big enough
    pub fn pick_template_for(&self, count: usize) -> &LayerTemplate {
        self.templates
            .iter()
            .find(|t| t.capacity() >= count)
            .unwrap_or_else(|| self.largest())
    }

    /// First template with strictly more capacity than `current`
    pub fn next_larger(&self, current: &LayerTemplate) -> Option<&LayerTemplate> {
        self.templates
            .iter()
            .find(|t| t.capacity() > current.capacity())
    }

    pub fn templates(&self) -> impl Iterator<Item = &LayerTemplate> {
        self.templates.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

fn check_templates(templates: &[LayerTemplate]) -> Result<(), CatalogError> {
    if templates.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    for template in templates {
        if template.columns == 0 || template.rows == 0 || template.columns > MAX_COLUMNS {
            return Err(CatalogError::InvalidDimensions {
                name: template.name.clone(),
                columns: template.columns,
                rows: template.rows,
            });
        }
        if !seen.insert(template.name.as_str()) {
            return Err(CatalogError::Duplicate {
                name: template.name.clone(),
            });
        }
    }
    Ok(())
}

/// Which shape templates are primitives rather than library components
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShapeLibrary {
    #[serde(default)]
    primitives: BTreeSet<String>,
}

impl ShapeLibrary {
    pub fn new<I, S>(primitives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primitives: primitives.into_iter().map(Into::into).collect(),
        }
    }

    /// Where a shape built from `template` originates
    pub fn source_kind(&self, template: &str) -> SourceKind {
        if self.primitives.contains(template) {
            SourceKind::Primitive
        } else {
            SourceKind::Component
        }
    }
}

/// Read-only layer and shape configuration
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Optional name for the catalog
    pub name: Option<String>,
    pub layers: LayerCatalog,
    pub shapes: ShapeLibrary,
}

/// TOML structure for deserializing catalogs
#[derive(Deserialize)]
struct TomlCatalog {
    metadata: Option<TomlMetadata>,
    layers: Vec<LayerTemplate>,
    #[serde(default)]
    shapes: ShapeLibrary,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

const DEFAULT_CATALOG: &str = r#"
[metadata]
name = "isometric"

[[layers]]
name = "layer2x2"
columns = 2
rows = 2

[[layers]]
name = "layer4x2"
columns = 2
rows = 4

[[layers]]
name = "layer3x3"
columns = 3
rows = 3

[[layers]]
name = "layer4x3"
columns = 3
rows = 4

[[layers]]
name = "layer4x8"
columns = 8
rows = 4

[shapes]
primitives = ["cube", "cuboid", "cylinder", "pyramid", "sphere", "cone"]
"#;

impl Catalog {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;

        Ok(Catalog {
            name: parsed.metadata.and_then(|m| m.name),
            layers: LayerCatalog::new(parsed.layers)?,
            shapes: parsed.shapes,
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_str(DEFAULT_CATALOG).expect("Default catalog should be valid TOML")
    }
}
