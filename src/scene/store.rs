//! Ordered shape storage, lookup and id allocation

use std::fmt;
use std::path::Path;

use thiserror::Error;

use super::types::{Shape, ShapeId};

/// Errors that can occur when loading or saving a scene snapshot
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// All shapes of one diagram, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    shapes: Vec<Shape>,
    next_suffix: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an existing shape list
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            next_suffix: 0,
        }
    }

    /// Load a scene from a JSON array of shapes
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let shapes: Vec<Shape> = serde_json::from_str(json)?;
        Ok(Self::from_shapes(shapes))
    }

    /// Load a scene from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize the shape list as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self.shapes)?)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve an optional reference to a layer, ignoring `exclude`
    pub fn resolve_layer(&self, id: Option<&ShapeId>, exclude: Option<&ShapeId>) -> Option<&Shape> {
        let id = id?;
        if Some(id) == exclude {
            return None;
        }
        self.get(id).filter(|s| s.is_layer())
    }

    /// Layers in insertion order, skipping `exclude`
    pub fn layers<'a>(&'a self, exclude: Option<&'a ShapeId>) -> impl Iterator<Item = &'a Shape> + 'a {
        self.shapes
            .iter()
            .filter(move |s| s.is_layer() && Some(&s.id) != exclude)
    }

    /// The most recently added layer, skipping `exclude`
    pub fn latest_layer<'a>(&'a self, exclude: Option<&'a ShapeId>) -> Option<&'a Shape> {
        self.layers(exclude).last()
    }

    /// Whether following `relative_to` links from `start` reaches `target`.
    ///
    /// `start` itself counts. Stops on dangling ids and on loops already
    /// present in a loaded snapshot.
    pub fn chain_contains(&self, start: &ShapeId, target: &ShapeId) -> bool {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if id == target {
                return true;
            }
            steps += 1;
            if steps > self.shapes.len() {
                return false;
            }
            current = self.get(id).and_then(|s| s.relative_to.as_ref());
        }
        false
    }

    pub(crate) fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Splice a shape out of the list
    pub(crate) fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| &s.id == id)?;
        Some(self.shapes.remove(index))
    }

    /// Allocate a fresh `<template>-<n>` id not used by any shape
    pub(crate) fn mint_id(&mut self, template: &str) -> ShapeId {
        loop {
            self.next_suffix += 1;
            let candidate = ShapeId(format!("{}-{}", template, self.next_suffix));
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }
}

/// One line per shape: `<id> <kind> <template> rel=<id|-> pos=<code|->`,
/// followed by the display name and decorators when present
impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shape in &self.shapes {
            let rel = shape
                .relative_to
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let pos = shape
                .position
                .map(|p| p.code())
                .unwrap_or_else(|| "-".to_string());
            write!(
                f,
                "{} {} {} rel={} pos={}",
                shape.id, shape.kind, shape.shape_template, rel, pos
            )?;
            if let Some(name) = shape.display_name() {
                write!(f, " name={:?}", name)?;
            }
            if !shape.attached_decorators.is_empty() {
                let names: Vec<&str> = shape
                    .attached_decorators
                    .iter()
                    .map(|d| d.decorator_name.as_str())
                    .collect();
                write!(f, " decorators=[{}]", names.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
