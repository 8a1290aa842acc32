//! The mutation surface of a diagram
//!
//! [`Diagram`] owns a scene and applies add/move/remove/rename and
//! decorator operations to it. Structural operations go through
//! [`validate`](crate::placement::validate) first and then apply the
//! corrected placement, including any synthesized layer or grid resize.
//!
//! An operation either fails with a [`DiagramError`] and leaves the scene
//! untouched, or applies in full. Operations on ids that do not exist are
//! no-ops.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::DiagramError;
use crate::placement::{validate, Anchor, Placement, PlacementRequest};
use crate::position::Slot;
use crate::scene::{Decorator, DisplayMetadata, Scene, SceneError, Shape, ShapeId, ShapeKind};

/// Metadata key mirroring a component's display name
pub const SERVICE_NAME_KEY: &str = "serviceName";

/// Parameters for [`Diagram::add_shape`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewShape {
    pub template: String,
    pub kind: ShapeKind,
    pub relative_to: Option<ShapeId>,
    pub display_name: Option<String>,
    /// Slot code, unparsed
    pub position: Option<String>,
    /// Decorator names, attached to the top face in order
    pub decorators: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Store the request as given instead of validating it
    pub skip_auto_placement: bool,
}

impl NewShape {
    pub fn new(template: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            template: template.into(),
            kind,
            relative_to: None,
            display_name: None,
            position: None,
            decorators: Vec::new(),
            metadata: BTreeMap::new(),
            skip_auto_placement: false,
        }
    }

    pub fn layer(template: impl Into<String>) -> Self {
        Self::new(template, ShapeKind::Layer)
    }

    pub fn component(template: impl Into<String>) -> Self {
        Self::new(template, ShapeKind::Component)
    }

    pub fn relative_to(mut self, id: impl Into<ShapeId>) -> Self {
        self.relative_to = Some(id.into());
        self
    }

    pub fn at(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_decorator(mut self, name: impl Into<String>) -> Self {
        self.decorators.push(name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn skip_auto_placement(mut self) -> Self {
        self.skip_auto_placement = true;
        self
    }
}

/// One editable diagram: a scene plus the configuration used to place shapes
#[derive(Debug, Clone)]
pub struct Diagram {
    scene: Scene,
    config: EngineConfig,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Diagram {
    /// Create an empty diagram
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scene: Scene::new(),
            config,
        }
    }

    /// Create a diagram from a copy of `shapes`; the caller's list is not
    /// touched by later edits
    pub fn from_shapes(shapes: &[Shape], config: EngineConfig) -> Self {
        Self {
            scene: Scene::from_shapes(shapes.to_vec()),
            config,
        }
    }

    /// Create a diagram from a serialized shape list
    pub fn from_json(json: &str, config: EngineConfig) -> Result<Self, SceneError> {
        Ok(Self {
            scene: Scene::from_json(json)?,
            config,
        })
    }

    pub fn with_scene(scene: Scene, config: EngineConfig) -> Self {
        Self { scene, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Every shape in insertion order
    pub fn get_all(&self) -> &[Shape] {
        self.scene.shapes()
    }

    pub fn get_by_id(&self, id: &ShapeId) -> Option<&Shape> {
        self.scene.get(id)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        self.scene.to_json()
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.scene.into_shapes()
    }

    /// Add a shape and return it
    pub fn add_shape(&mut self, new: NewShape) -> Result<&Shape, DiagramError> {
        let (relative_to, position) = if new.skip_auto_placement {
            self.unchecked_placement(&new)
        } else {
            let request = PlacementRequest::new(new.kind)
                .relative_to(new.relative_to.clone())
                .at(new.position.clone());
            let placement = validate(&self.scene, &self.config.catalog, &request)?;
            self.apply_placement(placement)
        };

        let id = self.scene.mint_id(&new.template);
        let source = self.config.catalog.shapes.source_kind(&new.template);
        let shape = Shape {
            id,
            shape_template: new.template,
            kind: new.kind,
            position,
            relative_to,
            attached_decorators: new.decorators.into_iter().map(Decorator::on_top).collect(),
            metadata: DisplayMetadata {
                name: new.display_name,
                label_position: None,
                extra: new.metadata,
            },
            source,
        };
        debug!(
            id = %shape.id,
            relative_to = ?shape.relative_to,
            position = ?shape.position,
            "adding shape"
        );

        let index = self.scene.len();
        self.scene.push(shape);
        Ok(&self.scene.shapes()[index])
    }

    /// The request as given, minus anything that cannot be stored: an
    /// unparseable position or a reference to no shape
    fn unchecked_placement(&self, new: &NewShape) -> (Option<ShapeId>, Option<Slot>) {
        let relative_to = new
            .relative_to
            .clone()
            .filter(|id| self.scene.contains(id));
        let position = new
            .position
            .as_deref()
            .and_then(|code| Slot::parse(code).ok());
        (relative_to, position)
    }

    /// Carry out the side effects of a placement and return the final
    /// reference and slot
    fn apply_placement(&mut self, placement: Placement) -> (Option<ShapeId>, Option<Slot>) {
        if let Some(resize) = placement.resize {
            info!(
                layer = %resize.layer,
                from = %resize.from,
                to = %resize.to.name,
                occupants = resize.moves.len(),
                "resizing full layer"
            );
            if let Some(layer) = self.scene.get_mut(&resize.layer) {
                layer.shape_template = resize.to.name.clone();
            }
            for (id, cell) in resize.moves {
                if let Some(shape) = self.scene.get_mut(&id) {
                    shape.position = Some(Slot::Cell(cell));
                }
            }
        }

        let relative_to = match placement.anchor {
            Anchor::Root => None,
            Anchor::Shape(id) => Some(id),
            Anchor::NewLayer(template) => {
                let id = self.scene.mint_id(&template.name);
                info!(layer = %id, template = %template.name, "creating default layer");
                let source = self.config.catalog.shapes.source_kind(&template.name);
                self.scene.push(Shape {
                    id: id.clone(),
                    shape_template: template.name,
                    kind: ShapeKind::Layer,
                    position: Some(Slot::Top),
                    relative_to: None,
                    attached_decorators: Vec::new(),
                    metadata: DisplayMetadata {
                        name: Some(self.config.default_layer_name.clone()),
                        ..Default::default()
                    },
                    source,
                });
                Some(id)
            }
        };

        (relative_to, placement.position)
    }

    /// Attach a decorator to the top face of `parent`
    pub fn add_decorator(&mut self, parent: &ShapeId, name: &str) -> Result<&Shape, DiagramError> {
        let shape = self
            .scene
            .get_mut(parent)
            .ok_or_else(|| DiagramError::target_not_found(parent.as_str()))?;
        shape.attached_decorators.push(Decorator::on_top(name));
        Ok(&*shape)
    }

    /// Move a shape to a new reference and position, re-validated with the
    /// shape's own kind. Returns `None` when `id` does not exist.
    pub fn move_shape(
        &mut self,
        id: &ShapeId,
        relative_to: Option<ShapeId>,
        position: Option<&str>,
    ) -> Result<Option<&Shape>, DiagramError> {
        let Some(kind) = self.scene.get(id).map(|s| s.kind) else {
            debug!(%id, "move of unknown shape ignored");
            return Ok(None);
        };

        let request = PlacementRequest::new(kind)
            .relative_to(relative_to)
            .at(position.map(str::to_string))
            .moving(id.clone());
        let placement = validate(&self.scene, &self.config.catalog, &request)?;
        let (relative_to, position) = self.apply_placement(placement);

        Ok(self.scene.get_mut(id).map(|shape| {
            shape.relative_to = relative_to;
            shape.position = position;
            &*shape
        }))
    }

    /// Remove a shape; `None` when `id` does not exist
    pub fn remove_shape(&mut self, id: &ShapeId) -> Option<Shape> {
        let removed = self.scene.remove(id);
        if removed.is_none() {
            debug!(%id, "remove of unknown shape ignored");
        }
        removed
    }

    /// Detach the first decorator called `name` from `parent`
    pub fn remove_decorator(&mut self, parent: &ShapeId, name: &str) -> Option<Decorator> {
        let shape = self.scene.get_mut(parent)?;
        let index = shape
            .attached_decorators
            .iter()
            .position(|d| d.decorator_name == name)?;
        Some(shape.attached_decorators.remove(index))
    }

    /// Move a decorator from one shape to another.
    ///
    /// Returns `None` when `from` has no such decorator, whatever `to` is.
    /// Otherwise fails with `TargetNotFound` before touching anything when
    /// `to` does not exist.
    pub fn move_decorator(
        &mut self,
        from: &ShapeId,
        name: &str,
        to: &ShapeId,
    ) -> Result<Option<&Shape>, DiagramError> {
        let has_decorator = self.scene.get(from).is_some_and(|s| s.has_decorator(name));
        if !has_decorator {
            return Ok(None);
        }
        if !self.scene.contains(to) {
            return Err(DiagramError::target_not_found(to.as_str()));
        }
        self.remove_decorator(from, name);
        self.add_decorator(to, name).map(Some)
    }

    /// Set a shape's display name; `None` when `id` does not exist
    pub fn rename(&mut self, id: &ShapeId, name: &str) -> Option<&Shape> {
        let shape = self.scene.get_mut(id)?;
        shape.metadata.name = Some(name.to_string());
        if shape.is_layer() {
            shape.metadata.label_position.get_or_insert(Slot::FrontLeft);
        } else {
            shape
                .metadata
                .extra
                .insert(SERVICE_NAME_KEY.to_string(), serde_json::Value::from(name));
        }
        Some(&*shape)
    }
}
