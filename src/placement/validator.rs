//! Request correction for layer and component placement
//!
//! [`validate`] maps a raw request onto the placement the scene will
//! actually receive. It never mutates the scene: layer synthesis and grid
//! resizes are returned as part of the [`Placement`] and applied by the
//! caller. Unusable positions and references are corrected silently; only
//! an ambiguous layer reference, an unknown layer template, a completely
//! full ladder or a layer with no side left to stack on are reported as
//! errors.
//!
//! No placement returned here ever lands on an occupied slot of a layer.
//! Shapes anchored on another component are the one exception, since that
//! attachment bypasses occupancy entirely.

use tracing::debug;

use crate::catalog::{Catalog, LayerTemplate};
use crate::error::DiagramError;
use crate::position::{GridCell, Slot};
use crate::scene::{Scene, Shape, ShapeId, ShapeKind};

use super::occupancy::{grid_occupants, occupancy, OccupancyMap};

/// A raw placement request as received from a caller
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub kind: ShapeKind,
    pub relative_to: Option<ShapeId>,
    /// Slot code, unparsed
    pub position: Option<String>,
    /// The shape being moved, if this is a move; it is invisible to the
    /// occupancy scan and can never become its own anchor
    pub moving: Option<ShapeId>,
}

impl PlacementRequest {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            relative_to: None,
            position: None,
            moving: None,
        }
    }

    pub fn relative_to(mut self, id: Option<ShapeId>) -> Self {
        self.relative_to = id;
        self
    }

    pub fn at(mut self, position: Option<String>) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, id: ShapeId) -> Self {
        self.moving = Some(id);
        self
    }
}

/// What the corrected placement hangs off
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// No reference: the first layer of a scene
    Root,
    /// An existing shape
    Shape(ShapeId),
    /// A default layer that must be created first
    NewLayer(LayerTemplate),
}

/// Growing a full layer to a larger template
#[derive(Debug, Clone, PartialEq)]
pub struct Resize {
    pub layer: ShapeId,
    pub from: String,
    pub to: LayerTemplate,
    /// New cell for every existing grid occupant, in scene order
    pub moves: Vec<(ShapeId, GridCell)>,
}

/// The authoritative placement for a request
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub anchor: Anchor,
    pub position: Option<Slot>,
    pub resize: Option<Resize>,
}

impl Placement {
    fn at(anchor: Anchor, position: Slot) -> Self {
        Self {
            anchor,
            position: Some(position),
            resize: None,
        }
    }

    /// The anchor id, when the anchor already exists
    pub fn anchor_id(&self) -> Option<&ShapeId> {
        match &self.anchor {
            Anchor::Shape(id) => Some(id),
            _ => None,
        }
    }
}

/// Compute the corrected placement for `request` against the whole scene
pub fn validate(
    scene: &Scene,
    catalog: &Catalog,
    request: &PlacementRequest,
) -> Result<Placement, DiagramError> {
    match request.kind {
        ShapeKind::Layer => place_layer(scene, request),
        ShapeKind::Component => place_component(scene, catalog, request),
    }
}

/// Layers a request may anchor to: every layer except the moving shape and
/// anything hanging off it
fn eligible_layers<'a>(scene: &'a Scene, moving: Option<&'a ShapeId>) -> Vec<&'a Shape> {
    scene
        .layers(moving)
        .filter(|layer| match moving {
            Some(m) => !scene.chain_contains(&layer.id, m),
            None => true,
        })
        .collect()
}

fn find_eligible<'a>(eligible: &[&'a Shape], id: Option<&ShapeId>) -> Option<&'a Shape> {
    let id = id?;
    eligible.iter().copied().find(|layer| &layer.id == id)
}

fn parse_position(raw: Option<&str>) -> Option<Slot> {
    let raw = raw?;
    match Slot::parse(raw) {
        Ok(slot) => Some(slot),
        Err(_) => {
            debug!(position = raw, "ignoring unparseable position");
            None
        }
    }
}

fn place_layer(scene: &Scene, request: &PlacementRequest) -> Result<Placement, DiagramError> {
    let moving = request.moving.as_ref();
    let eligible = eligible_layers(scene, moving);

    let requested = match parse_position(request.position.as_deref()) {
        Some(slot) if Slot::LAYER_SLOTS.contains(&slot) => slot,
        other => {
            if other.is_some() {
                debug!(?other, "layer position coerced to top");
            }
            Slot::Top
        }
    };

    let Some(latest) = eligible.last() else {
        if requested != Slot::Top || request.relative_to.is_some() {
            debug!("first layer forced to top with no reference");
        }
        return Ok(Placement::at(Anchor::Root, Slot::Top));
    };

    let (anchor, side) = if requested == Slot::Top {
        debug!(anchor = %latest.id, "top is taken by the first layer, stacking front-left");
        (latest.id.clone(), Slot::FrontLeft)
    } else {
        match find_eligible(&eligible, request.relative_to.as_ref()) {
            Some(layer) => (layer.id.clone(), requested),
            None => {
                debug!(
                    requested = ?request.relative_to,
                    anchor = %latest.id,
                    "layer reference unresolved, using latest layer"
                );
                (latest.id.clone(), requested)
            }
        }
    };

    let (anchor, side) = free_layer_side(scene, &eligible, anchor, side, moving)?;
    Ok(Placement::at(Anchor::Shape(anchor), side))
}

/// Keep a layer off a side slot that is already taken: try the mirrored
/// side, then any free side of the layers from newest to oldest. Fails
/// when every side of every eligible layer is taken.
fn free_layer_side(
    scene: &Scene,
    eligible: &[&Shape],
    anchor: ShapeId,
    side: Slot,
    moving: Option<&ShapeId>,
) -> Result<(ShapeId, Slot), DiagramError> {
    let is_free = |layer: &ShapeId, slot: Slot| !occupancy(scene, layer, moving).contains_key(&slot);

    if is_free(&anchor, side) {
        return Ok((anchor, side));
    }
    if is_free(&anchor, side.opposite()) {
        debug!(anchor = %anchor, "side taken, using the opposite side");
        return Ok((anchor, side.opposite()));
    }
    for layer in eligible.iter().rev() {
        for slot in [Slot::FrontLeft, Slot::FrontRight] {
            if is_free(&layer.id, slot) {
                debug!(anchor = %layer.id, %slot, "both sides taken, moving to a free side");
                return Ok((layer.id.clone(), slot));
            }
        }
    }
    Err(DiagramError::no_free_layer_side(anchor.as_str()))
}

fn place_component(
    scene: &Scene,
    catalog: &Catalog,
    request: &PlacementRequest,
) -> Result<Placement, DiagramError> {
    let moving = request.moving.as_ref();

    // Anchoring on another component bypasses the grid entirely.
    if let Some(target) = request
        .relative_to
        .as_ref()
        .and_then(|id| scene.get(id))
        .filter(|s| !s.is_layer())
        .filter(|s| moving.map_or(true, |m| !scene.chain_contains(&s.id, m)))
    {
        let position = parse_position(request.position.as_deref()).unwrap_or(Slot::FrontLeft);
        return Ok(Placement::at(Anchor::Shape(target.id.clone()), position));
    }

    let eligible = eligible_layers(scene, moving);
    if eligible.is_empty() {
        let template = catalog.layers.smallest().clone();
        debug!(template = %template.name, "no layers yet, synthesizing a default layer");
        return Ok(Placement::at(
            Anchor::NewLayer(template),
            Slot::Cell(GridCell::FIRST),
        ));
    }

    let layer = match find_eligible(&eligible, request.relative_to.as_ref()) {
        Some(layer) => layer,
        None if eligible.len() == 1 => eligible[0],
        None => {
            return Err(DiagramError::ambiguous(
                eligible.iter().map(|l| l.id.to_string()).collect(),
            ))
        }
    };

    let template = catalog
        .layers
        .get(&layer.shape_template)
        .ok_or_else(|| DiagramError::layer_not_found(layer.id.as_str(), &layer.shape_template))?;
    let occupied = occupancy(scene, &layer.id, moving);

    let start = match parse_position(request.position.as_deref()) {
        Some(side) if side.is_side() => {
            if !occupied.contains_key(&side) {
                return Ok(Placement::at(Anchor::Shape(layer.id.clone()), side));
            }
            debug!(%side, "side taken, falling back to the grid");
            GridCell::FIRST
        }
        Some(Slot::Cell(cell)) if cell.is_within_bounds(template.columns, template.rows) => cell,
        _ => GridCell::FIRST,
    };

    if let Some(cell) = scan_grid(start, template, &occupied) {
        return Ok(Placement::at(Anchor::Shape(layer.id.clone()), Slot::Cell(cell)));
    }

    let (resize, cell) = plan_resize(scene, catalog, layer, template, moving)?;
    Ok(Placement {
        anchor: Anchor::Shape(layer.id.clone()),
        position: Some(Slot::Cell(cell)),
        resize: Some(resize),
    })
}

/// First free cell at or after `start` in visiting order, wrapping to
/// `top-a1`; `None` when every cell is taken
fn scan_grid(start: GridCell, template: &LayerTemplate, occupied: &OccupancyMap) -> Option<GridCell> {
    let mut cell = start;
    loop {
        if !occupied.contains_key(&Slot::Cell(cell)) {
            return Some(cell);
        }
        cell = cell
            .next(template.columns, template.rows)
            .unwrap_or(GridCell::FIRST);
        if cell == start {
            return None;
        }
    }
}

/// Pick a larger template for `layer` and lay its occupants out again in
/// scene order; returns the resize and the cell left for the new shape
fn plan_resize(
    scene: &Scene,
    catalog: &Catalog,
    layer: &Shape,
    current: &LayerTemplate,
    moving: Option<&ShapeId>,
) -> Result<(Resize, GridCell), DiagramError> {
    let occupants = grid_occupants(scene, &layer.id, moving);
    let needed = occupants.len() + 1;

    let mut target = catalog.layers.pick_template_for(needed);
    if target.capacity() <= current.capacity() {
        target = catalog
            .layers
            .next_larger(current)
            .ok_or_else(|| DiagramError::layer_full(current.columns, current.rows))?;
    }
    if target.capacity() < needed {
        return Err(DiagramError::layer_full(target.columns, target.rows));
    }

    let full = || DiagramError::layer_full(target.columns, target.rows);
    let mut cells = GridCell::all(target.columns, target.rows);
    let mut moves = Vec::with_capacity(occupants.len());
    for (id, _) in occupants {
        moves.push((id, cells.next().ok_or_else(full)?));
    }
    let cell = cells.next().ok_or_else(full)?;

    Ok((
        Resize {
            layer: layer.id.clone(),
            from: current.name.clone(),
            to: target.clone(),
            moves,
        },
        cell,
    ))
}
