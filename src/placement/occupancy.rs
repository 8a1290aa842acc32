//! Occupancy maps derived from a full scan of the scene

use std::collections::BTreeMap;

use crate::position::{GridCell, Slot};
use crate::scene::{Scene, ShapeId};

/// Slot -> occupant for everything placed relative to one shape
pub type OccupancyMap = BTreeMap<Slot, ShapeId>;

/// Compute which slots around `anchor` are taken, ignoring `exclude`.
///
/// When a loaded scene already holds two shapes in one slot, the first in
/// scene order is reported.
pub fn occupancy(scene: &Scene, anchor: &ShapeId, exclude: Option<&ShapeId>) -> OccupancyMap {
    let mut map = OccupancyMap::new();
    for shape in scene.iter() {
        if Some(&shape.id) == exclude || shape.relative_to.as_ref() != Some(anchor) {
            continue;
        }
        if let Some(slot) = shape.position {
            map.entry(slot).or_insert_with(|| shape.id.clone());
        }
    }
    map
}

/// Shapes sitting on grid cells of `layer`, in scene order
pub fn grid_occupants(scene: &Scene, layer: &ShapeId, exclude: Option<&ShapeId>) -> Vec<(ShapeId, GridCell)> {
    scene
        .iter()
        .filter(|s| Some(&s.id) != exclude && s.relative_to.as_ref() == Some(layer))
        .filter_map(|s| s.position.and_then(|p| p.cell()).map(|cell| (s.id.clone(), cell)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DisplayMetadata, Shape, ShapeKind, SourceKind};

    fn shape(id: &str, kind: ShapeKind, rel: Option<&str>, pos: Option<&str>) -> Shape {
        Shape {
            id: ShapeId::new(id),
            shape_template: (if kind == ShapeKind::Layer { "layer2x2" } else { "server" }).to_string(),
            kind,
            position: pos.map(|p| Slot::parse(p).unwrap()),
            relative_to: rel.map(ShapeId::new),
            attached_decorators: vec![],
            metadata: DisplayMetadata::default(),
            source: SourceKind::Component,
        }
    }

    fn scene() -> Scene {
        Scene::from_shapes(vec![
            shape("l1", ShapeKind::Layer, None, Some("top")),
            shape("s1", ShapeKind::Component, Some("l1"), Some("top-a1")),
            shape("s2", ShapeKind::Component, Some("l1"), Some("top-a1")),
            shape("s3", ShapeKind::Component, Some("l1"), Some("top-b2")),
            shape("l2", ShapeKind::Layer, Some("l1"), Some("front-left")),
        ])
    }

    #[test]
    fn test_occupancy_first_occupant_wins() {
        let map = occupancy(&scene(), &ShapeId::new("l1"), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&Slot::parse("top-a1").unwrap()].as_str(), "s1");
        assert_eq!(map[&Slot::FrontLeft].as_str(), "l2");
    }

    #[test]
    fn test_occupancy_excludes_moving_shape() {
        let s3 = ShapeId::new("s3");
        let map = occupancy(&scene(), &ShapeId::new("l1"), Some(&s3));
        assert!(!map.contains_key(&Slot::parse("top-b2").unwrap()));
    }

    #[test]
    fn test_grid_occupants_skip_side_slots() {
        let ids: Vec<String> = grid_occupants(&scene(), &ShapeId::new("l1"), None)
            .into_iter()
            .map(|(id, _)| id.0)
            .collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }
}
