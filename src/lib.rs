//! Iso Diagram - layout engine for isometric architecture diagrams
//!
//! A diagram is a flat list of shapes: layers, 3D components placed on layer
//! grids, and 2D decorators attached to components. This library keeps that
//! list valid while it is edited: every add or move is corrected onto a free
//! slot, missing layers are created, and full layers grow to the next larger
//! template.
//!
//! # Example
//!
//! ```rust
//! use iso_diagram::{Diagram, NewShape};
//!
//! let mut diagram = Diagram::default();
//! let layer = diagram
//!     .add_shape(NewShape::layer("layer2x2").named("Platform").at("top"))
//!     .unwrap()
//!     .id
//!     .clone();
//!
//! let iam = diagram
//!     .add_shape(NewShape::component("server").relative_to(layer).named("IAM"))
//!     .unwrap();
//! assert_eq!(iam.position.unwrap().code(), "top-a1");
//! ```

pub mod batch;
pub mod blueprint;
pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod placement;
pub mod position;
pub mod scene;

pub use batch::{Batch, BatchFailure, BatchReport, InputError, Operation};
pub use blueprint::Blueprint;
pub use catalog::{Catalog, CatalogError, LayerCatalog, LayerTemplate, ShapeLibrary};
pub use config::EngineConfig;
pub use error::DiagramError;
pub use manager::{Diagram, NewShape};
pub use position::{GridCell, Slot};
pub use scene::{Decorator, DisplayMetadata, Scene, SceneError, Shape, ShapeId, ShapeKind, SourceKind};

use thiserror::Error;

/// Errors that can occur while loading inputs for an edit session
#[derive(Debug, Error)]
pub enum Error {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("diagram error: {0}")]
    Diagram(#[from] DiagramError),
}

/// Apply a batch to a serialized scene with the default configuration
///
/// Returns the edited diagram together with the batch report. A fatal
/// error inside the batch is reported, not returned: the diagram still
/// holds every operation applied before it.
///
/// # Example
///
/// ```rust
/// use iso_diagram::{edit, Batch};
///
/// let batch = Batch::from_toml_str(r#"
///     [[operations]]
///     action = "add"
///     template = "layer2x2"
///     name = "Platform"
///
///     [[operations]]
///     action = "add"
///     template = "server"
///     relativeTo = "Platform"
///     name = "IAM"
/// "#).unwrap();
///
/// let (diagram, report) = edit("[]", &batch.operations).unwrap();
/// assert!(report.is_complete());
/// assert_eq!(diagram.get_all().len(), 2);
/// ```
pub fn edit(scene_json: &str, operations: &[Operation]) -> Result<(Diagram, BatchReport), Error> {
    edit_with_config(scene_json, operations, EngineConfig::default())
}

/// Apply a batch to a serialized scene with a custom configuration
pub fn edit_with_config(
    scene_json: &str,
    operations: &[Operation],
    config: EngineConfig,
) -> Result<(Diagram, BatchReport), Error> {
    let mut diagram = Diagram::from_json(scene_json, config)?;
    let report = diagram.apply_batch(operations);
    Ok((diagram, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_empty_scene() {
        let (diagram, report) = edit("[]", &[]).unwrap();
        assert!(report.is_complete());
        assert!(diagram.get_all().is_empty());
    }

    #[test]
    fn test_edit_rejects_bad_scene() {
        let result = edit("{not json", &[]);
        assert!(matches!(result, Err(Error::Scene(_))));
    }

    #[test]
    fn test_edit_reports_fatal_error_without_rollback() {
        let ops = vec![
            Operation::Add {
                template: "server".to_string(),
                kind: None,
                position: None,
                relative_to: None,
                decorator: None,
                name: Some("a".to_string()),
            },
            Operation::AddDecorator {
                target: "ghost".to_string(),
                decorator: "icon".to_string(),
            },
            Operation::Remove {
                target: "a".to_string(),
            },
        ];
        let (diagram, report) = edit("[]", &ops).unwrap();
        assert_eq!(report.applied, 1);
        let failure = report.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.error, DiagramError::target_not_found("ghost"));
        // default layer + component stay, the remove never ran
        assert_eq!(diagram.get_all().len(), 2);
    }
}
