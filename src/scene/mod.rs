//! The scene store: a flat, ordered list of shapes
//!
//! The scene is the sole owner of every shape. Shapes point at each other
//! only through `relative_to` ids, which are resolved against the scene on
//! each lookup, so removing a shape can leave a dangling id but never a
//! dangling reference.

mod store;
mod types;

pub use store::{Scene, SceneError};
pub use types::{Decorator, DisplayMetadata, Shape, ShapeId, ShapeKind, SourceKind};
