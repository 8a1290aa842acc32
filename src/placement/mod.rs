//! Placement validation
//!
//! Every request recomputes occupancy from the whole scene, so the cost is
//! linear in the number of shapes per call.

pub mod occupancy;
pub mod validator;

pub use occupancy::{grid_occupants, occupancy, OccupancyMap};
pub use validator::{validate, Anchor, Placement, PlacementRequest, Resize};
