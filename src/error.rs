//! Error types for placement and slot decoding

use thiserror::Error;

/// Fatal errors raised by the diagram engine.
///
/// Everything else (missing ids, unusable positions, dangling references)
/// is corrected silently and never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    /// A slot code that is neither a named edge slot nor `top-<letter><row>`
    #[error("invalid position format '{code}'")]
    InvalidPositionFormat { code: String },

    /// The row-major successor would fall outside the grid
    #[error("layer full: no cell after the last of a {columns}x{rows} grid")]
    LayerFull { columns: u8, rows: u8 },

    /// A component was added without a layer while several layers exist
    #[error("ambiguous layer reference: {} layers exist ({})", layers.len(), layers.join(", "))]
    AmbiguousLayerReference { layers: Vec<String> },

    /// A layer whose template is not in the layer catalog
    #[error("layer '{layer}' uses unknown layer template '{template}'")]
    LayerNotFound { layer: String, template: String },

    /// Every side slot a new layer could stack on is already taken
    #[error("no free side left to stack a layer on (last tried '{layer}')")]
    NoFreeLayerSide { layer: String },

    /// A decorator operation named a shape that does not exist
    #[error("target shape '{id}' not found")]
    TargetNotFound { id: String },
}

impl DiagramError {
    /// Create an invalid position format error
    pub fn invalid_position(code: impl Into<String>) -> Self {
        Self::InvalidPositionFormat { code: code.into() }
    }

    /// Create a layer full error for a grid of the given size
    pub fn layer_full(columns: u8, rows: u8) -> Self {
        Self::LayerFull { columns, rows }
    }

    /// Create an ambiguous layer reference error listing the candidate layers
    pub fn ambiguous(layers: Vec<String>) -> Self {
        Self::AmbiguousLayerReference { layers }
    }

    /// Create a layer not found error
    pub fn layer_not_found(layer: impl Into<String>, template: impl Into<String>) -> Self {
        Self::LayerNotFound {
            layer: layer.into(),
            template: template.into(),
        }
    }

    /// Create a no free layer side error naming the preferred anchor
    pub fn no_free_layer_side(layer: impl Into<String>) -> Self {
        Self::NoFreeLayerSide { layer: layer.into() }
    }

    /// Create a target not found error
    pub fn target_not_found(id: impl Into<String>) -> Self {
        Self::TargetNotFound { id: id.into() }
    }

    /// Whether the error should be surfaced to the user as feedback
    /// rather than treated as a malformed request.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousLayerReference { .. }
                | Self::LayerNotFound { .. }
                | Self::TargetNotFound { .. }
        )
    }
}
