//! Batches of diagram edits
//!
//! A batch is an ordered list of [`Operation`]s, typically produced one at a
//! time by an interpreter of natural-language edit requests. Batches are
//! applied in order and stop at the first fatal error; operations already
//! applied stay applied.
//!
//! Shape references in a batch may name a shape id or, failing that, a
//! shape's display name, so later operations can refer to shapes created
//! earlier in the same batch.
//!
//! ```toml
//! [[operations]]
//! action = "add"
//! template = "layer2x2"
//! name = "Platform"
//!
//! [[operations]]
//! action = "add"
//! template = "server"
//! relativeTo = "Platform"
//! name = "IAM"
//! decorator = "icon-lock"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::DiagramError;
use crate::manager::{Diagram, NewShape};
use crate::scene::{ShapeId, ShapeKind};

/// Errors that can occur when loading a batch or blueprint file
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse input TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to parse input JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A single requested edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Operation {
    Add {
        template: String,
        /// Inferred from the catalog when omitted: layer templates make layers
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ShapeKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        #[serde(default, rename = "relativeTo", skip_serializing_if = "Option::is_none")]
        relative_to: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decorator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Move {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        #[serde(default, rename = "relativeTo", skip_serializing_if = "Option::is_none")]
        relative_to: Option<String>,
    },
    Remove {
        target: String,
    },
    Rename {
        target: String,
        name: String,
    },
    AddDecorator {
        target: String,
        decorator: String,
    },
    RemoveDecorator {
        target: String,
        decorator: String,
    },
    MoveDecorator {
        target: String,
        decorator: String,
        to: String,
    },
}

/// The failing operation of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Position of the operation in the batch
    pub index: usize,
    pub error: DiagramError,
}

/// Outcome of [`Diagram::apply_batch`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// Number of operations applied before stopping
    pub applied: usize,
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// An ordered list of operations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Batch {
    pub operations: Vec<Operation>,
}

impl Batch {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Load a batch from TOML with an `[[operations]]` array
    pub fn from_toml_str(content: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a batch from JSON, either `{"operations": [..]}` or a bare array
    pub fn from_json_str(content: &str) -> Result<Self, InputError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum JsonBatch {
            Wrapped(Batch),
            Bare(Vec<Operation>),
        }

        Ok(match serde_json::from_str(content)? {
            JsonBatch::Wrapped(batch) => batch,
            JsonBatch::Bare(operations) => Batch { operations },
        })
    }

    /// Load a batch file; `.json` files are read as JSON, anything else as TOML
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}

impl Diagram {
    /// Resolve a batch reference: an exact id first, then the first shape
    /// whose display name matches. Unknown references pass through as ids.
    pub fn resolve_reference(&self, reference: &str) -> ShapeId {
        let id = ShapeId::new(reference);
        if self.scene().contains(&id) {
            return id;
        }
        self.get_all()
            .iter()
            .find(|s| s.display_name() == Some(reference))
            .map(|s| s.id.clone())
            .unwrap_or(id)
    }

    /// Apply one operation
    pub fn apply(&mut self, operation: &Operation) -> Result<(), DiagramError> {
        match operation {
            Operation::Add {
                template,
                kind,
                position,
                relative_to,
                decorator,
                name,
            } => {
                let kind = kind.unwrap_or_else(|| {
                    if self.config().catalog.layers.contains(template) {
                        ShapeKind::Layer
                    } else {
                        ShapeKind::Component
                    }
                });
                let mut new = NewShape::new(template.clone(), kind);
                new.relative_to = relative_to.as_deref().map(|r| self.resolve_reference(r));
                new.position = position.clone();
                new.display_name = name.clone();
                new.decorators.extend(decorator.iter().cloned());
                self.add_shape(new)?;
            }
            Operation::Move {
                target,
                position,
                relative_to,
            } => {
                let id = self.resolve_reference(target);
                let relative_to = relative_to.as_deref().map(|r| self.resolve_reference(r));
                self.move_shape(&id, relative_to, position.as_deref())?;
            }
            Operation::Remove { target } => {
                let id = self.resolve_reference(target);
                self.remove_shape(&id);
            }
            Operation::Rename { target, name } => {
                let id = self.resolve_reference(target);
                self.rename(&id, name);
            }
            Operation::AddDecorator { target, decorator } => {
                let id = self.resolve_reference(target);
                self.add_decorator(&id, decorator)?;
            }
            Operation::RemoveDecorator { target, decorator } => {
                let id = self.resolve_reference(target);
                self.remove_decorator(&id, decorator);
            }
            Operation::MoveDecorator {
                target,
                decorator,
                to,
            } => {
                let from = self.resolve_reference(target);
                let to = self.resolve_reference(to);
                self.move_decorator(&from, decorator, &to)?;
            }
        }
        Ok(())
    }

    /// Apply operations in order, stopping at the first fatal error.
    ///
    /// Nothing is rolled back: operations before the failing one stay
    /// applied, operations after it are skipped.
    pub fn apply_batch(&mut self, operations: &[Operation]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, operation) in operations.iter().enumerate() {
            if let Err(error) = self.apply(operation) {
                warn!(index, %error, "batch aborted");
                report.failure = Some(BatchFailure { index, error });
                break;
            }
            report.applied += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_toml_batch() {
        let batch = Batch::from_toml_str(
            r#"
[[operations]]
action = "add"
template = "layer2x2"
name = "Platform"

[[operations]]
action = "move-decorator"
target = "a"
decorator = "icon"
to = "b"
"#,
        )
        .unwrap();

        assert_eq!(
            batch.operations,
            vec![
                Operation::Add {
                    template: "layer2x2".to_string(),
                    kind: None,
                    position: None,
                    relative_to: None,
                    decorator: None,
                    name: Some("Platform".to_string()),
                },
                Operation::MoveDecorator {
                    target: "a".to_string(),
                    decorator: "icon".to_string(),
                    to: "b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_json_batch_bare_and_wrapped() {
        let bare = Batch::from_json_str(r#"[{"action":"remove","target":"x"}]"#).unwrap();
        let wrapped =
            Batch::from_json_str(r#"{"operations":[{"action":"remove","target":"x"}]}"#).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.operations.len(), 1);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = Batch::from_json_str(r#"[{"action":"explode","target":"x"}]"#);
        assert!(matches!(result, Err(InputError::JsonError(_))));
    }

    #[test]
    fn test_add_infers_kind_from_catalog() {
        let mut diagram = Diagram::default();
        let report = diagram.apply_batch(&[Operation::Add {
            template: "layer3x3".to_string(),
            kind: None,
            position: None,
            relative_to: None,
            decorator: None,
            name: None,
        }]);
        assert!(report.is_complete());
        assert!(diagram.get_all()[0].is_layer());
    }

    #[test]
    fn test_references_resolve_by_display_name() {
        let mut diagram = Diagram::default();
        diagram
            .add_shape(NewShape::layer("layer2x2").named("Platform"))
            .unwrap();
        let resolved = diagram.resolve_reference("Platform");
        assert_eq!(resolved, diagram.get_all()[0].id);
        assert_eq!(diagram.resolve_reference("ghost"), ShapeId::new("ghost"));
    }
}
