//! Architecture blueprints rendered as stacked layers
//!
//! A blueprint lists service names per architecture tier. Each non-empty
//! tier becomes one layer, stacked front-left of the previous one, sized to
//! fit its services, with every service on its own cell. Placement is always
//! explicit, so building a blueprint never synthesizes layers or resizes
//! them.

use std::path::Path;

use serde::Deserialize;

use crate::batch::InputError;
use crate::config::EngineConfig;
use crate::error::DiagramError;
use crate::manager::{Diagram, NewShape, SERVICE_NAME_KEY};
use crate::position::{GridCell, Slot};
use crate::scene::ShapeId;

fn default_component_template() -> String {
    "server".to_string()
}

/// Services grouped by architecture tier
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Shape template used for every service
    #[serde(default = "default_component_template")]
    pub component_template: String,
    #[serde(default)]
    pub platform_services: Vec<String>,
    #[serde(default)]
    pub data_lake: Vec<String>,
    #[serde(default)]
    pub event_driven: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
    #[serde(default)]
    pub entity_services: Vec<String>,
    #[serde(default)]
    pub workflow_services: Vec<String>,
}

impl Default for Blueprint {
    fn default() -> Self {
        Self {
            component_template: default_component_template(),
            platform_services: Vec::new(),
            data_lake: Vec::new(),
            event_driven: Vec::new(),
            integrations: Vec::new(),
            entity_services: Vec::new(),
            workflow_services: Vec::new(),
        }
    }
}

impl Blueprint {
    /// Load a blueprint from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a blueprint from JSON
    pub fn from_json_str(content: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a blueprint file; `.json` files are read as JSON, anything else as TOML
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Tiers in stacking order, entity and workflow services sharing the last
    pub fn tiers(&self) -> Vec<(&'static str, Vec<&str>)> {
        fn names(list: &[String]) -> Vec<&str> {
            list.iter().map(String::as_str).collect()
        }

        let mut entity_and_workflow = names(&self.entity_services);
        entity_and_workflow.extend(names(&self.workflow_services));

        vec![
            ("Platform Services", names(&self.platform_services)),
            ("Data Lake", names(&self.data_lake)),
            ("Event-Driven", names(&self.event_driven)),
            ("Integrations", names(&self.integrations)),
            ("Entity & Workflow Services", entity_and_workflow),
        ]
    }

    /// Build a fresh diagram from this blueprint
    pub fn build(&self, config: EngineConfig) -> Result<Diagram, DiagramError> {
        let mut diagram = Diagram::new(config);
        let mut previous: Option<ShapeId> = None;

        for (title, services) in self.tiers() {
            if services.is_empty() {
                continue;
            }

            let template = diagram
                .config()
                .catalog
                .layers
                .pick_template_for(services.len())
                .clone();

            let mut layer = NewShape::layer(template.name.clone()).named(title);
            layer = match &previous {
                Some(prev) => layer.relative_to(prev.clone()).at(Slot::FrontLeft.code()),
                None => layer.at(Slot::Top.code()),
            };
            let layer_id = diagram.add_shape(layer)?.id.clone();
            diagram.rename(&layer_id, title);

            let mut cells = GridCell::all(template.columns, template.rows);
            for service in services {
                let mut component = NewShape::component(self.component_template.clone())
                    .relative_to(layer_id.clone())
                    .named(service)
                    .with_metadata(SERVICE_NAME_KEY, service);
                if let Some(cell) = cells.next() {
                    component = component.at(cell.encode());
                }
                diagram.add_shape(component)?;
            }

            previous = Some(layer_id);
        }

        Ok(diagram)
    }
}
