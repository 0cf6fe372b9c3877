// SPDX-License-Identifier: MIT OR Apache-2.0
//! Toolbox entries that become nodes when dropped on the canvas.

use crate::document::WorkflowType;
use crate::node::{Node, NodeConfig, NodeKind};
use crate::templates;
use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Blueprint for a node: everything except id and position.
///
/// This is also the shape of a drop payload and of an applied suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Label; the kind's display name if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Icon; the kind's default if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Color; the kind's default if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Initial config
    #[serde(default)]
    pub config: NodeConfig,
}

impl NodeTemplate {
    /// Bare template for a kind
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            label: None,
            icon: None,
            color: None,
            config: NodeConfig::default(),
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the config
    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Label the node will get
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.display_name())
    }

    /// Create a node with a fresh id at a canvas position
    pub fn instantiate(&self, position: Pos2) -> Node {
        let mut node = Node::new(self.kind, self.display_label());
        if let Some(icon) = &self.icon {
            node.icon = icon.clone();
        }
        if let Some(color) = &self.color {
            node.color = color.clone();
        }
        node.config = self.config.clone();
        node.position = position;
        node
    }
}

/// Registry of toolbox entries
#[derive(Debug, Clone, Default)]
pub struct NodePalette {
    templates: Vec<NodeTemplate>,
}

impl NodePalette {
    /// Create a new empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// One plain entry per node kind
    pub fn basic() -> Self {
        let mut palette = Self::new();
        for kind in NodeKind::all() {
            palette.register(NodeTemplate::new(*kind));
        }
        palette
    }

    /// Plain entries followed by presets for the workflow type
    pub fn for_workflow(workflow_type: WorkflowType) -> Self {
        let mut palette = Self::basic();
        for template in templates::presets(workflow_type) {
            palette.register(template);
        }
        palette
    }

    /// Register a template
    pub fn register(&mut self, template: NodeTemplate) {
        self.templates.push(template);
    }

    /// Get all registered templates
    pub fn templates(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.iter()
    }

    /// Get templates of one kind
    pub fn templates_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.iter().filter(move |t| t.kind == kind)
    }

    /// Get a template by index
    pub fn get(&self, index: usize) -> Option<&NodeTemplate> {
        self.templates.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::OutputPort;

    #[test]
    fn instantiate_fills_defaults() {
        let node = NodeTemplate::new(NodeKind::HumanAction).instantiate(Pos2::new(48.0, 24.0));
        assert_eq!(node.label, "Human Action");
        assert_eq!(node.icon, NodeKind::HumanAction.default_icon());
        assert_eq!(node.position, Pos2::new(48.0, 24.0));
        assert!(node.id.as_str().starts_with("node-"));
    }

    #[test]
    fn instantiate_keeps_overrides() {
        let template = NodeTemplate::new(NodeKind::Condition)
            .with_label("Deal size")
            .with_config(NodeConfig::with_outputs(vec![OutputPort::new("big", "Big", "green")]));
        let a = template.instantiate(Pos2::ZERO);
        let b = template.instantiate(Pos2::ZERO);
        assert_eq!(a.label, "Deal size");
        assert_eq!(a.config.outputs.as_ref().map(Vec::len), Some(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn workflow_palette_extends_basic() {
        let basic = NodePalette::basic();
        assert_eq!(basic.templates().count(), NodeKind::all().len());
        for workflow_type in WorkflowType::all() {
            let palette = NodePalette::for_workflow(*workflow_type);
            assert!(palette.templates().count() > basic.templates().count());
            assert_eq!(palette.templates_of_kind(NodeKind::Trigger).next().unwrap().label, None);
        }
    }
}
