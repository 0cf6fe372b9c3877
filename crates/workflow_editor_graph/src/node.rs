// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the workflow graph.

use crate::port::{OutputPort, PortId};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(format!("node-{}", Uuid::new_v4()))
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of node kinds a workflow can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Entry point; never a connection target
    Trigger,
    /// Pipeline stage entities sit in
    Stage,
    /// Branching node with named outputs
    Condition,
    /// Automated action performed by the assistant
    AiAction,
    /// Task assigned to a person
    HumanAction,
    /// Terminal node; never a connection source
    Exit,
}

impl NodeKind {
    /// Every kind, in toolbox order
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Trigger,
            NodeKind::Stage,
            NodeKind::Condition,
            NodeKind::AiAction,
            NodeKind::HumanAction,
            NodeKind::Exit,
        ]
    }

    /// Wire name, as used in documents and drop payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Stage => "stage",
            NodeKind::Condition => "condition",
            NodeKind::AiAction => "aiAction",
            NodeKind::HumanAction => "humanAction",
            NodeKind::Exit => "exit",
        }
    }

    /// Parse a wire name
    pub fn parse(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == value)
    }

    /// Get display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "Trigger",
            NodeKind::Stage => "Stage",
            NodeKind::Condition => "Condition",
            NodeKind::AiAction => "AI Action",
            NodeKind::HumanAction => "Human Action",
            NodeKind::Exit => "Exit",
        }
    }

    /// Icon name used when a node is created without one
    pub fn default_icon(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "zap",
            NodeKind::Stage => "layers",
            NodeKind::Condition => "git-branch",
            NodeKind::AiAction => "sparkles",
            NodeKind::HumanAction => "user",
            NodeKind::Exit => "flag",
        }
    }

    /// Accent color used when a node is created without one
    pub fn default_color(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "#f59e0b",
            NodeKind::Stage => "#3b82f6",
            NodeKind::Condition => "#8b5cf6",
            NodeKind::AiAction => "#ec4899",
            NodeKind::HumanAction => "#10b981",
            NodeKind::Exit => "#6b7280",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific node configuration.
///
/// Only condition nodes read `outputs`. Every other key is kept verbatim so a
/// document survives a load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Branch outputs of a condition node.
    ///
    /// An explicit `null` reads the same as a missing key and is not written
    /// back; both mean "use the default branches".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OutputPort>>,
    /// Opaque remainder of the config object
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NodeConfig {
    /// Config carrying an explicit branch list
    pub fn with_outputs(outputs: Vec<OutputPort>) -> Self {
        Self {
            outputs: Some(outputs),
            extra: serde_json::Map::new(),
        }
    }
}

/// A node instance in the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label
    pub label: String,
    /// Icon name
    pub icon: String,
    /// Accent color
    pub color: String,
    /// Position in canvas space
    pub position: Pos2,
    /// Kind-specific configuration
    #[serde(default)]
    pub config: NodeConfig,
    /// Number of entities currently in this stage (stage nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_count: Option<u32>,
}

impl Node {
    /// Create a new node of the given kind with default icon and color
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            label: label.into(),
            icon: kind.default_icon().to_string(),
            color: kind.default_color().to_string(),
            position: Pos2::ZERO,
            config: NodeConfig::default(),
            entity_count: None,
        }
    }

    /// Set the ID
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Pos2::new(x, y);
        self
    }

    /// Set condition outputs
    pub fn with_outputs(mut self, outputs: Vec<OutputPort>) -> Self {
        self.config.outputs = Some(outputs);
        self
    }

    /// Set the stage entity count
    pub fn with_entity_count(mut self, count: u32) -> Self {
        self.entity_count = Some(count);
        self
    }

    /// Whether an output port with this id exists on the node
    pub fn has_output(&self, port_id: &PortId) -> bool {
        crate::port::output_ports(self).iter().any(|p| &p.id == port_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names_round_trip() {
        for kind in NodeKind::all() {
            assert_eq!(NodeKind::parse(kind.as_str()), Some(*kind));
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(NodeKind::parse("loop"), None);
    }

    #[test]
    fn node_serializes_in_wire_shape() {
        let node = Node::new(NodeKind::Stage, "Qualified")
            .with_id("n1")
            .with_position(48.0, 96.0)
            .with_entity_count(12);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "stage");
        assert_eq!(value["entityCount"], 12);
        assert_eq!(value["position"]["x"], 48.0);
        assert!(value["config"].as_object().unwrap().is_empty());
    }

    #[test]
    fn unknown_config_keys_are_kept() {
        let json = r#"{
            "id": "c1", "type": "condition", "label": "Score", "icon": "git-branch",
            "color": "purple", "position": {"x": 0, "y": 0},
            "config": {"field": "leadScore", "operator": ">", "value": 70}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert!(node.config.outputs.is_none());
        assert_eq!(node.config.extra["field"], "leadScore");
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["config"]["value"], 70);
    }

    #[test]
    fn null_outputs_mean_default_branches() {
        let config: NodeConfig = serde_json::from_str(r#"{"outputs": null, "field": "tier"}"#).unwrap();
        assert_eq!(config.outputs, None);
        assert!(!config.extra.contains_key("outputs"));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back, serde_json::json!({"field": "tier"}));

        let node = Node::new(NodeKind::Condition, "Tier").with_id("c");
        let node = Node { config, ..node };
        let ids: Vec<_> = crate::port::output_ports(&node).into_iter().map(|p| p.id.0).collect();
        assert_eq!(ids, ["yes", "no"]);
    }
}
