// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions and per-kind port layout.
//!
//! All geometry here is in canvas space. A node's position is its top-left
//! corner; output anchors sit on the right edge, the input anchor on the left.

use crate::node::{Node, NodeKind};
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port id of the single output of non-condition nodes
pub const DEFAULT_OUTPUT: &str = "default";
/// Port id of the single input port
pub const INPUT_PORT: &str = "input";

/// Height of a node with a single output
pub const BASE_NODE_HEIGHT: f32 = 80.0;
/// Height of one branch row on a condition node
pub const PORT_HEIGHT: f32 = 24.0;
/// Gap between branch rows
pub const PORT_GAP: f32 = 12.0;
/// Distance between consecutive branch port centers
pub const PORT_SPACING: f32 = PORT_HEIGHT + PORT_GAP;

/// Identifier of a port on a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl PortId {
    /// The synthetic single output
    pub fn default_output() -> Self {
        Self(DEFAULT_OUTPUT.to_string())
    }

    /// The synthetic input
    pub fn input() -> Self {
        Self(INPUT_PORT.to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PortId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An output branch as stored in a condition node's config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPort {
    /// Port id referenced by connections
    pub id: PortId,
    /// Branch label
    pub label: String,
    /// Branch color
    pub color: String,
}

impl OutputPort {
    /// Create a new output port
    pub fn new(id: impl Into<PortId>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Branches of a condition node without configured outputs
pub fn default_condition_outputs() -> Vec<OutputPort> {
    vec![
        OutputPort::new("yes", "Yes", "green"),
        OutputPort::new("no", "No", "red"),
    ]
}

/// Whether nodes of this kind have an input port
pub fn has_input(kind: NodeKind) -> bool {
    !matches!(kind, NodeKind::Trigger)
}

/// Whether nodes of this kind have output ports
pub fn has_output(kind: NodeKind) -> bool {
    !matches!(kind, NodeKind::Exit)
}

/// Fixed node width per kind
pub fn node_width(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Stage => 180.0,
        NodeKind::Condition => 200.0,
        NodeKind::Trigger | NodeKind::AiAction | NodeKind::HumanAction | NodeKind::Exit => 160.0,
    }
}

/// Output ports of a node, in display order
pub fn output_ports(node: &Node) -> Vec<OutputPort> {
    match node.kind {
        NodeKind::Condition => match &node.config.outputs {
            Some(outputs) if !outputs.is_empty() => outputs.clone(),
            _ => default_condition_outputs(),
        },
        NodeKind::Exit => Vec::new(),
        NodeKind::Trigger | NodeKind::Stage | NodeKind::AiAction | NodeKind::HumanAction => {
            vec![OutputPort::new(DEFAULT_OUTPUT, "", node.color.clone())]
        }
    }
}

/// Effective height of a node
pub fn node_height(node: &Node) -> f32 {
    match node.kind {
        NodeKind::Condition => BASE_NODE_HEIGHT + output_ports(node).len() as f32 * PORT_HEIGHT,
        _ => BASE_NODE_HEIGHT,
    }
}

/// Width and height of a node
pub fn node_size(node: &Node) -> Vec2 {
    Vec2::new(node_width(node.kind), node_height(node))
}

/// Canvas-space body of a node
pub fn node_rect(node: &Node) -> Rect {
    Rect::from_min_size(node.position, node_size(node))
}

/// An output port together with its canvas anchor
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPort {
    /// The port
    pub port: OutputPort,
    /// Index among the node's outputs
    pub index: usize,
    /// Offset of the port center from the node's top edge
    pub offset_y: f32,
    /// Anchor point on the node's right edge
    pub anchor: Pos2,
}

/// Lay out a node's output ports.
///
/// Condition branches are centered around the node's vertical midpoint,
/// `PORT_SPACING` apart. Everything else gets one port at the midpoint.
pub fn resolve_outputs(node: &Node) -> Vec<ResolvedPort> {
    let ports = output_ports(node);
    let height = node_height(node);
    let right = node.position.x + node_width(node.kind);
    let first = height / 2.0 - (ports.len().saturating_sub(1)) as f32 * PORT_SPACING / 2.0;

    ports
        .into_iter()
        .enumerate()
        .map(|(index, port)| {
            let offset_y = first + index as f32 * PORT_SPACING;
            ResolvedPort {
                port,
                index,
                offset_y,
                anchor: Pos2::new(right, node.position.y + offset_y),
            }
        })
        .collect()
}

/// Anchor of a named output port, if the node has it
pub fn output_anchor(node: &Node, port_id: &PortId) -> Option<Pos2> {
    resolve_outputs(node)
        .into_iter()
        .find(|resolved| &resolved.port.id == port_id)
        .map(|resolved| resolved.anchor)
}

/// Anchor of the node's input port, if it has one
pub fn input_anchor(node: &Node) -> Option<Pos2> {
    has_input(node.kind).then(|| Pos2::new(node.position.x, node.position.y + node_height(node) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_output_kinds_use_default_port() {
        let node = Node::new(NodeKind::Stage, "Lead").with_position(0.0, 0.0);
        let ports = resolve_outputs(&node);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port.id.as_str(), DEFAULT_OUTPUT);
        assert_eq!(ports[0].anchor, Pos2::new(180.0, 40.0));
        assert_eq!(node_height(&node), 80.0);
    }

    #[test]
    fn exit_has_no_outputs_and_trigger_no_input() {
        let exit = Node::new(NodeKind::Exit, "Won");
        let trigger = Node::new(NodeKind::Trigger, "New lead");
        assert!(output_ports(&exit).is_empty());
        assert!(input_anchor(&trigger).is_none());
        assert!(input_anchor(&exit).is_some());
    }

    #[test]
    fn condition_defaults_to_yes_no() {
        let node = Node::new(NodeKind::Condition, "Score > 70").with_position(100.0, 100.0);
        let ports = resolve_outputs(&node);
        let ids: Vec<_> = ports.iter().map(|p| p.port.id.as_str()).collect();
        assert_eq!(ids, ["yes", "no"]);
        // height 80 + 2*24 = 128, centered at 64, spaced 36
        assert_eq!(node_height(&node), 128.0);
        assert_eq!(ports[0].offset_y, 46.0);
        assert_eq!(ports[1].offset_y, 82.0);
        assert_eq!(ports[0].anchor.x, 300.0);
    }

    #[test]
    fn empty_outputs_fall_back_to_defaults() {
        let node = Node::new(NodeKind::Condition, "Empty").with_outputs(Vec::new());
        assert_eq!(output_ports(&node), default_condition_outputs());
    }

    #[test]
    fn custom_condition_outputs_are_centered() {
        let node = Node::new(NodeKind::Condition, "Tier").with_outputs(vec![
            OutputPort::new("gold", "Gold", "yellow"),
            OutputPort::new("silver", "Silver", "gray"),
            OutputPort::new("bronze", "Bronze", "orange"),
        ]);
        let ports = resolve_outputs(&node);
        let height = node_height(&node);
        assert_eq!(height, 152.0);
        assert_eq!(ports[1].offset_y, height / 2.0);
        assert_eq!(ports[2].offset_y - ports[0].offset_y, 2.0 * PORT_SPACING);
        assert_eq!(
            output_anchor(&node, &PortId::from("bronze")),
            Some(ports[2].anchor)
        );
        assert_eq!(output_anchor(&node, &PortId::from("yes")), None);
    }

    #[test]
    fn input_anchor_sits_on_left_midpoint() {
        let node = Node::new(NodeKind::Condition, "C").with_position(10.0, 20.0);
        assert_eq!(input_anchor(&node), Some(Pos2::new(10.0, 84.0)));
    }
}
