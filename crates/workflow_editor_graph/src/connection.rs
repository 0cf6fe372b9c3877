// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::port::PortId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(format!("conn-{}", Uuid::new_v4()))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line style of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStyle {
    /// Continuous stroke
    #[default]
    Solid,
    /// Dashed stroke
    Dashed,
}

impl ConnectionStyle {
    /// Dash and gap lengths in canvas units, if dashed
    pub fn dash_pattern(&self) -> Option<[f32; 2]> {
        match self {
            ConnectionStyle::Solid => None,
            ConnectionStyle::Dashed => Some([6.0, 4.0]),
        }
    }
}

/// A directed connection from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node_id: NodeId,
    /// Source port ID
    pub from_port: PortId,
    /// Target node ID
    pub to_node_id: NodeId,
    /// Target port ID
    pub to_port: PortId,
    /// Branch label drawn on the curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Stroke color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke style
    #[serde(default)]
    pub style: ConnectionStyle,
}

impl Connection {
    /// Create a new connection into the target's input port
    pub fn new(from_node_id: NodeId, from_port: PortId, to_node_id: NodeId) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node_id,
            from_port,
            to_node_id,
            to_port: PortId::input(),
            label: None,
            color: None,
            style: ConnectionStyle::Solid,
        }
    }

    /// Set the ID
    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the style
    pub fn with_style(mut self, style: ConnectionStyle) -> Self {
        self.style = style;
        self
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        &self.from_node_id == node_id || &self.to_node_id == node_id
    }
}
