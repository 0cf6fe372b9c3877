// SPDX-License-Identifier: MIT OR Apache-2.0
//! Workflow graph containing nodes, connections and the current selection.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeConfig, NodeId, NodeKind};
use crate::port::{self, PortId};
use egui::{Pos2, Rect};
use indexmap::IndexMap;

/// What the user currently has selected. At most one entity at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A single node
    Node(NodeId),
    /// A single connection
    Connection(ConnectionId),
}

impl Selection {
    /// Selected node, if any
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Selection::Node(id) => Some(id),
            _ => None,
        }
    }

    /// Selected connection, if any
    pub fn connection(&self) -> Option<&ConnectionId> {
        match self {
            Selection::Connection(id) => Some(id),
            _ => None,
        }
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// A workflow graph.
///
/// Nodes and connections keep insertion order; the order of a node's outgoing
/// connections is the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
    selection: Selection,
}

impl WorkflowGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    ///
    /// A node whose id is already taken is given a fresh id. Entity counts are
    /// dropped from anything but a stage. Returns the id the node was stored
    /// under.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        if self.nodes.contains_key(&node.id) {
            let fresh = NodeId::new();
            tracing::debug!(old = %node.id, new = %fresh, "node id already in use, reassigning");
            node.id = fresh;
        }
        if node.kind != NodeKind::Stage && node.entity_count.is_some() {
            tracing::debug!(node = %node.id, kind = %node.kind, "ignoring entity count on non-stage node");
            node.entity_count = None;
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        id
    }

    /// Remove a node and every connection touching it
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let node = self.nodes.shift_remove(node_id)?;

        let selection = &mut self.selection;
        self.connections.retain(|id, c| {
            let keep = !c.involves_node(node_id);
            if !keep && selection.connection() == Some(id) {
                *selection = Selection::None;
            }
            keep
        });
        if self.selection.node() == Some(node_id) {
            self.selection = Selection::None;
        }

        Some(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Trigger nodes, the possible simulation origins
    pub fn triggers(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.kind == NodeKind::Trigger)
    }

    /// Move a node. Returns false if the node does not exist.
    pub fn update_node_position(&mut self, node_id: &NodeId, position: Pos2) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Rename a node
    pub fn update_node_label(
        &mut self,
        node_id: &NodeId,
        label: impl Into<String>,
    ) -> Result<(), NodeEditError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| NodeEditError::NodeNotFound(node_id.clone()))?;
        node.label = label.into();
        Ok(())
    }

    /// Replace a node's config.
    ///
    /// Outgoing connections leaving from a branch the new config no longer has
    /// are removed.
    pub fn update_node_config(
        &mut self,
        node_id: &NodeId,
        config: NodeConfig,
    ) -> Result<(), NodeEditError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| NodeEditError::NodeNotFound(node_id.clone()))?;
        node.config = config;
        let outputs: Vec<PortId> = port::output_ports(node).into_iter().map(|p| p.id).collect();

        let selection = &mut self.selection;
        self.connections.retain(|id, c| {
            let keep = &c.from_node_id != node_id || outputs.contains(&c.from_port);
            if !keep {
                tracing::debug!(connection = %id, port = %c.from_port, "branch removed, dropping connection");
                if selection.connection() == Some(id) {
                    *selection = Selection::None;
                }
            }
            keep
        });
        Ok(())
    }

    /// Set the number of entities in a stage
    pub fn set_entity_count(
        &mut self,
        node_id: &NodeId,
        count: Option<u32>,
    ) -> Result<(), NodeEditError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| NodeEditError::NodeNotFound(node_id.clone()))?;
        if node.kind != NodeKind::Stage {
            return Err(NodeEditError::NotAStage(node_id.clone()));
        }
        node.entity_count = count;
        Ok(())
    }

    /// Add a connection.
    ///
    /// Both endpoints must exist, the target must accept input, the source
    /// must have output and the two must differ. The connection must leave
    /// from one of the source's output ports and enter the target's input
    /// port. The graph is untouched when any check fails.
    pub fn add_connection(&mut self, connection: Connection) -> Result<ConnectionId, ConnectionError> {
        let source = self
            .nodes
            .get(&connection.from_node_id)
            .ok_or_else(|| ConnectionError::NodeNotFound(connection.from_node_id.clone()))?;
        let target = self
            .nodes
            .get(&connection.to_node_id)
            .ok_or_else(|| ConnectionError::NodeNotFound(connection.to_node_id.clone()))?;

        if connection.from_node_id == connection.to_node_id {
            return Err(ConnectionError::SelfLoop);
        }
        if !port::has_input(target.kind) {
            return Err(ConnectionError::TargetIsTrigger);
        }
        if !port::has_output(source.kind) {
            return Err(ConnectionError::SourceIsExit);
        }
        if !source.has_output(&connection.from_port) {
            return Err(ConnectionError::UnknownPort {
                node: connection.from_node_id.clone(),
                port: connection.from_port.clone(),
            });
        }
        if connection.to_port != PortId::input() {
            return Err(ConnectionError::UnknownPort {
                node: connection.to_node_id.clone(),
                port: connection.to_port.clone(),
            });
        }

        let mut connection = connection;
        if self.connections.contains_key(&connection.id) {
            connection.id = ConnectionId::new();
        }
        let id = connection.id.clone();
        self.connections.insert(id.clone(), connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        let removed = self.connections.shift_remove(connection_id)?;
        if self.selection.connection() == Some(connection_id) {
            self.selection = Selection::None;
        }
        Some(removed)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Connections leaving a node, in stored order
    pub fn outgoing<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| &c.from_node_id == node_id)
    }

    /// Connections entering a node
    pub fn incoming<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| &c.to_node_id == node_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a>(
        &'a self,
        node_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select a node, or clear the selection with `None`.
    ///
    /// Returns false, leaving the selection alone, if the node does not exist.
    pub fn select_node(&mut self, node_id: Option<NodeId>) -> bool {
        match node_id {
            Some(id) if !self.nodes.contains_key(&id) => false,
            Some(id) => {
                self.selection = Selection::Node(id);
                true
            }
            None => {
                self.selection = Selection::None;
                true
            }
        }
    }

    /// Select a connection, or clear the selection with `None`
    pub fn select_connection(&mut self, connection_id: Option<ConnectionId>) -> bool {
        match connection_id {
            Some(id) if !self.connections.contains_key(&id) => false,
            Some(id) => {
                self.selection = Selection::Connection(id);
                true
            }
            None => {
                self.selection = Selection::None;
                true
            }
        }
    }

    /// Clear selection
    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Delete whatever is selected. Returns true if something was removed.
    pub fn delete_selected(&mut self) -> bool {
        match std::mem::take(&mut self.selection) {
            Selection::None => false,
            Selection::Node(id) => self.remove_node(&id).is_some(),
            Selection::Connection(id) => self.remove_connection(&id).is_some(),
        }
    }

    /// Canvas-space bounding box of every node body
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .values()
            .map(port::node_rect)
            .reduce(|acc, rect| acc.union(rect))
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Trigger nodes have no input port
    #[error("Trigger nodes cannot be connection targets")]
    TargetIsTrigger,

    /// Exit nodes have no output port
    #[error("Exit nodes cannot be connection sources")]
    SourceIsExit,

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// The port does not exist on the node
    #[error("Node {node} has no port {port}")]
    UnknownPort {
        /// Node the port was looked up on
        node: NodeId,
        /// Missing port
        port: PortId,
    },
}

/// Error when editing a node's fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeEditError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Entity counts only apply to stages
    #[error("Node {0} is not a stage")]
    NotAStage(NodeId),
}
