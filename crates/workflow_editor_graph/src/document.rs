// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted workflow documents.
//!
//! The document is what a save/publish call sends and what the editor is
//! loaded from: workflow metadata plus the node and connection lists. Viewport
//! and selection are session state and never persisted.

use crate::connection::{Connection, ConnectionId};
use crate::graph::{ConnectionError, WorkflowGraph};
use crate::node::Node;
use crate::palette::NodeTemplate;
use serde::{Deserialize, Serialize};

/// Business process a workflow models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowType {
    /// Lead to close
    #[default]
    Sales,
    /// New customer setup
    Onboarding,
    /// Ticket handling
    Support,
    /// Account nurturing
    Engagement,
}

impl WorkflowType {
    /// Get display name for this workflow type
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowType::Sales => "Sales",
            WorkflowType::Onboarding => "Onboarding",
            WorkflowType::Support => "Support",
            WorkflowType::Engagement => "Engagement",
        }
    }

    /// Get all workflow types
    pub fn all() -> &'static [WorkflowType] {
        &[
            WorkflowType::Sales,
            WorkflowType::Onboarding,
            WorkflowType::Support,
            WorkflowType::Engagement,
        ]
    }
}

/// A workflow as loaded from and saved to the store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    /// Store id, absent for unsaved workflows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Workflow name
    #[serde(default)]
    pub name: String,
    /// Free text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind of process
    #[serde(default)]
    pub workflow_type: WorkflowType,
    /// Nodes, order insignificant
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Connections, order insignificant
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// What happened while building a graph from a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Nodes inserted
    pub nodes_loaded: usize,
    /// Connections inserted
    pub connections_loaded: usize,
    /// Connections dropped, with the reason
    pub rejected: Vec<(ConnectionId, ConnectionError)>,
}

impl LoadReport {
    /// Whether every connection made it into the graph
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl WorkflowDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>, workflow_type: WorkflowType) -> Self {
        Self {
            name: name.into(),
            workflow_type,
            ..Self::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a graph through the regular mutation API.
    ///
    /// Nodes go in first so connection order does not matter. Connections
    /// that break a graph invariant are dropped and reported.
    pub fn to_graph(&self) -> (WorkflowGraph, LoadReport) {
        let mut graph = WorkflowGraph::new();
        let mut report = LoadReport::default();

        for node in &self.nodes {
            graph.add_node(node.clone());
            report.nodes_loaded += 1;
        }
        for connection in &self.connections {
            match graph.add_connection(connection.clone()) {
                Ok(_) => report.connections_loaded += 1,
                Err(err) => {
                    tracing::warn!(connection = %connection.id, %err, "dropping invalid connection");
                    report.rejected.push((connection.id.clone(), err));
                }
            }
        }

        (graph, report)
    }

    /// Replace the node and connection lists with the graph's contents
    pub fn set_graph(&mut self, graph: &WorkflowGraph) {
        self.nodes = graph.nodes().cloned().collect();
        self.connections = graph.connections().cloned().collect();
    }

    /// Copy of this document carrying the graph's contents
    pub fn with_graph(mut self, graph: &WorkflowGraph) -> Self {
        self.set_graph(graph);
        self
    }
}

/// Parse the payload of a toolbox drag-and-drop
pub fn parse_drop_payload(payload: &str) -> Result<NodeTemplate, DocumentError> {
    if payload.trim().is_empty() {
        return Err(DocumentError::EmptyPayload);
    }
    Ok(serde_json::from_str(payload)?)
}

/// Error reading or writing documents and payloads
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing was dropped
    #[error("Empty drop payload")]
    EmptyPayload,
}
