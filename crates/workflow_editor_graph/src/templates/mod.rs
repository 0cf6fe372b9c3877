// SPDX-License-Identifier: MIT OR Apache-2.0
//! Starter workflows and toolbox presets per workflow type.

pub mod engagement;
pub mod onboarding;
pub mod sales;
pub mod support;

use crate::connection::Connection;
use crate::document::{WorkflowDocument, WorkflowType};
use crate::node::{Node, NodeId};
use crate::palette::NodeTemplate;
use crate::port::PortId;
use egui::Pos2;

/// Horizontal distance between columns of a starter layout
pub const COLUMN_SPACING: f32 = 240.0;
/// Vertical distance between rows of a starter layout
pub const ROW_SPACING: f32 = 168.0;

/// Toolbox presets for a workflow type
pub fn presets(workflow_type: WorkflowType) -> Vec<NodeTemplate> {
    match workflow_type {
        WorkflowType::Sales => sales::presets(),
        WorkflowType::Onboarding => onboarding::presets(),
        WorkflowType::Support => support::presets(),
        WorkflowType::Engagement => engagement::presets(),
    }
}

/// Starter workflow for a workflow type
pub fn starter(workflow_type: WorkflowType) -> WorkflowDocument {
    match workflow_type {
        WorkflowType::Sales => sales::starter(),
        WorkflowType::Onboarding => onboarding::starter(),
        WorkflowType::Support => support::starter(),
        WorkflowType::Engagement => engagement::starter(),
    }
}

/// Lays nodes out on a column/row grid and wires them up
pub(crate) struct StarterBuilder {
    document: WorkflowDocument,
}

impl StarterBuilder {
    pub(crate) fn new(name: &str, workflow_type: WorkflowType) -> Self {
        Self {
            document: WorkflowDocument::new(name, workflow_type),
        }
    }

    /// Place a template at a grid cell and return the node id
    pub(crate) fn node(&mut self, id: &str, template: NodeTemplate, column: u8, row: u8) -> NodeId {
        let position = Pos2::new(
            96.0 + f32::from(column) * COLUMN_SPACING,
            96.0 + f32::from(row) * ROW_SPACING,
        );
        let node: Node = template.instantiate(position).with_id(id);
        let node_id = node.id.clone();
        self.document.nodes.push(node);
        node_id
    }

    /// Connect two nodes from the given output port
    pub(crate) fn connect(&mut self, from: &NodeId, port: &str, to: &NodeId, label: Option<&str>) {
        let id = format!("{from}-{port}-{to}");
        let mut connection = Connection::new(from.clone(), PortId::from(port), to.clone()).with_id(id.as_str());
        connection.label = label.map(str::to_string);
        self.document.connections.push(connection);
    }

    pub(crate) fn build(self) -> WorkflowDocument {
        self.document
    }
}
