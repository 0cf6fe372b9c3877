// SPDX-License-Identifier: MIT OR Apache-2.0
//! Support ticket triage.

use super::StarterBuilder;
use crate::document::{WorkflowDocument, WorkflowType};
use crate::node::{NodeConfig, NodeKind};
use crate::palette::NodeTemplate;
use crate::port::OutputPort;

fn severity_outputs() -> NodeConfig {
    NodeConfig::with_outputs(vec![
        OutputPort::new("critical", "Critical", "red"),
        OutputPort::new("high", "High", "orange"),
        OutputPort::new("normal", "Normal", "gray"),
    ])
}

/// Support toolbox presets
pub fn presets() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate::new(NodeKind::Trigger).with_label("Ticket Created"),
        NodeTemplate::new(NodeKind::Condition)
            .with_label("Severity")
            .with_config(severity_outputs()),
        NodeTemplate::new(NodeKind::HumanAction).with_label("Escalate to Engineer"),
        NodeTemplate::new(NodeKind::Exit).with_label("Resolved"),
    ]
}

/// Starter support workflow
pub fn starter() -> WorkflowDocument {
    let mut b = StarterBuilder::new("Ticket Triage", WorkflowType::Support);
    let created = b.node("created", NodeTemplate::new(NodeKind::Trigger).with_label("Ticket Created"), 0, 1);
    let severity = b.node(
        "severity",
        NodeTemplate::new(NodeKind::Condition)
            .with_label("Severity")
            .with_config(severity_outputs()),
        1,
        1,
    );
    let escalate = b.node("escalate", NodeTemplate::new(NodeKind::HumanAction).with_label("Escalate"), 2, 0);
    let assign = b.node("assign", NodeTemplate::new(NodeKind::Stage).with_label("Assigned"), 2, 1);
    let answer = b.node("answer", NodeTemplate::new(NodeKind::AiAction).with_label("Suggest Answer"), 2, 2);
    let resolved = b.node("resolved", NodeTemplate::new(NodeKind::Exit).with_label("Resolved"), 3, 1);

    b.connect(&created, "default", &severity, None);
    b.connect(&severity, "critical", &escalate, Some("Critical"));
    b.connect(&severity, "high", &assign, Some("High"));
    b.connect(&severity, "normal", &answer, Some("Normal"));
    b.connect(&escalate, "default", &resolved, None);
    b.connect(&assign, "default", &resolved, None);
    b.connect(&answer, "default", &resolved, None);
    b.build()
}
