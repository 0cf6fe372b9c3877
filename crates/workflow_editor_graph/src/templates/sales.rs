// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sales pipeline: lead to closed deal.

use super::StarterBuilder;
use crate::document::{WorkflowDocument, WorkflowType};
use crate::node::{NodeConfig, NodeKind};
use crate::palette::NodeTemplate;
use crate::port::OutputPort;

/// Sales toolbox presets
pub fn presets() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate::new(NodeKind::Trigger).with_label("New Lead"),
        NodeTemplate::new(NodeKind::Stage).with_label("Qualified"),
        NodeTemplate::new(NodeKind::Stage).with_label("Proposal Sent"),
        NodeTemplate::new(NodeKind::Condition)
            .with_label("Deal Size")
            .with_config(NodeConfig::with_outputs(vec![
                OutputPort::new("enterprise", "Enterprise", "purple"),
                OutputPort::new("mid-market", "Mid-market", "blue"),
                OutputPort::new("smb", "SMB", "green"),
            ])),
        NodeTemplate::new(NodeKind::AiAction).with_label("Draft Follow-up"),
        NodeTemplate::new(NodeKind::Exit).with_label("Closed Won"),
    ]
}

/// Starter sales workflow
pub fn starter() -> WorkflowDocument {
    let mut b = StarterBuilder::new("Sales Pipeline", WorkflowType::Sales);
    let lead = b.node("lead", NodeTemplate::new(NodeKind::Trigger).with_label("New Lead"), 0, 0);
    let qualify = b.node("qualify", NodeTemplate::new(NodeKind::Condition).with_label("Lead Score > 70"), 1, 0);
    let demo = b.node("demo", NodeTemplate::new(NodeKind::Stage).with_label("Demo Scheduled"), 2, 0);
    let nurture = b.node("nurture", NodeTemplate::new(NodeKind::AiAction).with_label("Nurture Sequence"), 2, 1);
    let call = b.node("call", NodeTemplate::new(NodeKind::HumanAction).with_label("Discovery Call"), 3, 0);
    let won = b.node("won", NodeTemplate::new(NodeKind::Exit).with_label("Closed Won"), 4, 0);

    b.connect(&lead, "default", &qualify, None);
    b.connect(&qualify, "yes", &demo, Some("Yes"));
    b.connect(&qualify, "no", &nurture, Some("No"));
    b.connect(&demo, "default", &call, None);
    b.connect(&call, "default", &won, None);
    b.connect(&nurture, "default", &qualify, Some("Re-score"));
    b.build()
}
