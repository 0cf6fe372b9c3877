// SPDX-License-Identifier: MIT OR Apache-2.0
//! Customer onboarding.

use super::StarterBuilder;
use crate::document::{WorkflowDocument, WorkflowType};
use crate::node::NodeKind;
use crate::palette::NodeTemplate;

/// Onboarding toolbox presets
pub fn presets() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate::new(NodeKind::Trigger).with_label("Contract Signed"),
        NodeTemplate::new(NodeKind::Stage).with_label("Kickoff"),
        NodeTemplate::new(NodeKind::HumanAction).with_label("Schedule Training"),
        NodeTemplate::new(NodeKind::AiAction).with_label("Send Welcome Kit"),
    ]
}

/// Starter onboarding workflow
pub fn starter() -> WorkflowDocument {
    let mut b = StarterBuilder::new("Customer Onboarding", WorkflowType::Onboarding);
    let signed = b.node("signed", NodeTemplate::new(NodeKind::Trigger).with_label("Contract Signed"), 0, 0);
    let welcome = b.node("welcome", NodeTemplate::new(NodeKind::AiAction).with_label("Send Welcome Kit"), 1, 0);
    let kickoff = b.node("kickoff", NodeTemplate::new(NodeKind::Stage).with_label("Kickoff"), 2, 0);
    let training = b.node("training", NodeTemplate::new(NodeKind::HumanAction).with_label("Schedule Training"), 3, 0);
    let live = b.node("live", NodeTemplate::new(NodeKind::Exit).with_label("Live"), 4, 0);

    b.connect(&signed, "default", &welcome, None);
    b.connect(&welcome, "default", &kickoff, None);
    b.connect(&kickoff, "default", &training, None);
    b.connect(&training, "default", &live, None);
    b.build()
}
