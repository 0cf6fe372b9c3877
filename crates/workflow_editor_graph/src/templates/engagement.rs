// SPDX-License-Identifier: MIT OR Apache-2.0
//! Account engagement and renewal.

use super::StarterBuilder;
use crate::document::{WorkflowDocument, WorkflowType};
use crate::node::NodeKind;
use crate::palette::NodeTemplate;

/// Engagement toolbox presets
pub fn presets() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate::new(NodeKind::Trigger).with_label("Health Score Dropped"),
        NodeTemplate::new(NodeKind::AiAction).with_label("Generate Check-in"),
        NodeTemplate::new(NodeKind::Stage).with_label("At Risk"),
    ]
}

/// Starter engagement workflow
pub fn starter() -> WorkflowDocument {
    let mut b = StarterBuilder::new("Account Health", WorkflowType::Engagement);
    let dropped = b.node("dropped", NodeTemplate::new(NodeKind::Trigger).with_label("Health Score Dropped"), 0, 0);
    let healthy = b.node("healthy", NodeTemplate::new(NodeKind::Condition).with_label("Score Above 50"), 1, 0);
    let checkin = b.node("checkin", NodeTemplate::new(NodeKind::AiAction).with_label("Generate Check-in"), 2, 0);
    let at_risk = b.node("at-risk", NodeTemplate::new(NodeKind::Stage).with_label("At Risk"), 2, 1);
    let csm = b.node("csm", NodeTemplate::new(NodeKind::HumanAction).with_label("CSM Outreach"), 3, 1);
    let retained = b.node("retained", NodeTemplate::new(NodeKind::Exit).with_label("Retained"), 4, 0);

    b.connect(&dropped, "default", &healthy, None);
    b.connect(&healthy, "yes", &checkin, Some("Yes"));
    b.connect(&healthy, "no", &at_risk, Some("No"));
    b.connect(&checkin, "default", &retained, None);
    b.connect(&at_risk, "default", &csm, None);
    b.connect(&csm, "default", &retained, None);
    b.build()
}
