// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test-mode traversal of a workflow.
//!
//! A run starts at a trigger and follows connections one step at a time,
//! always taking the first outgoing connection in stored order. Nothing is
//! evaluated: a condition node does not look at the test entity, so a run
//! previews the graph's shape rather than what a real entity would do.

use crate::connection::ConnectionId;
use crate::document::WorkflowType;
use crate::graph::WorkflowGraph;
use crate::node::{NodeId, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    /// No run in progress
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// The run finished
    Complete,
}

/// Why a run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// An exit node was reached
    ReachedExit,
    /// A non-exit node had no outgoing connections
    DeadEnd,
    /// The current node was deleted during the run
    NodeRemoved,
    /// Auto-run hit its step limit
    StepLimit,
}

impl CompletionReason {
    /// Log text of the terminal entry
    pub fn message(&self) -> &'static str {
        match self {
            CompletionReason::ReachedExit => "Workflow complete: reached exit node",
            CompletionReason::DeadEnd => "Workflow ended: no outgoing connections",
            CompletionReason::NodeRemoved => "Workflow ended: node removed",
            CompletionReason::StepLimit => "Workflow stopped: step limit reached",
        }
    }
}

/// One line of the step log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntry {
    /// Position in the log
    pub index: usize,
    /// Node the entry is about
    pub node_id: NodeId,
    /// Label of that node when the entry was written
    pub node_label: String,
    /// Kind of that node
    pub node_kind: NodeKind,
    /// What happened
    pub action: String,
    /// Label of the connection taken to get here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Result of a single `step` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved along a connection; the run continues
    Advanced,
    /// The run finished on this step
    Completed(CompletionReason),
    /// No run in progress, nothing happened
    Inactive,
}

/// The sample entity pushed through a test run.
///
/// Attributes are shown to the user but never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntity {
    /// Display name
    pub label: String,
    /// Free-form attributes (lead score, deal value, ...)
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
}

impl TestEntity {
    /// Entity with no attributes
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Sample entity for a kind of workflow
    pub fn sample(workflow_type: WorkflowType) -> Self {
        let (label, attributes): (&str, [(&str, serde_json::Value); 2]) = match workflow_type {
            WorkflowType::Sales => (
                "Acme Corp",
                [("leadScore", 75.into()), ("dealValue", 50_000.into())],
            ),
            WorkflowType::Onboarding => (
                "New Customer",
                [("plan", "growth".into()), ("seats", 25.into())],
            ),
            WorkflowType::Support => (
                "Ticket #1042",
                [("severity", "high".into()), ("category", "billing".into())],
            ),
            WorkflowType::Engagement => (
                "Existing Account",
                [("healthScore", 62.into()), ("daysSinceContact", 30.into())],
            ),
        };
        Self {
            label: label.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// One-line description, e.g. `Acme Corp (leadScore: 75, dealValue: 50000)`
    pub fn summary(&self) -> String {
        if self.attributes.is_empty() {
            return self.label.clone();
        }
        let attributes: Vec<String> = self
            .attributes
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(text) => format!("{key}: {text}"),
                other => format!("{key}: {other}"),
            })
            .collect();
        format!("{} ({})", self.label, attributes.join(", "))
    }
}

/// A test run over a workflow graph
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    state: SimulationState,
    entity: Option<TestEntity>,
    current: Option<NodeId>,
    log: Vec<StepEntry>,
    visited: Vec<NodeId>,
    traversed: Vec<ConnectionId>,
    completion: Option<CompletionReason>,
}

impl Simulation {
    /// Create an idle simulation
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// Node the run is currently at
    pub fn current_node(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    /// Step log of the current run
    pub fn log(&self) -> &[StepEntry] {
        &self.log
    }

    /// Entity of the current run
    pub fn entity(&self) -> Option<&TestEntity> {
        self.entity.as_ref()
    }

    /// Nodes visited so far, in order
    pub fn visited(&self) -> &[NodeId] {
        &self.visited
    }

    /// Connections taken so far, in order
    pub fn traversed_connections(&self) -> &[ConnectionId] {
        &self.traversed
    }

    /// Why the run finished, once complete
    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// Start a run at `trigger_id` with an entity of the given name
    pub fn start(
        &mut self,
        graph: &WorkflowGraph,
        trigger_id: &NodeId,
        entity_label: impl Into<String>,
    ) -> Result<(), SimulationError> {
        self.start_with_entity(graph, trigger_id, TestEntity::new(entity_label))
    }

    /// Start a run at `trigger_id`. Any previous run is discarded.
    pub fn start_with_entity(
        &mut self,
        graph: &WorkflowGraph,
        trigger_id: &NodeId,
        entity: TestEntity,
    ) -> Result<(), SimulationError> {
        let trigger = graph
            .node(trigger_id)
            .ok_or_else(|| SimulationError::NodeNotFound(trigger_id.clone()))?;
        if trigger.kind != NodeKind::Trigger {
            return Err(SimulationError::NotATrigger(trigger_id.clone()));
        }

        self.reset();
        self.log.push(StepEntry {
            index: 0,
            node_id: trigger.id.clone(),
            node_label: trigger.label.clone(),
            node_kind: trigger.kind,
            action: format!("{} entered workflow", entity.label),
            result: None,
        });
        self.visited.push(trigger.id.clone());
        self.current = Some(trigger.id.clone());
        self.state = SimulationState::Running;
        tracing::info!(trigger = %trigger.id, entity = %entity.label, "simulation started");
        self.entity = Some(entity);
        Ok(())
    }

    /// Advance the run by one connection
    pub fn step(&mut self, graph: &WorkflowGraph) -> StepOutcome {
        if self.state != SimulationState::Running {
            return StepOutcome::Inactive;
        }
        let Some(current_id) = self.current.clone() else {
            return StepOutcome::Inactive;
        };
        let Some(current) = graph.node(&current_id) else {
            return self.finish(CompletionReason::NodeRemoved);
        };

        let Some(connection) = graph.outgoing(&current_id).next() else {
            let reason = if current.kind == NodeKind::Exit {
                CompletionReason::ReachedExit
            } else {
                CompletionReason::DeadEnd
            };
            return self.finish(reason);
        };

        let Some(target) = graph.node(&connection.to_node_id) else {
            return self.finish(CompletionReason::NodeRemoved);
        };

        let label = &target.label;
        let action = match target.kind {
            NodeKind::Trigger => format!("Triggered {label}"),
            NodeKind::Stage => format!("Moved to stage {label}"),
            NodeKind::Condition => format!("Evaluating condition {label}"),
            NodeKind::AiAction => format!("AI Action {label} would execute"),
            NodeKind::HumanAction => format!("Task {label} would be created"),
            NodeKind::Exit => format!("Reached exit {label}"),
        };
        tracing::debug!(from = %current_id, to = %target.id, "simulation step");

        self.log.push(StepEntry {
            index: self.log.len(),
            node_id: target.id.clone(),
            node_label: target.label.clone(),
            node_kind: target.kind,
            action,
            result: connection.label.clone(),
        });
        self.visited.push(target.id.clone());
        self.traversed.push(connection.id.clone());
        self.current = Some(target.id.clone());

        if target.kind == NodeKind::Exit {
            self.complete(CompletionReason::ReachedExit);
            return StepOutcome::Completed(CompletionReason::ReachedExit);
        }
        StepOutcome::Advanced
    }

    /// Step until the run completes or `max_steps` steps were taken.
    ///
    /// Hitting the limit ends the run with a step-limit entry. Returns the
    /// number of `step` calls made.
    pub fn run_to_completion(&mut self, graph: &WorkflowGraph, max_steps: usize) -> usize {
        let mut steps = 0;
        while self.is_running() {
            if steps >= max_steps {
                self.finish(CompletionReason::StepLimit);
                break;
            }
            self.step(graph);
            steps += 1;
        }
        steps
    }

    /// Discard the run and return to idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Write a terminal entry and complete
    fn finish(&mut self, reason: CompletionReason) -> StepOutcome {
        if let Some(last) = self.log.last() {
            let entry = StepEntry {
                index: self.log.len(),
                node_id: last.node_id.clone(),
                node_label: last.node_label.clone(),
                node_kind: last.node_kind,
                action: reason.message().to_string(),
                result: None,
            };
            self.log.push(entry);
        }
        self.complete(reason);
        StepOutcome::Completed(reason)
    }

    fn complete(&mut self, reason: CompletionReason) {
        self.state = SimulationState::Complete;
        self.completion = Some(reason);
        tracing::info!(?reason, steps = self.log.len(), "simulation complete");
    }
}

/// Paces `Simulation::step` calls for auto-run.
///
/// Time is accumulated per tick and one step is taken per elapsed interval, so
/// the log is the same as stepping by hand.
#[derive(Debug, Clone)]
pub struct AutoRun {
    interval: Duration,
    accumulated: Duration,
    max_steps: usize,
    steps_taken: usize,
}

impl AutoRun {
    /// Create a driver taking one step per `interval`
    pub fn new(interval: Duration, max_steps: usize) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            max_steps,
            steps_taken: 0,
        }
    }

    /// Steps taken so far
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Feed elapsed time; returns how many steps were taken
    pub fn tick(&mut self, simulation: &mut Simulation, graph: &WorkflowGraph, elapsed: Duration) -> usize {
        if !simulation.is_running() {
            return 0;
        }
        self.accumulated += elapsed;

        let mut steps = 0;
        while simulation.is_running() && self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            if self.steps_taken >= self.max_steps {
                simulation.finish(CompletionReason::StepLimit);
                break;
            }
            simulation.step(graph);
            self.steps_taken += 1;
            steps += 1;
        }
        if !simulation.is_running() {
            self.accumulated = Duration::ZERO;
        }
        steps
    }
}

/// Error when starting a run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Runs must start at a trigger
    #[error("Node {0} is not a trigger")]
    NotATrigger(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::node::Node;
    use crate::port::PortId;

    fn linear() -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::new(NodeKind::Trigger, "A").with_id("a"));
        let b = graph.add_node(Node::new(NodeKind::Stage, "B").with_id("b").with_position(300.0, 0.0));
        let c = graph.add_node(Node::new(NodeKind::Exit, "C").with_id("c").with_position(600.0, 0.0));
        graph
            .add_connection(Connection::new(a, PortId::default_output(), b.clone()))
            .unwrap();
        graph
            .add_connection(Connection::new(b, PortId::default_output(), c).with_label("done"))
            .unwrap();
        graph
    }

    #[test]
    fn linear_chain_reaches_exit() {
        let graph = linear();
        let mut sim = Simulation::new();
        sim.start(&graph, &NodeId::from("a"), "Acme").unwrap();
        assert_eq!(sim.state(), SimulationState::Running);
        assert_eq!(sim.step(&graph), StepOutcome::Advanced);
        assert_eq!(
            sim.step(&graph),
            StepOutcome::Completed(CompletionReason::ReachedExit)
        );

        let actions: Vec<_> = sim.log().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["Acme entered workflow", "Moved to stage B", "Reached exit C"]);
        assert_eq!(sim.log()[2].result.as_deref(), Some("done"));
        assert_eq!(sim.state(), SimulationState::Complete);
        assert_eq!(sim.traversed_connections().len(), 2);
        assert_eq!(sim.step(&graph), StepOutcome::Inactive);
        assert_eq!(sim.log().len(), 3);
    }

    #[test]
    fn dead_end_is_distinct_from_exit() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::new(NodeKind::Trigger, "A"));
        let mut sim = Simulation::new();
        sim.start(&graph, &a, "Lead").unwrap();
        assert_eq!(sim.step(&graph), StepOutcome::Completed(CompletionReason::DeadEnd));
        assert_eq!(sim.log().len(), 2);
        assert_eq!(sim.log()[1].action, CompletionReason::DeadEnd.message());
        assert_ne!(
            CompletionReason::DeadEnd.message(),
            CompletionReason::ReachedExit.message()
        );
    }

    #[test]
    fn start_requires_trigger() {
        let graph = linear();
        let mut sim = Simulation::new();
        assert_eq!(
            sim.start(&graph, &NodeId::from("b"), "x"),
            Err(SimulationError::NotATrigger(NodeId::from("b")))
        );
        assert_eq!(
            sim.start(&graph, &NodeId::from("zz"), "x"),
            Err(SimulationError::NodeNotFound(NodeId::from("zz")))
        );
        assert_eq!(sim.state(), SimulationState::Idle);
    }

    #[test]
    fn first_connection_wins_on_conditions() {
        let mut graph = WorkflowGraph::new();
        let t = graph.add_node(Node::new(NodeKind::Trigger, "T"));
        let c = graph.add_node(Node::new(NodeKind::Condition, "Score"));
        let hot = graph.add_node(Node::new(NodeKind::AiAction, "Draft email"));
        let cold = graph.add_node(Node::new(NodeKind::HumanAction, "Call"));
        graph.add_connection(Connection::new(t.clone(), PortId::default_output(), c.clone())).unwrap();
        graph
            .add_connection(Connection::new(c.clone(), PortId::from("no"), cold).with_label("No"))
            .unwrap();
        graph
            .add_connection(Connection::new(c, PortId::from("yes"), hot).with_label("Yes"))
            .unwrap();

        let mut sim = Simulation::new();
        sim.start_with_entity(&graph, &t, TestEntity::sample(WorkflowType::Sales)).unwrap();
        sim.step(&graph);
        sim.step(&graph);
        let last = sim.log().last().unwrap();
        assert_eq!(last.action, "Task Call would be created");
        assert_eq!(last.result.as_deref(), Some("No"));
        assert_eq!(sim.log()[1].action, "Evaluating condition Score");
    }

    #[test]
    fn entity_summary_lists_attributes() {
        assert_eq!(TestEntity::new("Acme Corp").summary(), "Acme Corp");
        assert_eq!(
            TestEntity::sample(WorkflowType::Onboarding).summary(),
            "New Customer (plan: growth, seats: 25)"
        );
        assert_eq!(
            TestEntity::sample(WorkflowType::Support).summary(),
            "Ticket #1042 (severity: high, category: billing)"
        );
    }

    #[test]
    fn reset_discards_run() {
        let graph = linear();
        let mut sim = Simulation::new();
        sim.start(&graph, &NodeId::from("a"), "Acme").unwrap();
        sim.step(&graph);
        sim.reset();
        assert_eq!(sim.state(), SimulationState::Idle);
        assert!(sim.log().is_empty());
        assert!(sim.current_node().is_none());
    }

    #[test]
    fn auto_run_matches_manual_log() {
        let graph = linear();
        let mut manual = Simulation::new();
        manual.start(&graph, &NodeId::from("a"), "Acme").unwrap();
        while manual.is_running() {
            manual.step(&graph);
        }

        let mut auto = Simulation::new();
        auto.start(&graph, &NodeId::from("a"), "Acme").unwrap();
        let mut driver = AutoRun::new(Duration::from_millis(500), 100);
        assert_eq!(driver.tick(&mut auto, &graph, Duration::from_millis(300)), 0);
        assert_eq!(driver.tick(&mut auto, &graph, Duration::from_millis(300)), 1);
        driver.tick(&mut auto, &graph, Duration::from_secs(10));

        assert_eq!(auto.state(), SimulationState::Complete);
        assert_eq!(manual.log(), auto.log());
    }

    #[test]
    fn cycles_stop_at_step_limit() {
        let mut graph = WorkflowGraph::new();
        let t = graph.add_node(Node::new(NodeKind::Trigger, "T"));
        let a = graph.add_node(Node::new(NodeKind::Stage, "A"));
        let b = graph.add_node(Node::new(NodeKind::Stage, "B"));
        graph.add_connection(Connection::new(t.clone(), PortId::default_output(), a.clone())).unwrap();
        graph.add_connection(Connection::new(a.clone(), PortId::default_output(), b.clone())).unwrap();
        graph.add_connection(Connection::new(b, PortId::default_output(), a)).unwrap();

        let mut sim = Simulation::new();
        sim.start(&graph, &t, "Loop").unwrap();
        let steps = sim.run_to_completion(&graph, 10);
        assert_eq!(steps, 10);
        assert_eq!(sim.completion(), Some(CompletionReason::StepLimit));
        assert_eq!(sim.log().len(), 12);
    }

    #[test]
    fn deleted_current_node_ends_run() {
        let mut graph = linear();
        let mut sim = Simulation::new();
        sim.start(&graph, &NodeId::from("a"), "Acme").unwrap();
        sim.step(&graph);
        graph.remove_node(&NodeId::from("b"));
        assert_eq!(
            sim.step(&graph),
            StepOutcome::Completed(CompletionReason::NodeRemoved)
        );
    }
}
