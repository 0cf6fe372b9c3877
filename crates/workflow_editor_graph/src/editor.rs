// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor session: graph, viewport, gestures and test runs together.
//!
//! This is the surface an editor shell talks to. Every method is synchronous
//! and touches nothing but in-memory state, so it is safe to call from the
//! middle of a save or publish flow.

use crate::connection::{ConnectionId, ConnectionStyle};
use crate::document::{self, LoadReport, WorkflowDocument};
use crate::gesture::{GestureController, PointerCapture, PointerTarget};
use crate::graph::{Selection, WorkflowGraph};
use crate::node::NodeId;
use crate::palette::{NodePalette, NodeTemplate};
use crate::port::{self, ResolvedPort};
use crate::routing::{self, ConnectionPath};
use crate::settings::EditorSettings;
use crate::simulation::{AutoRun, Simulation, SimulationError, StepOutcome, TestEntity};
use crate::viewport::{snap_to_grid, Viewport};
use egui::{Pos2, Vec2};
use std::time::Duration;

/// Pick radius around port anchors, canvas units
pub const PORT_HIT_RADIUS: f32 = 10.0;
/// Pick distance from connection curves, screen pixels
pub const CONNECTION_HIT_DISTANCE: f32 = 6.0;
/// Horizontal gap between an applied suggestion and the rightmost node
pub const SUGGESTION_SPACING: f32 = 240.0;
/// Where the first node of an empty graph goes
pub const FIRST_SLOT: Pos2 = Pos2::new(96.0, 96.0);

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Cancel gesture and clear selection
    Escape,
    /// Delete selection
    Delete,
    /// Delete selection
    Backspace,
}

/// A connection ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnection {
    /// Connection id
    pub id: ConnectionId,
    /// Canvas-space geometry
    pub path: ConnectionPath,
    /// Label chip text
    pub label: Option<String>,
    /// Stroke color
    pub color: Option<String>,
    /// Stroke style
    pub style: ConnectionStyle,
    /// Whether it is selected
    pub selected: bool,
    /// Whether the current test run went through it
    pub traversed: bool,
}

/// An editing session over one workflow
#[derive(Debug)]
pub struct WorkflowEditor {
    document: WorkflowDocument,
    graph: WorkflowGraph,
    viewport: Viewport,
    gestures: GestureController,
    simulation: Simulation,
    auto_run: Option<AutoRun>,
    palette: NodePalette,
    settings: EditorSettings,
}

impl WorkflowEditor {
    /// Open a document. Invalid connections are dropped and reported.
    pub fn open(document: WorkflowDocument, settings: EditorSettings) -> (Self, LoadReport) {
        let (graph, report) = document.to_graph();
        let palette = NodePalette::for_workflow(document.workflow_type);
        let gestures = GestureController::default().with_grid_size(settings.grid_size);
        let meta = WorkflowDocument {
            nodes: Vec::new(),
            connections: Vec::new(),
            ..document
        };
        let editor = Self {
            document: meta,
            graph,
            viewport: Viewport::new(),
            gestures,
            simulation: Simulation::new(),
            auto_run: None,
            palette,
            settings,
        };
        (editor, report)
    }

    /// Use a host pointer-capture hook for gestures
    pub fn with_pointer_capture(mut self, capture: Box<dyn PointerCapture>) -> Self {
        self.gestures = GestureController::new(capture).with_grid_size(self.settings.grid_size);
        self
    }

    /// Snapshot for save/publish
    pub fn to_document(&self) -> WorkflowDocument {
        self.document.clone().with_graph(&self.graph)
    }

    /// Workflow name
    pub fn name(&self) -> &str {
        &self.document.name
    }

    /// Rename the workflow
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
    }

    /// The graph
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// The graph, for field edits
    pub fn graph_mut(&mut self) -> &mut WorkflowGraph {
        &mut self.graph
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        self.graph.selection()
    }

    /// The viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The viewport, for zoom buttons and container layout
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Toolbox entries for this workflow
    pub fn palette(&self) -> &NodePalette {
        &self.palette
    }

    /// Settings in effect
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Gesture state
    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    /// Test run state
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    // ---------------------------------------------------------------------
    // Pointer and keyboard
    // ---------------------------------------------------------------------

    /// What lies under a screen position. Ports win over node bodies, node
    /// bodies over connections; later nodes are on top.
    pub fn hit_test(&self, screen: Pos2) -> PointerTarget {
        let canvas = self.viewport.screen_to_canvas(screen);
        let nodes: Vec<_> = self.graph.nodes().collect();

        for node in nodes.iter().rev() {
            for resolved in port::resolve_outputs(node) {
                if resolved.anchor.distance(canvas) <= PORT_HIT_RADIUS {
                    return PointerTarget::OutputPort(node.id.clone(), resolved.port.id);
                }
            }
            if let Some(anchor) = port::input_anchor(node) {
                if anchor.distance(canvas) <= PORT_HIT_RADIUS {
                    return PointerTarget::InputPort(node.id.clone());
                }
            }
        }

        if let Some(node) = nodes.iter().rev().find(|n| port::node_rect(n).contains(canvas)) {
            return PointerTarget::Node(node.id.clone());
        }

        let tolerance = CONNECTION_HIT_DISTANCE / self.viewport.zoom();
        for connection in self.graph.connections() {
            if let Some(path) = routing::route_connection(&self.graph, connection) {
                if path.distance_to(canvas) <= tolerance {
                    return PointerTarget::Connection(connection.id.clone());
                }
            }
        }

        PointerTarget::Background
    }

    /// Pointer pressed at a screen position
    pub fn pointer_down(&mut self, screen: Pos2) -> bool {
        let target = self.hit_test(screen);
        self.gestures
            .pointer_down(&target, screen, &mut self.graph, &self.viewport)
    }

    /// Pointer moved
    pub fn pointer_move(&mut self, screen: Pos2) {
        self.gestures
            .pointer_move(screen, &mut self.graph, &mut self.viewport);
    }

    /// Pointer released. Returns a connection created by the release.
    pub fn pointer_up(&mut self, screen: Pos2) -> Option<ConnectionId> {
        let target = self.hit_test(screen);
        self.gestures.pointer_up(Some(&target), &mut self.graph)
    }

    /// Pointer left the window
    pub fn pointer_leave(&mut self) {
        self.gestures.cancel();
    }

    /// Mouse wheel over the canvas
    pub fn wheel(&mut self, delta: f32) -> f32 {
        self.viewport.apply_wheel(delta)
    }

    /// Keyboard shortcut. Returns true if the graph or selection changed.
    pub fn key(&mut self, key: EditorKey) -> bool {
        match key {
            EditorKey::Escape => {
                self.gestures.cancel();
                let had_selection = !self.graph.selection().is_empty();
                self.graph.clear_selection();
                had_selection
            }
            EditorKey::Delete | EditorKey::Backspace => {
                if self.gestures.is_active() {
                    return false;
                }
                self.graph.delete_selected()
            }
        }
    }

    // ---------------------------------------------------------------------
    // Creating nodes
    // ---------------------------------------------------------------------

    /// Drop a toolbox template at a screen position
    pub fn drop_template(&mut self, template: &NodeTemplate, screen: Pos2) -> NodeId {
        let mut position = self.viewport.screen_to_canvas(screen);
        if self.settings.snap_on_drop {
            position = snap_to_grid(position, self.settings.grid_size);
        }
        self.graph.add_node(template.instantiate(position))
    }

    /// Drop a raw drag-and-drop payload. Malformed payloads are logged and
    /// leave the graph unchanged.
    pub fn drop_payload(&mut self, payload: &str, screen: Pos2) -> Option<NodeId> {
        match document::parse_drop_payload(payload) {
            Ok(template) => Some(self.drop_template(&template, screen)),
            Err(e) => {
                tracing::warn!("Ignoring drop: {}", e);
                None
            }
        }
    }

    /// Where the next applied suggestion goes: one column right of the
    /// rightmost node, on its row
    pub fn next_suggestion_slot(&self) -> Pos2 {
        let rightmost = self
            .graph
            .nodes()
            .max_by(|a, b| a.position.x.total_cmp(&b.position.x));
        match rightmost {
            Some(node) => snap_to_grid(
                Pos2::new(node.position.x + SUGGESTION_SPACING, node.position.y),
                self.settings.grid_size,
            ),
            None => FIRST_SLOT,
        }
    }

    /// Add a suggested node through the regular `add_node` path
    pub fn apply_suggestion(&mut self, template: &NodeTemplate) -> NodeId {
        let slot = self.next_suggestion_slot();
        let id = self.graph.add_node(template.instantiate(slot));
        tracing::info!(node = %id, kind = %template.kind, "applied suggestion");
        id
    }

    // ---------------------------------------------------------------------
    // Geometry queries
    // ---------------------------------------------------------------------

    /// Output ports of a node with their anchors
    pub fn node_ports(&self, node_id: &NodeId) -> Option<Vec<ResolvedPort>> {
        self.graph.node(node_id).map(port::resolve_outputs)
    }

    /// Every drawable connection, canvas space
    pub fn connection_paths(&self) -> Vec<RoutedConnection> {
        let selected = self.graph.selection().connection();
        let traversed = self.simulation.traversed_connections();
        self.graph
            .connections()
            .filter_map(|connection| {
                let path = routing::route_connection(&self.graph, connection)?;
                Some(RoutedConnection {
                    id: connection.id.clone(),
                    path,
                    label: connection.label.clone(),
                    color: connection.color.clone(),
                    style: connection.style,
                    selected: selected == Some(&connection.id),
                    traversed: traversed.contains(&connection.id),
                })
            })
            .collect()
    }

    /// Live preview of the connection being dragged, canvas space
    pub fn drag_preview(&self) -> Option<ConnectionPath> {
        let drag = self.gestures.connection_drag()?;
        let node = self.graph.node(&drag.from_node)?;
        let from = port::output_anchor(node, &drag.from_port)?;
        Some(routing::route_preview(from, drag.pointer))
    }

    /// Zoom and pan so the whole graph fits the container
    pub fn fit_view(&mut self, container_size: Vec2) {
        if let Some(bounds) = self.graph.bounds() {
            self.viewport
                .fit_to(bounds, container_size, self.settings.fit_padding);
        }
    }

    // ---------------------------------------------------------------------
    // Test mode
    // ---------------------------------------------------------------------

    /// Start a test run. A blank entity gets the configured default name.
    pub fn start_test(&mut self, trigger_id: &NodeId, entity: Option<TestEntity>) -> Result<(), SimulationError> {
        self.auto_run = None;
        let entity = entity.unwrap_or_else(|| TestEntity::new(self.settings.default_entity_label.clone()));
        self.simulation.start_with_entity(&self.graph, trigger_id, entity)
    }

    /// Take one step by hand
    pub fn step_test(&mut self) -> StepOutcome {
        self.simulation.step(&self.graph)
    }

    /// Switch the current run to auto-run
    pub fn start_auto_run(&mut self) {
        if self.simulation.is_running() {
            self.auto_run = Some(AutoRun::new(
                self.settings.auto_run_interval(),
                self.settings.auto_run_step_limit(),
            ));
        }
    }

    /// Back to manual stepping
    pub fn stop_auto_run(&mut self) {
        self.auto_run = None;
    }

    /// Whether auto-run is on
    pub fn is_auto_running(&self) -> bool {
        self.auto_run.is_some()
    }

    /// Advance auto-run by elapsed frame time. Returns steps taken.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let Some(auto_run) = self.auto_run.as_mut() else {
            return 0;
        };
        let steps = auto_run.tick(&mut self.simulation, &self.graph, elapsed);
        if !self.simulation.is_running() {
            self.auto_run = None;
        }
        steps
    }

    /// End the test run
    pub fn reset_test(&mut self) {
        self.auto_run = None;
        self.simulation.reset();
    }
}

impl Default for WorkflowEditor {
    fn default() -> Self {
        Self::open(WorkflowDocument::default(), EditorSettings::default()).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::node::{Node, NodeKind};
    use crate::port::PortId;
    use crate::document::WorkflowType;
    use crate::simulation::SimulationState;
    use crate::templates;

    fn editor_with_chain() -> WorkflowEditor {
        let mut document = WorkflowDocument::new("Chain", WorkflowType::Sales);
        document.nodes = vec![
            Node::new(NodeKind::Trigger, "A").with_id("a").with_position(0.0, 0.0),
            Node::new(NodeKind::Stage, "B").with_id("b").with_position(288.0, 0.0),
        ];
        document.connections = vec![Connection::new(NodeId::from("a"), PortId::default_output(), NodeId::from("b")).with_id("ab")];
        WorkflowEditor::open(document, EditorSettings::default()).0
    }

    #[test]
    fn hit_test_prefers_ports() {
        let editor = editor_with_chain();
        assert_eq!(
            editor.hit_test(Pos2::new(160.0, 40.0)),
            PointerTarget::OutputPort(NodeId::from("a"), PortId::default_output())
        );
        assert_eq!(editor.hit_test(Pos2::new(290.0, 40.0)), PointerTarget::InputPort(NodeId::from("b")));
        assert_eq!(editor.hit_test(Pos2::new(80.0, 40.0)), PointerTarget::Node(NodeId::from("a")));
        assert_eq!(editor.hit_test(Pos2::new(224.0, 40.0)), PointerTarget::Connection(ConnectionId::from("ab")));
        assert_eq!(editor.hit_test(Pos2::new(224.0, 400.0)), PointerTarget::Background);
    }

    #[test]
    fn drag_from_port_to_port_connects() {
        let mut editor = editor_with_chain();
        let exit = editor.drop_template(&NodeTemplate::new(NodeKind::Exit), Pos2::new(600.0, 0.0));
        assert_eq!(editor.graph().node(&exit).unwrap().position, Pos2::new(600.0, 0.0));

        assert!(editor.pointer_down(Pos2::new(468.0, 40.0)));
        editor.pointer_move(Pos2::new(550.0, 60.0));
        assert!(editor.drag_preview().is_some());
        let id = editor.pointer_up(Pos2::new(600.0, 40.0)).unwrap();
        assert_eq!(editor.graph().connection(&id).unwrap().to_node_id, exit);
        assert!(editor.drag_preview().is_none());
    }

    #[test]
    fn escape_and_delete() {
        let mut editor = editor_with_chain();
        editor.pointer_down(Pos2::new(80.0, 40.0));
        editor.pointer_up(Pos2::new(80.0, 40.0));
        assert_eq!(editor.selection().node(), Some(&NodeId::from("a")));
        assert!(editor.key(EditorKey::Escape));
        assert!(editor.selection().is_empty());

        editor.pointer_down(Pos2::new(80.0, 40.0));
        assert!(!editor.key(EditorKey::Delete));
        editor.pointer_up(Pos2::new(80.0, 40.0));
        assert!(editor.key(EditorKey::Backspace));
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(editor.graph().connection_count(), 0);
    }

    #[test]
    fn malformed_drop_changes_nothing() {
        let mut editor = editor_with_chain();
        assert!(editor.drop_payload("{not json", Pos2::ZERO).is_none());
        assert!(editor.drop_payload(r#"{"type": "portal"}"#, Pos2::ZERO).is_none());
        assert_eq!(editor.graph().node_count(), 2);

        let id = editor
            .drop_payload(r#"{"type": "stage", "label": "Won"}"#, Pos2::new(310.0, 205.0))
            .unwrap();
        assert_eq!(editor.graph().node(&id).unwrap().position, Pos2::new(312.0, 216.0));
    }

    #[test]
    fn drop_converts_screen_to_canvas() {
        let mut editor = editor_with_chain();
        editor.viewport_mut().set_zoom(2.0);
        editor.viewport_mut().container_origin = Pos2::new(100.0, 50.0);
        let id = editor.drop_template(&NodeTemplate::new(NodeKind::Stage), Pos2::new(196.0, 146.0));
        assert_eq!(editor.graph().node(&id).unwrap().position, Pos2::new(48.0, 48.0));
    }

    #[test]
    fn suggestions_land_right_of_the_graph() {
        let mut editor = WorkflowEditor::default();
        let first = editor.apply_suggestion(&NodeTemplate::new(NodeKind::Trigger));
        assert_eq!(editor.graph().node(&first).unwrap().position, FIRST_SLOT);
        let second = editor.apply_suggestion(&NodeTemplate::new(NodeKind::Stage));
        assert_eq!(editor.graph().node(&second).unwrap().position, Pos2::new(336.0, 96.0));
    }

    #[test]
    fn auto_run_through_editor() {
        let (mut editor, _) = WorkflowEditor::open(templates::starter(WorkflowType::Onboarding), EditorSettings::default());
        let trigger = editor.graph().triggers().next().unwrap().id.clone();
        editor.start_test(&trigger, None).unwrap();
        assert_eq!(editor.simulation().log()[0].action, "Test Entity entered workflow");
        editor.start_auto_run();
        assert!(editor.is_auto_running());
        editor.tick(Duration::from_secs(60));
        assert_eq!(editor.simulation().state(), SimulationState::Complete);
        assert!(!editor.is_auto_running());
        assert!(editor.connection_paths().iter().any(|c| c.traversed));
        editor.reset_test();
        assert_eq!(editor.simulation().state(), SimulationState::Idle);
    }

    #[test]
    fn document_round_trip_through_editor() {
        let document = templates::starter(WorkflowType::Support);
        let (editor, report) = WorkflowEditor::open(document.clone(), EditorSettings::default());
        assert!(report.is_clean());
        assert_eq!(editor.to_document(), document);
    }
}
