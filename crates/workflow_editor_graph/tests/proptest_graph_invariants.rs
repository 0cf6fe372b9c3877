// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based invariant tests for the editor core.
//!
//! 1. Wheel zoom stays within bounds for any delta sequence.
//! 2. Screen/canvas conversion round-trips at any zoom and pan.
//! 3. Grid snapping lands on the grid and is idempotent.
//! 4. Removing a node never leaves a dangling connection.
//! 5. Self-loops and trigger targets are never accepted.
//! 6. Documents round-trip through JSON.

use egui::{Pos2, Vec2};
use proptest::prelude::*;
use workflow_editor_graph::port::PortId;
use workflow_editor_graph::viewport::{snap_to_grid, MAX_ZOOM, MIN_ZOOM};
use workflow_editor_graph::{
    Connection, ConnectionError, Node, NodeId, NodeKind, Viewport, WorkflowDocument, WorkflowGraph,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop::sample::select(NodeKind::all().to_vec())
}

fn coord_strategy() -> impl Strategy<Value = f32> {
    (-200i32..=200).prop_map(|v| v as f32 * 12.0)
}

/// Nodes `n0..nk` plus candidate edges given as index pairs
fn graph_strategy() -> impl Strategy<Value = (Vec<(NodeKind, f32, f32)>, Vec<(usize, usize)>)> {
    prop::collection::vec((kind_strategy(), coord_strategy(), coord_strategy()), 1..12).prop_flat_map(
        |nodes| {
            let n = nodes.len();
            let edges = prop::collection::vec((0..n, 0..n), 0..24);
            (Just(nodes), edges)
        },
    )
}

fn build(nodes: &[(NodeKind, f32, f32)], edges: &[(usize, usize)]) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    for (i, (kind, x, y)) in nodes.iter().enumerate() {
        graph.add_node(Node::new(*kind, format!("Node {i}")).with_id(format!("n{i}")).with_position(*x, *y));
    }
    for (from, to) in edges {
        let _ = graph.add_connection(Connection::new(
            NodeId::from(format!("n{from}")),
            PortId::default_output(),
            NodeId::from(format!("n{to}")),
        ));
    }
    graph
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Zoom clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wheel_zoom_stays_in_bounds(deltas in prop::collection::vec(-10_000.0f32..10_000.0, 1..64)) {
        let mut viewport = Viewport::new();
        for delta in deltas {
            let zoom = viewport.apply_wheel(delta);
            prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom), "zoom {} out of bounds", zoom);
        }
    }

    #[test]
    fn set_zoom_clamps(zoom in prop::num::f32::ANY) {
        let mut viewport = Viewport::new();
        viewport.set_zoom(zoom);
        prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&viewport.zoom()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Coordinate round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn screen_canvas_round_trip(
        zoom in 0.25f32..3.0,
        pan_x in -2000.0f32..2000.0,
        pan_y in -2000.0f32..2000.0,
        x in -5000.0f32..5000.0,
        y in -5000.0f32..5000.0,
    ) {
        let mut viewport = Viewport::new();
        viewport.set_zoom(zoom);
        viewport.set_pan(Vec2::new(pan_x, pan_y));
        viewport.container_origin = Pos2::new(120.0, 64.0);

        let canvas = Pos2::new(x, y);
        let back = viewport.screen_to_canvas(viewport.canvas_to_screen(canvas));
        prop_assert!(back.distance(canvas) < 0.05, "{:?} came back as {:?}", canvas, back);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Grid snapping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn snapping_is_on_grid_and_idempotent(x in -10_000.0f32..10_000.0, y in -10_000.0f32..10_000.0) {
        let snapped = snap_to_grid(Pos2::new(x, y), 24.0);
        prop_assert_eq!(snapped.x % 24.0, 0.0);
        prop_assert_eq!(snapped.y % 24.0, 0.0);
        prop_assert!((snapped.x - x).abs() <= 12.01);
        prop_assert!((snapped.y - y).abs() <= 12.01);
        prop_assert_eq!(snap_to_grid(snapped, 24.0), snapped);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Structural rules
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn accepted_connections_obey_the_rules((nodes, edges) in graph_strategy()) {
        let graph = build(&nodes, &edges);
        for connection in graph.connections() {
            prop_assert_ne!(&connection.from_node_id, &connection.to_node_id);
            let from = graph.node(&connection.from_node_id).unwrap();
            let to = graph.node(&connection.to_node_id).unwrap();
            prop_assert_ne!(to.kind, NodeKind::Trigger);
            prop_assert_ne!(from.kind, NodeKind::Exit);
        }
    }

    #[test]
    fn self_loops_are_always_rejected(kind in kind_strategy()) {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(Node::new(kind, "Solo"));
        let result = graph.add_connection(Connection::new(id.clone(), PortId::default_output(), id));
        prop_assert!(result.is_err());
        prop_assert_eq!(graph.connection_count(), 0);
        if kind != NodeKind::Trigger && kind != NodeKind::Exit {
            prop_assert_eq!(result, Err(ConnectionError::SelfLoop));
        }
    }

    #[test]
    fn removal_cascades((nodes, edges) in graph_strategy(), victim in any::<prop::sample::Index>()) {
        let mut graph = build(&nodes, &edges);
        let id = NodeId::from(format!("n{}", victim.index(nodes.len())));
        prop_assert!(graph.remove_node(&id).is_some());
        prop_assert!(graph.connections().all(|c| !c.involves_node(&id)));
        prop_assert_eq!(graph.node_count(), nodes.len() - 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Document round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn documents_round_trip((nodes, edges) in graph_strategy()) {
        let graph = build(&nodes, &edges);
        let document = WorkflowDocument::default().with_graph(&graph);

        let json = document.to_json().unwrap();
        let reloaded = WorkflowDocument::from_json(&json).unwrap();
        prop_assert_eq!(&reloaded, &document);

        let (rebuilt, report) = reloaded.to_graph();
        prop_assert!(report.is_clean());
        prop_assert_eq!(rebuilt.node_count(), graph.node_count());
        prop_assert_eq!(rebuilt.connection_count(), graph.connection_count());
    }
}
