// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer gestures on the canvas: pan, node drag and connection drag.
//!
//! Only one gesture runs at a time and a new one can only start from idle.
//! While a gesture is active the host keeps global pointer listeners
//! attached; the controller tells it when through [`PointerCapture`] and
//! always detaches when the gesture ends, is cancelled or the controller is
//! dropped.

use crate::connection::{Connection, ConnectionId};
use crate::graph::WorkflowGraph;
use crate::node::{NodeId, NodeKind};
use crate::port::{self, PortId};
use crate::viewport::{snap_to_grid, Viewport, GRID_SIZE};
use egui::{Pos2, Vec2};

/// Host hook for global pointer-move / pointer-up listeners
pub trait PointerCapture {
    /// Start delivering pointer events outside the canvas
    fn attach(&mut self);
    /// Stop delivering them
    fn detach(&mut self);
}

/// Capture for hosts that always deliver pointer events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn attach(&mut self) {}
    fn detach(&mut self) {}
}

/// What a pointer event landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas
    Background,
    /// A node body
    Node(NodeId),
    /// An output port
    OutputPort(NodeId, PortId),
    /// A node's input port
    InputPort(NodeId),
    /// A connection curve
    Connection(ConnectionId),
}

/// Connection being dragged out of an output port
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDrag {
    /// Source node
    pub from_node: NodeId,
    /// Source port
    pub from_port: PortId,
    /// Current pointer position (canvas space)
    pub pointer: Pos2,
}

/// Gesture state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No gesture
    #[default]
    Idle,
    /// Panning the view
    Panning {
        /// `pointer - pan` at gesture start, screen pixels
        anchor: Vec2,
    },
    /// Dragging a node
    DraggingNode {
        /// Node being dragged
        node_id: NodeId,
        /// Pointer position relative to the node's corner, canvas space
        grab_offset: Vec2,
    },
    /// Creating a connection
    Connecting(ConnectionDrag),
}

/// Drives the gesture state machine
pub struct GestureController {
    gesture: Gesture,
    capture: Box<dyn PointerCapture>,
    grid_size: f32,
}

impl GestureController {
    /// Controller that reports to the given capture hook
    pub fn new(capture: Box<dyn PointerCapture>) -> Self {
        Self {
            gesture: Gesture::Idle,
            capture,
            grid_size: GRID_SIZE,
        }
    }

    /// Set the grid dragged nodes snap to
    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Current gesture
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Connection drag in progress, if any
    pub fn connection_drag(&self) -> Option<&ConnectionDrag> {
        match &self.gesture {
            Gesture::Connecting(drag) => Some(drag),
            _ => None,
        }
    }

    /// Handle pointer-down. Returns true if a gesture started.
    pub fn pointer_down(
        &mut self,
        target: &PointerTarget,
        screen: Pos2,
        graph: &mut WorkflowGraph,
        viewport: &Viewport,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let canvas = viewport.screen_to_canvas(screen);

        let next = match target {
            PointerTarget::Background => {
                graph.clear_selection();
                Gesture::Panning {
                    anchor: screen.to_vec2() - viewport.pan,
                }
            }
            PointerTarget::Node(node_id) => {
                let Some(node) = graph.node(node_id) else {
                    return false;
                };
                let grab_offset = canvas - node.position;
                graph.select_node(Some(node_id.clone()));
                Gesture::DraggingNode {
                    node_id: node_id.clone(),
                    grab_offset,
                }
            }
            PointerTarget::OutputPort(node_id, port_id) => {
                let Some(node) = graph.node(node_id) else {
                    return false;
                };
                if !node.has_output(port_id) {
                    return false;
                }
                Gesture::Connecting(ConnectionDrag {
                    from_node: node_id.clone(),
                    from_port: port_id.clone(),
                    pointer: canvas,
                })
            }
            PointerTarget::Connection(connection_id) => {
                graph.select_connection(Some(connection_id.clone()));
                return false;
            }
            PointerTarget::InputPort(_) => return false,
        };

        self.gesture = next;
        self.capture.attach();
        true
    }

    /// Handle pointer-move
    pub fn pointer_move(&mut self, screen: Pos2, graph: &mut WorkflowGraph, viewport: &mut Viewport) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { anchor } => {
                viewport.pan = screen.to_vec2() - *anchor;
            }
            Gesture::DraggingNode { node_id, grab_offset } => {
                let canvas = viewport.screen_to_canvas(screen);
                let position = snap_to_grid(canvas - *grab_offset, self.grid_size);
                graph.update_node_position(node_id, position);
            }
            Gesture::Connecting(drag) => {
                drag.pointer = viewport.screen_to_canvas(screen);
            }
        }
    }

    /// Handle pointer-up, ending the gesture.
    ///
    /// Releasing a connection drag over an input port tries to create the
    /// connection. Returns the new connection's id if one was created.
    pub fn pointer_up(
        &mut self,
        target: Option<&PointerTarget>,
        graph: &mut WorkflowGraph,
    ) -> Option<ConnectionId> {
        let gesture = self.end();
        let Gesture::Connecting(drag) = gesture else {
            return None;
        };
        let Some(PointerTarget::InputPort(to_node)) = target else {
            return None;
        };

        let connection = branch_connection(graph, &drag, to_node.clone())?;
        match graph.add_connection(connection) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::debug!(%err, "connection drop ignored");
                None
            }
        }
    }

    /// Abort the current gesture, e.g. when the pointer leaves the window
    pub fn cancel(&mut self) {
        self.end();
    }

    fn end(&mut self) -> Gesture {
        let gesture = std::mem::take(&mut self.gesture);
        if !matches!(gesture, Gesture::Idle) {
            self.capture.detach();
        }
        gesture
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(Box::new(NoCapture))
    }
}

impl Drop for GestureController {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for GestureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureController")
            .field("gesture", &self.gesture)
            .field("grid_size", &self.grid_size)
            .finish_non_exhaustive()
    }
}

/// Connection for a finished drag. Condition branches lend it their label and
/// color.
fn branch_connection(graph: &WorkflowGraph, drag: &ConnectionDrag, to_node: NodeId) -> Option<Connection> {
    let source = graph.node(&drag.from_node)?;
    let mut connection = Connection::new(drag.from_node.clone(), drag.from_port.clone(), to_node);
    if source.kind == NodeKind::Condition {
        if let Some(branch) = port::output_ports(source)
            .into_iter()
            .find(|p| p.id == drag.from_port)
        {
            connection.label = Some(branch.label);
            connection.color = Some(branch.color);
        }
    }
    Some(connection)
}
