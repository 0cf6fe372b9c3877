// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual workflow graph editor core.
//!
//! This crate powers the canvas where CRM workflows (sales pipelines,
//! onboarding, support and engagement processes) are drawn:
//! - Graph model of typed nodes joined by port-to-port connections
//! - Viewport pan and zoom with screen/canvas conversion
//! - Port layout and anchor resolution
//! - Connection routing, including loop-back curves
//! - Step-by-step test runs of a test entity through the graph
//!
//! ## Architecture
//!
//! [`WorkflowGraph`] owns nodes and connections and enforces the structural
//! rules. Geometry is derived on demand from node kind, config and position
//! ([`port`], [`routing`]). [`WorkflowEditor`] ties graph, viewport, gestures
//! and test runs into one session, and [`ui::WorkflowCanvas`] paints it with
//! egui.

pub mod connection;
pub mod document;
pub mod editor;
pub mod gesture;
pub mod graph;
pub mod node;
pub mod palette;
pub mod port;
pub mod routing;
pub mod settings;
pub mod simulation;
pub mod templates;
pub mod ui;
pub mod viewport;

pub use connection::{Connection, ConnectionId, ConnectionStyle};
pub use document::{LoadReport, WorkflowDocument, WorkflowType};
pub use editor::{EditorKey, RoutedConnection, WorkflowEditor};
pub use gesture::{GestureController, PointerCapture, PointerTarget};
pub use graph::{ConnectionError, NodeEditError, Selection, WorkflowGraph};
pub use node::{Node, NodeConfig, NodeId, NodeKind};
pub use palette::{NodePalette, NodeTemplate};
pub use port::{OutputPort, PortId};
pub use routing::ConnectionPath;
pub use settings::EditorSettings;
pub use simulation::{CompletionReason, Simulation, SimulationState, StepEntry, TestEntity};
pub use viewport::Viewport;
