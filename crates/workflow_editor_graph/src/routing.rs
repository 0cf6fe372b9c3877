// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection routing.
//!
//! Connections are cubic beziers from an output anchor (right edge of the
//! source) to an input anchor (left edge of the target). When the target is
//! left of the source the path loops out to the right first and comes back
//! through a smooth `S` segment, so it never runs straight back across the
//! nodes in between.

use crate::connection::Connection;
use crate::graph::WorkflowGraph;
use crate::port;
use egui::Pos2;
use std::fmt::Write as _;

/// Minimum horizontal control distance for forward curves
pub const MIN_CURVATURE: f32 = 50.0;
/// Maximum horizontal control distance for forward curves
pub const MAX_CURVATURE: f32 = 150.0;
/// Share of the horizontal distance used as control distance
pub const CURVATURE_RATIO: f32 = 0.4;
/// Minimum loop-out distance for backward curves
pub const MIN_LOOP_OFFSET: f32 = 80.0;
/// Share of the vertical distance used as loop-out distance
pub const LOOP_OFFSET_RATIO: f32 = 0.3;
/// Vertical kick applied to the loop midpoint when the ends are close
pub const LOOP_KICK: f32 = 50.0;
/// Vertical distance below which the kick applies
pub const LOOP_KICK_THRESHOLD: f32 = 100.0;

/// One command of a path, mirroring SVG path syntax
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// `M x,y`
    MoveTo(Pos2),
    /// `C c1 c2 end`
    CubicTo {
        /// First control point
        c1: Pos2,
        /// Second control point
        c2: Pos2,
        /// End point
        end: Pos2,
    },
    /// `S c2 end`; the first control point mirrors the previous segment's second
    SmoothCubicTo {
        /// Second control point
        c2: Pos2,
        /// End point
        end: Pos2,
    },
}

/// Geometry of one routed connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPath {
    /// Path commands, starting with a `MoveTo`
    pub commands: Vec<PathCommand>,
    /// Where a label chip is centered
    pub label_anchor: Pos2,
    /// Whether the path uses the backward loop form
    pub backward: bool,
}

impl ConnectionPath {
    /// Render as an SVG path `d` attribute
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = match command {
                PathCommand::MoveTo(p) => write!(out, "M {},{}", p.x, p.y),
                PathCommand::CubicTo { c1, c2, end } => write!(
                    out,
                    "C {},{} {},{} {},{}",
                    c1.x, c1.y, c2.x, c2.y, end.x, end.y
                ),
                PathCommand::SmoothCubicTo { c2, end } => {
                    write!(out, "S {},{} {},{}", c2.x, c2.y, end.x, end.y)
                }
            };
        }
        out
    }

    /// Whether the path contains a smooth (`S`) segment
    pub fn has_smooth_segment(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::SmoothCubicTo { .. }))
    }

    /// Sample the path into a polyline, `segments` points per curve
    pub fn flatten(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        let mut points = Vec::with_capacity(self.commands.len() * segments + 1);
        let mut current = Pos2::ZERO;
        let mut last_control: Option<Pos2> = None;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    current = p;
                    last_control = None;
                    points.push(p);
                }
                PathCommand::CubicTo { c1, c2, end } => {
                    points.extend(bezier_points(current, c1, c2, end, segments).into_iter().skip(1));
                    current = end;
                    last_control = Some(c2);
                }
                PathCommand::SmoothCubicTo { c2, end } => {
                    let c1 = match last_control {
                        Some(prev) => current + (current - prev),
                        None => current,
                    };
                    points.extend(bezier_points(current, c1, c2, end, segments).into_iter().skip(1));
                    current = end;
                    last_control = Some(c2);
                }
            }
        }
        points
    }

    /// Shortest distance from `point` to the sampled curve
    pub fn distance_to(&self, point: Pos2) -> f32 {
        let points = self.flatten(24);
        if points.len() == 1 {
            return points[0].distance(point);
        }
        points
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

/// Route a curve between two anchors.
///
/// Used for committed connections and for the live drag preview alike, so the
/// preview always has the shape the connection will get.
pub fn route(from: Pos2, to: Pos2) -> ConnectionPath {
    let label_anchor = Pos2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let dx = to.x - from.x;

    if dx >= 0.0 {
        let k = (dx.abs() * CURVATURE_RATIO).clamp(MIN_CURVATURE, MAX_CURVATURE);
        return ConnectionPath {
            commands: vec![
                PathCommand::MoveTo(from),
                PathCommand::CubicTo {
                    c1: Pos2::new(from.x + k, from.y),
                    c2: Pos2::new(to.x - k, to.y),
                    end: to,
                },
            ],
            label_anchor,
            backward: false,
        };
    }

    let dy = to.y - from.y;
    let vertical = dy.abs();
    let loop_offset = (vertical * LOOP_OFFSET_RATIO).max(MIN_LOOP_OFFSET);
    let mut mid = label_anchor;
    if vertical < LOOP_KICK_THRESHOLD {
        mid.y += if dy >= 0.0 { LOOP_KICK } else { -LOOP_KICK };
    }

    ConnectionPath {
        commands: vec![
            PathCommand::MoveTo(from),
            PathCommand::CubicTo {
                c1: Pos2::new(from.x + loop_offset, from.y),
                c2: Pos2::new(from.x + loop_offset, mid.y),
                end: mid,
            },
            PathCommand::SmoothCubicTo {
                c2: Pos2::new(to.x - loop_offset, to.y),
                end: to,
            },
        ],
        label_anchor,
        backward: true,
    }
}

/// Route the in-progress curve from a held output port to the pointer
pub fn route_preview(from_anchor: Pos2, pointer: Pos2) -> ConnectionPath {
    route(from_anchor, pointer)
}

/// Anchors of a stored connection, if both ends resolve
pub fn connection_anchors(graph: &WorkflowGraph, connection: &Connection) -> Option<(Pos2, Pos2)> {
    let from = graph.node(&connection.from_node_id)?;
    let to = graph.node(&connection.to_node_id)?;
    let from_anchor = port::output_anchor(from, &connection.from_port)?;
    let to_anchor = port::input_anchor(to)?;
    Some((from_anchor, to_anchor))
}

/// Route a stored connection in canvas space.
///
/// Returns `None` when the source port no longer exists on the node, e.g.
/// after a condition branch was removed.
pub fn route_connection(graph: &WorkflowGraph, connection: &Connection) -> Option<ConnectionPath> {
    let (from, to) = connection_anchors(graph, connection)?;
    Some(route(from, to))
}

/// Generate points along a cubic bezier curve
fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x;
        let y = mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y;

        points.push(Pos2::new(x, y));
    }
    points
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
