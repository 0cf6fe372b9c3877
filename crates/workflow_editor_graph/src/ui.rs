// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas rendering with interactive editing.
//!
//! Features:
//! - Dot grid that follows pan and zoom
//! - Node cards with ports, branch labels and entity counts
//! - Routed connections with label chips and dashed styles
//! - Live drag preview while connecting
//! - Test-run highlighting
//!
//! All editing goes through [`WorkflowEditor`]; this module only maps egui
//! input onto it and paints the result.

use crate::editor::{EditorKey, RoutedConnection, WorkflowEditor};
use crate::node::{Node, NodeKind};
use crate::port;
use crate::routing::ConnectionPath;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use std::time::Duration;

const NODE_ROUNDING: f32 = 8.0;
const NODE_SHADOW_OFFSET: f32 = 3.0;
const NODE_ACCENT_WIDTH: f32 = 4.0;
const PORT_RADIUS: f32 = 6.0;
const CONNECTION_THICKNESS: f32 = 2.0;
const CURVE_SEGMENTS: usize = 24;
const LABEL_CHIP_PADDING: Vec2 = Vec2::new(6.0, 3.0);

const CANVAS_BG: Color32 = Color32::from_rgb(248, 250, 252);
const GRID_DOT: Color32 = Color32::from_rgb(203, 213, 225);
const NODE_BG: Color32 = Color32::WHITE;
const NODE_BORDER: Color32 = Color32::from_rgb(226, 232, 240);
const SELECTION: Color32 = Color32::from_rgb(59, 130, 246);
const ACTIVE: Color32 = Color32::from_rgb(34, 197, 94);
const CONNECTION_DEFAULT: Color32 = Color32::from_rgb(148, 163, 184);
const TEXT: Color32 = Color32::from_rgb(15, 23, 42);
const TEXT_MUTED: Color32 = Color32::from_rgb(100, 116, 139);

/// Canvas widget state that is not part of the editing session
#[derive(Debug, Clone)]
pub struct WorkflowCanvas {
    /// Draw the dot grid
    pub show_grid: bool,
    /// Draw the status line
    pub show_status: bool,
}

impl WorkflowCanvas {
    /// Create a new canvas
    pub fn new() -> Self {
        Self {
            show_grid: true,
            show_status: true,
        }
    }

    /// Render the editor into the remaining space of `ui`
    pub fn ui(&mut self, ui: &mut egui::Ui, editor: &mut WorkflowEditor) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        editor.viewport_mut().container_origin = rect.min;

        self.handle_input(ui, &response, rect, editor);
        self.advance_auto_run(ui, editor);

        painter.rect_filled(rect, 0.0, CANVAS_BG);
        if self.show_grid {
            self.draw_grid(&painter, rect, editor);
        }

        for connection in editor.connection_paths() {
            self.draw_connection(&painter, editor, &connection);
        }
        if let Some(preview) = editor.drag_preview() {
            let points = screen_points(editor, &preview);
            painter.extend(egui::Shape::dashed_line(
                &points,
                Stroke::new(CONNECTION_THICKNESS, SELECTION),
                6.0,
                4.0,
            ));
        }

        for node in editor.graph().nodes() {
            self.draw_node(&painter, rect, editor, node);
        }

        if self.show_status {
            self.draw_status_bar(ui, rect, editor);
        }
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: Rect,
        editor: &mut WorkflowEditor,
    ) {
        let hover = ui.input(|i| i.pointer.hover_pos());

        if let Some(pos) = hover.filter(|p| rect.contains(*p)) {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                // egui scrolls positive upward; the editor expects wheel deltas
                editor.wheel(-scroll);
            }

            if let Some(payload) = response.dnd_release_payload::<String>() {
                editor.drop_payload(&payload, pos);
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ui.input(|i| i.pointer.press_origin()).or(hover);
            if let Some(origin) = origin {
                editor.pointer_down(origin);
            }
        }
        if response.dragged() {
            if let Some(pos) = hover {
                editor.pointer_move(pos);
            }
        }
        if response.drag_stopped() {
            match hover {
                Some(pos) => {
                    editor.pointer_up(pos);
                }
                None => editor.pointer_leave(),
            }
        }

        if response.clicked() {
            if let Some(pos) = hover {
                editor.pointer_down(pos);
                editor.pointer_up(pos);
            }
        }

        let keys = ui.input(|i| {
            let mut keys = Vec::new();
            if i.key_pressed(egui::Key::Escape) {
                keys.push(EditorKey::Escape);
            }
            if i.key_pressed(egui::Key::Delete) {
                keys.push(EditorKey::Delete);
            }
            if i.key_pressed(egui::Key::Backspace) {
                keys.push(EditorKey::Backspace);
            }
            keys
        });
        if response.hovered() || response.has_focus() {
            for key in keys {
                editor.key(key);
            }
        }
    }

    fn advance_auto_run(&self, ui: &egui::Ui, editor: &mut WorkflowEditor) {
        if !editor.is_auto_running() {
            return;
        }
        let dt = ui.input(|i| i.stable_dt);
        editor.tick(Duration::from_secs_f32(dt.max(0.0)));
        ui.ctx().request_repaint();
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect, editor: &WorkflowEditor) {
        let viewport = editor.viewport();
        let spacing = editor.settings().grid_size * viewport.zoom();
        if spacing < 6.0 {
            return;
        }

        let origin = viewport.canvas_to_screen(Pos2::ZERO);
        let start_x = rect.left() + (origin.x - rect.left()).rem_euclid(spacing);
        let start_y = rect.top() + (origin.y - rect.top()).rem_euclid(spacing);
        let radius = viewport.zoom().clamp(0.5, 1.5);

        let mut y = start_y;
        while y < rect.bottom() {
            let mut x = start_x;
            while x < rect.right() {
                painter.circle_filled(Pos2::new(x, y), radius, GRID_DOT);
                x += spacing;
            }
            y += spacing;
        }
    }

    fn draw_connection(&self, painter: &egui::Painter, editor: &WorkflowEditor, connection: &RoutedConnection) {
        let zoom = editor.viewport().zoom();
        let color = if connection.selected {
            SELECTION
        } else if connection.traversed {
            ACTIVE
        } else {
            connection
                .color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or(CONNECTION_DEFAULT)
        };
        let width = if connection.selected { CONNECTION_THICKNESS * 1.5 } else { CONNECTION_THICKNESS };
        let stroke = Stroke::new(width * zoom, color);
        let points = screen_points(editor, &connection.path);

        match connection.style.dash_pattern() {
            Some([dash, gap]) => {
                painter.extend(egui::Shape::dashed_line(&points, stroke, dash * zoom, gap * zoom));
            }
            None => {
                for pair in points.windows(2) {
                    painter.line_segment([pair[0], pair[1]], stroke);
                }
            }
        }

        if let Some(label) = &connection.label {
            let center = editor.viewport().canvas_to_screen(connection.path.label_anchor);
            let font = egui::FontId::proportional(11.0 * zoom);
            let galley = painter.layout_no_wrap(label.clone(), font, color);
            let chip = Rect::from_center_size(center, galley.size() + LABEL_CHIP_PADDING * 2.0 * zoom);
            painter.rect_filled(chip, 4.0 * zoom, NODE_BG);
            painter.rect_stroke(chip, 4.0 * zoom, Stroke::new(1.0, color));
            painter.galley(chip.min + LABEL_CHIP_PADDING * zoom, galley, color);
        }
    }

    fn draw_node(&self, painter: &egui::Painter, rect: Rect, editor: &WorkflowEditor, node: &Node) {
        let viewport = editor.viewport();
        let zoom = viewport.zoom();
        let screen_rect = viewport.canvas_rect_to_screen(port::node_rect(node));
        if !screen_rect.intersects(rect) {
            return;
        }

        let is_selected = editor.selection().node() == Some(&node.id);
        let is_current = editor.simulation().current_node() == Some(&node.id);
        let accent = parse_color(&node.color).unwrap_or(CONNECTION_DEFAULT);
        let rounding = NODE_ROUNDING * zoom;

        // Shadow
        painter.rect_filled(
            screen_rect.translate(Vec2::splat(NODE_SHADOW_OFFSET * zoom)),
            rounding,
            Color32::from_rgba_unmultiplied(15, 23, 42, 25),
        );

        painter.rect_filled(screen_rect, rounding, NODE_BG);
        let accent_rect = Rect::from_min_size(
            screen_rect.min,
            Vec2::new(NODE_ACCENT_WIDTH * zoom, screen_rect.height()),
        );
        painter.rect_filled(
            accent_rect,
            egui::Rounding {
                nw: rounding,
                ne: 0.0,
                sw: rounding,
                se: 0.0,
            },
            accent,
        );

        let border = if is_current {
            Stroke::new(3.0 * zoom, ACTIVE)
        } else if is_selected {
            Stroke::new(2.0 * zoom, SELECTION)
        } else {
            Stroke::new(1.0, NODE_BORDER)
        };
        painter.rect_stroke(screen_rect, rounding, border);

        let text_left = screen_rect.left() + (NODE_ACCENT_WIDTH + 12.0) * zoom;
        painter.text(
            Pos2::new(text_left, screen_rect.top() + 14.0 * zoom),
            egui::Align2::LEFT_TOP,
            node.kind.display_name().to_uppercase(),
            egui::FontId::proportional(9.0 * zoom),
            accent,
        );
        painter.text(
            Pos2::new(text_left, screen_rect.top() + 30.0 * zoom),
            egui::Align2::LEFT_TOP,
            &node.label,
            egui::FontId::proportional(13.0 * zoom),
            TEXT,
        );

        if let (NodeKind::Stage, Some(count)) = (node.kind, node.entity_count) {
            painter.text(
                Pos2::new(screen_rect.right() - 12.0 * zoom, screen_rect.top() + 14.0 * zoom),
                egui::Align2::RIGHT_TOP,
                count.to_string(),
                egui::FontId::proportional(11.0 * zoom),
                TEXT_MUTED,
            );
        }

        self.draw_ports(painter, editor, node);
    }

    fn draw_ports(&self, painter: &egui::Painter, editor: &WorkflowEditor, node: &Node) {
        let viewport = editor.viewport();
        let zoom = viewport.zoom();
        let radius = PORT_RADIUS * zoom;
        let outline = Stroke::new(1.5 * zoom, NODE_BG);

        if let Some(anchor) = port::input_anchor(node) {
            let pos = viewport.canvas_to_screen(anchor);
            painter.circle_filled(pos, radius, CONNECTION_DEFAULT);
            painter.circle_stroke(pos, radius, outline);
        }

        let branches = node.kind == NodeKind::Condition;
        for resolved in port::resolve_outputs(node) {
            let pos = viewport.canvas_to_screen(resolved.anchor);
            let color = parse_color(&resolved.port.color).unwrap_or(CONNECTION_DEFAULT);
            painter.circle_filled(pos, radius, color);
            painter.circle_stroke(pos, radius, outline);

            if branches && !resolved.port.label.is_empty() {
                painter.text(
                    Pos2::new(pos.x - (PORT_RADIUS + 6.0) * zoom, pos.y),
                    egui::Align2::RIGHT_CENTER,
                    &resolved.port.label,
                    egui::FontId::proportional(10.0 * zoom),
                    color,
                );
            }
        }
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui, rect: Rect, editor: &WorkflowEditor) {
        let painter = ui.painter();
        let font = egui::FontId::proportional(11.0);
        painter.text(
            Pos2::new(rect.left() + 8.0, rect.bottom() - 12.0),
            egui::Align2::LEFT_CENTER,
            status_line(editor),
            font.clone(),
            TEXT_MUTED,
        );
        if let Some(entity) = entity_line(editor) {
            painter.text(
                Pos2::new(rect.left() + 8.0, rect.bottom() - 28.0),
                egui::Align2::LEFT_CENTER,
                entity,
                font,
                TEXT_MUTED,
            );
        }
    }
}

/// Counts, zoom and the latest test-run event
fn status_line(editor: &WorkflowEditor) -> String {
    let graph = editor.graph();
    let mut status = format!(
        "Nodes: {} | Connections: {} | Zoom: {:.0}%",
        graph.node_count(),
        graph.connection_count(),
        editor.viewport().zoom() * 100.0,
    );
    if let Some(reason) = editor.simulation().completion() {
        status.push_str(" | ");
        status.push_str(reason.message());
    } else if let Some(last) = editor.simulation().log().last() {
        status.push_str(" | ");
        status.push_str(&last.action);
    }
    status
}

/// The test entity and its attributes while a run is shown
fn entity_line(editor: &WorkflowEditor) -> Option<String> {
    editor
        .simulation()
        .entity()
        .map(|entity| format!("Test entity: {}", entity.summary()))
}

impl Default for WorkflowCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn screen_points(editor: &WorkflowEditor, path: &ConnectionPath) -> Vec<Pos2> {
    path.flatten(CURVE_SEGMENTS)
        .into_iter()
        .map(|p| editor.viewport().canvas_to_screen(p))
        .collect()
}

/// Parse a node or port color: `#rrggbb`, `#rgb` or a basic color name
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return Color32::from_hex(&format!("#{hex}")).ok().or_else(|| {
            if hex.len() != 3 {
                return None;
            }
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            Color32::from_hex(&format!("#{expanded}")).ok()
        });
    }

    let color = match value.to_ascii_lowercase().as_str() {
        "green" => Color32::from_rgb(34, 197, 94),
        "red" => Color32::from_rgb(239, 68, 68),
        "blue" => Color32::from_rgb(59, 130, 246),
        "yellow" => Color32::from_rgb(234, 179, 8),
        "orange" => Color32::from_rgb(249, 115, 22),
        "purple" => Color32::from_rgb(139, 92, 246),
        "gray" | "grey" => CONNECTION_DEFAULT,
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WorkflowType;
    use crate::settings::EditorSettings;
    use crate::simulation::TestEntity;
    use crate::templates;

    #[test]
    fn parses_colors() {
        assert_eq!(parse_color("#3b82f6"), Some(Color32::from_rgb(0x3b, 0x82, 0xf6)));
        assert_eq!(parse_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_color("Green"), Some(Color32::from_rgb(34, 197, 94)));
        assert_eq!(parse_color("chartreuse-ish"), None);
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn status_bar_shows_the_test_entity() {
        let (mut editor, _) = WorkflowEditor::open(templates::starter(WorkflowType::Sales), EditorSettings::default());
        assert_eq!(entity_line(&editor), None);

        let trigger = editor.graph().triggers().next().map(|n| n.id.clone()).unwrap();
        editor
            .start_test(&trigger, Some(TestEntity::sample(WorkflowType::Sales)))
            .unwrap();
        assert_eq!(
            entity_line(&editor).as_deref(),
            Some("Test entity: Acme Corp (leadScore: 75, dealValue: 50000)")
        );
        assert!(status_line(&editor).ends_with("Acme Corp entered workflow"));

        editor.reset_test();
        assert_eq!(entity_line(&editor), None);
    }

    #[test]
    fn renders_headless() {
        let (mut editor, _) = WorkflowEditor::open(templates::starter(WorkflowType::Sales), EditorSettings::default());
        let trigger = editor.graph().triggers().next().map(|n| n.id.clone()).unwrap();
        editor.start_test(&trigger, None).unwrap();
        editor.step_test();

        let mut canvas = WorkflowCanvas::new();
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                canvas.ui(ui, &mut editor);
            });
        });

        assert!(editor.viewport().container_origin.x >= 0.0);
        assert_eq!(editor.graph().node_count(), templates::starter(WorkflowType::Sales).nodes.len());
    }
}
