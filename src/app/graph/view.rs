use eframe::egui::{
    self, Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, Stroke, StrokeKind,
    Ui, vec2,
};

use crate::sim::{SimNode, Simulation};
use crate::util::truncate_label;

use super::super::render_utils::{
    EDGE_COLOR, LABEL_COLOR, circle_visible, draw_background, draw_flag_glow, edge_visible,
    node_fill, node_stroke,
};
use super::super::{LAYOUT_SEED, ViewModel};

const LABEL_BUDGET: usize = 14;

impl ViewModel {
    fn rebuild_snapshot(&mut self, bounds: egui::Vec2) {
        self.sim = Some(Simulation::new(
            &self.data.nodes,
            &self.data.links,
            bounds,
            LAYOUT_SEED,
        ));
        self.drag_node = None;
        self.snapshot_dirty = false;
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        // A resized canvas moves the centering target; discard the layout
        // and re-initialize against the new bounds.
        if (rect.size() - self.canvas_size).length() > 1.0 {
            self.canvas_size = rect.size();
            self.snapshot_dirty = true;
        }
        if self.snapshot_dirty {
            self.rebuild_snapshot(rect.size());
        }

        self.handle_graph_zoom(ui, rect, &response);
        let hovered = self.hovered_node(ui, rect);
        self.handle_graph_drag(rect, &response, hovered);

        let Some(sim) = self.sim.as_mut() else {
            return;
        };

        // Interaction above is fully applied before the step; rendering
        // below is a read-only projection of the stepped state.
        let still_hot = sim.step();
        if still_hot || response.dragged() {
            ui.ctx().request_repaint();
        }

        draw_background(&painter, rect, sim.view.pan, sim.view.zoom);

        if sim.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No entities matched the current filters.",
                FontId::proportional(13.0),
                LABEL_COLOR,
            );
            return;
        }

        let zoom = sim.view.zoom;
        let zoom_sqrt = zoom.sqrt();
        let screen_positions = sim
            .nodes
            .iter()
            .map(|node| sim.view.world_to_screen(rect, node.pos))
            .collect::<Vec<_>>();

        for link in &sim.links {
            let start = screen_positions[link.source];
            let end = screen_positions[link.target];
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }
            let width = (link.width * zoom_sqrt).clamp(0.3, 6.0);
            painter.line_segment([start, end], Stroke::new(width, EDGE_COLOR));
        }

        for (index, node) in sim.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = (node.radius * zoom).clamp(1.5, 60.0);
            if !circle_visible(rect, position, radius + 8.0) {
                continue;
            }

            let is_hovered = hovered == Some(index);
            if node.flagged {
                draw_flag_glow(&painter, position, radius);
            }
            painter.circle_filled(position, radius, node_fill(node.flagged, is_hovered));
            painter.circle_stroke(position, radius, node_stroke(node.flagged));

            if is_hovered || radius > 14.0 || zoom > 1.2 {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    truncate_label(&node.label, LABEL_BUDGET),
                    FontId::proportional(10.0),
                    LABEL_COLOR,
                );
            }
        }

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        // Activation fires on a click, never at the end of a drag; egui's
        // click/drag threshold keeps the two exclusive.
        if response.clicked_by(PointerButton::Primary)
            && let Some(index) = hovered
        {
            let id = sim.nodes[index].id.clone();
            log::info!("entity activated: {id}");
            self.activated = Some(id);
        }

        if let Some(index) = hovered
            && self.drag_node.is_none()
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            draw_tooltip(&painter, rect, pointer, &sim.nodes[index]);
        }
    }
}

fn draw_tooltip(painter: &Painter, rect: Rect, pointer: Pos2, node: &SimNode) {
    let mut galleys = vec![
        painter.layout_no_wrap(
            node.label.clone(),
            FontId::proportional(12.0),
            Color32::from_gray(230),
        ),
        painter.layout_no_wrap(node.id.clone(), FontId::proportional(10.0), LABEL_COLOR),
        painter.layout_no_wrap(
            format!("{} messages", node.weight as u64),
            FontId::proportional(10.0),
            Color32::from_rgb(212, 175, 55),
        ),
    ];
    if node.flagged {
        galleys.push(painter.layout_no_wrap(
            "FLAGGED ACCOUNT".to_owned(),
            FontId::proportional(10.0),
            Color32::from_rgb(204, 17, 0),
        ));
    }

    let padding = vec2(8.0, 6.0);
    let line_gap = 2.0;
    let width = galleys
        .iter()
        .map(|galley| galley.size().x)
        .fold(0.0_f32, f32::max);
    let height = galleys
        .iter()
        .map(|galley| galley.size().y + line_gap)
        .sum::<f32>()
        - line_gap;
    let size = vec2(width, height) + padding * 2.0;

    let mut anchor = pointer + vec2(14.0, -10.0);
    if anchor.x + size.x > rect.right() {
        anchor.x = pointer.x - 14.0 - size.x;
    }
    anchor.y = anchor.y.clamp(rect.top(), (rect.bottom() - size.y).max(rect.top()));

    let tooltip_rect = Rect::from_min_size(anchor, size);
    painter.rect_filled(
        tooltip_rect,
        4.0,
        Color32::from_rgba_unmultiplied(30, 34, 40, 244),
    );
    painter.rect_stroke(
        tooltip_rect,
        4.0,
        Stroke::new(1.0, Color32::from_rgb(70, 78, 88)),
        StrokeKind::Inside,
    );

    let mut cursor = anchor + padding;
    for galley in galleys {
        let advance = galley.size().y + line_gap;
        painter.galley(cursor, galley, Color32::WHITE);
        cursor.y += advance;
    }
}
