use eframe::egui::{self, PointerButton, Rect, Ui};

use crate::sim::DRAG_REHEAT;

use super::super::ViewModel;

// Pointer slop, in world units at zoom 1, added to a node's disk for
// hit-testing.
const HOVER_SLOP: f32 = 2.0;

impl ViewModel {
    /// Wheel zoom about the pointer. Only the view transform changes;
    /// simulated world coordinates are never touched.
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }
        let Some(sim) = self.sim.as_mut() else {
            return;
        };

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        sim.view.zoom_about(rect, pointer, factor);
    }

    /// Hit-test the pointer against node disks in world space, closest
    /// center wins.
    pub(in crate::app) fn hovered_node(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let sim = self.sim.as_ref()?;
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        let world = sim.view.screen_to_world(rect, pointer);
        sim.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.pos - world).length();
                (distance <= node.radius + HOVER_SLOP).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Primary drag on a node pins it to the pointer and reheats the layout;
    /// primary drag on empty canvas (and secondary/middle drag anywhere)
    /// pans. Release clears the pin and lets the temperature decay.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };

        if response.drag_started_by(PointerButton::Primary)
            && let Some(index) = hovered
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.drag_node = Some(index);
            sim.pin(index, sim.view.screen_to_world(rect, pointer));
            sim.reheat(DRAG_REHEAT);
        }

        if response.dragged_by(PointerButton::Primary) {
            match self.drag_node {
                Some(index) => {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        sim.pin(index, sim.view.screen_to_world(rect, pointer));
                        // Keep the simulation warm for the whole gesture.
                        sim.reheat(DRAG_REHEAT);
                    }
                }
                None => sim.view.pan_by(response.drag_delta()),
            }
        }

        if response.drag_stopped_by(PointerButton::Primary)
            && let Some(index) = self.drag_node.take()
        {
            sim.unpin(index);
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            sim.view.pan_by(response.drag_delta());
        }
    }
}
