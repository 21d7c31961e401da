use eframe::egui::{self, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.add(egui::Slider::new(&mut self.min_weight, 1..=100).text("Min edge weight"))
            .on_hover_text("Edges below this weight are filtered out server-side.");
        ui.add(egui::Slider::new(&mut self.max_nodes, 20..=300).text("Max entities"))
            .on_hover_text("Cap on the number of entities in the snapshot.");

        ui.add_space(6.0);
        ui.label("Ego entity (empty for the global graph)");
        ui.text_edit_singleline(&mut self.ego)
            .on_hover_text("Restrict the graph to one entity's network.");
        ui.add_enabled(
            !self.ego.trim().is_empty(),
            egui::Slider::new(&mut self.ego_depth, 1..=2).text("Ego depth"),
        );

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!is_reloading, egui::Button::new("Reload"))
                .on_hover_text("Fetch a fresh snapshot with the filters above.")
                .clicked()
            {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }
        });

        ui.separator();

        if let Some(sim) = &self.sim {
            ui.label(format!(
                "{} entities, {} connections",
                sim.nodes.len(),
                sim.links.len()
            ));
            let status = if sim.alpha() > 0.001 {
                format!("layout settling (alpha {:.3})", sim.alpha())
            } else {
                "layout converged".to_owned()
            };
            ui.label(status);
        }

        if let Some(activated) = self.activated.clone() {
            ui.separator();
            ui.label("Selected entity");
            ui.monospace(&activated);
            if ui
                .button("View ego network")
                .on_hover_text("Reload the graph centered on this entity.")
                .clicked()
            {
                self.ego = activated;
                *reload_requested = true;
            }
        }
    }
}
