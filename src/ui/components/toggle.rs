// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Small on/off switch used for per-reference "in use" flags.

use eframe::egui;

/// Draw a switch reflecting `on`. The caller reacts to `clicked()`; the
/// widget itself does not own the state.
pub fn toggle_switch(ui: &mut egui::Ui, on: bool) -> egui::Response {
    let height = ui.spacing().interact_size.y.max(16.0);
    let size = egui::vec2(height * 1.8, height);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let t = ui.ctx().animate_bool(response.id, on);
        let visuals = ui.style().interact_selectable(&response, on);
        let off_fill = ui.visuals().widgets.inactive.bg_fill;
        let fill = off_fill.lerp_to_gamma(visuals.bg_fill, t);
        let radius = rect.height() / 2.0;

        ui.painter().rect_filled(rect, radius, fill);
        let knob_x = egui::lerp((rect.left() + radius)..=(rect.right() - radius), t);
        ui.painter().circle(
            egui::pos2(knob_x, rect.center().y),
            radius * 0.75,
            visuals.fg_stroke.color,
            egui::Stroke::NONE,
        );
    }

    response
}
