// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reference faces panel: thumbnails with in-use switches.

use eframe::egui;

use crate::logic::references::{MAX_REFERENCES, ReferenceList};
use crate::models::artifact::Artifact;
use crate::ui::components::previews::PreviewsModel;
use crate::ui::components::toggle_switch;

/// Messages emitted by the references panel.
#[derive(Clone, Debug, PartialEq)]
pub enum ReferencesMsg {
    RequestAdd,
    Remove(usize),
    Toggle(usize),
    LoadPreview(Artifact),
}

const THUMB: f32 = 56.0;

/// Render the panel and return any triggered messages.
pub fn view(
    ui: &mut egui::Ui,
    references: &ReferenceList,
    previews: &PreviewsModel,
    enabled: bool,
) -> Vec<ReferencesMsg> {
    let mut msgs = Vec::new();

    egui::CollapsingHeader::new(format!(
        "{} Reference faces ({}/{MAX_REFERENCES})",
        egui_phosphor::regular::USER_CIRCLE,
        references.len()
    ))
    .default_open(false)
    .show(ui, |ui| {
        ui.label(
            egui::RichText::new("Faces switched on are sent along with each edit to keep identities consistent.")
                .small()
                .color(egui::Color32::from_gray(110)),
        );
        ui.add_space(4.0);

        if references.is_empty() {
            ui.label(egui::RichText::new("No reference faces").color(egui::Color32::from_gray(150)));
        }

        for (index, reference) in references.items().iter().enumerate() {
            ui.horizontal(|ui| {
                let id = reference.artifact.id();
                match previews.get(id) {
                    Some(preview) => {
                        let size = preview.texture.size_vec2();
                        let scale = (THUMB / size.x).min(THUMB / size.y).min(1.0);
                        ui.add(egui::Image::new((preview.texture.id(), size * scale)));
                    }
                    None => {
                        if previews.needs(id) {
                            msgs.push(ReferencesMsg::LoadPreview(reference.artifact.clone()));
                        }
                        ui.allocate_space(egui::vec2(THUMB, THUMB));
                    }
                }

                ui.vertical(|ui| {
                    ui.label(reference.artifact.name());
                    ui.horizontal(|ui| {
                        if toggle_switch(ui, reference.in_use)
                            .on_hover_text("Send with edits")
                            .clicked()
                        {
                            msgs.push(ReferencesMsg::Toggle(index));
                        }
                        ui.label(if reference.in_use { "In use" } else { "Off" });
                    });
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(egui_phosphor::regular::TRASH_SIMPLE)
                        .on_hover_text("Remove reference")
                        .clicked()
                    {
                        msgs.push(ReferencesMsg::Remove(index));
                    }
                });
            });
        }

        ui.add_space(4.0);
        let add = egui::Button::new(format!("{} Add face", egui_phosphor::regular::PLUS));
        if ui
            .add_enabled(enabled, add)
            .on_hover_text(format!("Keeps at most {MAX_REFERENCES}; the oldest is replaced"))
            .clicked()
        {
            msgs.push(ReferencesMsg::RequestAdd);
        }
    });

    msgs
}
