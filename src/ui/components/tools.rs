// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Tool tabs and the Retouch, Adjust and Filters panels.

use eframe::egui;

use crate::logic::prompts::{ADJUSTMENT_PRESETS, FILTER_PRESETS};

/// Active editing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Retouch,
    Crop,
    Adjust,
    Filters,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Retouch, Tool::Crop, Tool::Adjust, Tool::Filters];

    fn label(&self) -> String {
        let (icon, text) = match self {
            Tool::Retouch => (egui_phosphor::regular::MAGIC_WAND, "Retouch"),
            Tool::Crop => (egui_phosphor::regular::CROP, "Crop"),
            Tool::Adjust => (egui_phosphor::regular::SLIDERS_HORIZONTAL, "Adjust"),
            Tool::Filters => (egui_phosphor::regular::PALETTE, "Filters"),
        };
        format!("{icon} {text}")
    }
}

/// Text inputs and the selected tool.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ToolsModel {
    tool: Tool,
    instruction: String,
    custom_filter: String,
    custom_adjustment: String,
}

/// Messages emitted by the tool panels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolsMsg {
    Select(Tool),
    InstructionChanged(String),
    CustomFilterChanged(String),
    CustomAdjustmentChanged(String),
    Retouch,
    Filter(String),
    Adjust(String),
}

/// Requests the root model has to act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolAction {
    /// The selected tool changed from `from`.
    Switched { from: Tool },
    Retouch { instruction: String },
    Filter { instruction: String },
    Adjust { instruction: String },
}

/// What the panels need to know about the rest of the app.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToolsContext {
    pub busy: bool,
    pub has_image: bool,
    pub has_hotspot: bool,
}

impl ToolsModel {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[cfg(test)]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Apply a message; returns an action for the root model when relevant.
pub fn update(model: &mut ToolsModel, msg: ToolsMsg) -> Option<ToolAction> {
    match msg {
        ToolsMsg::Select(tool) => {
            if tool == model.tool {
                return None;
            }
            let from = std::mem::replace(&mut model.tool, tool);
            Some(ToolAction::Switched { from })
        }
        ToolsMsg::InstructionChanged(text) => {
            model.instruction = text;
            None
        }
        ToolsMsg::CustomFilterChanged(text) => {
            model.custom_filter = text;
            None
        }
        ToolsMsg::CustomAdjustmentChanged(text) => {
            model.custom_adjustment = text;
            None
        }
        ToolsMsg::Retouch => Some(ToolAction::Retouch {
            instruction: model.instruction.trim().to_string(),
        }),
        ToolsMsg::Filter(instruction) => Some(ToolAction::Filter {
            instruction: instruction.trim().to_string(),
        }),
        ToolsMsg::Adjust(instruction) => Some(ToolAction::Adjust {
            instruction: instruction.trim().to_string(),
        }),
    }
}

/// Render the tab strip.
pub fn tabs(ui: &mut egui::Ui, model: &ToolsModel, ctx: ToolsContext) -> Vec<ToolsMsg> {
    let mut msgs = Vec::new();
    ui.horizontal(|ui| {
        for tool in Tool::ALL {
            let button = egui::Button::new(tool.label()).selected(model.tool == tool);
            if ui.add_enabled(!ctx.busy, button).clicked() {
                msgs.push(ToolsMsg::Select(tool));
            }
        }
    });
    msgs
}

/// Render the panel for the selected tool. The crop panel lives in
/// [`crate::ui::components::crop`].
pub fn panel(ui: &mut egui::Ui, model: &ToolsModel, ctx: ToolsContext) -> Vec<ToolsMsg> {
    let mut msgs = Vec::new();
    let enabled = ctx.has_image && !ctx.busy;
    match model.tool {
        Tool::Retouch => render_retouch(ui, model, ctx, enabled, &mut msgs),
        Tool::Adjust => render_presets(
            ui,
            "Apply a professional adjustment",
            ADJUSTMENT_PRESETS,
            &model.custom_adjustment,
            "Or describe an adjustment (e.g. 'change background to a forest')",
            enabled,
            ToolsMsg::CustomAdjustmentChanged,
            ToolsMsg::Adjust,
            &mut msgs,
        ),
        Tool::Filters => render_presets(
            ui,
            "Apply a filter",
            FILTER_PRESETS,
            &model.custom_filter,
            "Or describe a custom filter (e.g. '80s synthwave glow')",
            enabled,
            ToolsMsg::CustomFilterChanged,
            ToolsMsg::Filter,
            &mut msgs,
        ),
        Tool::Crop => {}
    }
    msgs
}

fn render_retouch(
    ui: &mut egui::Ui,
    model: &ToolsModel,
    ctx: ToolsContext,
    enabled: bool,
    msgs: &mut Vec<ToolsMsg>,
) {
    let hint = if ctx.has_hotspot {
        "Describe your edit (e.g. 'change the shirt color to blue')"
    } else {
        "First click a point on the image"
    };
    ui.label(
        egui::RichText::new("Click an area on the image to make a precise edit.")
            .small()
            .color(egui::Color32::from_gray(110)),
    );

    let mut text = model.instruction.clone();
    let response = ui.add_enabled(
        enabled && ctx.has_hotspot,
        egui::TextEdit::singleline(&mut text)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        msgs.push(ToolsMsg::InstructionChanged(text));
    }
    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    let can_generate = enabled && ctx.has_hotspot && !model.instruction.trim().is_empty();
    let button = egui::Button::new(format!("{} Generate", egui_phosphor::regular::SPARKLE));
    if ui.add_enabled(can_generate, button).clicked() || (enter && can_generate) {
        msgs.push(ToolsMsg::Retouch);
    }
}

#[allow(clippy::too_many_arguments)]
fn render_presets(
    ui: &mut egui::Ui,
    heading: &str,
    presets: &[(&str, &str)],
    custom: &str,
    custom_hint: &str,
    enabled: bool,
    on_change: fn(String) -> ToolsMsg,
    on_apply: fn(String) -> ToolsMsg,
    msgs: &mut Vec<ToolsMsg>,
) {
    ui.label(heading);
    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        for (label, prompt) in presets {
            if ui
                .add_enabled(enabled, egui::Button::new(*label))
                .on_hover_text(*prompt)
                .clicked()
            {
                msgs.push(on_apply((*prompt).to_string()));
            }
        }
    });

    ui.add_space(6.0);
    let mut text = custom.to_string();
    if ui
        .add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut text)
                .hint_text(custom_hint)
                .desired_width(f32::INFINITY),
        )
        .changed()
    {
        msgs.push(on_change(text));
    }
    let apply = egui::Button::new(format!("{} Apply", egui_phosphor::regular::CHECK));
    if ui
        .add_enabled(enabled && !custom.trim().is_empty(), apply)
        .clicked()
    {
        msgs.push(on_apply(custom.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_reports_previous_tool_once() {
        let mut model = ToolsModel::default();
        assert_eq!(
            update(&mut model, ToolsMsg::Select(Tool::Crop)),
            Some(ToolAction::Switched {
                from: Tool::Retouch
            })
        );
        assert_eq!(update(&mut model, ToolsMsg::Select(Tool::Crop)), None);
        assert_eq!(model.tool(), Tool::Crop);
    }

    #[test]
    fn retouch_uses_trimmed_instruction() {
        let mut model = ToolsModel::default();
        update(&mut model, ToolsMsg::InstructionChanged("  add a hat ".into()));
        assert_eq!(
            update(&mut model, ToolsMsg::Retouch),
            Some(ToolAction::Retouch {
                instruction: "add a hat".into()
            })
        );
        assert_eq!(model.instruction(), "  add a hat ");
    }

    #[test]
    fn preset_requests_carry_prompt() {
        let mut model = ToolsModel::default();
        let (_, prompt) = FILTER_PRESETS[0];
        assert_eq!(
            update(&mut model, ToolsMsg::Filter(prompt.to_string())),
            Some(ToolAction::Filter {
                instruction: prompt.to_string()
            })
        );
        assert!(matches!(
            update(&mut model, ToolsMsg::Adjust(" brighter ".into())),
            Some(ToolAction::Adjust { instruction }) if instruction == "brighter"
        ));
    }
}
