// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Modal prompting for the session API key.

use eframe::egui;

use crate::models::credential::Credential;

/// Modal state. The entered key lives here only until it is submitted.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct CredentialModel {
    open: bool,
    input: String,
    hint: Option<String>,
}

/// Messages emitted by the modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialMsg {
    Open,
    InputChanged(String),
    Submit,
    /// Drop the session key.
    Forget,
    Close,
}

/// What the root model must do after an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialOutcome {
    Submitted(Credential),
    Forgotten,
    Dismissed,
}

impl CredentialModel {
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        self.hint = None;
    }
}

/// Apply a message; returns an outcome when the modal closes.
pub fn update(model: &mut CredentialModel, msg: CredentialMsg) -> Option<CredentialOutcome> {
    match msg {
        CredentialMsg::Open => {
            model.open();
            None
        }
        CredentialMsg::InputChanged(text) => {
            model.input = text;
            model.hint = None;
            None
        }
        CredentialMsg::Submit => match Credential::parse(&model.input) {
            Some(credential) => {
                model.open = false;
                model.input.clear();
                model.hint = None;
                Some(CredentialOutcome::Submitted(credential))
            }
            None => {
                model.hint = Some("Please enter an API key.".into());
                None
            }
        },
        CredentialMsg::Forget => {
            model.open = false;
            model.input.clear();
            model.hint = None;
            Some(CredentialOutcome::Forgotten)
        }
        CredentialMsg::Close => {
            model.open = false;
            model.input.clear();
            model.hint = None;
            Some(CredentialOutcome::Dismissed)
        }
    }
}

/// Render the modal when open. `has_credential` offers forgetting the current key.
pub fn view(
    ctx: &egui::Context,
    model: &CredentialModel,
    has_credential: bool,
) -> Vec<CredentialMsg> {
    let mut msgs = Vec::new();
    if !model.open {
        return msgs;
    }

    egui::Window::new(format!("{} API key", egui_phosphor::regular::KEY))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("Enter your image-generation API key to enable AI edits.");
            ui.label(
                egui::RichText::new("The key is kept in memory for this session only.")
                    .small()
                    .color(egui::Color32::from_gray(110)),
            );
            ui.add_space(6.0);

            let mut input = model.input.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut input)
                    .password(true)
                    .hint_text("API key")
                    .desired_width(280.0),
            );
            if response.changed() {
                msgs.push(CredentialMsg::InputChanged(input));
            }
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if let Some(hint) = &model.hint {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 40), hint);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Save key").clicked() || enter {
                    msgs.push(CredentialMsg::Submit);
                }
                if ui.button("Cancel").clicked() {
                    msgs.push(CredentialMsg::Close);
                }
                if has_credential
                    && ui
                        .button(format!("{} Forget key", egui_phosphor::regular::TRASH_SIMPLE))
                        .clicked()
                {
                    msgs.push(CredentialMsg::Forget);
                }
            });
        });

    msgs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_submit_keeps_modal_open_with_hint() {
        let mut model = CredentialModel::default();
        update(&mut model, CredentialMsg::Open);
        update(&mut model, CredentialMsg::InputChanged("  ".into()));

        assert_eq!(update(&mut model, CredentialMsg::Submit), None);
        assert!(model.is_open());
        assert!(model.hint.is_some());
    }

    #[test]
    fn submit_returns_credential_and_clears_input() {
        let mut model = CredentialModel::default();
        update(&mut model, CredentialMsg::Open);
        update(&mut model, CredentialMsg::InputChanged(" key-1 ".into()));

        let outcome = update(&mut model, CredentialMsg::Submit);

        assert_eq!(
            outcome,
            Some(CredentialOutcome::Submitted(Credential::parse("key-1").unwrap()))
        );
        assert!(!model.is_open());
        assert!(model.input.is_empty());
    }

    #[test]
    fn forget_closes_and_reports() {
        let mut model = CredentialModel::default();
        update(&mut model, CredentialMsg::Open);

        assert_eq!(
            update(&mut model, CredentialMsg::Forget),
            Some(CredentialOutcome::Forgotten)
        );
        assert!(!model.is_open());
    }

    #[test]
    fn close_dismisses() {
        let mut model = CredentialModel::default();
        update(&mut model, CredentialMsg::Open);
        update(&mut model, CredentialMsg::InputChanged("partial".into()));

        assert_eq!(
            update(&mut model, CredentialMsg::Close),
            Some(CredentialOutcome::Dismissed)
        );
        assert!(model.input.is_empty());
    }
}
