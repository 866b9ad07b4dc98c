// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for the photo editor.
//! Handles layout, canvas interaction, and wiring to background workers.

pub mod components;

use std::sync::Arc;

use eframe::egui;

use crate::config::AppConfig;
use crate::logic::generation::{GeminiClient, GenerationError, ImageGenerator};
use crate::models::credential::Credential;
use crate::models::hotspot::DisplayGeometry;
use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::previews::PreviewsMsg;
use crate::ui::components::tools::{Tool, ToolsContext};
use crate::ui::components::{credential, crop, references, tools};
use crate::utils::{ensure_extension, suggested_download_name};

/// Stateful egui application driving the editor.
pub struct RetouchApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
    /// Canvas geometry from the last frame, used to map crop selections.
    geometry: Option<DisplayGeometry>,
}

impl RetouchApp {
    /// Spawn the command workers and build the initial model.
    ///
    /// Builds a [`GeminiClient`] from `config` and shares it with a small pool
    /// of worker threads fed through a crossbeam channel. `credential` is the
    /// session key, if one was supplied up front; without it the key modal opens
    /// on the first frame. Loading of the reference store is queued immediately.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = AppConfig::load();
    /// let app = RetouchApp::new(&config, None)?;
    /// ```
    pub fn new(config: &AppConfig, credential: Option<Credential>) -> Result<Self, GenerationError> {
        let generator: Arc<dyn ImageGenerator> = Arc::new(GeminiClient::from_config(config)?);
        Ok(Self::with_generator(
            generator,
            credential,
            config.reference_store_path(),
        ))
    }

    fn with_generator(
        generator: Arc<dyn ImageGenerator>,
        credential: Option<Credential>,
        reference_store: Option<std::path::PathBuf>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd, generator.as_ref());
                    let _ = msg_tx.send(msg);
                }
            });
        }

        let mut commands = Vec::new();
        let mut model = AppModel::new(credential, reference_store, &mut commands);
        for cmd in commands {
            if cmd_tx.send(cmd).is_ok() {
                model.pending_commands += 1;
            }
        }

        Self {
            model,
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
            geometry: None,
        }
    }
}

impl eframe::App for RetouchApp {
    /// Drives a single UI frame: processes worker results, updates the model,
    /// and renders the editor.
    ///
    /// This method:
    /// - Drains messages produced by background workers into the inbox and
    ///   decrements the pending command counter for each.
    /// - Processes inbox messages in arrival order, turning decoded previews into
    ///   egui textures and applying everything else to the MVU model; resulting
    ///   commands go to the workers and bump the pending counter.
    /// - Renders the top bar (file, history and key controls), the status bar,
    ///   the tools side panel with the reference faces, the canvas, and the key
    ///   and error modals. Views emit messages into the inbox for the next frame.
    /// - Keeps repainting while messages or background work are pending.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// // Driven by the eframe runtime; this shows the intended call site.
    /// // let mut app = RetouchApp::new(&config, None)?;
    /// // let ctx: egui::Context = /* provided by eframe */ unimplemented!();
    /// // let mut frame: eframe::Frame = /* provided by eframe */ unimplemented!();
    /// // app.update(&ctx, &mut frame);
    /// ```
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });

        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        let mut msgs = std::mem::take(&mut self.inbox);
        msgs.reverse();
        while let Some(msg) = msgs.pop() {
            match msg {
                Msg::Previews(PreviewsMsg::Decoded { id, natural, image }) => {
                    let texture = ctx.load_texture(
                        format!("artifact-{id}"),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    msgs.push(Msg::Previews(PreviewsMsg::Ready {
                        id,
                        natural,
                        texture,
                    }));
                }
                other => {
                    let mut commands = Vec::new();
                    mvu::update(&mut self.model, other, &mut commands);
                    for cmd in commands {
                        if self.cmd_tx.send(cmd).is_ok() {
                            self.model.pending_commands += 1;
                        }
                    }
                }
            }
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Retouch");
                ui.separator();
                self.render_file_controls(ui);
                ui.separator();
                self.render_history_controls(ui);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::widgets::global_theme_preference_switch(ui);
                    ui.separator();
                    self.render_credential_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::SidePanel::right("tools_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(8.0);
                    self.render_tools(ui);
                    ui.add_space(12.0);
                    let ref_msgs = references::view(
                        ui,
                        &self.model.references,
                        &self.model.previews,
                        !self.model.busy,
                    );
                    self.inbox.extend(ref_msgs.into_iter().map(Msg::References));
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_canvas(ui);
        });

        let cred_msgs = credential::view(
            ctx,
            &self.model.credential_modal,
            self.model.credential.is_some(),
        );
        self.inbox.extend(cred_msgs.into_iter().map(Msg::Credential));

        self.render_error_modal(ctx);

        if !self.inbox.is_empty() {
            ctx.request_repaint();
        } else if self.model.pending_commands > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    /// Required by eframe 0.34; all rendering happens in `update`, which the
    /// runtime still calls before `ui` each frame.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}
}

impl RetouchApp {
    fn tools_context(&self) -> ToolsContext {
        ToolsContext {
            busy: self.model.busy,
            has_image: !self.model.history.is_empty(),
            has_hotspot: self.model.hotspot.is_some(),
        }
    }

    /// Open, start over and download.
    fn render_file_controls(&mut self, ui: &mut egui::Ui) {
        let busy = self.model.busy;
        let has_image = self.model.history.current().is_some();

        let open = egui::Button::new(format!("{} Open", egui_phosphor::regular::FOLDER_OPEN));
        if ui.add_enabled(!busy, open).clicked() {
            self.inbox.push(Msg::RequestOpenImage);
        }

        let start_over = egui::Button::new(format!("{} Upload new", egui_phosphor::regular::UPLOAD));
        if ui
            .add_enabled(!busy && has_image, start_over)
            .on_hover_text("Discard all versions and start with a new image")
            .clicked()
        {
            self.inbox.push(Msg::StartOver);
        }

        let download = egui::Button::new(format!(
            "{} Download",
            egui_phosphor::regular::DOWNLOAD_SIMPLE
        ));
        if ui.add_enabled(!busy && has_image, download).clicked() {
            if let Some(current) = self.model.history.current() {
                let extension = current.extension();
                let default_name = suggested_download_name(current.name(), extension);
                let dialog = rfd::FileDialog::new()
                    .set_title("Download image")
                    .add_filter("Image", &[extension])
                    .set_file_name(&default_name);
                match dialog.save_file() {
                    Some(path) => self
                        .inbox
                        .push(Msg::DownloadRequested(ensure_extension(path, extension))),
                    None => self.inbox.push(Msg::DownloadCancelled),
                }
            }
        }
    }

    /// Undo, redo, reset and hold-to-compare.
    fn render_history_controls(&mut self, ui: &mut egui::Ui) {
        let busy = self.model.busy;
        let history = &self.model.history;

        let undo = egui::Button::new(format!("{} Undo", egui_phosphor::regular::ARROW_U_UP_LEFT));
        if ui.add_enabled(!busy && history.can_undo(), undo).clicked() {
            self.inbox.push(Msg::Undo);
        }
        let redo = egui::Button::new(format!("{} Redo", egui_phosphor::regular::ARROW_U_UP_RIGHT));
        if ui.add_enabled(!busy && history.can_redo(), redo).clicked() {
            self.inbox.push(Msg::Redo);
        }
        let reset = egui::Button::new(format!(
            "{} Reset",
            egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
        ));
        if ui.add_enabled(!busy && history.can_undo(), reset).clicked() {
            self.inbox.push(Msg::Reset);
        }

        let compare = egui::Button::new(format!("{} Compare", egui_phosphor::regular::EYE));
        let response = ui
            .add_enabled(!busy && history.len() > 1, compare)
            .on_hover_text("Hold to see the original");
        let held = response.is_pointer_button_down_on();
        if held != self.model.comparing {
            self.inbox.push(Msg::SetComparing(held));
        }
    }

    fn render_credential_button(&mut self, ui: &mut egui::Ui) {
        let (icon, hover) = if self.model.credential.is_some() {
            (egui_phosphor::regular::KEY, "API key set for this session")
        } else {
            (egui_phosphor::regular::WARNING, "No API key set")
        };
        if ui
            .button(format!("{icon} API key"))
            .on_hover_text(hover)
            .clicked()
        {
            self.inbox
                .push(Msg::Credential(credential::CredentialMsg::Open));
        }
    }

    fn render_tools(&mut self, ui: &mut egui::Ui) {
        let ctx = self.tools_context();
        let tab_msgs = tools::tabs(ui, &self.model.tools, ctx);
        self.inbox.extend(tab_msgs.into_iter().map(Msg::Tools));
        ui.separator();

        if self.model.tools.tool() == Tool::Crop {
            let enabled = ctx.has_image && !ctx.busy;
            let (crop_msgs, apply) = crop::controls(ui, &self.model.crop, enabled);
            self.inbox.extend(crop_msgs.into_iter().map(Msg::Crop));
            if apply {
                match self.geometry {
                    Some(geometry) => self.inbox.push(Msg::ApplyCrop {
                        geometry,
                        pixel_ratio: ui.ctx().pixels_per_point(),
                    }),
                    None => log::debug!("crop requested before the image was laid out"),
                }
            }
        } else {
            let panel_msgs = tools::panel(ui, &self.model.tools, ctx);
            self.inbox.extend(panel_msgs.into_iter().map(Msg::Tools));
        }
    }

    /// Draw the displayed image, hotspot marker and crop overlay.
    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let Some(artifact) = self.model.displayed().cloned() else {
            self.geometry = None;
            ui.centered_and_justified(|ui| {
                if ui
                    .add_enabled(
                        !self.model.busy,
                        egui::Button::new(format!(
                            "{} Open an image to start editing",
                            egui_phosphor::regular::IMAGE
                        )),
                    )
                    .clicked()
                {
                    self.inbox.push(Msg::RequestOpenImage);
                }
            });
            return;
        };

        let Some(preview) = self.model.previews.get(artifact.id()) else {
            if self.model.previews.needs(artifact.id()) {
                self.inbox
                    .push(Msg::Previews(PreviewsMsg::Request(artifact.clone())));
            }
            ui.centered_and_justified(|ui| {
                if self.model.previews.has_failed(artifact.id()) {
                    ui.label("This image cannot be displayed.");
                } else {
                    ui.add(egui::Spinner::new().size(24.0));
                }
            });
            return;
        };

        let available = ui.available_size();
        let natural = egui::vec2(preview.natural[0] as f32, preview.natural[1] as f32);
        let scale = (available.x / natural.x).min(available.y / natural.y).min(1.0);
        let size = natural * scale;
        let texture_id = preview.texture.id();
        let geometry = DisplayGeometry::new([size.x, size.y], preview.natural);

        let outer = ui.available_rect_before_wrap();
        let image_rect = egui::Rect::from_center_size(outer.center(), size);
        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        ui.painter().image(
            texture_id,
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if !self.model.comparing {
            self.geometry = Some(geometry);
            match self.model.tools.tool() {
                Tool::Retouch => self.render_hotspot(ui, image_rect, &response, geometry),
                Tool::Crop if !self.model.busy => {
                    let crop_msgs = crop::view(ui, image_rect, &response, &self.model.crop);
                    self.inbox.extend(crop_msgs.into_iter().map(Msg::Crop));
                }
                _ => {}
            }
        }

        if self.model.busy {
            let painter = ui.painter_at(image_rect);
            painter.rect_filled(image_rect, 0.0, egui::Color32::from_black_alpha(120));
            painter.text(
                image_rect.center(),
                egui::Align2::CENTER_CENTER,
                "AI is working its magic…",
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn render_hotspot(
        &mut self,
        ui: &egui::Ui,
        image_rect: egui::Rect,
        response: &egui::Response,
        geometry: DisplayGeometry,
    ) {
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.inbox.push(Msg::ImageClicked {
                    point: [pos.x - image_rect.min.x, pos.y - image_rect.min.y],
                    geometry,
                });
            }
        }
        if response.hovered() && !self.model.busy {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        if let Some([x, y]) = self
            .model
            .hotspot
            .and_then(|spot| geometry.to_display(spot))
        {
            let center = image_rect.min + egui::vec2(x, y);
            let painter = ui.painter_at(image_rect);
            let accent = egui::Color32::from_rgb(64, 156, 255);
            painter.circle_filled(center, 7.0, accent.gamma_multiply(0.5));
            painter.circle_stroke(center, 10.0, egui::Stroke::new(2.0, accent));
        }
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("An error occurred")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Render latest status message, with a spinner while work is pending.
    fn render_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(text) = &self.model.status {
                ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(68)));
            }
            if self.model.pending_commands > 0 {
                ui.add(egui::Spinner::new().size(14.0)).on_hover_text(format!(
                    "{} task(s) running in background",
                    self.model.pending_commands
                ));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(position) = self.model.history.position() {
                    ui.label(
                        egui::RichText::new(format!(
                            "Version {} of {}",
                            position + 1,
                            self.model.history.len()
                        ))
                        .small()
                        .color(egui::Color32::from_gray(110)),
                    );
                }
            });
        });
    }
}
