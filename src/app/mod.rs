// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Application entry point wiring egui/eframe to launch the editor UI.

use eframe::egui;
use egui_phosphor::Variant;

use crate::config::{AppConfig, credential_from_env};
use crate::ui::RetouchApp;

/// Bootstrap the desktop application and run the main egui event loop.
pub fn run() -> eframe::Result<()> {
    let config = AppConfig::load();
    log::info!(
        "using model {} at {}",
        config.model,
        config.api_base_url
    );
    let credential = credential_from_env();
    if credential.is_some() {
        log::info!("API key taken from RETOUCH_API_KEY for this session");
    }

    // Register Phosphor icon font.
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, Variant::Regular);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Retouch",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_fonts(fonts);
            let app = RetouchApp::new(&config, credential)?;
            Ok(Box::new(app))
        }),
    )
}
