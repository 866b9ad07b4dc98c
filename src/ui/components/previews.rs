// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! GPU texture cache for artifacts on screen.
//!
//! Textures are decoded off the UI thread and kept only while their artifact
//! is still displayed; [`retain`] drops the rest so superseded versions do not
//! pile up in GPU memory.

use std::collections::{HashMap, HashSet};

use eframe::egui;
use uuid::Uuid;

use crate::models::artifact::Artifact;

/// Longest edge of a decoded preview; larger images are downscaled for display.
pub const MAX_PREVIEW_EDGE: u32 = 4096;

/// A texture plus the native size of the artifact it shows.
pub struct Preview {
    pub texture: egui::TextureHandle,
    pub natural: [u32; 2],
}

/// Cache state: ready textures, requests in flight, failures.
#[derive(Default)]
pub struct PreviewsModel {
    ready: HashMap<Uuid, Preview>,
    requested: HashSet<Uuid>,
    failed: HashSet<Uuid>,
}

/// Messages for the preview cache.
// Debug omitted because TextureHandle and ColorImage payloads are large.
pub enum PreviewsMsg {
    Request(Artifact),
    Decoded {
        id: Uuid,
        natural: [u32; 2],
        image: egui::ColorImage,
    },
    Ready {
        id: Uuid,
        natural: [u32; 2],
        texture: egui::TextureHandle,
    },
    Failed {
        id: Uuid,
        error: String,
    },
}

/// Side effects requested by the cache.
pub enum PreviewsCommand {
    Decode(Artifact),
}

impl PreviewsModel {
    pub fn get(&self, id: Uuid) -> Option<&Preview> {
        self.ready.get(&id)
    }

    /// Whether a decode for `id` should be requested now.
    pub fn needs(&self, id: Uuid) -> bool {
        !self.ready.contains_key(&id) && !self.requested.contains(&id) && !self.failed.contains(&id)
    }

    pub fn has_failed(&self, id: Uuid) -> bool {
        self.failed.contains(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ready.len()
    }
}

/// Apply a message. Returns an error text for failed decodes.
pub fn update(
    model: &mut PreviewsModel,
    msg: PreviewsMsg,
    cmds: &mut Vec<PreviewsCommand>,
) -> Option<String> {
    match msg {
        PreviewsMsg::Request(artifact) => {
            if model.needs(artifact.id()) {
                model.requested.insert(artifact.id());
                cmds.push(PreviewsCommand::Decode(artifact));
            }
            None
        }
        // Texture upload needs the egui context; the shell converts this into `Ready`.
        PreviewsMsg::Decoded { .. } => None,
        PreviewsMsg::Ready {
            id,
            natural,
            texture,
        } => {
            if model.requested.remove(&id) {
                model.ready.insert(id, Preview { texture, natural });
            }
            None
        }
        PreviewsMsg::Failed { id, error } => {
            model.requested.remove(&id);
            model.failed.insert(id);
            log::warn!("could not decode preview {id}: {error}");
            Some(format!("Could not display image: {error}"))
        }
    }
}

/// Release textures and bookkeeping for artifacts not in `live`.
///
/// A decode still in flight for a dropped artifact is forgotten too, so its
/// late `Ready` message is discarded.
pub fn retain(model: &mut PreviewsModel, live: &HashSet<Uuid>) -> usize {
    let before = model.ready.len();
    model.ready.retain(|id, _| live.contains(id));
    model.requested.retain(|id| live.contains(id));
    model.failed.retain(|id| live.contains(id));
    let released = before - model.ready.len();
    if released > 0 {
        log::debug!("released {released} preview texture(s)");
    }
    released
}

/// Decode an artifact into an RGBA image suitable for texture upload.
pub fn decode_preview(artifact: &Artifact) -> Result<([u32; 2], egui::ColorImage), String> {
    let image = artifact.decode().map_err(|e| format!("{e:#}"))?;
    let natural = [image.width(), image.height()];
    let image = if natural[0] > MAX_PREVIEW_EDGE || natural[1] > MAX_PREVIEW_EDGE {
        image.thumbnail(MAX_PREVIEW_EDGE, MAX_PREVIEW_EDGE)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok((
        natural,
        egui::ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifact::sample_png;

    fn texture(ctx: &egui::Context, name: &str) -> egui::TextureHandle {
        ctx.load_texture(
            name,
            egui::ColorImage::from_rgba_unmultiplied([1, 1], &[255, 255, 255, 255]),
            egui::TextureOptions::default(),
        )
    }

    #[test]
    fn request_enqueues_decode_once() {
        let mut model = PreviewsModel::default();
        let art = sample_png(2, 2);
        let mut cmds = Vec::new();

        update(&mut model, PreviewsMsg::Request(art.clone()), &mut cmds);
        update(&mut model, PreviewsMsg::Request(art.clone()), &mut cmds);

        assert_eq!(cmds.len(), 1);
        assert!(!model.needs(art.id()));
    }

    #[test]
    fn ready_texture_is_cached_and_released_when_superseded() {
        let ctx = egui::Context::default();
        let mut model = PreviewsModel::default();
        let keep = sample_png(2, 2);
        let drop = sample_png(3, 3);
        let mut cmds = Vec::new();

        for art in [&keep, &drop] {
            update(&mut model, PreviewsMsg::Request(art.clone()), &mut cmds);
            update(
                &mut model,
                PreviewsMsg::Ready {
                    id: art.id(),
                    natural: [2, 2],
                    texture: texture(&ctx, art.name()),
                },
                &mut cmds,
            );
        }
        assert_eq!(model.len(), 2);

        let live: HashSet<Uuid> = [keep.id()].into_iter().collect();
        assert_eq!(retain(&mut model, &live), 1);

        assert!(model.get(keep.id()).is_some());
        assert!(model.get(drop.id()).is_none());
    }

    #[test]
    fn late_ready_for_released_artifact_is_discarded() {
        let ctx = egui::Context::default();
        let mut model = PreviewsModel::default();
        let art = sample_png(2, 2);
        let mut cmds = Vec::new();

        update(&mut model, PreviewsMsg::Request(art.clone()), &mut cmds);
        retain(&mut model, &HashSet::new());
        update(
            &mut model,
            PreviewsMsg::Ready {
                id: art.id(),
                natural: [2, 2],
                texture: texture(&ctx, "late"),
            },
            &mut cmds,
        );

        assert_eq!(model.len(), 0);
    }

    #[test]
    fn failures_are_remembered_and_reported() {
        let mut model = PreviewsModel::default();
        let art = sample_png(2, 2);
        let mut cmds = Vec::new();
        update(&mut model, PreviewsMsg::Request(art.clone()), &mut cmds);

        let err = update(
            &mut model,
            PreviewsMsg::Failed {
                id: art.id(),
                error: "boom".into(),
            },
            &mut cmds,
        );

        assert!(err.unwrap().contains("boom"));
        assert!(model.has_failed(art.id()));
        assert!(!model.needs(art.id()));
    }

    #[test]
    fn decode_preview_reports_native_size() {
        let (natural, image) = decode_preview(&sample_png(5, 7)).unwrap();
        assert_eq!(natural, [5, 7]);
        assert_eq!(image.size, [5, 7]);

        let bad = Artifact::new("bad.png", "image/png", vec![0; 4]);
        assert!(decode_preview(&bad).is_err());
    }
}
