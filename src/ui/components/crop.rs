// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Interactive crop selection: drawing, moving and resizing a rectangle over
//! the displayed image.

use eframe::egui;

use crate::models::crop::{AspectPreset, DisplayRect};

/// Smallest selection edge in displayed points while resizing.
const MIN_SIZE: f32 = 1.0;

/// Pointer distance (points) within which a handle is grabbed.
const HANDLE_GRAB: f32 = 8.0;

/// Which part of the selection a drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragHandle {
    /// Drawing a fresh selection.
    #[default]
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    handle: DragHandle,
    start: [f32; 2],
    start_rect: Option<DisplayRect>,
}

/// Crop tool state. Coordinates are displayed points relative to the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropModel {
    selection: Option<DisplayRect>,
    aspect: AspectPreset,
    drag: Option<Drag>,
}

/// Messages emitted by the crop overlay and controls.
#[derive(Debug, Clone, PartialEq)]
pub enum CropMsg {
    DragStart {
        pos: [f32; 2],
        handle: DragHandle,
    },
    DragMove {
        pos: [f32; 2],
        bounds: [f32; 2],
    },
    DragEnd,
    SetAspect(AspectPreset),
    Clear,
}

impl CropModel {
    pub fn selection(&self) -> Option<DisplayRect> {
        self.selection.filter(|r| !r.is_empty())
    }

    pub fn aspect(&self) -> AspectPreset {
        self.aspect
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.drag = None;
    }
}

/// Apply a message to the crop model.
pub fn update(model: &mut CropModel, msg: CropMsg) {
    match msg {
        CropMsg::DragStart { pos, handle } => {
            if handle == DragHandle::None {
                model.selection = Some(DisplayRect::new(pos[0], pos[1], 0.0, 0.0));
            }
            model.drag = Some(Drag {
                handle,
                start: pos,
                start_rect: model.selection,
            });
        }
        CropMsg::DragMove { pos, bounds } => {
            if let Some(drag) = model.drag {
                if let Some(rect) = drag_rect(drag, pos, bounds) {
                    model.selection = Some(model.aspect.constrain(rect));
                }
            }
        }
        CropMsg::DragEnd => model.drag = None,
        CropMsg::SetAspect(aspect) => {
            model.aspect = aspect;
            model.selection = model.selection.map(|r| aspect.constrain(r));
        }
        CropMsg::Clear => model.clear(),
    }
}

/// Compute the selection produced by dragging `drag` to `pos`, clamped to
/// `bounds` (displayed width/height).
fn drag_rect(drag: Drag, pos: [f32; 2], bounds: [f32; 2]) -> Option<DisplayRect> {
    let [w, h] = bounds;
    let [x, y] = pos;
    let [sx, sy] = drag.start;

    match drag.handle {
        DragHandle::None => {
            let min_x = sx.min(x).max(0.0);
            let min_y = sy.min(y).max(0.0);
            let max_x = sx.max(x).min(w);
            let max_y = sy.max(y).min(h);
            Some(DisplayRect::new(
                min_x,
                min_y,
                (max_x - min_x).max(0.0),
                (max_y - min_y).max(0.0),
            ))
        }
        DragHandle::Move => {
            let r = drag.start_rect?;
            let nx = (r.x + x - sx).max(0.0).min(w - r.width);
            let ny = (r.y + y - sy).max(0.0).min(h - r.height);
            Some(DisplayRect { x: nx, y: ny, ..r })
        }
        handle => {
            let r = drag.start_rect?;
            Some(resize(handle, r, x - sx, y - sy, w, h))
        }
    }
}

fn resize(handle: DragHandle, r: DisplayRect, dx: f32, dy: f32, w: f32, h: f32) -> DisplayRect {
    let right = r.x + r.width;
    let bottom = r.y + r.height;

    let move_left = |r: &mut DisplayRect| {
        r.x = (r.x + dx).max(0.0).min(right - MIN_SIZE);
        r.width = right - r.x;
    };
    let move_top = |r: &mut DisplayRect| {
        r.y = (r.y + dy).max(0.0).min(bottom - MIN_SIZE);
        r.height = bottom - r.y;
    };
    let move_right = |r: &mut DisplayRect| {
        r.width = (right + dx).min(w).max(r.x + MIN_SIZE) - r.x;
    };
    let move_bottom = |r: &mut DisplayRect| {
        r.height = (bottom + dy).min(h).max(r.y + MIN_SIZE) - r.y;
    };

    let mut out = r;
    match handle {
        DragHandle::TopLeft => {
            move_left(&mut out);
            move_top(&mut out);
        }
        DragHandle::TopRight => {
            move_right(&mut out);
            move_top(&mut out);
        }
        DragHandle::BottomLeft => {
            move_left(&mut out);
            move_bottom(&mut out);
        }
        DragHandle::BottomRight => {
            move_right(&mut out);
            move_bottom(&mut out);
        }
        DragHandle::Top => move_top(&mut out),
        DragHandle::Bottom => move_bottom(&mut out),
        DragHandle::Left => move_left(&mut out),
        DragHandle::Right => move_right(&mut out),
        DragHandle::None | DragHandle::Move => {}
    }
    out
}

/// Find the handle under `pos`, `Move` inside the selection, `None` outside.
pub fn hit_test(rect: DisplayRect, pos: [f32; 2]) -> DragHandle {
    let [x, y] = pos;
    let (l, t) = (rect.x, rect.y);
    let (r, b) = (rect.x + rect.width, rect.y + rect.height);
    let near = |a: f32, b: f32| (a - b).abs() <= HANDLE_GRAB;
    let within_x = x >= l - HANDLE_GRAB && x <= r + HANDLE_GRAB;
    let within_y = y >= t - HANDLE_GRAB && y <= b + HANDLE_GRAB;

    match (near(x, l), near(x, r), near(y, t), near(y, b)) {
        (true, _, true, _) => DragHandle::TopLeft,
        (_, true, true, _) => DragHandle::TopRight,
        (true, _, _, true) => DragHandle::BottomLeft,
        (_, true, _, true) => DragHandle::BottomRight,
        (_, _, true, _) if within_x => DragHandle::Top,
        (_, _, _, true) if within_x => DragHandle::Bottom,
        (true, _, _, _) if within_y => DragHandle::Left,
        (_, true, _, _) if within_y => DragHandle::Right,
        _ if x > l && x < r && y > t && y < b => DragHandle::Move,
        _ => DragHandle::None,
    }
}

/// Draw the overlay over `image_rect` and translate pointer input into
/// messages. `response` must be the drag-sensing response covering the image.
pub fn view(
    ui: &egui::Ui,
    image_rect: egui::Rect,
    response: &egui::Response,
    model: &CropModel,
) -> Vec<CropMsg> {
    let mut msgs = Vec::new();
    let bounds = [image_rect.width(), image_rect.height()];
    let to_local = |p: egui::Pos2| [p.x - image_rect.min.x, p.y - image_rect.min.y];

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = to_local(pos);
            let handle = model
                .selection()
                .map_or(DragHandle::None, |r| hit_test(r, local));
            msgs.push(CropMsg::DragStart { pos: local, handle });
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            msgs.push(CropMsg::DragMove {
                pos: to_local(pos),
                bounds,
            });
        }
    }
    if response.drag_stopped() {
        msgs.push(CropMsg::DragEnd);
    }

    if model.is_dragging() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    let painter = ui.painter_at(image_rect);
    let shade = egui::Color32::from_black_alpha(140);
    match model.selection() {
        Some(sel) => {
            let sel_rect = egui::Rect::from_min_size(
                image_rect.min + egui::vec2(sel.x, sel.y),
                egui::vec2(sel.width, sel.height),
            );
            // Darken the four bands around the selection.
            for band in [
                egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, sel_rect.min.y)),
                egui::Rect::from_min_max(egui::pos2(image_rect.min.x, sel_rect.max.y), image_rect.max),
                egui::Rect::from_min_max(
                    egui::pos2(image_rect.min.x, sel_rect.min.y),
                    egui::pos2(sel_rect.min.x, sel_rect.max.y),
                ),
                egui::Rect::from_min_max(
                    egui::pos2(sel_rect.max.x, sel_rect.min.y),
                    egui::pos2(image_rect.max.x, sel_rect.max.y),
                ),
            ] {
                painter.rect_filled(band, 0.0, shade);
            }
            painter.rect_stroke(
                sel_rect,
                0.0,
                egui::Stroke::new(1.5, egui::Color32::WHITE),
                egui::StrokeKind::Middle,
            );
            for corner in [
                sel_rect.left_top(),
                sel_rect.right_top(),
                sel_rect.left_bottom(),
                sel_rect.right_bottom(),
            ] {
                painter.circle_filled(corner, 4.0, egui::Color32::WHITE);
            }
        }
        None => {
            painter.rect_filled(image_rect, 0.0, egui::Color32::from_black_alpha(60));
        }
    }

    msgs
}

/// Render the crop panel. Returns messages plus whether "Apply crop" was clicked.
pub fn controls(ui: &mut egui::Ui, model: &CropModel, enabled: bool) -> (Vec<CropMsg>, bool) {
    let mut msgs = Vec::new();
    ui.label(
        egui::RichText::new("Drag on the image to select an area to crop.")
            .small()
            .color(egui::Color32::from_gray(110)),
    );
    ui.horizontal(|ui| {
        ui.label("Aspect ratio");
        for preset in AspectPreset::ALL {
            let button = egui::Button::new(preset.label()).selected(model.aspect() == preset);
            if ui.add_enabled(enabled, button).clicked() {
                msgs.push(CropMsg::SetAspect(preset));
            }
        }
    });

    let has_selection = model.selection().is_some();
    let mut apply = false;
    ui.horizontal(|ui| {
        let button = egui::Button::new(format!("{} Apply crop", egui_phosphor::regular::CROP));
        apply = ui
            .add_enabled(enabled && has_selection, button)
            .on_disabled_hover_text("Select an area first")
            .clicked();
        if ui
            .add_enabled(has_selection, egui::Button::new("Clear"))
            .clicked()
        {
            msgs.push(CropMsg::Clear);
        }
    });
    (msgs, apply)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: [f32; 2] = [200.0, 100.0];

    fn drawn(model: &mut CropModel, from: [f32; 2], to: [f32; 2]) {
        update(
            model,
            CropMsg::DragStart {
                pos: from,
                handle: DragHandle::None,
            },
        );
        update(model, CropMsg::DragMove { pos: to, bounds: BOUNDS });
        update(model, CropMsg::DragEnd);
    }

    #[test]
    fn drawing_normalizes_and_clamps() {
        let mut model = CropModel::default();
        drawn(&mut model, [150.0, 80.0], [250.0, -10.0]);

        assert_eq!(
            model.selection(),
            Some(DisplayRect::new(150.0, 0.0, 50.0, 80.0))
        );
        assert!(!model.is_dragging());
    }

    #[test]
    fn click_without_drag_leaves_no_selection() {
        let mut model = CropModel::default();
        update(
            &mut model,
            CropMsg::DragStart {
                pos: [10.0, 10.0],
                handle: DragHandle::None,
            },
        );
        update(&mut model, CropMsg::DragEnd);
        assert!(model.selection().is_none());
    }

    #[test]
    fn moving_stays_inside_bounds() {
        let mut model = CropModel::default();
        drawn(&mut model, [10.0, 10.0], [60.0, 40.0]);

        update(
            &mut model,
            CropMsg::DragStart {
                pos: [20.0, 20.0],
                handle: DragHandle::Move,
            },
        );
        update(
            &mut model,
            CropMsg::DragMove {
                pos: [500.0, 500.0],
                bounds: BOUNDS,
            },
        );

        assert_eq!(
            model.selection(),
            Some(DisplayRect::new(150.0, 70.0, 50.0, 30.0))
        );
    }

    #[test]
    fn resizing_keeps_minimum_size() {
        let mut model = CropModel::default();
        drawn(&mut model, [10.0, 10.0], [60.0, 40.0]);

        update(
            &mut model,
            CropMsg::DragStart {
                pos: [60.0, 40.0],
                handle: DragHandle::BottomRight,
            },
        );
        update(
            &mut model,
            CropMsg::DragMove {
                pos: [0.0, 0.0],
                bounds: BOUNDS,
            },
        );

        let sel = model.selection().unwrap();
        assert_eq!((sel.x, sel.y), (10.0, 10.0));
        assert_eq!((sel.width, sel.height), (MIN_SIZE, MIN_SIZE));
    }

    #[test]
    fn aspect_preset_constrains_existing_and_new_selections() {
        let mut model = CropModel::default();
        drawn(&mut model, [0.0, 0.0], [80.0, 40.0]);

        update(&mut model, CropMsg::SetAspect(AspectPreset::Square));
        assert_eq!(model.selection(), Some(DisplayRect::new(0.0, 0.0, 40.0, 40.0)));

        drawn(&mut model, [0.0, 0.0], [100.0, 90.0]);
        let sel = model.selection().unwrap();
        assert_eq!(sel.width, sel.height);
    }

    #[test]
    fn hit_test_finds_handles() {
        let rect = DisplayRect::new(50.0, 50.0, 100.0, 40.0);
        assert_eq!(hit_test(rect, [50.0, 50.0]), DragHandle::TopLeft);
        assert_eq!(hit_test(rect, [150.0, 90.0]), DragHandle::BottomRight);
        assert_eq!(hit_test(rect, [100.0, 51.0]), DragHandle::Top);
        assert_eq!(hit_test(rect, [149.0, 70.0]), DragHandle::Right);
        assert_eq!(hit_test(rect, [100.0, 70.0]), DragHandle::Move);
        assert_eq!(hit_test(rect, [10.0, 10.0]), DragHandle::None);
    }

    #[test]
    fn clear_drops_selection() {
        let mut model = CropModel::default();
        drawn(&mut model, [0.0, 0.0], [20.0, 20.0]);
        update(&mut model, CropMsg::Clear);
        assert!(model.selection().is_none());
    }
}
