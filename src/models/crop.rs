// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Crop selection geometry, independent of any widget toolkit.

use crate::models::hotspot::DisplayGeometry;

/// Rectangle in displayed (UI point) coordinates, relative to the image's
/// top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Crop region in native pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Aspect ratio presets offered by the crop tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AspectPreset {
    #[default]
    Free,
    Square,
    Widescreen,
}

impl DisplayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the selection covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Rescale to native pixels with the same per-axis ratio as hotspots,
    /// clamped to the image bounds. Returns `None` for empty results.
    pub fn to_native(&self, geometry: &DisplayGeometry) -> Option<CropRegion> {
        if self.is_empty() {
            return None;
        }
        let (sx, sy) = geometry.scale()?;
        let [nw, nh] = geometry.natural;

        let left = (self.x * sx).round().clamp(0.0, nw as f32);
        let top = (self.y * sy).round().clamp(0.0, nh as f32);
        let right = ((self.x + self.width) * sx).round().clamp(0.0, nw as f32);
        let bottom = ((self.y + self.height) * sy).round().clamp(0.0, nh as f32);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let region = CropRegion::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        );
        region.is_valid().then_some(region)
    }
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if region has valid dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 3] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::Widescreen,
    ];

    /// Width divided by height, `None` for free-form.
    pub fn ratio(&self) -> Option<f32> {
        match self {
            AspectPreset::Free => None,
            AspectPreset::Square => Some(1.0),
            AspectPreset::Widescreen => Some(16.0 / 9.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectPreset::Free => "Free",
            AspectPreset::Square => "1:1",
            AspectPreset::Widescreen => "16:9",
        }
    }

    /// Shrink one side of `rect` around its origin so it matches the preset.
    pub fn constrain(&self, rect: DisplayRect) -> DisplayRect {
        let Some(ratio) = self.ratio() else {
            return rect;
        };
        if rect.is_empty() {
            return rect;
        }
        if rect.width / rect.height > ratio {
            DisplayRect {
                width: rect.height * ratio,
                ..rect
            }
        } else {
            DisplayRect {
                height: rect.width / ratio,
                ..rect
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_to_native_pixels() {
        let geo = DisplayGeometry::new([200.0, 100.0], [800, 400]);
        let rect = DisplayRect::new(10.0, 20.0, 50.0, 25.0);
        assert_eq!(rect.to_native(&geo), Some(CropRegion::new(40, 80, 200, 100)));
    }

    #[test]
    fn clamps_to_image_bounds() {
        let geo = DisplayGeometry::new([100.0, 100.0], [100, 100]);
        let rect = DisplayRect::new(80.0, 90.0, 50.0, 50.0);
        assert_eq!(rect.to_native(&geo), Some(CropRegion::new(80, 90, 20, 10)));
    }

    #[test]
    fn zero_size_selection_has_no_region() {
        let geo = DisplayGeometry::new([100.0, 100.0], [100, 100]);
        assert!(DisplayRect::new(5.0, 5.0, 0.0, 10.0).to_native(&geo).is_none());
        assert!(DisplayRect::new(5.0, 5.0, 10.0, 0.0).to_native(&geo).is_none());
        // Sub-pixel selections round away to nothing.
        let tiny = DisplayGeometry::new([1000.0, 1000.0], [10, 10]);
        assert!(DisplayRect::new(0.0, 0.0, 1.0, 1.0).to_native(&tiny).is_none());
    }

    #[test]
    fn presets_constrain_aspect() {
        let rect = DisplayRect::new(0.0, 0.0, 160.0, 160.0);
        let wide = AspectPreset::Widescreen.constrain(rect);
        assert_eq!(wide.width, 160.0);
        assert!((wide.height - 90.0).abs() < 1e-3);

        let square = AspectPreset::Square.constrain(DisplayRect::new(4.0, 4.0, 30.0, 10.0));
        assert_eq!(square, DisplayRect::new(4.0, 4.0, 10.0, 10.0));

        assert_eq!(AspectPreset::Free.constrain(rect), rect);
    }
}
