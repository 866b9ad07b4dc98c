// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Rasterize a selected region of an artifact into a new artifact.

use anyhow::{Result, bail};
use image::imageops::FilterType;

use crate::models::artifact::{Artifact, encode_png};
use crate::models::crop::DisplayRect;
use crate::models::hotspot::DisplayGeometry;

/// Message shown when the user applies a crop without a usable selection.
pub const EMPTY_SELECTION: &str = "Please select an area to crop.";

/// Crop `source` to `selection` and render it at `pixel_ratio`.
///
/// The selection is given in displayed coordinates and rescaled to native
/// pixels with `geometry`. A ratio of 2.0 doubles the output dimensions;
/// non-positive or non-finite ratios are treated as 1.0.
///
/// # Errors
///
/// Fails when no selection is present, when it maps to zero native pixels, or
/// when the source cannot be decoded or the result encoded.
pub fn render_crop(
    source: &Artifact,
    selection: Option<DisplayRect>,
    geometry: &DisplayGeometry,
    pixel_ratio: f32,
) -> Result<Artifact> {
    let Some(selection) = selection else {
        bail!(EMPTY_SELECTION);
    };
    let Some(region) = selection.to_native(geometry) else {
        bail!(EMPTY_SELECTION);
    };

    let image = source.decode()?;
    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);

    let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    let rendered = if (ratio - 1.0).abs() < f32::EPSILON {
        cropped
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (w, h) = (
            ((cropped.width() as f32 * ratio).round() as u32).max(1),
            ((cropped.height() as f32 * ratio).round() as u32).max(1),
        );
        cropped.resize_exact(w, h, FilterType::Lanczos3)
    };

    log::debug!(
        "cropped {} to {}x{} at {}x{} (ratio {ratio})",
        source.name(),
        region.width,
        region.height,
        rendered.width(),
        rendered.height()
    );

    let name = format!("cropped-{}.png", crate::logic::unix_millis());
    Ok(Artifact::new(name, "image/png", encode_png(&rendered)?))
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;
    use crate::models::artifact::sample_png;

    #[test]
    fn crops_native_region_from_displayed_selection() {
        let source = sample_png(100, 80);
        let geo = DisplayGeometry::new([50.0, 40.0], [100, 80]);
        let sel = DisplayRect::new(5.0, 10.0, 20.0, 15.0);

        let out = render_crop(&source, Some(sel), &geo, 1.0).unwrap();
        let img = out.decode().unwrap();

        assert_eq!(img.dimensions(), (40, 30));
        // Top-left pixel of the crop is native (10, 20) of the sample gradient.
        let px = img.get_pixel(0, 0);
        assert_eq!((px[0], px[1]), (10, 20));
        assert!(out.name().starts_with("cropped-"));
        assert_eq!(out.mime(), "image/png");
    }

    #[test]
    fn renders_at_pixel_ratio() {
        let source = sample_png(64, 64);
        let geo = DisplayGeometry::new([64.0, 64.0], [64, 64]);
        let sel = DisplayRect::new(0.0, 0.0, 10.0, 5.0);

        let out = render_crop(&source, Some(sel), &geo, 2.0).unwrap();
        assert_eq!(out.dimensions().unwrap(), (20, 10));

        let fallback = render_crop(&source, Some(sel), &geo, f32::NAN).unwrap();
        assert_eq!(fallback.dimensions().unwrap(), (10, 5));
    }

    #[test]
    fn rejects_missing_or_zero_size_selection() {
        let source = sample_png(10, 10);
        let geo = DisplayGeometry::new([10.0, 10.0], [10, 10]);

        let err = render_crop(&source, None, &geo, 1.0).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_SELECTION);

        let zero = DisplayRect::new(3.0, 3.0, 0.0, 0.0);
        let err = render_crop(&source, Some(zero), &geo, 1.0).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_SELECTION);
    }

    #[test]
    fn undecodable_source_is_an_error() {
        let source = Artifact::new("bad.png", "image/png", vec![1, 2, 3]);
        let geo = DisplayGeometry::new([10.0, 10.0], [10, 10]);
        let sel = DisplayRect::new(0.0, 0.0, 5.0, 5.0);
        assert!(render_crop(&source, Some(sel), &geo, 1.0).is_err());
    }
}
