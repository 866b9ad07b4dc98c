// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Mapping between on-screen image coordinates and native pixel coordinates.

/// Size of an image as laid out on screen versus its native resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayGeometry {
    /// Displayed width/height in UI points.
    pub displayed: [f32; 2],
    /// Native width/height in pixels.
    pub natural: [u32; 2],
}

/// A native-resolution pixel coordinate selected by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

impl DisplayGeometry {
    pub fn new(displayed: [f32; 2], natural: [u32; 2]) -> Self {
        Self { displayed, natural }
    }

    /// Native pixels per displayed point on each axis, or `None` when the
    /// displayed size is degenerate.
    pub fn scale(&self) -> Option<(f32, f32)> {
        let [dw, dh] = self.displayed;
        if !(dw.is_finite() && dh.is_finite()) || dw <= 0.0 || dh <= 0.0 {
            return None;
        }
        Some((self.natural[0] as f32 / dw, self.natural[1] as f32 / dh))
    }

    /// Map a displayed point (relative to the image's top-left corner) to
    /// native pixel coordinates. Points outside the displayed image yield
    /// `None`; points on the right or bottom edge land on the last pixel.
    pub fn to_native(&self, point: [f32; 2]) -> Option<Hotspot> {
        let (sx, sy) = self.scale()?;
        let [x, y] = point;
        if x < 0.0 || y < 0.0 || x > self.displayed[0] || y > self.displayed[1] {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Hotspot {
            x: ((x * sx).round() as u32).min(self.natural[0].saturating_sub(1)),
            y: ((y * sy).round() as u32).min(self.natural[1].saturating_sub(1)),
        })
    }

    /// Inverse of [`DisplayGeometry::to_native`], used to place the marker.
    pub fn to_display(&self, hotspot: Hotspot) -> Option<[f32; 2]> {
        let (sx, sy) = self.scale()?;
        if sx == 0.0 || sy == 0.0 {
            return None;
        }
        Some([hotspot.x as f32 / sx, hotspot.y as f32 / sy])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_clicks_stay_inside_the_image() {
        let geo = DisplayGeometry::new([400.0, 300.0], [1600, 600]);
        assert_eq!(geo.to_native([400.0, 300.0]), Some(Hotspot { x: 1599, y: 599 }));
        assert_eq!(geo.to_native([0.0, 0.0]), Some(Hotspot { x: 0, y: 0 }));
        assert_eq!(geo.to_native([399.99, 150.0]).map(|h| h.x), Some(1599));
    }

    #[test]
    fn scales_each_axis_independently() {
        let geo = DisplayGeometry::new([400.0, 300.0], [1600, 600]);
        let spot = geo.to_native([100.0, 150.0]).unwrap();
        assert_eq!(spot, Hotspot { x: 400, y: 300 });
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        let geo = DisplayGeometry::new([300.0, 300.0], [1000, 1000]);
        // 10 * 3.333.. = 33.33 -> 33, 11 * 3.333.. = 36.66 -> 37
        let spot = geo.to_native([10.0, 11.0]).unwrap();
        assert_eq!(spot, Hotspot { x: 33, y: 37 });
    }

    #[test]
    fn reversible_up_to_rounding() {
        let geo = DisplayGeometry::new([512.0, 384.0], [3000, 2250]);
        let (sx, sy) = geo.scale().unwrap();
        for &(x, y) in &[(0.0, 0.0), (17.3, 200.9), (511.0, 383.5), (256.0, 192.0)] {
            let spot = geo.to_native([x, y]).unwrap();
            let [bx, by] = geo.to_display(spot).unwrap();
            assert!((bx - x).abs() <= 0.5 / sx + 1e-3);
            assert!((by - y).abs() <= 0.5 / sy + 1e-3);
        }
    }

    #[test]
    fn rejects_points_outside_image() {
        let geo = DisplayGeometry::new([100.0, 100.0], [200, 200]);
        assert!(geo.to_native([-1.0, 5.0]).is_none());
        assert!(geo.to_native([5.0, 100.5]).is_none());
        assert!(geo.to_native([100.0, 100.0]).is_some());
    }

    #[test]
    fn degenerate_display_size_yields_nothing() {
        let geo = DisplayGeometry::new([0.0, 100.0], [200, 200]);
        assert!(geo.scale().is_none());
        assert!(geo.to_native([0.0, 0.0]).is_none());
        assert!(geo.to_display(Hotspot { x: 1, y: 1 }).is_none());
    }
}
