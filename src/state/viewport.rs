use crate::model::Extent;
use crate::state::View;

/// Source tile size the zoom levels are defined against: zoom 0 fits the
/// extent width into 256 pixels.
const TILE_SIZE: f64 = 256.0;

/// Maps between canvas pixels (y down) and projection coordinates (y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub view: View,
    /// Canvas size in CSS pixels.
    pub size: [f64; 2],
    pub max_resolution: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

fn rotate(v: [f64; 2], angle: f64) -> [f64; 2] {
    let (s, c) = angle.sin_cos();
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

impl Viewport {
    pub fn new(extent: &Extent, view: View, min_zoom: f64, max_zoom: f64) -> Self {
        let mut vp = Self {
            view,
            size: [0.0, 0.0],
            max_resolution: extent.width() / TILE_SIZE,
            min_zoom,
            max_zoom,
        };
        vp.view.zoom = vp.clamp_zoom(view.zoom);
        vp
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn has_size(&self) -> bool {
        self.size[0] > 0.0 && self.size[1] > 0.0
    }

    /// Projection units per pixel.
    pub fn resolution(&self) -> f64 {
        self.max_resolution / 2f64.powf(self.view.zoom)
    }

    fn half_size(&self) -> [f64; 2] {
        [self.size[0] / 2.0, self.size[1] / 2.0]
    }

    fn pixel_delta_to_coord(&self, d: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        rotate([d[0] * res, -d[1] * res], self.view.rotation)
    }

    pub fn to_coordinate(&self, pixel: [f64; 2]) -> [f64; 2] {
        let half = self.half_size();
        let d = self.pixel_delta_to_coord([pixel[0] - half[0], pixel[1] - half[1]]);
        [self.view.center[0] + d[0], self.view.center[1] + d[1]]
    }

    pub fn to_pixel(&self, coord: [f64; 2]) -> [f64; 2] {
        let half = self.half_size();
        let res = self.resolution();
        let u = rotate(
            [coord[0] - self.view.center[0], coord[1] - self.view.center[1]],
            -self.view.rotation,
        );
        [half[0] + u[0] / res, half[1] - u[1] / res]
    }

    /// Canvas `setTransform` arguments taking projection coordinates to pixels.
    pub fn transform(&self) -> [f64; 6] {
        let res = self.resolution();
        let (s, c) = self.view.rotation.sin_cos();
        let [e, f] = self.to_pixel([0.0, 0.0]);
        [c / res, s / res, s / res, -c / res, e, f]
    }

    /// Like [`transform`](Self::transform) but with y pointing down from the
    /// top-left corner of `extent`, so an image can be drawn at (0, 0).
    pub fn image_transform(&self, extent: &Extent) -> [f64; 6] {
        let [a, b, c, d, _, _] = self.transform();
        let [e, f] = self.to_pixel([extent.min_x(), extent.max_y()]);
        [a, b, -c, -d, e, f]
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> bool {
        let size = [width.max(0.0), height.max(0.0)];
        if size == self.size {
            return false;
        }
        self.size = size;
        true
    }

    pub fn set_view(&mut self, view: View) -> bool {
        let view = View {
            zoom: self.clamp_zoom(view.zoom),
            ..view
        };
        if view == self.view {
            return false;
        }
        self.view = view;
        true
    }

    /// Moves the map content by a pixel offset, as a drag does.
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let d = self.pixel_delta_to_coord([dx, dy]);
        self.view.center = [self.view.center[0] - d[0], self.view.center[1] - d[1]];
        true
    }

    /// Changes zoom by `delta` levels keeping the coordinate under `anchor`
    /// (default: canvas center) in place.
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<[f64; 2]>) -> bool {
        let zoom = self.clamp_zoom(self.view.zoom + delta);
        if zoom == self.view.zoom {
            return false;
        }
        let half = self.half_size();
        let anchor = anchor.unwrap_or(half);
        let fixed = self.to_coordinate(anchor);
        self.view.zoom = zoom;
        let d = self.pixel_delta_to_coord([anchor[0] - half[0], anchor[1] - half[1]]);
        self.view.center = [fixed[0] - d[0], fixed[1] - d[1]];
        true
    }

    /// Pans so that a box around `coord` stays `margin` pixels inside the
    /// canvas. `offsets` is `[left, top, right, bottom]` relative to the
    /// coordinate's pixel.
    pub fn ensure_visible(&mut self, coord: [f64; 2], offsets: [f64; 4], margin: f64) -> bool {
        if !self.has_size() {
            return false;
        }
        let [px, py] = self.to_pixel(coord);
        let (left, top) = (px + offsets[0], py + offsets[1]);
        let (right, bottom) = (px + offsets[2], py + offsets[3]);
        let [w, h] = self.size;
        let dx = if left < margin {
            margin - left
        } else if right > w - margin {
            (w - margin) - right
        } else {
            0.0
        };
        let dy = if top < margin {
            margin - top
        } else if bottom > h - margin {
            (h - margin) - bottom
        } else {
            0.0
        };
        self.pan_by_pixels(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: Extent = Extent([0.0, 0.0, 8192.0, 6144.0]);

    fn viewport(rotation: f64) -> Viewport {
        let mut vp = Viewport::new(
            &EXTENT,
            View {
                center: EXTENT.center(),
                zoom: 2.0,
                rotation,
            },
            0.0,
            8.0,
        );
        vp.set_size(800.0, 600.0);
        vp
    }

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn resolution_follows_zoom() {
        let vp = viewport(0.0);
        assert_eq!(vp.max_resolution, 32.0);
        assert_eq!(vp.resolution(), 8.0);
    }

    #[test]
    fn canvas_center_is_view_center() {
        let vp = viewport(0.0);
        assert_eq!(vp.to_coordinate([400.0, 300.0]), [4096.0, 3072.0]);
        // y flips between pixels and coordinates
        assert_eq!(vp.to_coordinate([410.0, 290.0]), [4176.0, 3152.0]);
    }

    #[test]
    fn pixel_coordinate_round_trip() {
        for rotation in [0.0, 0.7, -2.1] {
            let vp = viewport(rotation);
            for p in [[0.0, 0.0], [123.0, 456.0], [800.0, 600.0]] {
                assert!(close(vp.to_pixel(vp.to_coordinate(p)), p));
            }
        }
    }

    #[test]
    fn transform_matches_to_pixel() {
        let vp = viewport(0.4);
        let [a, b, c, d, e, f] = vp.transform();
        let coord = [1000.0, 2500.0];
        let by_matrix = [
            a * coord[0] + c * coord[1] + e,
            b * coord[0] + d * coord[1] + f,
        ];
        assert!(close(by_matrix, vp.to_pixel(coord)));
    }

    #[test]
    fn image_transform_puts_origin_at_top_left() {
        let vp = viewport(0.0);
        let [a, b, c, d, e, f] = vp.image_transform(&EXTENT);
        // image pixel (u, v) = coordinate (u, max_y - v)
        let (u, v) = (100.0, 200.0);
        let by_matrix = [a * u + c * v + e, b * u + d * v + f];
        assert!(close(by_matrix, vp.to_pixel([u, EXTENT.max_y() - v])));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = viewport(0.3);
        let anchor = [650.0, 120.0];
        let before = vp.to_coordinate(anchor);
        assert!(vp.zoom_by(1.5, Some(anchor)));
        assert!(close(vp.to_coordinate(anchor), before));
        assert_eq!(vp.view.zoom, 3.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = viewport(0.0);
        assert!(vp.zoom_by(100.0, None));
        assert_eq!(vp.view.zoom, 8.0);
        assert!(!vp.zoom_by(1.0, None));
        assert!(vp.set_view(View { center: [0.0, 0.0], zoom: -3.0, rotation: 0.0 }));
        assert_eq!(vp.view.zoom, 0.0);
    }

    #[test]
    fn drag_moves_content_with_pointer() {
        let mut vp = viewport(0.0);
        let grabbed = vp.to_coordinate([100.0, 100.0]);
        vp.pan_by_pixels(50.0, -20.0);
        assert!(close(vp.to_coordinate([150.0, 80.0]), grabbed));
    }

    #[test]
    fn ensure_visible_pans_only_when_needed() {
        let mut vp = viewport(0.0);
        let inside = vp.to_coordinate([400.0, 300.0]);
        assert!(!vp.ensure_visible(inside, [-50.0, -132.0, 230.0, 0.0], 20.0));

        let near_corner = vp.to_coordinate([790.0, 30.0]);
        assert!(vp.ensure_visible(near_corner, [-50.0, -132.0, 230.0, 0.0], 20.0));
        let [px, py] = vp.to_pixel(near_corner);
        assert!((px + 230.0 - 780.0).abs() < 1e-6);
        assert!((py - 132.0 - 20.0).abs() < 1e-6);
    }

    #[test]
    fn ensure_visible_needs_a_size() {
        let mut vp = Viewport::new(
            &EXTENT,
            View { center: EXTENT.center(), zoom: 2.0, rotation: 0.0 },
            0.0,
            8.0,
        );
        assert!(!vp.ensure_visible([0.0, 0.0], [-50.0, -132.0, 230.0, 0.0], 20.0));
    }
}
