//! Aspect-fit placement of an image inside a viewport.
//!
//! A native pixel `(x, y)` lands on display pixel
//! `(round(x * scale + offset_x), round(y * scale + offset_y))`; the rasterizer scans
//! native pixels through [`DisplayRect::native_to_display`] and never maps back.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub offset_x: u32,
    pub offset_y: u32,
    pub draw_w: u32,
    pub draw_h: u32,
    pub scale: f64,
}

impl DisplayRect {
    /// Nothing drawn. Returned for zero-sized images or viewports.
    pub const EMPTY: DisplayRect = DisplayRect {
        offset_x: 0,
        offset_y: 0,
        draw_w: 0,
        draw_h: 0,
        scale: 1.0,
    };

    /// Fits `image_w x image_h` into `viewport_w x viewport_h`, centered, never upscaled.
    pub fn fit(image_w: u32, image_h: u32, viewport_w: u32, viewport_h: u32) -> Self {
        if image_w == 0 || image_h == 0 || viewport_w == 0 || viewport_h == 0 {
            return Self::EMPTY;
        }
        let scale = (viewport_w as f64 / image_w as f64)
            .min(viewport_h as f64 / image_h as f64)
            .min(1.0);
        let draw_w = ((image_w as f64 * scale).round() as u32).min(viewport_w);
        let draw_h = ((image_h as f64 * scale).round() as u32).min(viewport_h);
        Self {
            offset_x: (viewport_w - draw_w) / 2,
            offset_y: (viewport_h - draw_h) / 2,
            draw_w,
            draw_h,
            scale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.draw_w == 0 || self.draw_h == 0
    }

    pub fn native_to_display(&self, x: u32, y: u32) -> (i64, i64) {
        let dx = (x as f64 * self.scale + self.offset_x as f64).round() as i64;
        let dy = (y as f64 * self.scale + self.offset_y as f64).round() as i64;
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_image_is_centered_without_upscaling() {
        let rect = DisplayRect::fit(100, 50, 200, 200);
        assert_eq!(rect.scale, 1.0);
        assert_eq!((rect.draw_w, rect.draw_h), (100, 50));
        assert_eq!((rect.offset_x, rect.offset_y), (50, 75));
    }

    #[test]
    fn large_image_is_scaled_down_on_limiting_axis() {
        let rect = DisplayRect::fit(4000, 2000, 800, 600);
        assert!((rect.scale - 0.2).abs() < 1e-12);
        assert_eq!((rect.draw_w, rect.draw_h), (800, 400));
        assert_eq!((rect.offset_x, rect.offset_y), (0, 100));
    }

    #[test]
    fn zero_dimensions_yield_empty_rect() {
        assert!(DisplayRect::fit(0, 10, 100, 100).is_empty());
        assert!(DisplayRect::fit(10, 10, 0, 100).is_empty());
        assert_eq!(DisplayRect::fit(10, 10, 100, 0), DisplayRect::EMPTY);
    }

    #[test]
    fn fit_stays_inside_viewport_for_many_sizes() {
        let sizes = [1u32, 2, 3, 7, 50, 99, 100, 101, 333, 640, 1080, 1921, 4096];
        for &iw in &sizes {
            for &ih in &sizes {
                for &vw in &sizes {
                    for &vh in &sizes {
                        let rect = DisplayRect::fit(iw, ih, vw, vh);
                        assert!(rect.scale > 0.0 && rect.scale <= 1.0);
                        assert!(rect.offset_x + rect.draw_w <= vw, "{iw}x{ih} in {vw}x{vh}");
                        assert!(rect.offset_y + rect.draw_h <= vh, "{iw}x{ih} in {vw}x{vh}");
                        assert!(rect.draw_w <= iw && rect.draw_h <= ih);
                    }
                }
            }
        }
    }

    #[test]
    fn fit_is_deterministic() {
        assert_eq!(
            DisplayRect::fit(1234, 567, 890, 123),
            DisplayRect::fit(1234, 567, 890, 123)
        );
    }
}
