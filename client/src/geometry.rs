use maskpaint_shared::Point;

use crate::state::{DEFAULT_BRUSH_RADIUS, MAX_BRUSH_RADIUS, MIN_BRUSH_RADIUS};

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.is_finite() {
        return None;
    }
    Some(point)
}

pub fn sanitize_radius(radius: f32) -> f32 {
    let radius = if radius.is_finite() {
        radius
    } else {
        DEFAULT_BRUSH_RADIUS
    };
    radius.max(MIN_BRUSH_RADIUS).min(MAX_BRUSH_RADIUS)
}

/// Client-space pointer position to canvas pixels, given the canvas' on-page box.
pub fn client_to_canvas(
    client_x: f64,
    client_y: f64,
    left: f64,
    top: f64,
    css_width: f64,
    css_height: f64,
    canvas_w: u32,
    canvas_h: u32,
) -> Option<Point> {
    if css_width <= 0.0 || css_height <= 0.0 {
        return None;
    }
    let x = (client_x - left) * canvas_w as f64 / css_width;
    let y = (client_y - top) * canvas_h as f64 / css_height;
    normalize_point(Point {
        x: x as f32,
        y: y as f32,
    })
}
