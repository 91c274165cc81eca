//! Freehand paint in display space.
//!
//! Strokes are rasterized straight into a [`PaintedMask`] as they arrive. Each dot and
//! segment is a capsule of the stroke's radius, so consecutive segments join with
//! round caps and no gaps at corners. Edges get one pixel of coverage falloff,
//! matching what a 2D canvas draws for an anti-aliased round-capped line.

use crate::mask::PaintedMask;
use crate::Point;

#[derive(Clone, Debug)]
pub struct StrokeAccumulator {
    surface: PaintedMask,
    /// Last point and radius of the open stroke.
    open: Option<(Point, f32)>,
    has_paint: bool,
}

impl StrokeAccumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: PaintedMask::new(width, height),
            open: None,
            has_paint: false,
        }
    }

    pub fn surface(&self) -> &PaintedMask {
        &self.surface
    }

    /// True once any dot or segment has been committed since the last clear.
    pub fn has_paint(&self) -> bool {
        self.has_paint
    }

    pub fn is_stroking(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_painted(&self, x: i64, y: i64) -> bool {
        self.surface.is_painted(x, y)
    }

    pub fn begin_stroke(&mut self, point: Point, radius: f32) {
        self.open = Some((point, radius));
        stamp_capsule(&mut self.surface, point, point, radius);
        self.has_paint = true;
    }

    /// Returns false (and paints nothing) when no stroke is open.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        let Some((last, radius)) = self.open else {
            return false;
        };
        self.open = Some((point, radius));
        stamp_capsule(&mut self.surface, last, point, radius);
        self.has_paint = true;
        true
    }

    pub fn end_stroke(&mut self) -> bool {
        self.open.take().is_some()
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        self.open = None;
        self.has_paint = false;
    }

    /// Starts over on a blank surface of the new viewport size.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = PaintedMask::new(width, height);
        self.open = None;
    }

    /// Folds a remapped surface into the current one, keeping paint laid down since the resize.
    pub fn merge_surface(&mut self, remapped: &PaintedMask) -> bool {
        self.surface.merge_max(remapped)
    }
}

pub fn distance_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }
    let t = ((px - x1) * dx + (py - y1) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let proj_x = x1 + t * dx;
    let proj_y = y1 + t * dy;
    ((px - proj_x).powi(2) + (py - proj_y).powi(2)).sqrt()
}

/// Paints the capsule `from..to` of `radius`, sampling at pixel centers.
fn stamp_capsule(surface: &mut PaintedMask, from: Point, to: Point, radius: f32) {
    if surface.width() == 0 || surface.height() == 0 {
        return;
    }
    let radius = radius.max(0.0) as f64;
    let reach = radius + 0.5;
    let (x1, y1, x2, y2) = (from.x as f64, from.y as f64, to.x as f64, to.y as f64);

    let min_x = (x1.min(x2) - reach).floor().max(0.0);
    let min_y = (y1.min(y2) - reach).floor().max(0.0);
    let max_x = (x1.max(x2) + reach).ceil().min(surface.width() as f64 - 1.0);
    let max_y = (y1.max(y2) + reach).ceil().min(surface.height() as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let distance = distance_to_segment(x as f64 + 0.5, y as f64 + 0.5, x1, y1, x2, y2);
            let coverage = (reach - distance).clamp(0.0, 1.0);
            if coverage > 0.0 {
                surface.raise(x, y, (coverage * 255.0).round() as u8);
            }
        }
    }
}
