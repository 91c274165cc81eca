//! Carries painted coverage across a viewport resize.
//!
//! The old surface is treated as an image and blitted, bilinearly scaled, from the old
//! rect's box into the new rect's box. Repeated resizes may soften stroke edges a
//! little; that loss is accepted.

use crate::display::DisplayRect;
use crate::mask::PaintedMask;

/// One pending remap. Only the completion whose `seq` is the latest issued is applied.
#[derive(Clone, Debug)]
pub struct RemapJob {
    pub seq: u64,
    pub snapshot: PaintedMask,
    pub old: DisplayRect,
    pub new: DisplayRect,
    pub viewport_w: u32,
    pub viewport_h: u32,
}

#[derive(Clone, Debug)]
pub struct RemapResult {
    pub seq: u64,
    pub old: DisplayRect,
    pub new: DisplayRect,
    pub mask: PaintedMask,
}

impl RemapJob {
    pub fn run(self) -> RemapResult {
        let mask = remap(
            &self.snapshot,
            &self.old,
            &self.new,
            self.viewport_w,
            self.viewport_h,
        );
        RemapResult {
            seq: self.seq,
            old: self.old,
            new: self.new,
            mask,
        }
    }
}

/// Returns a `viewport_w x viewport_h` surface holding `snapshot`'s old-rect box scaled
/// into the new rect's box. Everything outside the new box is unpainted.
pub fn remap(
    snapshot: &PaintedMask,
    old: &DisplayRect,
    new: &DisplayRect,
    viewport_w: u32,
    viewport_h: u32,
) -> PaintedMask {
    let mut target = PaintedMask::new(viewport_w, viewport_h);
    if old.is_empty() || new.is_empty() {
        return target;
    }

    let sx = old.draw_w as f64 / new.draw_w as f64;
    let sy = old.draw_h as f64 / new.draw_h as f64;
    let src_min_x = old.offset_x as f64;
    let src_min_y = old.offset_y as f64;
    let src_max_x = (old.offset_x + old.draw_w) as f64 - 1.0;
    let src_max_y = (old.offset_y + old.draw_h) as f64 - 1.0;

    let end_x = (new.offset_x + new.draw_w).min(viewport_w);
    let end_y = (new.offset_y + new.draw_h).min(viewport_h);
    for y in new.offset_y..end_y {
        let v = ((y - new.offset_y) as f64 + 0.5) * sy - 0.5 + src_min_y;
        let v = v.clamp(src_min_y, src_max_y);
        for x in new.offset_x..end_x {
            let u = ((x - new.offset_x) as f64 + 0.5) * sx - 0.5 + src_min_x;
            let u = u.clamp(src_min_x, src_max_x);
            let value = sample_bilinear(snapshot, u, v);
            if value > 0 {
                target.raise(x, y, value);
            }
        }
    }
    target
}

fn sample_bilinear(mask: &PaintedMask, u: f64, v: f64) -> u8 {
    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let c00 = mask.coverage(x0, y0) as f64;
    let c10 = mask.coverage(x0 + 1, y0) as f64;
    let c01 = mask.coverage(x0, y0 + 1) as f64;
    let c11 = mask.coverage(x0 + 1, y0 + 1) as f64;

    let top = c00 + (c10 - c00) * fx;
    let bottom = c01 + (c11 - c01) * fx;
    (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterize::rasterize_native;
    use crate::stroke::StrokeAccumulator;
    use crate::Point;

    #[test]
    fn no_op_resize_reproduces_the_surface() {
        let rect = DisplayRect::fit(300, 200, 400, 400);
        let mut strokes = StrokeAccumulator::new(400, 400);
        strokes.begin_stroke(Point::new(120.0, 150.0), 9.0);
        strokes.extend_stroke(Point::new(260.0, 220.0));

        let remapped = remap(strokes.surface(), &rect, &rect, 400, 400);
        assert_eq!(&remapped, strokes.surface());
    }

    #[test]
    fn paint_outside_the_image_box_is_dropped() {
        let rect = DisplayRect::fit(100, 50, 200, 200);
        let mut strokes = StrokeAccumulator::new(200, 200);
        strokes.begin_stroke(Point::new(5.0, 5.0), 3.0);
        let remapped = remap(strokes.surface(), &rect, &rect, 200, 200);
        assert!(!remapped.has_coverage());
    }

    #[test]
    fn shrink_then_rasterize_keeps_the_native_selection() {
        let (image_w, image_h) = (800, 600);
        let old = DisplayRect::fit(image_w, image_h, 800, 600);
        let new = DisplayRect::fit(image_w, image_h, 400, 400);
        let mut strokes = StrokeAccumulator::new(800, 600);
        strokes.begin_stroke(Point::new(400.0, 300.0), 40.0);

        let before = rasterize_native(strokes.surface(), &old, image_w, image_h).unwrap();
        let remapped = remap(strokes.surface(), &old, &new, 400, 400);
        let after = rasterize_native(&remapped, &new, image_w, image_h).unwrap();

        assert!(after.is_selected(400, 300));
        assert!(!after.is_selected(400, 360));
        let drift = before.selected_count().abs_diff(after.selected_count()) as f64;
        assert!(drift / (before.selected_count() as f64) < 0.1);
    }

    #[test]
    fn grow_moves_paint_into_the_new_box() {
        let (image_w, image_h) = (1000, 1000);
        let old = DisplayRect::fit(image_w, image_h, 200, 300);
        let new = DisplayRect::fit(image_w, image_h, 600, 400);
        let mut strokes = StrokeAccumulator::new(200, 300);
        // Native (500, 500) sits at display (100, 150) under the old rect.
        strokes.begin_stroke(Point::new(100.0, 150.0), 6.0);

        let remapped = remap(strokes.surface(), &old, &new, 600, 400);
        let (dx, dy) = new.native_to_display(500, 500);
        assert!(remapped.is_painted(dx, dy));
        assert!(!remapped.is_painted(100, 150));
    }

    #[test]
    fn empty_rects_produce_blank_surface() {
        let mut strokes = StrokeAccumulator::new(50, 50);
        strokes.begin_stroke(Point::new(25.0, 25.0), 10.0);
        let remapped = remap(
            strokes.surface(),
            &DisplayRect::EMPTY,
            &DisplayRect::fit(50, 50, 50, 50),
            50,
            50,
        );
        assert!(!remapped.has_coverage());
        assert_eq!((remapped.width(), remapped.height()), (50, 50));
    }

    #[test]
    fn job_run_keeps_its_sequence_number() {
        let rect = DisplayRect::fit(10, 10, 10, 10);
        let job = RemapJob {
            seq: 7,
            snapshot: PaintedMask::new(10, 10),
            old: rect,
            new: rect,
            viewport_w: 10,
            viewport_h: 10,
        };
        assert_eq!(job.run().seq, 7);
    }
}
