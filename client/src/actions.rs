use log::{debug, info};
use maskpaint_shared::rasterize::rasterize;
use maskpaint_shared::remap::remap;
use maskpaint_shared::{
    ConfirmMaskRequest, DisplayRect, ImageAsset, MaskError, Point, RemapJob, RemapResult,
};

use crate::geometry::{normalize_point, sanitize_radius};
use crate::state::{DrawingSession, ImageState, PendingRemap, StrokeMode};

/// Outcome of feeding an event to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Rejected(&'static str),
}

impl Transition {
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

pub fn pointer_down(session: &mut DrawingSession, point: Point) -> Transition {
    let Some(point) = normalize_point(point) else {
        return Transition::Rejected("non-finite pointer position");
    };
    if session.image().is_none() {
        return Transition::Rejected("no image loaded");
    }
    // A missed pointer-up leaves the previous stroke open; close it first.
    session.strokes.end_stroke();
    session.strokes.begin_stroke(point, session.brush_radius);
    session.mode = StrokeMode::Stroking { last: point };
    Transition::Applied
}

pub fn pointer_move(session: &mut DrawingSession, point: Point) -> Transition {
    if !session.is_stroking() {
        return Transition::Rejected("pointer is not down");
    }
    let Some(point) = normalize_point(point) else {
        return Transition::Rejected("non-finite pointer position");
    };
    if !session.strokes.extend_stroke(point) {
        session.mode = StrokeMode::Idle;
        return Transition::Rejected("stroke was closed");
    }
    session.mode = StrokeMode::Stroking { last: point };
    Transition::Applied
}

pub fn pointer_up(session: &mut DrawingSession) -> Transition {
    if !session.is_stroking() {
        return Transition::Rejected("pointer is not down");
    }
    session.strokes.end_stroke();
    session.mode = StrokeMode::Idle;
    Transition::Applied
}

pub fn set_brush_radius(session: &mut DrawingSession, radius: f32) -> f32 {
    session.brush_radius = sanitize_radius(radius);
    session.brush_radius
}

/// Erases all paint. Any remap still in flight is invalidated.
pub fn clear_paint(session: &mut DrawingSession) {
    session.strokes.clear();
    session.mode = StrokeMode::Idle;
    session.pending_remap = None;
    session.remap_issued += 1;
}

/// Starts an asynchronous image load. Only the most recent ticket may complete.
pub fn begin_load(session: &mut DrawingSession) -> LoadTicket {
    session.load_ticket += 1;
    let previous = match std::mem::replace(&mut session.image, ImageState::Unloaded) {
        ImageState::Loaded { asset, file_name } => Some((asset, file_name)),
        ImageState::Loading { previous, .. } => previous,
        ImageState::Unloaded => None,
    };
    session.image = ImageState::Loading {
        ticket: session.load_ticket,
        previous,
    };
    session.strokes.end_stroke();
    session.mode = StrokeMode::Idle;
    LoadTicket(session.load_ticket)
}

/// Installs a decoded image. Paint is discarded and the display rect recomputed.
pub fn finish_load(
    session: &mut DrawingSession,
    ticket: LoadTicket,
    asset: ImageAsset,
    file_name: Option<String>,
) -> Transition {
    if !is_current_load(session, ticket) {
        debug!("Dropping stale image load ticket={}", ticket.0);
        return Transition::Rejected("stale image load");
    }
    session.rect = DisplayRect::fit(
        asset.width(),
        asset.height(),
        session.viewport_w,
        session.viewport_h,
    );
    info!(
        "Image loaded width={} height={} file={}",
        asset.width(),
        asset.height(),
        file_name.as_deref().unwrap_or("-")
    );
    session.image = ImageState::Loaded { asset, file_name };
    clear_paint(session);
    Transition::Applied
}

/// Abandons a load; whatever image was showing before stays.
pub fn fail_load(session: &mut DrawingSession, ticket: LoadTicket) -> Transition {
    if !is_current_load(session, ticket) {
        return Transition::Rejected("stale image load");
    }
    let previous = match std::mem::replace(&mut session.image, ImageState::Unloaded) {
        ImageState::Loading { previous, .. } => previous,
        other => {
            session.image = other;
            return Transition::Rejected("no load in progress");
        }
    };
    if let Some((asset, file_name)) = previous {
        session.image = ImageState::Loaded { asset, file_name };
    }
    Transition::Applied
}

/// Begin and finish a load in one step, for images that are already decoded.
pub fn load_image(
    session: &mut DrawingSession,
    asset: ImageAsset,
    file_name: Option<String>,
) -> Transition {
    let ticket = begin_load(session);
    finish_load(session, ticket, asset, file_name)
}

fn is_current_load(session: &DrawingSession, ticket: LoadTicket) -> bool {
    matches!(session.image, ImageState::Loading { ticket: current, .. } if current == ticket.0)
}

/// Adopts a new viewport size. The visible surface starts blank; when there is paint to
/// keep, the returned job rebuilds it for the new rect and must be handed back to
/// [`finish_remap`]. While a load is pending the rect follows the image still on screen.
pub fn resize(session: &mut DrawingSession, viewport_w: u32, viewport_h: u32) -> Option<RemapJob> {
    if (viewport_w, viewport_h) == (session.viewport_w, session.viewport_h) {
        return None;
    }
    let source = remap_source(session);

    session.viewport_w = viewport_w;
    session.viewport_h = viewport_h;
    session.strokes.resize_surface(viewport_w, viewport_h);
    session.mode = StrokeMode::Idle;
    // Whatever is still in flight was built for the previous viewport.
    session.remap_issued += 1;

    let Some((image_w, image_h)) = session
        .displayed_image()
        .map(|image| (image.width(), image.height()))
    else {
        debug!("Resize without an image viewport={viewport_w}x{viewport_h}");
        return None;
    };
    let new = DisplayRect::fit(image_w, image_h, viewport_w, viewport_h);
    session.rect = new;

    if !session.strokes.has_paint() || source.old.is_empty() {
        return None;
    }
    if new.is_empty() {
        debug!("Holding paint until the viewport has room viewport={viewport_w}x{viewport_h}");
        session.pending_remap = Some(source);
        return None;
    }
    let job = RemapJob {
        seq: session.remap_issued,
        snapshot: source.snapshot.clone(),
        old: source.old,
        new,
        viewport_w,
        viewport_h,
    };
    session.pending_remap = Some(source);
    debug!(
        "Remap issued seq={} viewport={viewport_w}x{viewport_h}",
        job.seq
    );
    Some(job)
}

/// The surface the next remap starts from. A remap still in flight keeps its settled
/// snapshot, with paint laid down since the last resize folded back into it.
fn remap_source(session: &mut DrawingSession) -> PendingRemap {
    let live = session.strokes.surface();
    match session.pending_remap.take() {
        Some(mut pending) if live.has_coverage() && !session.rect.is_empty() => {
            let fresh = remap(
                live,
                &session.rect,
                &pending.old,
                pending.snapshot.width(),
                pending.snapshot.height(),
            );
            pending.snapshot.merge_max(&fresh);
            pending
        }
        Some(pending) => pending,
        None => PendingRemap {
            snapshot: live.clone(),
            old: session.rect,
        },
    }
}

/// Applies a remap completion if it is the latest one issued; older completions are dropped.
pub fn finish_remap(session: &mut DrawingSession, result: RemapResult) -> Transition {
    if result.seq != session.remap_issued {
        debug!(
            "Dropping stale remap seq={} latest={}",
            result.seq, session.remap_issued
        );
        return Transition::Rejected("stale remap");
    }
    if result.new != session.rect || !session.strokes.merge_surface(&result.mask) {
        return Transition::Rejected("remap does not match the current viewport");
    }
    session.pending_remap = None;
    Transition::Applied
}

/// Builds the confirm request for the current paint.
pub fn confirm(
    session: &DrawingSession,
    file_name: Option<&str>,
) -> Result<ConfirmMaskRequest, MaskError> {
    let image = session.image().ok_or(MaskError::NoImageLoaded)?;
    if !session.has_mask_content() {
        return Err(MaskError::EmptyMask);
    }
    let mut mask = rasterize(session.strokes.surface(), &session.rect, Some(image))?;
    if let Some(pending) = &session.pending_remap {
        let settled = rasterize(&pending.snapshot, &pending.old, Some(image))?;
        mask.union_with(&settled);
    }
    info!(
        "Mask confirmed width={} height={} selected={}",
        mask.width(),
        mask.height(),
        mask.selected_count()
    );
    Ok(ConfirmMaskRequest {
        mask_data_url: mask.to_data_url()?,
        original_file_name: file_name
            .or_else(|| session.file_name())
            .map(str::to_string),
        session_id: session.session_id.clone(),
    })
}
