use maskpaint_shared::{DisplayRect, ImageAsset, PaintedMask, Point, StrokeAccumulator};

pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;
pub const MIN_BRUSH_RADIUS: f32 = 1.0;
pub const MAX_BRUSH_RADIUS: f32 = 100.0;
pub const OVERLAY_COLOR: [u8; 3] = [255, 64, 64];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeMode {
    Idle,
    Stroking { last: Point },
}

#[derive(Clone, Debug)]
pub enum ImageState {
    Unloaded,
    Loading {
        ticket: u64,
        previous: Option<(ImageAsset, Option<String>)>,
    },
    Loaded {
        asset: ImageAsset,
        file_name: Option<String>,
    },
}

/// The pre-resize surface a remap job was built from. It stays the mask's truth until
/// the matching result lands.
#[derive(Clone, Debug)]
pub struct PendingRemap {
    pub snapshot: PaintedMask,
    pub old: DisplayRect,
}

/// Everything the painting surface knows, passed explicitly through every handler.
pub struct DrawingSession {
    pub image: ImageState,
    pub viewport_w: u32,
    pub viewport_h: u32,
    pub rect: DisplayRect,
    pub strokes: StrokeAccumulator,
    pub brush_radius: f32,
    pub mode: StrokeMode,
    pub load_ticket: u64,
    pub remap_issued: u64,
    pub pending_remap: Option<PendingRemap>,
    /// Server session the editor was opened for, if any.
    pub session_id: Option<String>,
}

impl DrawingSession {
    pub fn new(viewport_w: u32, viewport_h: u32) -> Self {
        Self {
            image: ImageState::Unloaded,
            viewport_w,
            viewport_h,
            rect: DisplayRect::EMPTY,
            strokes: StrokeAccumulator::new(viewport_w, viewport_h),
            brush_radius: DEFAULT_BRUSH_RADIUS,
            mode: StrokeMode::Idle,
            load_ticket: 0,
            remap_issued: 0,
            pending_remap: None,
            session_id: None,
        }
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        match &self.image {
            ImageState::Loaded { asset, .. } => Some(asset),
            _ => None,
        }
    }

    /// The image on screen: the loaded one, or while a load is pending the one it replaces.
    pub fn displayed_image(&self) -> Option<&ImageAsset> {
        match &self.image {
            ImageState::Loaded { asset, .. }
            | ImageState::Loading {
                previous: Some((asset, _)),
                ..
            } => Some(asset),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.image {
            ImageState::Loaded { file_name, .. } => file_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.image, ImageState::Loading { .. })
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.mode, StrokeMode::Stroking { .. })
    }

    pub fn has_mask_content(&self) -> bool {
        self.strokes.has_paint()
    }
}
