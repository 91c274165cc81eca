use log::info;
use wasm_bindgen::prelude::*;

use maskpaint_shared::data_url::decode_base64_payload;
use maskpaint_shared::{ImageAsset, MaskError, Point};

use crate::actions::{
    begin_load, clear_paint, confirm, fail_load, finish_load, finish_remap, pointer_down,
    pointer_move, pointer_up, resize, set_brush_radius,
};
use crate::geometry::client_to_canvas;
use crate::net::{
    confirm_body, initial_image_bytes, parse_confirm_response, session_id_from_path,
    session_info_url, CONFIRM_ENDPOINT,
};
use crate::persistence::{default_store, remember_image, restore_image, LastImageStore};
use crate::state::{DrawingSession, OVERLAY_COLOR};
use crate::util::init_logging;

fn js_error(error: &MaskError) -> JsValue {
    let js = js_sys::Error::new(&error.to_string());
    js.set_name(error.code());
    js.into()
}

/// Page-facing handle on one drawing session. The page owns the canvases and the
/// network; this owns the state and the pixels.
#[wasm_bindgen]
pub struct MaskEditor {
    session: DrawingSession,
    store: Box<dyn LastImageStore>,
}

#[wasm_bindgen]
impl MaskEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(viewport_w: u32, viewport_h: u32, debug: bool) -> MaskEditor {
        console_error_panic_hook::set_once();
        init_logging(debug);
        MaskEditor::with_store(viewport_w, viewport_h, default_store())
    }

    /// Binds the editor to the server session in a `/s/<id>` page path.
    pub fn attach_to_path(&mut self, path: &str) -> Option<String> {
        self.session.session_id = session_id_from_path(path);
        self.session.session_id.clone()
    }

    /// Where to fetch the attached session's opener image, if a session is attached.
    pub fn session_info_url(&self) -> Option<String> {
        self.session.session_id.as_deref().map(session_info_url)
    }

    pub fn confirm_endpoint() -> String {
        CONFIRM_ENDPOINT.to_string()
    }

    pub fn load_image(&mut self, bytes: &[u8], file_name: Option<String>) -> Result<(), JsValue> {
        let ticket = begin_load(&mut self.session);
        match ImageAsset::decode(bytes) {
            Ok(asset) => {
                remember_image(self.store.as_mut(), &asset, file_name.as_deref());
                finish_load(&mut self.session, ticket, asset, file_name);
                Ok(())
            }
            Err(error) => {
                fail_load(&mut self.session, ticket);
                Err(js_error(&error))
            }
        }
    }

    pub fn load_data_url(
        &mut self,
        data_url: &str,
        file_name: Option<String>,
    ) -> Result<(), JsValue> {
        let bytes = decode_base64_payload(data_url).map_err(|e| js_error(&e))?;
        self.load_image(&bytes, file_name)
    }

    /// Loads the image carried by a `/api/session/<id>` response. False when there is none.
    pub fn load_session_info(&mut self, text: &str) -> Result<bool, JsValue> {
        match initial_image_bytes(text).map_err(|e| js_error(&e))? {
            Some((bytes, file_name)) => self.load_image(&bytes, file_name).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn restore_last_image(&mut self) -> bool {
        let Some((asset, file_name)) = restore_image(self.store.as_ref()) else {
            return false;
        };
        info!("Restored last image width={} height={}", asset.width(), asset.height());
        let ticket = begin_load(&mut self.session);
        finish_load(&mut self.session, ticket, asset, file_name).is_applied()
    }

    /// Remaps synchronously; the page calls this from its debounced resize handler.
    pub fn resize(&mut self, viewport_w: u32, viewport_h: u32) {
        if let Some(job) = resize(&mut self.session, viewport_w, viewport_h) {
            finish_remap(&mut self.session, job.run());
        }
    }

    /// Pointer client coordinates to canvas pixels, given the canvas' bounding box.
    /// Empty when the canvas has no on-page size.
    pub fn to_canvas_point(
        &self,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        css_width: f64,
        css_height: f64,
    ) -> Vec<f32> {
        client_to_canvas(
            client_x,
            client_y,
            left,
            top,
            css_width,
            css_height,
            self.session.viewport_w,
            self.session.viewport_h,
        )
        .map(|point| vec![point.x, point.y])
        .unwrap_or_default()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        pointer_down(&mut self.session, Point::new(x, y)).is_applied()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        pointer_move(&mut self.session, Point::new(x, y)).is_applied()
    }

    pub fn pointer_up(&mut self) -> bool {
        pointer_up(&mut self.session).is_applied()
    }

    pub fn set_brush_radius(&mut self, radius: f32) -> f32 {
        set_brush_radius(&mut self.session, radius)
    }

    pub fn brush_radius(&self) -> f32 {
        self.session.brush_radius
    }

    pub fn clear(&mut self) {
        clear_paint(&mut self.session);
    }

    pub fn has_image(&self) -> bool {
        self.session.image().is_some()
    }

    pub fn has_mask_content(&self) -> bool {
        self.session.has_mask_content()
    }

    pub fn file_name(&self) -> Option<String> {
        self.session.file_name().map(str::to_string)
    }

    /// `[offset_x, offset_y, draw_w, draw_h, scale]` of the current image placement.
    pub fn display_rect(&self) -> Vec<f64> {
        let rect = self.session.rect;
        vec![
            rect.offset_x as f64,
            rect.offset_y as f64,
            rect.draw_w as f64,
            rect.draw_h as f64,
            rect.scale,
        ]
    }

    /// RGBA pixels of the paint overlay, viewport-sized.
    pub fn overlay_rgba(&self) -> Vec<u8> {
        self.session
            .strokes
            .surface()
            .to_overlay(OVERLAY_COLOR)
            .into_raw()
    }

    /// JSON body for `POST /api/mask`.
    pub fn confirm_payload(&self, file_name: Option<String>) -> Result<String, JsValue> {
        let request = confirm(&self.session, file_name.as_deref()).map_err(|e| js_error(&e))?;
        confirm_body(&request).map_err(|e| js_error(&e))
    }

    /// Checks the server's confirm answer and returns the saved file path.
    pub fn accept_confirm_response(&self, text: &str) -> Result<String, JsValue> {
        let response = parse_confirm_response(text).map_err(|e| js_error(&e))?;
        Ok(response.file_path.unwrap_or_default())
    }
}

impl MaskEditor {
    fn with_store(viewport_w: u32, viewport_h: u32, store: Box<dyn LastImageStore>) -> Self {
        MaskEditor {
            session: DrawingSession::new(viewport_w, viewport_h),
            store,
        }
    }
}
