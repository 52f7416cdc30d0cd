//! Browser glue: DOM lookup, WebGL1 context, scratch canvas.

use glsl_math_core::render::GlowBackend;
use glsl_math_core::{Bitmap, RenderSession, SessionConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData, WebGlRenderingContext,
};

use crate::resolve_sources;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| js_err("no document available"))
}

fn sized_canvas(
    document: &Document,
    id: &str,
    width: u32,
    height: u32,
) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = document
        .get_element_by_id(id)
        .ok_or_else(|| js_err(format!("missing element #{id}")))?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

fn element_text(document: &Document, id: &str) -> Option<String> {
    document.get_element_by_id(id).and_then(|el| el.text_content())
}

fn paint_scratch(canvas: &HtmlCanvasElement, bitmap: &Bitmap) -> Result<(), JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| js_err("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let side = |v: usize| {
        u32::try_from(v).map_err(|_| js_err(format!("bitmap side {v} too large")))
    };
    let image = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(bitmap.data()),
        side(bitmap.width())?,
        side(bitmap.height())?,
    )?;
    ctx.put_image_data(&image, 0.0, 0.0)
}

/// A running session on the page's WebGL canvas.
#[wasm_bindgen]
pub struct WebSession {
    session: RenderSession<GlowBackend>,
}

#[wasm_bindgen]
impl WebSession {
    /// Draws the textured quad again.
    pub fn render_frame(&mut self) -> Result<(), JsValue> {
        self.session.render_frame().map_err(js_err)
    }

    /// Shader compile and link logs collected during setup.
    pub fn diagnostics(&self) -> Vec<String> {
        self.session
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// Sets up the page from `config_json` (or defaults) and draws one frame.
#[wasm_bindgen]
pub fn run_with_config(config_json: Option<String>) -> Result<WebSession, JsValue> {
    let config = match config_json {
        Some(json) => SessionConfig::from_json(&json).map_err(js_err)?,
        None => SessionConfig::default(),
    };
    let document = document()?;
    let ids = &config.elements;

    let canvas = sized_canvas(
        &document,
        &ids.canvas,
        config.surface.width,
        config.surface.height,
    )?;
    let webgl = canvas
        .get_context("webgl")?
        .ok_or_else(|| js_err("webgl context unavailable"))?
        .dyn_into::<WebGlRenderingContext>()?;
    let gl = glow::Context::from_webgl1_context(webgl);

    let sources = resolve_sources(
        element_text(&document, &ids.vertex_shader),
        element_text(&document, &ids.fragment_shader),
    );

    let scratch_id = ids.scratch_canvas.clone();
    let mut session =
        RenderSession::new(GlowBackend::new(gl), config, sources).map_err(js_err)?;

    let bitmap = session.pattern_bitmap().map_err(js_err)?;
    let size = u32::try_from(bitmap.width())
        .map_err(|_| js_err(format!("pattern size {} too large", bitmap.width())))?;
    let scratch = sized_canvas(&document, &scratch_id, size, size)?;
    paint_scratch(&scratch, &bitmap)?;

    session.initialize_with(bitmap).map_err(js_err)?;
    session.render_frame().map_err(js_err)?;
    Ok(WebSession { session })
}

/// Module entry point: logging, then the default demo.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // a page that re-instantiates the module already has a logger
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("console logger already installed");
    }
    run_with_config(None).map(|_| ())
}
