use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use quadwarp::config::WarpConfig;
use quadwarp::geometry::{Containment, Quad};
use quadwarp::image::RgbaImage;
use quadwarp::overlay::draw_polylines;
use quadwarp::warp::Warper as CoreWarper;
use quadwarp::WarpError;

// ── Tsify types for TypeScript interface generation ──

/// Warp settings passed from JavaScript.
#[derive(Tsify, Serialize, Deserialize, Default)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmWarpConfig {
    /// Exact quadrilateral containment instead of the bounding box (default: false).
    #[serde(default)]
    pub polygon: Option<bool>,
    /// Grid spacing in source pixels (default: 20).
    #[serde(default)]
    pub grid_spacing: Option<f64>,
    /// RGBA grid stroke color (default: [0, 150, 255, 128]).
    #[serde(default)]
    pub grid_color: Option<[u8; 4]>,
    /// Stroke the projected grid over every render (default: false).
    #[serde(default)]
    pub show_grid: Option<bool>,
}

/// Destination corners: top-left, top-right, bottom-right, bottom-left.
#[derive(Tsify, Serialize, Deserialize, Clone, Copy)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmCorners {
    pub points: [[f64; 2]; 4],
}

/// A projected grid line returned to JavaScript.
#[derive(Tsify, Serialize, Deserialize)]
#[tsify(into_wasm_abi)]
pub struct WasmPolyline {
    /// "horizontal" or "vertical".
    pub axis: String,
    pub points: Vec<[f64; 2]>,
}

// ── Warper wrapper ──

/// Perspective warper over one source image, for use from JavaScript/TypeScript.
#[wasm_bindgen]
pub struct Warper {
    inner: CoreWarper,
    source: RgbaImage,
    show_grid: bool,
}

#[wasm_bindgen]
impl Warper {
    /// Create a warper over an RGBA source image (4 bytes per pixel).
    #[wasm_bindgen(constructor)]
    pub fn new(
        data: &[u8],
        width: u32,
        height: u32,
        config: Option<WasmWarpConfig>,
    ) -> Result<Warper, JsError> {
        let config = config.unwrap_or_default();
        let source = RgbaImage::from_buf(width, height, data.to_vec()).map_err(to_js)?;
        let show_grid = config.show_grid.unwrap_or(false);
        Ok(Warper {
            inner: CoreWarper::new(build_config(config)),
            source,
            show_grid,
        })
    }

    /// Source image width in pixels.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.source.width
    }

    /// Source image height in pixels.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.source.height
    }

    /// Render the source onto `corners` in a `width x height` RGBA buffer.
    ///
    /// Degenerate corners fall back to an undistorted full-canvas render.
    pub fn render(&self, corners: WasmCorners, width: u32, height: u32) -> Result<Vec<u8>, JsError> {
        let dst = Quad::from(corners.points);
        let mut out = self
            .inner
            .render_or_fallback(&self.source, &dst, width, height)
            .map_err(to_js)?;

        if self.show_grid {
            match self
                .inner
                .grid(self.source.width, self.source.height, &self.source.corners(), &dst)
            {
                Ok(lines) => draw_polylines(&mut out, &lines, self.inner.config.grid_color),
                // the fallback render carries no grid
                Err(WarpError::DegenerateGeometry(_)) => {}
                Err(e) => return Err(to_js(e)),
            }
        }

        Ok(out.buf)
    }

    /// Project the source grid onto `corners`; `spacing` overrides the configured one.
    pub fn grid(&self, corners: WasmCorners, spacing: Option<f64>) -> Result<JsValue, JsError> {
        let dst = Quad::from(corners.points);
        let spacing = spacing.unwrap_or(self.inner.config.grid_spacing);
        let lines = quadwarp::project_grid(
            self.source.width,
            self.source.height,
            &self.source.corners(),
            &dst,
            spacing,
        )
        .map_err(to_js)?;

        let wasm_lines: Vec<WasmPolyline> = lines.iter().map(polyline_to_wasm).collect();

        serde_wasm_bindgen::to_value(&wasm_lines).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Resting corner positions for a `width x height` canvas.
    #[wasm_bindgen(js_name = resetCorners)]
    pub fn reset_corners(&self, width: u32, height: u32) -> WasmCorners {
        WasmCorners {
            points: Quad::rect(width as f64, height as f64).into(),
        }
    }
}

fn build_config(config: WasmWarpConfig) -> WarpConfig {
    let mut warp = WarpConfig::default();
    if config.polygon.unwrap_or(false) {
        warp.containment = Containment::Polygon;
    }
    if let Some(s) = config.grid_spacing {
        warp.grid_spacing = s;
    }
    if let Some(c) = config.grid_color {
        warp.grid_color = c;
    }
    warp
}

fn polyline_to_wasm(line: &quadwarp::Polyline) -> WasmPolyline {
    let axis = match line.axis {
        quadwarp::GridAxis::Horizontal => "horizontal",
        quadwarp::GridAxis::Vertical => "vertical",
    };
    WasmPolyline {
        axis: axis.to_string(),
        points: line.points.iter().map(|p| [p.x, p.y]).collect(),
    }
}

fn to_js(e: WarpError) -> JsError {
    JsError::new(&e.to_string())
}
