//! Result renderer — overlays extracted paragraph polygons onto the image.
//!
//! Each paragraph gets a random distinguishing color and a 3 px polygon
//! outline drawn on a copy of the source image.  Rendering is strictly
//! best-effort: an absent analysis or any drawing/IO failure passes the
//! original image path through unchanged so the turn never fails on
//! visualization.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::docint::DocumentAnalysis;

use super::flip::ImagingError;

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Annotate `source` with the paragraph polygons of `analysis`.
///
/// Returns the path of the annotated copy written into `out_dir`, or the
/// unchanged `source` path when `analysis` is `None` or rendering fails.
pub fn render(source: &Path, analysis: Option<&DocumentAnalysis>, out_dir: &Path) -> PathBuf {
    let Some(analysis) = analysis else {
        return source.to_path_buf();
    };

    match try_render(source, analysis, out_dir) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("render: annotation failed ({e}), passing original image through");
            source.to_path_buf()
        }
    }
}

fn try_render(
    source: &Path,
    analysis: &DocumentAnalysis,
    out_dir: &Path,
) -> Result<PathBuf, ImagingError> {
    let mut canvas = image::open(source)?.to_rgba8();
    let mut rng = rand::thread_rng();

    for paragraph in &analysis.paragraphs {
        if paragraph.polygon.len() < 2 {
            continue;
        }
        let color = random_color(&mut rng);
        draw_polygon(&mut canvas, &paragraph.polygon, color);
    }

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!(
        "annotated_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S%3f")
    ));
    canvas.save(&path)?;

    log::debug!(
        "render: annotated {} paragraphs -> {}",
        analysis.paragraphs.len(),
        path.display()
    );
    Ok(path)
}

// ---------------------------------------------------------------------------
// Drawing primitives
// ---------------------------------------------------------------------------

fn random_color(rng: &mut impl Rng) -> Rgba<u8> {
    let r: u8 = rng.gen_range(0..=255);
    let g: u8 = rng.gen_range(0..=255);
    let b: u8 = rng.gen_range(0..=255);
    Rgba([r, g, b, 255])
}

/// Draw the closed outline of `polygon` onto `canvas`.
fn draw_polygon(canvas: &mut RgbaImage, polygon: &[(f32, f32)], color: Rgba<u8>) {
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        draw_segment(canvas, a, b, color);
    }
}

/// Bresenham line with a 3x3 stamp per step for a ~3 px stroke.
/// Coordinates outside the canvas are clipped, never a panic.
fn draw_segment(canvas: &mut RgbaImage, a: (f32, f32), b: (f32, f32), color: Rgba<u8>) {
    let (mut x0, mut y0) = (a.0.round() as i64, a.1.round() as i64);
    let (x1, y1) = (b.0.round() as i64, b.1.round() as i64);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(canvas, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn stamp(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    for oy in -1..=1i64 {
        for ox in -1..=1i64 {
            let px = x + ox;
            let py = y + oy;
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
