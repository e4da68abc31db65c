use ab_glyph::{Font, FontRef, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use stroop_cache::TextKey;
use stroop_core::{Rgba, Surface};
use tiny_skia::{
    Color, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke, Transform,
};

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Rasterized run of text.
pub struct TextSprite {
    pub pixmap: Pixmap,
    /// Top-left of the pixmap relative to the pen start on the baseline.
    pub offset: (f32, f32),
    pub advance: f32,
}

/// Lays out `text` on a baseline at y = 0 and rasterizes it into a
/// premultiplied pixmap tight around the inked pixels. `None` for text with
/// no visible glyphs.
pub fn render_text_pixmap(
    text: &str,
    size_px: f32,
    font: &FontRef<'_>,
    color: Rgba,
) -> Option<TextSprite> {
    let scale = PxScale::from(size_px);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, 0.0),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    if outlines.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }
    let (x0, y0) = (min_x.floor(), min_y.floor());
    let w = (max_x.ceil() - x0).max(1.0) as u32;
    let h = (max_y.ceil() - y0).max(1.0) as u32;

    // new pixmaps start fully transparent
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - x0).floor() as i32;
            let iy = (y as f32 + b.min.y - y0).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // premultiplied source, then Porter-Duff over the pixel below
            let a_lin = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
            let sr = (color[0] as f32 * a_lin) as u8;
            let sg = (color[1] as f32 * a_lin) as u8;
            let sb = (color[2] as f32 * a_lin) as u8;
            let sa = (a_lin * 255.0) as u8;

            let bg = dst[i];
            let inv = 1.0 - (sa as f32 / 255.0);
            let r = sr.saturating_add((bg.red() as f32 * inv) as u8);
            let g = sg.saturating_add((bg.green() as f32 * inv) as u8);
            let b = sb.saturating_add((bg.blue() as f32 * inv) as u8);
            let a = sa.saturating_add((bg.alpha() as f32 * inv) as u8);
            if let Some(px) = PremultipliedColorU8::from_rgba(r, g, b, a) {
                dst[i] = px;
            }
        });
    }

    Some(TextSprite {
        pixmap: pm,
        offset: (x0, y0),
        advance: pen_x,
    })
}

/// Opaque black canvas drawn with tiny-skia. Text sprites are cached per
/// (text, size, color), so static pages rasterize their glyphs once.
pub struct SkiaSurface {
    canvas: Pixmap,
    font: FontRef<'static>,
    sprites: HashMap<TextKey, Option<Arc<TextSprite>>>,
}

impl SkiaSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let font = FontRef::try_from_slice(FONT_BYTES).context("bundled font failed to parse")?;
        let canvas = Pixmap::new(width.max(1), height.max(1))
            .with_context(|| format!("cannot allocate a {width}x{height} canvas"))?;
        let mut surface = Self {
            canvas,
            font,
            sprites: HashMap::new(),
        };
        surface.clear();
        Ok(surface)
    }

    /// Replaces the canvas; cached sprites stay valid since they are keyed
    /// by pixel size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = Pixmap::new(width.max(1), height.max(1))
            .with_context(|| format!("cannot allocate a {width}x{height} canvas"))?;
        self.clear();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// RGBA8 bytes, row-major. The canvas is opaque, so premultiplied and
    /// straight alpha coincide.
    pub fn data(&self) -> &[u8] {
        self.canvas.data()
    }

    /// Copies the canvas into a frame buffer of the same dimensions.
    pub fn copy_to(&self, frame: &mut [u8]) {
        let data = self.canvas.data();
        let n = frame.len().min(data.len());
        frame[..n].copy_from_slice(&data[..n]);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.canvas
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn cached_sprites(&self) -> usize {
        self.sprites.len()
    }

    fn sprite(&mut self, text: &str, size_px: f32, color: Rgba) -> Option<Arc<TextSprite>> {
        let key = TextKey::new(text, size_px, color);
        let font = &self.font;
        self.sprites
            .entry(key)
            .or_insert_with(|| render_text_pixmap(text, key.size_px(), font, color).map(Arc::new))
            .clone()
    }
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

impl Surface for SkiaSurface {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        self.canvas.fill(Color::BLACK);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
        let Some(sprite) = self.sprite(text, size, color) else {
            return;
        };
        let left = x - sprite.advance / 2.0 + sprite.offset.0;
        let top = y + sprite.offset.1;
        self.canvas.draw_pixmap(
            left.round() as i32,
            top.round() as i32,
            sprite.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, width: f32, color: Rgba) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.canvas.stroke_path(
            &path,
            &paint_for(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.canvas.stroke_path(
            &path,
            &paint_for(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint;
    use stroop_core::{InkColor, Screen};

    fn lit_pixels(s: &SkiaSurface) -> Vec<Rgba> {
        s.data()
            .chunks_exact(4)
            .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect()
    }

    #[test]
    fn text_sprites_are_tight_and_offset_above_baseline() {
        let font = FontRef::try_from_slice(FONT_BYTES).unwrap();
        let sprite = render_text_pixmap("RED", 48.0, &font, [255, 0, 0, 255]).unwrap();
        assert!(sprite.offset.1 < 0.0);
        assert!(sprite.advance > sprite.pixmap.width() as f32 * 0.8);
        assert!(render_text_pixmap(" ", 48.0, &font, [255, 255, 255, 255]).is_none());
    }

    #[test]
    fn stimulus_word_is_painted_in_its_ink() {
        let mut s = SkiaSurface::new(920, 500).unwrap();
        paint(
            &Screen::Stimulus {
                word: InkColor::Blue,
                color: InkColor::Red,
            },
            &mut s,
        );
        let lit = lit_pixels(&s);
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|px| px[1] == 0 && px[2] == 0));
        assert!(lit.iter().any(|px| px[0] > 200));
        // nothing in the corners
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn clear_leaves_opaque_black() {
        let mut s = SkiaSurface::new(64, 64).unwrap();
        s.stroke_circle(32.0, 32.0, 20.0, 3.0, [255, 255, 255, 255]);
        assert!(!lit_pixels(&s).is_empty());
        s.clear();
        assert!(lit_pixels(&s).is_empty());
        assert!(s.data().chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn sprites_are_cached_per_text_size_and_color() {
        let mut s = SkiaSurface::new(400, 300).unwrap();
        s.fill_text("X", 200.0, 150.0, 40.0, [255, 255, 255, 255]);
        s.fill_text("X", 100.0, 100.0, 40.0, [255, 255, 255, 255]);
        assert_eq!(s.cached_sprites(), 1);
        s.fill_text("X", 100.0, 100.0, 40.0, [255, 0, 0, 255]);
        assert_eq!(s.cached_sprites(), 2);
    }

    #[test]
    fn resize_and_copy_out() {
        let mut s = SkiaSurface::new(10, 10).unwrap();
        s.resize(20, 8).unwrap();
        assert_eq!((s.width(), s.height()), (20, 8));
        let mut frame = vec![7u8; 20 * 8 * 4];
        s.copy_to(&mut frame);
        assert_eq!(&frame[..4], &[0, 0, 0, 255]);
    }
}
