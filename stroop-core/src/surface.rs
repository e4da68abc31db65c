/// Straight (non-premultiplied) RGBA.
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];

/// 2D drawing surface the screens are painted onto.
///
/// Text is horizontally centered on `x` with its baseline at `y`, matching
/// a canvas with `textAlign = "center"`.
pub trait Surface {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba);
    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, width: f32, color: Rgba);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
}
