pub mod paint;
pub mod skia;

pub use paint::{Layout, paint};
pub use skia::{SkiaSurface, TextSprite, render_text_pixmap};
