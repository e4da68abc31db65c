use lazy_static::lazy_static;
use std::sync::RwLock;
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Intern a string and return its ID
pub fn intern_text(s: &str) -> usize {
    let atom = Atom::from(s);
    if let Some(idx) = TEXT_INTERNER
        .read()
        .ok()
        .and_then(|v| v.iter().position(|a| *a == atom))
    {
        return idx;
    }
    let mut v = TEXT_INTERNER.write().unwrap_or_else(|e| e.into_inner());
    // another writer may have pushed the same text between the two locks
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

/// Current count of unique texts
pub fn text_count() -> usize {
    TEXT_INTERNER.read().map(|v| v.len()).unwrap_or(0)
}

pub fn get_text(id: usize) -> Option<String> {
    TEXT_INTERNER
        .read()
        .ok()
        .and_then(|v| v.get(id).map(|a| a.to_string()))
}

/// Identity of one rasterized piece of text: the interned string, its pixel
/// size quantized to a tenth of a pixel, and its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextKey {
    pub text_id: usize,
    pub size_dpx: u32,
    pub color: [u8; 4],
}

impl TextKey {
    pub fn new(text: &str, size_px: f32, color: [u8; 4]) -> Self {
        Self {
            text_id: intern_text(text),
            size_dpx: (size_px * 10.0).round().max(0.0) as u32,
            color,
        }
    }

    pub fn size_px(&self) -> f32 {
        self.size_dpx as f32 / 10.0
    }
}
