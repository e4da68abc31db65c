pub mod cache;

pub use cache::{Atom, TextKey, get_text, intern_text, text_count};
