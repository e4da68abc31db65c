use crate::stimulus::InkColor;

/// Keys the task listens to. Anything else never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Y,
    G,
    R,
    B,
    N,
    Space,
    Escape,
}

impl Key {
    /// Maps a DOM-style key code ("KeyY", "Space", ...) onto a recognized key.
    pub fn from_code(code: &str) -> Option<Key> {
        Some(match code {
            "KeyY" => Key::Y,
            "KeyG" => Key::G,
            "KeyR" => Key::R,
            "KeyB" => Key::B,
            "KeyN" => Key::N,
            "Space" => Key::Space,
            "Escape" => Key::Escape,
            _ => return None,
        })
    }

    /// Color answer carried by the key, if it is one of the four response keys.
    pub fn response(&self) -> Option<InkColor> {
        match self {
            Key::Y => Some(InkColor::Yellow),
            Key::G => Some(InkColor::Green),
            Key::R => Some(InkColor::Red),
            Key::B => Some(InkColor::Blue),
            _ => None,
        }
    }

    pub fn for_color(color: InkColor) -> Key {
        match color {
            InkColor::Yellow => Key::Y,
            InkColor::Green => Key::G,
            InkColor::Red => Key::R,
            InkColor::Blue => Key::B,
        }
    }
}

/// Single-slot "last accepted key" buffer.
///
/// A newer key overwrites one that has not been consumed yet, so input faster
/// than one frame keeps only the latest press.
#[derive(Debug, Default, Clone)]
pub struct KeyBuffer {
    last: Option<Key>,
}

impl KeyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: Key) {
        self.last = Some(key);
    }

    /// Pushes a raw key code, silently ignoring codes outside the key set.
    pub fn push_code(&mut self, code: &str) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.push(key);
                true
            }
            None => false,
        }
    }

    pub fn peek(&self) -> Option<Key> {
        self.last
    }

    pub fn take(&mut self) -> Option<Key> {
        self.last.take()
    }

    /// Consumes the buffered key only when it is a color response.
    pub fn take_response(&mut self) -> Option<InkColor> {
        let color = self.last.and_then(|k| k.response())?;
        self.last = None;
        Some(color)
    }

    /// Consumes the buffered key only when it equals `key`.
    pub fn take_if(&mut self, key: Key) -> bool {
        if self.last == Some(key) {
            self.last = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_codes_are_ignored() {
        let mut buf = KeyBuffer::new();
        assert!(buf.push_code("KeyR"));
        assert!(!buf.push_code("KeyQ"));
        assert_eq!(buf.peek(), Some(Key::R));
    }

    #[test]
    fn latest_press_wins() {
        let mut buf = KeyBuffer::new();
        buf.push(Key::R);
        buf.push(Key::B);
        assert_eq!(buf.take_response(), Some(InkColor::Blue));
        assert_eq!(buf.peek(), None);
    }

    #[test]
    fn non_response_keys_survive_take_response() {
        let mut buf = KeyBuffer::new();
        buf.push(Key::Space);
        assert_eq!(buf.take_response(), None);
        assert!(buf.take_if(Key::Space));
        assert!(!buf.take_if(Key::Space));
    }
}
