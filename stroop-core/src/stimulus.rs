use serde::{Deserialize, Serialize};
use std::fmt;

/// The four color names used both as words and as print colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InkColor {
    Yellow,
    Red,
    Green,
    Blue,
}

impl InkColor {
    /// Fixed order used when the deck pool is constructed.
    pub const ALL: [InkColor; 4] = [
        InkColor::Yellow,
        InkColor::Red,
        InkColor::Green,
        InkColor::Blue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InkColor::Yellow => "YELLOW",
            InkColor::Red => "RED",
            InkColor::Green => "GREEN",
            InkColor::Blue => "BLUE",
        }
    }

    pub fn rgba(&self) -> [u8; 4] {
        match self {
            InkColor::Yellow => [255, 255, 0, 255],
            InkColor::Red => [255, 0, 0, 255],
            InkColor::Green => [0, 128, 0, 255],
            InkColor::Blue => [0, 0, 255, 255],
        }
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A color word printed in some ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StroopStimulus {
    pub word: InkColor,
    pub color: InkColor,
}

impl StroopStimulus {
    pub fn new(word: InkColor, color: InkColor) -> Self {
        Self { word, color }
    }

    pub fn is_congruent(&self) -> bool {
        self.word == self.color
    }
}
