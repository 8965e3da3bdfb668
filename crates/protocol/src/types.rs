use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Shift the rectangle by `dy` logical pixels.
    pub fn offset_y(self, dy: f64) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rrggbb` string. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| -> Option<f32> {
            let v = u8::from_str_radix(digits.get(range)?, 16).ok()?;
            Some(f32::from(v) / 255.0)
        };
        Some(Self::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0))
    }
}

/// The visible region of the host surface, in logical pixels.
///
/// Rectangles produced by the views are positioned relative to the top of
/// the plan view; `y` is the current vertical scroll offset of that view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    /// Whether *any* portion of `rect` is inside the viewport (touching
    /// edges count as visible).
    pub fn intersects(&self, rect: &Rect) -> bool {
        let top = rect.y - self.y;
        let left = rect.x - self.x;
        top + rect.h >= 0.0
            && left + rect.w >= 0.0
            && top <= self.height
            && left <= self.width
    }
}
