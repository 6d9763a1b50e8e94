//! In-memory bitmaps and the off-screen compositor

use snafu::OptionExt;

use crate::{
    errors::{DockError, InvalidColorSnafu},
    render::{Canvas, Rect, Sheet, SIZE},
    sprites::Sheets,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RGB`, `#RRGGBB` or X11 style `rgb:R/G/B` with 1 to 4 hex
    /// digits per channel.
    pub(crate) fn parse(text: &str) -> Result<Self, DockError> {
        let text = text.trim();
        let parsed = if let Some(hex) = text.strip_prefix('#') {
            parse_hash(hex)
        } else if let Some(channels) = text.strip_prefix("rgb:") {
            parse_x11(channels)
        } else {
            None
        };
        parsed.context(InvalidColorSnafu { color: text })
    }

    /// Shift every channel by `delta`, saturating.
    pub(crate) fn offset(self, delta: i16) -> Self {
        let f = |c: u8| (i16::from(c) + delta).clamp(0, 255) as u8;
        Self(f(self.0), f(self.1), f(self.2))
    }
}

fn parse_hash(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let v = u16::from_str_radix(hex, 16).ok()?;
            let c = |shift: u16| ((v >> shift) & 0xf) as u8 * 0x11;
            Some(Rgb(c(8), c(4), c(0)))
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some(Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

fn parse_x11(channels: &str) -> Option<Rgb> {
    let mut parts = channels.split('/').map(|c| {
        if c.is_empty() || c.len() > 4 || !c.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(c, 16).ok()?;
        let max = (1u32 << (4 * c.len())) - 1;
        Some(((value * 255 + max / 2) / max) as u8)
    });
    let rgb = Rgb(parts.next()??, parts.next()??, parts.next()??);
    parts.next().is_none().then_some(rgb)
}

/// A bitmap with per-pixel transparency. `None` pixels are outside the shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bitmap {
    width: u16,
    height: u16,
    pixels: Vec<Option<Rgb>>,
}

impl Bitmap {
    /// Transparent bitmap.
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; usize::from(width) * usize::from(height)],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Rgb> {
        self.index(x, y).and_then(|i| self.pixels[i])
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, color: Option<Rgb>) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Option<Rgb>) {
        for y in rect.y..rect.y.saturating_add(rect.h) {
            for x in rect.x..rect.x.saturating_add(rect.w) {
                self.set(x, y, color);
            }
        }
    }

    /// Draw a pattern where `#` is `color` and anything else is left alone.
    pub(crate) fn draw_pattern(&mut self, x: u16, y: u16, pattern: &[&str], color: Rgb) {
        for (dy, row) in (0u16..).zip(pattern) {
            for (dx, ch) in (0u16..).zip(row.chars()) {
                if ch == '#' {
                    self.set(x + dx, y + dy, Some(color));
                }
            }
        }
    }

    /// Replace every transparent pixel.
    pub(crate) fn fill_transparent(&mut self, color: Rgb) {
        for p in self.pixels.iter_mut().filter(|p| p.is_none()) {
            *p = Some(color);
        }
    }

    /// Copy a rectangle of `src`, clipped to both bitmaps.
    pub(crate) fn copy_from(&mut self, src: &Bitmap, area: Rect, dx: u16, dy: u16) {
        for y in 0..area.h {
            for x in 0..area.w {
                let (sx, sy) = (area.x + x, area.y + y);
                if src.index(sx, sy).is_none() {
                    continue;
                }
                self.set(dx + x, dy + y, src.get(sx, sy));
            }
        }
    }
}

/// Composes frames from the sprite sheets.
#[derive(Debug)]
pub(crate) struct Compositor {
    sheets: Sheets,
    frame: Bitmap,
}

impl Compositor {
    pub(crate) fn new(sheets: Sheets) -> Self {
        Self {
            sheets,
            frame: Bitmap::new(SIZE, SIZE),
        }
    }

    pub(crate) fn frame(&self) -> &Bitmap {
        &self.frame
    }
}

impl Canvas for Compositor {
    fn copy_area(&mut self, sheet: Sheet, src: Rect, dx: u16, dy: u16) {
        let source = match sheet {
            Sheet::BackdropOff => &self.sheets.backdrop_off,
            Sheet::BackdropOn => &self.sheets.backdrop_on,
            Sheet::Parts => &self.sheets.parts,
        };
        self.frame.copy_from(source, src, dx, dy);
    }
}
