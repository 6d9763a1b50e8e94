//! Procedurally drawn backdrops and parts sheet
//!
//! The layout matches the coordinates used by the draw sequence in
//! [`crate::render`]. Glyph cells are opaque so a blit fully replaces what was
//! below.

use crate::{
    pixmap::{Bitmap, Rgb},
    render::{
        Rect, BAR_PITCH, BAR_SEGMENT, BAR_X, BAR_Y, CHARGE_GLYPH, CHARGE_X, MAX_SEGMENTS,
        PARTS_SIZE, SIZE, SMALL_DIGIT, SMALL_DIGIT_Y, STATUS_Y, TIME_DIGIT, TIME_X, TIME_Y,
    },
};

/// Background for transparent pixels in windowed mode.
pub(crate) const WINDOWED_BG: Rgb = Rgb(0xae, 0xaa, 0xae);
const BEZEL: Rgb = Rgb(0x00, 0x00, 0x00);

/// Seven segment masks, bit 0 is the top segment, then clockwise, bit 6 is the
/// middle one.
const SEGMENTS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];

const PERCENT_SIGN: [&str; 9] = [
    "##..#", "##.#.", "...#.", "..#..", "..#..", ".#...", ".#.##", "#..##", ".....",
];
const CHARGING: [&str; 9] = [
    "..##", ".##.", "##..", "####", "..##", ".##.", "##..", "#...", "....",
];
const MAINS: [&str; 9] = [
    ".#.#.", ".#.#.", "#####", "#####", "#####", ".###.", "..#..", "..#..", ".....",
];
const BATTERY: [&str; 9] = [
    ".###.", "#####", "#...#", "#...#", "#####", "#####", "#####", "#####", ".....",
];

/// Colors of one back-light mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    /// Display background
    pub panel: Rgb,
    /// Lit segments and glyphs
    pub ink: Rgb,
    /// Unlit segments
    pub dim: Rgb,
}

impl Palette {
    pub(crate) fn light_off() -> Self {
        Self {
            panel: Rgb(0x20, 0x20, 0x20),
            ink: Rgb(0x20, 0xb2, 0xae),
            dim: Rgb(0x10, 0x40, 0x40),
        }
    }

    /// Back-light palette. The unlit shade is the light color darkened by 24.
    pub(crate) fn light_on(color: Rgb) -> Self {
        Self {
            panel: color,
            ink: Rgb(0x20, 0x20, 0x20),
            dim: color.offset(-24),
        }
    }
}

/// All images the draw sequence blits from.
#[derive(Debug, Clone)]
pub(crate) struct Sheets {
    pub backdrop_off: Bitmap,
    pub backdrop_on: Bitmap,
    pub parts: Bitmap,
}

impl Sheets {
    pub(crate) fn new(light_color: Rgb, windowed: bool) -> Self {
        let off = Palette::light_off();
        let on = Palette::light_on(light_color);
        let mut backdrop_off = backdrop(&off);
        let mut backdrop_on = backdrop(&on);
        if windowed {
            backdrop_off.fill_transparent(WINDOWED_BG);
            backdrop_on.fill_transparent(WINDOWED_BG);
        }
        Self {
            backdrop_off,
            backdrop_on,
            parts: parts(&off, &on),
        }
    }
}

fn backdrop(palette: &Palette) -> Bitmap {
    let mut bmp = Bitmap::new(SIZE, SIZE);
    let last = SIZE - 1;
    bmp.fill_rect(Rect::new(0, 0, SIZE, SIZE), Some(BEZEL));
    bmp.fill_rect(Rect::new(2, 2, SIZE - 4, SIZE - 4), Some(palette.panel));
    // Rounded corners are outside the shape.
    for (x, y) in [(0, 0), (1, 0), (0, 1)] {
        bmp.set(x, y, None);
        bmp.set(last - x, y, None);
        bmp.set(x, last - y, None);
        bmp.set(last - x, last - y, None);
    }

    let (w, h) = TIME_DIGIT;
    for x in TIME_X {
        seven_segment(&mut bmp, Rect::new(x, TIME_Y, w, h), 2, 1, None, palette);
    }
    // Colon between hours and minutes.
    let colon_x = TIME_X[1] + w + 2;
    bmp.fill_rect(Rect::new(colon_x, TIME_Y + 5, 2, 2), Some(palette.ink));
    bmp.fill_rect(Rect::new(colon_x, TIME_Y + 13, 2, 2), Some(palette.ink));

    let (w, h) = BAR_SEGMENT;
    for n in 0..MAX_SEGMENTS {
        bmp.fill_rect(Rect::new(BAR_X + n * BAR_PITCH, BAR_Y, w, h), Some(palette.dim));
    }

    bmp.draw_pattern(23, 45, &PERCENT_SIGN, palette.ink);
    bmp
}

fn parts(off: &Palette, on: &Palette) -> Bitmap {
    let (width, height) = PARTS_SIZE;
    let mut bmp = Bitmap::new(width, height);
    let modes = [(off, 0, 0, 31, 100), (on, 20, 50, 40, 102)];
    for (palette, time_y, small_x, charge_y, bar_x) in modes {
        let (w, h) = TIME_DIGIT;
        for d in 0..10u8 {
            let cell = Rect::new(u16::from(d) * w, time_y, w, h);
            seven_segment(&mut bmp, cell, 2, 1, Some(d), palette);
        }

        let (w, h) = SMALL_DIGIT;
        for d in 0..10u8 {
            let cell = Rect::new(u16::from(d) * w + small_x, SMALL_DIGIT_Y, w, h);
            seven_segment(&mut bmp, cell, 1, 0, Some(d), palette);
        }

        glyph(&mut bmp, Rect::new(small_x, STATUS_Y, w, h), &MAINS, palette);
        glyph(&mut bmp, Rect::new(small_x + w, STATUS_Y, w, h), &BATTERY, palette);

        let (w, h) = CHARGE_GLYPH;
        glyph(&mut bmp, Rect::new(CHARGE_X, charge_y, w, h), &CHARGING, palette);

        let (w, h) = BAR_SEGMENT;
        bmp.fill_rect(Rect::new(bar_x, 0, w, h), Some(palette.ink));
    }
    bmp
}

fn glyph(bmp: &mut Bitmap, cell: Rect, pattern: &[&str], palette: &Palette) {
    bmp.fill_rect(cell, Some(palette.panel));
    bmp.draw_pattern(cell.x, cell.y, pattern, palette.ink);
}

/// Draw a seven segment digit into `cell`. `None` draws only unlit segments.
fn seven_segment(
    bmp: &mut Bitmap,
    cell: Rect,
    thickness: u16,
    margin: u16,
    digit: Option<u8>,
    palette: &Palette,
) {
    let t = thickness;
    let (x0, x1) = (cell.x + margin, cell.x + cell.w - margin);
    let (y0, y1) = (cell.y + 1, cell.y + cell.h - 1);
    let mid = y0 + (y1 - y0 - t) / 2;
    let span = x1 - x0 - 2 * t;

    let segments = [
        Rect::new(x0 + t, y0, span, t),
        Rect::new(x1 - t, y0 + t, t, mid - y0 - t),
        Rect::new(x1 - t, mid + t, t, y1 - mid - 2 * t),
        Rect::new(x0 + t, y1 - t, span, t),
        Rect::new(x0, mid + t, t, y1 - mid - 2 * t),
        Rect::new(x0, y0 + t, t, mid - y0 - t),
        Rect::new(x0 + t, mid, span, t),
    ];

    bmp.fill_rect(cell, Some(palette.panel));
    let lit = digit.map_or(0, |d| SEGMENTS[usize::from(d)]);
    for (bit, rect) in segments.into_iter().enumerate() {
        let color = if lit & (1 << bit) != 0 {
            palette.ink
        } else {
            palette.dim
        };
        bmp.fill_rect(rect, Some(color));
    }
}
