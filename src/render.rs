//! Draw sequence for the widget
//!
//! Everything is blitted from three sheets into an off-screen frame. The parts
//! sheet holds every glyph twice, once for each back-light mode, and the
//! [`Offsets`] table picks the right copy.

use crate::{sensor::PowerSample, state::Backlight};

/// Width and height of the widget in pixels.
pub(crate) const SIZE: u16 = 58;

/// Source images that can be blitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Sheet {
    BackdropOff,
    BackdropOn,
    Parts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub(crate) const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }
}

/// Off-screen drawing target.
pub(crate) trait Canvas {
    /// Copy `src` from `sheet` to `(dx, dy)` of the frame.
    fn copy_area(&mut self, sheet: Sheet, src: Rect, dx: u16, dy: u16);
}

/// Parts sheet coordinates that depend on the back-light mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Offsets {
    time_y: u16,
    small_x: u16,
    charge_y: u16,
    bar_x: u16,
}

const LIGHT_OFF: Offsets = Offsets {
    time_y: 0,
    small_x: 0,
    charge_y: 31,
    bar_x: 100,
};

const LIGHT_ON: Offsets = Offsets {
    time_y: 20,
    small_x: 50,
    charge_y: 40,
    bar_x: 102,
};

// Parts sheet geometry, shared with the sprite generator.
pub(crate) const TIME_DIGIT: (u16, u16) = (10, 20);
pub(crate) const SMALL_DIGIT: (u16, u16) = (5, 9);
pub(crate) const SMALL_DIGIT_Y: u16 = 40;
pub(crate) const STATUS_Y: u16 = 49;
pub(crate) const CHARGE_GLYPH: (u16, u16) = (4, 9);
pub(crate) const CHARGE_X: u16 = 100;
pub(crate) const BAR_SEGMENT: (u16, u16) = (2, 9);
pub(crate) const PARTS_SIZE: (u16, u16) = (104, 58);

// Frame positions.
pub(crate) const TIME_X: [u16; 4] = [5, 17, 32, 44];
pub(crate) const TIME_Y: u16 = 7;
pub(crate) const PERCENT_X: [u16; 3] = [5, 11, 17];
pub(crate) const FIELD_Y: u16 = 45;
pub(crate) const MAINS_X: u16 = 34;
pub(crate) const CHARGING_X: u16 = 41;
pub(crate) const BATTERY_X: u16 = 48;
pub(crate) const BAR_X: u16 = 6;
pub(crate) const BAR_Y: u16 = 33;
pub(crate) const BAR_PITCH: u16 = 3;
pub(crate) const MAX_SEGMENTS: u16 = 16;

fn offsets(backlight: Backlight) -> Offsets {
    match backlight {
        Backlight::Off => LIGHT_OFF,
        Backlight::On => LIGHT_ON,
    }
}

/// Compose a full frame. The caller flushes.
pub(crate) fn draw(canvas: &mut impl Canvas, backlight: Backlight, sample: &PowerSample) {
    let backdrop = match backlight {
        Backlight::Off => Sheet::BackdropOff,
        Backlight::On => Sheet::BackdropOn,
    };
    canvas.copy_area(backdrop, Rect::new(0, 0, SIZE, SIZE), 0, 0);

    let off = offsets(backlight);
    draw_time(canvas, off, sample.seconds_remaining);
    draw_percent(canvas, off, sample.display_percent());
    draw_status(canvas, off, sample);
    draw_graph(canvas, off, sample.display_percent());
}

/// Hours and minutes left, clamped to what four digits can show.
pub(crate) fn time_digits(seconds: u64) -> [u8; 4] {
    let minutes = seconds / 60;
    let (hours, minutes) = match minutes / 60 {
        h if h > 99 => (99, 59),
        h => (h, minutes % 60),
    };
    [
        (hours / 10) as u8,
        (hours % 10) as u8,
        (minutes / 10) as u8,
        (minutes % 10) as u8,
    ]
}

/// Hundreds, tens and units of a percentage.
pub(crate) fn percent_digits(percent: u8) -> (u8, u8, u8) {
    (percent / 100, percent % 100 / 10, percent % 10)
}

/// Number of bar graph segments, one per 6.25%.
pub(crate) fn bar_segments(percent: u8) -> u16 {
    (u16::from(percent) * 4 / 25).min(MAX_SEGMENTS)
}

fn draw_time(canvas: &mut impl Canvas, off: Offsets, seconds: u64) {
    let (w, h) = TIME_DIGIT;
    for (digit, x) in time_digits(seconds).into_iter().zip(TIME_X) {
        canvas.copy_area(
            Sheet::Parts,
            Rect::new(u16::from(digit) * w, off.time_y, w, h),
            x,
            TIME_Y,
        );
    }
}

fn small_digit(canvas: &mut impl Canvas, off: Offsets, digit: u8, x: u16) {
    let (w, h) = SMALL_DIGIT;
    canvas.copy_area(
        Sheet::Parts,
        Rect::new(u16::from(digit) * w + off.small_x, SMALL_DIGIT_Y, w, h),
        x,
        FIELD_Y,
    );
}

fn draw_percent(canvas: &mut impl Canvas, off: Offsets, percent: u8) {
    let (hundreds, tens, units) = percent_digits(percent);
    small_digit(canvas, off, units, PERCENT_X[2]);
    if tens != 0 {
        small_digit(canvas, off, tens, PERCENT_X[1]);
    }
    if hundreds == 1 {
        small_digit(canvas, off, 1, PERCENT_X[0]);
        small_digit(canvas, off, 0, PERCENT_X[1]);
    }
}

fn draw_status(canvas: &mut impl Canvas, off: Offsets, sample: &PowerSample) {
    if sample.charging {
        let (w, h) = CHARGE_GLYPH;
        canvas.copy_area(
            Sheet::Parts,
            Rect::new(CHARGE_X, off.charge_y, w, h),
            CHARGING_X,
            FIELD_Y,
        );
    }

    let (w, h) = SMALL_DIGIT;
    let (src_x, dx) = if sample.on_battery {
        (w + off.small_x, BATTERY_X)
    } else {
        (off.small_x, MAINS_X)
    };
    canvas.copy_area(Sheet::Parts, Rect::new(src_x, STATUS_Y, w, h), dx, FIELD_Y);
}

fn draw_graph(canvas: &mut impl Canvas, off: Offsets, percent: u8) {
    let (w, h) = BAR_SEGMENT;
    for n in 0..bar_segments(percent) {
        canvas.copy_area(
            Sheet::Parts,
            Rect::new(off.bar_x, 0, w, h),
            BAR_X + n * BAR_PITCH,
            BAR_Y,
        );
    }
}
