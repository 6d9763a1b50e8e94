//! Test doubles for the sensor, surface and launcher

use std::{collections::VecDeque, time::Duration};

use crate::{
    errors::DockError,
    launcher::Launcher,
    render::{Canvas, Rect, Sheet},
    sensor::PowerSensor,
    surface::{InputEvent, Surface},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reading {
    pub valid: bool,
    pub percent: i32,
    pub on_battery: bool,
    pub charging: bool,
    pub discharge_secs: i64,
    pub charge_secs: i64,
}

impl Reading {
    pub(crate) fn battery(percent: i32) -> Self {
        Self {
            valid: true,
            percent,
            on_battery: true,
            charging: false,
            discharge_secs: 3600,
            charge_secs: 0,
        }
    }

    pub(crate) fn mains(percent: i32, charging: bool) -> Self {
        Self {
            on_battery: false,
            charging,
            ..Self::battery(percent)
        }
    }

    pub(crate) fn invalid() -> Self {
        Self {
            valid: false,
            percent: -1,
            on_battery: false,
            charging: false,
            discharge_secs: 0,
            charge_secs: 0,
        }
    }

    pub(crate) fn with_times(self, discharge_secs: i64, charge_secs: i64) -> Self {
        Self {
            discharge_secs,
            charge_secs,
            ..self
        }
    }
}

/// Sensor replaying scripted readings. The last reading repeats forever.
#[derive(Debug)]
pub(crate) struct FakeSensor {
    script: VecDeque<Reading>,
    current: Reading,
    pub updates: usize,
    pub learned: usize,
    pub ignored: usize,
    pub saved: usize,
}

impl FakeSensor {
    pub(crate) fn new(script: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: Reading::invalid(),
            updates: 0,
            learned: 0,
            ignored: 0,
            saved: 0,
        }
    }

    pub(crate) fn push(&mut self, reading: Reading) {
        self.script.push_back(reading);
    }
}

impl PowerSensor for FakeSensor {
    fn update(&mut self) {
        self.updates += 1;
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
    }

    fn valid(&self) -> bool {
        self.current.valid
    }

    fn percent(&self) -> i32 {
        self.current.percent
    }

    fn on_battery(&self) -> bool {
        self.current.on_battery
    }

    fn charging(&self) -> bool {
        self.current.charging
    }

    fn seconds_left_discharging(&self) -> i64 {
        self.current.discharge_secs
    }

    fn seconds_left_charging(&self) -> i64 {
        self.current.charge_secs
    }

    fn update_statistics(&mut self) {
        self.learned += 1;
    }

    fn ignore_statistics(&mut self) {
        self.ignored += 1;
    }

    fn save(&mut self) {
        self.saved += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Blit {
    pub sheet: Sheet,
    pub src: Rect,
    pub dx: u16,
    pub dy: u16,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub blits: Vec<Blit>,
}

impl Canvas for RecordingCanvas {
    fn copy_area(&mut self, sheet: Sheet, src: Rect, dx: u16, dy: u16) {
        self.blits.push(Blit { sheet, src, dx, dy });
    }
}

/// Surface that records frames and hands out scripted events.
///
/// Each flushed frame is the list of blits since the previous flush.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pending: RecordingCanvas,
    pub frames: Vec<Vec<Blit>>,
    pub events: VecDeque<Option<InputEvent>>,
    pub waits: Vec<Duration>,
}

impl RecordingSurface {
    /// Backdrop of every flushed frame.
    pub(crate) fn backdrops(&self) -> Vec<Sheet> {
        self.frames
            .iter()
            .map(|frame| frame[0].sheet)
            .collect()
    }
}

impl Canvas for RecordingSurface {
    fn copy_area(&mut self, sheet: Sheet, src: Rect, dx: u16, dy: u16) {
        self.pending.copy_area(sheet, src, dx, dy);
    }
}

impl Surface for RecordingSurface {
    fn flush(&mut self) -> Result<(), DockError> {
        self.frames.push(std::mem::take(&mut self.pending.blits));
        Ok(())
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DockError> {
        self.waits.push(timeout);
        Ok(self.events.pop_front().unwrap_or(Some(InputEvent::Quit)))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingLauncher {
    pub launched: Vec<String>,
}

impl Launcher for RecordingLauncher {
    fn launch(&mut self, command: &str) {
        self.launched.push(command.to_owned());
    }
}
