//! Power sensor abstraction and the per-refresh sample

use log::trace;

/// Source of battery and power readings.
///
/// The statistics hooks let an implementation learn drain and charge rates
/// over time. Exactly one of [`update_statistics`](Self::update_statistics) or
/// [`ignore_statistics`](Self::ignore_statistics) is called after every
/// [`update`](Self::update), followed by [`save`](Self::save).
pub(crate) trait PowerSensor {
    /// Re-read the underlying source.
    fn update(&mut self);
    /// The last update produced usable data.
    fn valid(&self) -> bool;
    /// Battery charge in percent. Negative when unknown.
    fn percent(&self) -> i32;
    fn on_battery(&self) -> bool;
    fn charging(&self) -> bool;
    /// Estimated seconds until the battery is empty.
    fn seconds_left_discharging(&self) -> i64;
    /// Estimated seconds until the battery is full.
    fn seconds_left_charging(&self) -> i64;
    /// Feed the current reading into the learned statistics.
    fn update_statistics(&mut self) {}
    /// The current reading must not be learned from.
    fn ignore_statistics(&mut self) {}
    /// Persist whatever the sensor wants to keep.
    fn save(&mut self) {}
}

/// One refresh worth of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PowerSample {
    pub percent: i32,
    pub on_battery: bool,
    pub charging: bool,
    pub seconds_remaining: u64,
    pub valid: bool,
}

impl PowerSample {
    /// Percent used for the alarm decision. Unusable samples count as empty.
    pub(crate) fn alarm_percent(&self) -> u8 {
        if self.valid {
            self.display_percent()
        } else {
            0
        }
    }

    /// Best-effort percent for drawing.
    pub(crate) fn display_percent(&self) -> u8 {
        self.percent.clamp(0, 100) as u8
    }
}

/// Refresh the sensor and take a sample.
pub(crate) fn refresh(sensor: &mut impl PowerSensor) -> PowerSample {
    sensor.update();
    let valid = sensor.valid();
    if valid {
        sensor.update_statistics();
    } else {
        sensor.ignore_statistics();
    }
    sensor.save();

    let on_battery = sensor.on_battery();
    let charging = sensor.charging();
    // Discharge estimate unless charging from mains.
    let seconds = if on_battery || !charging {
        sensor.seconds_left_discharging()
    } else {
        sensor.seconds_left_charging()
    };
    let sample = PowerSample {
        percent: sensor.percent(),
        on_battery,
        charging,
        seconds_remaining: seconds.max(0) as u64,
        valid,
    };
    trace!("Sample: {sample:?}");
    sample
}
