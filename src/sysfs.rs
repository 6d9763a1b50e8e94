//! Power sensor reading /sys/class/power_supply

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

use anyhow::Context;
use log::{debug, warn};

use crate::sensor::PowerSensor;

/// Weight of a new observation in the learned rates.
const SMOOTHING: f64 = 0.3;

/// Helper to read a trimmed string from a path.
fn read_string(path: &Path) -> anyhow::Result<String> {
    let data = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    Ok(data.trim().to_owned())
}

/// Helper to read a number from a path.
fn read_value<T: FromStr>(path: &Path) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    read_string(path)?
        .parse()
        .with_context(|| format!("Parsing {}", path.display()))
}

/// One reading of the battery.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
    at: Instant,
    percent: i32,
    /// Charge level with sub-percent precision when the kernel reports it.
    level: f64,
    charging: bool,
    on_battery: bool,
    secs_to_empty: Option<i64>,
    secs_to_full: Option<i64>,
}

fn read_supplies(root: &Path) -> anyhow::Result<Reading> {
    let mut entries = fs::read_dir(root)
        .with_context(|| format!("Reading {}", root.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    let mut battery = None;
    let mut mains_online = None;
    for path in entries {
        let Ok(kind) = read_string(&path.join("type")) else {
            continue;
        };
        match kind.as_str() {
            "Battery" if battery.is_none() => {
                let present = read_value::<u8>(&path.join("present")).unwrap_or(1);
                if present != 0 {
                    battery = Some(path);
                }
            }
            "Mains" => {
                let online = read_value::<u8>(&path.join("online")).unwrap_or(0) != 0;
                mains_online = Some(mains_online.unwrap_or(false) || online);
            }
            _ => (),
        }
    }
    let battery = battery.context("No battery found")?;
    read_battery(&battery, mains_online)
}

fn read_battery(path: &Path, mains_online: Option<bool>) -> anyhow::Result<Reading> {
    let status = read_string(&path.join("status")).unwrap_or_else(|_| "Unknown".to_owned());
    let read = |name: &str| read_value::<i64>(&path.join(name)).ok();
    // Either energy in µWh and power in µW, or charge in µAh and current in µA.
    let (now, full, rate) = match read("energy_now") {
        Some(now) => (Some(now), read("energy_full"), read("power_now")),
        None => (read("charge_now"), read("charge_full"), read("current_now")),
    };

    let ratio = match (now, full) {
        (Some(now), Some(full)) if full > 0 => Some(now as f64 * 100.0 / full as f64),
        _ => None,
    };
    let percent = match read_value::<i32>(&path.join("capacity")) {
        Ok(capacity) => capacity,
        Err(e) => ratio
            .map(|r| r.round() as i32)
            .ok_or(e)
            .context("Battery reports neither capacity nor charge")?,
    };

    let charging = status == "Charging";
    let on_battery = match mains_online {
        Some(online) => !online,
        None => status == "Discharging",
    };

    let rate = rate.map(i64::abs).filter(|&r| r > 0);
    let secs_to_empty = now.zip(rate).map(|(now, rate)| now * 3600 / rate);
    let secs_to_full = now
        .zip(full)
        .zip(rate)
        .map(|((now, full), rate)| (full - now).max(0) * 3600 / rate);

    Ok(Reading {
        at: Instant::now(),
        percent,
        level: ratio.unwrap_or(f64::from(percent)),
        charging,
        on_battery,
        secs_to_empty,
        secs_to_full,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    at: Instant,
    level: f64,
    charging: bool,
}

/// Learned charge and discharge rates, in percent per second.
#[derive(Debug, Default, Clone, PartialEq)]
struct RateStats {
    anchor: Option<Anchor>,
    discharge: Option<f64>,
    charge: Option<f64>,
}

impl RateStats {
    fn learn(&mut self, at: Instant, level: f64, charging: bool, on_battery: bool) {
        if !charging && !on_battery {
            // Full or idle on mains, nothing moves.
            self.anchor = None;
            return;
        }
        let here = Anchor {
            at,
            level,
            charging,
        };
        let Some(anchor) = self.anchor.filter(|a| a.charging == charging) else {
            self.anchor = Some(here);
            return;
        };
        let delta = if charging {
            level - anchor.level
        } else {
            anchor.level - level
        };
        let secs = at.saturating_duration_since(anchor.at).as_secs_f64();
        if delta < 0.0 {
            self.anchor = Some(here);
        } else if delta > 0.0 && secs > 0.0 {
            let rate = delta / secs;
            let slot = if charging {
                &mut self.charge
            } else {
                &mut self.discharge
            };
            *slot = Some(slot.map_or(rate, |old| old + SMOOTHING * (rate - old)));
            self.anchor = Some(here);
        }
    }

    fn forget_anchor(&mut self) {
        self.anchor = None;
    }

    fn secs_to_empty(&self, level: f64) -> Option<i64> {
        self.discharge.map(|rate| (level / rate) as i64)
    }

    fn secs_to_full(&self, level: f64) -> Option<i64> {
        self.charge.map(|rate| ((100.0 - level).max(0.0) / rate) as i64)
    }
}

/// Battery sensor backed by the kernel power supply class.
#[derive(Debug)]
pub(crate) struct SysfsSensor {
    root: PathBuf,
    reading: Option<Reading>,
    stats: RateStats,
}

impl SysfsSensor {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            reading: None,
            stats: RateStats::default(),
        }
    }
}

impl PowerSensor for SysfsSensor {
    fn update(&mut self) {
        match read_supplies(&self.root) {
            Ok(reading) => self.reading = Some(reading),
            Err(e) => {
                if self.reading.take().is_some() {
                    warn!("Lost battery readings: {e:#}");
                } else {
                    debug!("No battery readings: {e:#}");
                }
            }
        }
    }

    fn valid(&self) -> bool {
        self.reading.is_some()
    }

    fn percent(&self) -> i32 {
        self.reading.map_or(-1, |r| r.percent)
    }

    fn on_battery(&self) -> bool {
        self.reading.is_some_and(|r| r.on_battery)
    }

    fn charging(&self) -> bool {
        self.reading.is_some_and(|r| r.charging)
    }

    fn seconds_left_discharging(&self) -> i64 {
        self.reading.map_or(0, |r| {
            self.stats
                .secs_to_empty(r.level)
                .or(r.secs_to_empty)
                .unwrap_or(0)
        })
    }

    fn seconds_left_charging(&self) -> i64 {
        self.reading.map_or(0, |r| {
            self.stats
                .secs_to_full(r.level)
                .or(r.secs_to_full)
                .unwrap_or(0)
        })
    }

    fn update_statistics(&mut self) {
        if let Some(r) = self.reading {
            self.stats.learn(r.at, r.level, r.charging, r.on_battery);
        }
    }

    fn ignore_statistics(&mut self) {
        self.stats.forget_anchor();
    }
}
