//! Validated runtime configuration

use std::{path::PathBuf, time::Duration};

use crate::{errors::DockError, flags::Cli, pixmap::Rgb, state::Backlight, surface::Modifier};

pub(crate) const SUSPEND_CMD: &str = "echo -n disk >/sys/power/state";
pub(crate) const STANDBY_CMD: &str = "echo -n mem >/sys/power/state";

/// Settings fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub interval: Duration,
    /// Alarm is raised below this percentage.
    pub alarm_level: u8,
    pub backlight: Backlight,
    pub light_color: Rgb,
    pub windowed: bool,
    pub broken_wm: bool,
    pub display: Option<String>,
    pub notify_cmd: Option<String>,
    pub suspend_cmd: String,
    pub standby_cmd: String,
    pub suspend_modifier: Modifier,
    pub power_supply_dir: PathBuf,
}

impl Config {
    pub(crate) fn from_cli(cli: Cli) -> Result<Self, DockError> {
        Ok(Self {
            interval: Duration::from_secs(cli.interval.into()),
            alarm_level: cli.alarm,
            backlight: if cli.backlight {
                Backlight::On
            } else {
                Backlight::Off
            },
            light_color: Rgb::parse(&cli.light_color)?,
            windowed: cli.windowed,
            broken_wm: cli.broken_wm,
            display: cli.display.filter(|d| !d.is_empty()),
            notify_cmd: cli.notify,
            suspend_cmd: cli.suspend.unwrap_or_else(|| SUSPEND_CMD.to_owned()),
            standby_cmd: cli.standby.unwrap_or_else(|| STANDBY_CMD.to_owned()),
            suspend_modifier: cli.suspend_modifier,
            power_supply_dir: cli.power_supply,
        })
    }
}
