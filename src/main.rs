//! Battery monitor widget. Shows time left, charge and power source, and
//! raises an alarm when the battery runs low.
//!
//! There is no public code API for you to use! However, the command line
//! interface should be stable.

use anyhow::Context;
use log::info;

use config::Config;
use launcher::ShellLauncher;
use monitor::Monitor;
use surface::TerminalSurface;
use sysfs::SysfsSensor;

mod config;
mod errors;
mod flags;
mod launcher;
mod monitor;
mod pixmap;
mod policy;
mod render;
mod sensor;
mod sprites;
mod state;
mod surface;
mod sysfs;
#[cfg(test)]
mod testing;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = flags::parse();
    let config = Config::from_cli(cli).context("Invalid configuration")?;
    launcher::install_child_reaper()?;
    run(config)
}

/// Set up the widget and run it
fn run(config: Config) -> anyhow::Result<()> {
    info!(
        "Updating every {:?}, alarm below {}%",
        config.interval, config.alarm_level
    );
    let sensor = SysfsSensor::new(config.power_supply_dir.clone());
    let surface = TerminalSurface::new(&config).context("Failed to initialise display")?;
    let mut monitor = Monitor::new(config, sensor, surface, ShellLauncher);
    monitor.monitor()
}
