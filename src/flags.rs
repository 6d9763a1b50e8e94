//! clap argument parsing
use std::{ffi::OsString, path::PathBuf};

use clap::{Arg, ArgAction, CommandFactory, FromArgMatches};

use crate::surface::Modifier;

/// Power monitor widget with low battery alarm and back-light.
///
/// Left click toggles the back-light, middle click runs the standby command
/// (suspend when the suspend modifier is held) and right click toggles whether
/// the alarm may switch the back-light on its own.
#[derive(Debug, clap::Parser)]
#[command(version, about, long_about, disable_version_flag = true)]
pub struct Cli {
    /// Display to use.
    #[clap(short, long)]
    pub display: Option<String>,
    /// Turn on back-light (-bl).
    #[clap(long)]
    pub backlight: bool,
    /// Back-light color (-lc).
    #[clap(long, default_value = "rgb:6E/C6/3B")]
    pub light_color: String,
    /// Number of seconds between updates.
    #[clap(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub interval: u32,
    /// Low battery level in percent at which to raise the alarm.
    #[clap(short, long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub alarm: u8,
    /// Run the application in windowed mode.
    #[clap(short, long)]
    pub windowed: bool,
    /// Activate broken window manager fix (-bw).
    #[clap(long)]
    pub broken_wm: bool,
    /// Command to launch when the alarm is raised.
    #[clap(short, long)]
    pub notify: Option<String>,
    /// Command for suspend.
    #[clap(short, long)]
    pub suspend: Option<String>,
    /// Command for standby.
    #[clap(short = 'S', long)]
    pub standby: Option<String>,
    /// Modifier to hold while middle clicking to suspend instead of standby.
    #[clap(long, value_enum, default_value_t = Modifier::Control)]
    pub suspend_modifier: Modifier,
    /// Directory with the power supplies to monitor.
    #[clap(long, default_value = "/sys/class/power_supply")]
    pub power_supply: PathBuf,
}

/// Short options that are more than one letter long.
const LEGACY_SHORTS: [(&str, &str); 3] = [
    ("-bl", "--backlight"),
    ("-lc", "--light-color"),
    ("-bw", "--broken-wm"),
];

fn normalize(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            LEGACY_SHORTS
                .iter()
                .find(|(short, _)| arg == *short)
                .map_or(arg, |(_, long)| OsString::from(*long))
        })
        .collect()
}

/// Parse the given arguments, the first one being the program name.
pub fn try_parse_from(args: impl IntoIterator<Item = OsString>) -> Result<Cli, clap::Error> {
    let mut command = Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .help("Print version")
            .action(ArgAction::Version),
    );
    let matches = command.try_get_matches_from_mut(normalize(args))?;
    Cli::from_arg_matches(&matches).map_err(|e| e.format(&mut command))
}

/// Parse the process arguments. Exits on `--help` and `--version` (status 0)
/// and on invalid arguments (status 1).
pub fn parse() -> Cli {
    try_parse_from(std::env::args_os()).unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        // Nothing sensible to do if printing fails.
        let _ = err.print();
        std::process::exit(code);
    })
}
