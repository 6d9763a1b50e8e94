//! Error types

use snafu::{prelude::*, Backtrace};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum DockError {
    #[snafu(display("Invalid color {color:?}: expected rgb:RR/GG/BB or #RRGGBB"))]
    InvalidColor { color: String, backtrace: Backtrace },
    #[snafu(display("Terminal is {cols}x{rows}, need at least {min_cols}x{min_rows}"))]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to set up terminal: {source}"))]
    TerminalSetup {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Terminal IO error: {source}"))]
    TerminalIo {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to change SIGCHLD disposition: {source}"))]
    ChildReaper {
        source: nix::Error,
        backtrace: Backtrace,
    },
}
