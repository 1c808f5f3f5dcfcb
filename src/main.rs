//! Binary entrypoint for the relay bot.

use std::process::ExitCode;

use chatrelay::start;

/// Load configuration, connect to Telegram, and run until interrupted.
fn main() -> ExitCode {
    start::run()
}
