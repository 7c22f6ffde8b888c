// This file is part of quash, a job-control shell.
// Copyright (C) 2026 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Diagnostic logging
//!
//! Logging is disabled unless the `QUASH_LOG` environment variable is set.
//! Its value is the maximum level of messages written to the standard error
//! (`error`, `warn`, `info`, `debug` or `trace`).

use log::LevelFilter;
use simplelog::ConfigBuilder;
use simplelog::WriteLogger;

/// Name of the environment variable that enables logging
pub const LOG_VARIABLE: &str = "QUASH_LOG";

/// Returns the level filter for the value of [`LOG_VARIABLE`].
///
/// An unrecognized value enables debug logging.
#[must_use]
pub fn level(value: &str) -> LevelFilter {
    value.trim().parse().unwrap_or(LevelFilter::Debug)
}

/// Installs the logger if [`LOG_VARIABLE`] is set.
pub fn init() {
    let Some(value) = std::env::var_os(LOG_VARIABLE) else {
        return;
    };
    let level = level(&value.to_string_lossy());
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    if let Err(error) = WriteLogger::init(level, config, std::io::stderr()) {
        eprintln!("quash: cannot initialize logging: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(level("warn"), LevelFilter::Warn);
        assert_eq!(level("TRACE"), LevelFilter::Trace);
        assert_eq!(level(" off\n"), LevelFilter::Off);
    }

    #[test]
    fn unknown_level_falls_back_to_debug() {
        assert_eq!(level(""), LevelFilter::Debug);
        assert_eq!(level("1"), LevelFilter::Debug);
        assert_eq!(level("verbose"), LevelFilter::Debug);
    }
}
