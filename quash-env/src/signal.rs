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

//! Signal names and the signal dispositions of the shell

pub use nix::sys::signal::Signal;
use std::str::FromStr as _;
use thiserror::Error;

/// Signals an interactive shell ignores so that the keyboard affects only
/// foreground jobs
pub const INTERACTIVE_IGNORED: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Error returned for a string that does not name a signal
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{0}: invalid signal specification")]
pub struct UnknownSignal(pub String);

/// Parses a signal number or name.
///
/// Names are case-insensitive and may omit the `SIG` prefix, so `9`, `KILL`,
/// `kill` and `SIGKILL` all denote `SIGKILL`.
pub fn parse(spec: &str) -> Result<Signal, UnknownSignal> {
    let unknown = || UnknownSignal(spec.to_owned());
    if !spec.is_empty() && spec.bytes().all(|b| b.is_ascii_digit()) {
        let number = spec.parse::<i32>().map_err(|_| unknown())?;
        return Signal::try_from(number).map_err(|_| unknown());
    }

    let upper = spec.to_ascii_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&name).map_err(|_| unknown())
}

/// Returns the name of the signal without the `SIG` prefix.
#[must_use]
pub fn short_name(signal: Signal) -> &'static str {
    let name = signal.as_str();
    name.strip_prefix("SIG").unwrap_or(name)
}

/// Returns all signals supported by the system, in ascending order of the
/// signal number.
#[must_use]
pub fn all() -> Vec<Signal> {
    let mut signals = Signal::iterator().collect::<Vec<_>>();
    signals.sort_by_key(|&signal| signal as i32);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_signal_forms() {
        for spec in ["9", "KILL", "kill", "SIGKILL", "sigkill"] {
            assert_eq!(parse(spec), Ok(Signal::SIGKILL), "{spec}");
        }
        assert_eq!(parse("TERM"), Ok(Signal::SIGTERM));
        assert_eq!(parse("cont"), Ok(Signal::SIGCONT));
    }

    #[test]
    fn parsing_invalid_signals() {
        assert_eq!(parse(""), Err(UnknownSignal(String::new())));
        assert_eq!(parse("0"), Err(UnknownSignal("0".to_owned())));
        assert_eq!(parse("999"), Err(UnknownSignal("999".to_owned())));
        assert_eq!(parse("NOPE"), Err(UnknownSignal("NOPE".to_owned())));
        assert_eq!(
            parse("-9").unwrap_err().to_string(),
            "-9: invalid signal specification"
        );
    }

    #[test]
    fn short_names() {
        assert_eq!(short_name(Signal::SIGHUP), "HUP");
        assert_eq!(short_name(Signal::SIGCHLD), "CHLD");
    }

    #[test]
    fn listing_is_ordered() {
        let numbers = all().into_iter().map(|signal| signal as i32).collect::<Vec<_>>();
        assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(all().contains(&Signal::SIGINT));
    }
}
