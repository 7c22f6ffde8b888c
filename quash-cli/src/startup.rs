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

//! Shell startup

use self::args::Run;
use self::args::Source;
use quash_env::io::Fd;
use quash_env::system::System;

pub mod args;
pub mod input;
pub mod logging;

/// Tests whether the shell should be implicitly interactive.
///
/// The shell is interactive if it reads commands from the standard input and
/// both the standard input and the standard error are terminals.
#[must_use]
pub fn auto_interactive(system: &dyn System, run: &Run) -> bool {
    run.source == Source::Stdin && system.isatty(Fd::STDIN) && system.isatty(Fd::STDERR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quash_env::system::dummy::DummySystem;

    fn run(source: Source) -> Run {
        Run {
            source,
            interactive: false,
        }
    }

    #[test]
    fn terminal_standard_input_makes_shell_interactive() {
        let system = DummySystem::new();
        assert!(!auto_interactive(&system, &run(Source::Stdin)));

        system.state.borrow_mut().terminals.push(Fd::STDIN);
        assert!(!auto_interactive(&system, &run(Source::Stdin)));

        system.state.borrow_mut().terminals.push(Fd::STDERR);
        assert!(auto_interactive(&system, &run(Source::Stdin)));
        assert!(!auto_interactive(&system, &run(Source::String("true".to_owned()))));
    }
}
