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

//! Utilities for testing

use quash_env::Env;
use quash_env::io::Fd;
use quash_env::job::Job;
use quash_env::job::JobFlags;
use quash_env::job::Pid;
use quash_env::job::Process;
use quash_env::system::dummy::DummySystem;

/// Returns an environment backed by a dummy system.
pub fn dummy_env() -> (Env, DummySystem) {
    let system = DummySystem::new();
    let env = Env::with_system(Box::new(system.clone()));
    (env, system)
}

/// Converts string slices to command line words.
pub fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|&arg| arg.to_owned()).collect()
}

pub fn stdout(system: &DummySystem) -> String {
    system.state.borrow().output(Fd::STDOUT)
}

pub fn stderr(system: &DummySystem) -> String {
    system.state.borrow().output(Fd::STDERR)
}

/// Adds a background job with running processes.
pub fn add_job(env: &mut Env, name: &str, pids: &[i32]) -> usize {
    let mut job = Job::new(name);
    job.flags |= JobFlags::ASYNC;
    for &pid in pids {
        job.processes.push(Process::new(Pid::from_raw(pid), name));
    }
    env.jobs.add(job).unwrap()
}
