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

//! Fg built-in
//!
//! The fg built-in resumes a job in the foreground. The operand is a
//! [job specifier](quash_env::job::id); without it, the current job is
//! resumed.
//!
//! The built-in prints the job name, gives the terminal to the job's process
//! group if the shell controls jobs, sends `SIGCONT` to the job and waits
//! for it as a foreground job. The exit status of the built-in is that of
//! the job. If the job stops again, it stays in the job list as the current
//! job.

use crate::common::{find_job, report_error, report_failure, signal_job};
use quash_env::Env;
use quash_env::job::JobFlags;
use quash_env::semantics::Result;
use quash_env::signal::Signal;
use std::ops::ControlFlow::Continue;

const NAME: &str = "fg";

/// Entry point for executing the `fg` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    let operand = match args.as_slice() {
        [] => None,
        [operand] => Some(operand.as_str()),
        [_, extra, ..] => {
            return report_error(env, NAME, format_args!("{extra}: unexpected operand"));
        }
    };

    env.reap();
    let index = match find_job(env, operand) {
        Ok(index) => index,
        Err(error) => return report_failure(env, NAME, error),
    };
    let Some(job) = env.jobs.get_mut(index) else {
        return report_failure(env, NAME, "no such job");
    };
    job.flags.remove(JobFlags::ASYNC);
    let name = job.name.clone();
    let pgid = job.pgid;

    if let Err(errno) = env.print(format!("{name}\n")) {
        log::warn!("cannot print job name: {errno}");
    }
    if let Some(pgid) = pgid {
        env.give_terminal(pgid);
    }
    if let Err(errno) = signal_job(env, index, Signal::SIGCONT) {
        env.take_terminal();
        let message = format!("cannot resume job [{}]: {errno}", index + 1);
        return report_failure(env, NAME, message);
    }
    env.jobs.resume(index);
    log::debug!("job [{}] resumed in the foreground", index + 1);

    env.exit_status = env.wait_for_foreground_job(index);
    Continue(())
}
