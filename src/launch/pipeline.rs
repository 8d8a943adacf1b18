/*
 * Dbgmap
 * Copyright (C) 2020 Andrew Moffat
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Two processes joined by a pipe, without a shell in between.

use crate::common::constants::EXIT_SIGNAL_BASE;
use crate::common::err::{DbgError, DbgResult};
use crate::common::settings::config::FilterPlacement;
use log::{debug, info, warn};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const TAG: &str = "pipeline";

/// One program and its argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
}

impl Stage {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    fn spawn(&self, stdin: Stdio, stdout: Stdio) -> DbgResult<Child> {
        debug!(target: TAG, "Spawning {}", self.render());
        Command::new(&self.program)
            .args(&self.args)
            .stdin(stdin)
            .stdout(stdout)
            .spawn()
            .map_err(|source| DbgError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quotes `arg` the way a shell would need it, for log output only. Nothing is ever run through a
/// shell.
fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Maps a status to what a shell would report: the exit code, or 128 + signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => EXIT_SIGNAL_BASE + status.signal().unwrap_or(0),
    }
}

pub struct Pipeline {
    debugger: Stage,
    filter: Option<Stage>,
    placement: FilterPlacement,
    stdin: Option<Stdio>,
    stdout: Option<Stdio>,
}

impl Pipeline {
    pub fn new(debugger: Stage, filter: Stage, placement: FilterPlacement) -> Self {
        let filter = match placement {
            FilterPlacement::None => None,
            _ => Some(filter),
        };
        Self {
            debugger,
            filter,
            placement,
            stdin: None,
            stdout: None,
        }
    }

    /// Where the first stage reads from. Inherited unless set.
    pub fn stdin(mut self, stdin: Stdio) -> Self {
        self.stdin = Some(stdin);
        self
    }

    /// Where the last stage writes to. Inherited unless set.
    pub fn stdout(mut self, stdout: Stdio) -> Self {
        self.stdout = Some(stdout);
        self
    }

    pub fn debugger(&self) -> &Stage {
        &self.debugger
    }

    pub fn filter(&self) -> Option<&Stage> {
        self.filter.as_ref()
    }

    /// The pipeline as it would be typed at a shell prompt.
    pub fn render(&self) -> String {
        match (&self.filter, self.placement) {
            (Some(filter), FilterPlacement::Input) => {
                format!("{} | {}", filter.render(), self.debugger.render())
            }
            (Some(filter), FilterPlacement::Output) => {
                format!("{} | {}", self.debugger.render(), filter.render())
            }
            _ => self.debugger.render(),
        }
    }

    /// Runs the pipeline to completion and returns the debugger's exit code.
    ///
    /// SIGINT and SIGQUIT are caught for the duration, so a ^C at the terminal goes to the
    /// debugger (which shares our process group) instead of killing us out from under it. The
    /// children get default dispositions back on exec.
    pub fn run(mut self) -> DbgResult<i32> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let sig_ids = vec![
            signal_hook::flag::register(signal_hook::SIGINT, Arc::clone(&interrupted))?,
            signal_hook::flag::register(signal_hook::SIGQUIT, Arc::clone(&interrupted))?,
        ];

        info!(target: TAG, "Running {}", self.render());
        let stdin = self.stdin.take().unwrap_or_else(Stdio::inherit);
        let stdout = self.stdout.take().unwrap_or_else(Stdio::inherit);
        let res = match self.filter.take() {
            Some(filter) if self.placement == FilterPlacement::Input => {
                self.run_filtered_input(&filter, stdin, stdout)
            }
            Some(filter) => self.run_filtered_output(&filter, stdin, stdout),
            None => self
                .debugger
                .spawn(stdin, stdout)
                .and_then(|mut child| Ok(child.wait()?)),
        };

        for id in sig_ids {
            signal_hook::unregister(id);
        }
        if interrupted.load(Ordering::Relaxed) {
            debug!(target: TAG, "Interrupted while the debugger was running");
        }

        let status = res?;
        info!(target: TAG, "Debugger finished with {}", status);
        Ok(exit_code(status))
    }

    /// `filter | debugger`
    fn run_filtered_input(
        &self,
        filter: &Stage,
        stdin: Stdio,
        stdout: Stdio,
    ) -> DbgResult<ExitStatus> {
        let mut filter_child = filter.spawn(stdin, Stdio::piped())?;
        let piped: Stdio = match filter_child.stdout.take() {
            Some(out) => out.into(),
            None => Stdio::null(),
        };

        let mut debugger_child = match self.debugger.spawn(piped, stdout) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut filter_child);
                return Err(e);
            }
        };

        let status = debugger_child.wait();
        // the filter is still blocked reading the terminal, and nothing will ever read what it
        // writes next
        reap(&mut filter_child);
        Ok(status?)
    }

    /// `debugger | filter`
    fn run_filtered_output(
        &self,
        filter: &Stage,
        stdin: Stdio,
        stdout: Stdio,
    ) -> DbgResult<ExitStatus> {
        let mut debugger_child = self.debugger.spawn(stdin, Stdio::piped())?;
        let piped: Stdio = match debugger_child.stdout.take() {
            Some(out) => out.into(),
            None => Stdio::null(),
        };

        let mut filter_child = match filter.spawn(piped, stdout) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut debugger_child);
                return Err(e);
            }
        };

        let status = or_reap(debugger_child.wait(), &mut filter_child)?;
        // the filter sees EOF once the debugger is gone; wait so its last lines are flushed
        let filter_status = filter_child.wait()?;
        if !filter_status.success() {
            warn!(
                target: TAG,
                "Filter {} finished with {}", filter.program, filter_status
            );
        }
        Ok(status)
    }
}

/// Kills and waits on `child`. It may already have exited, which is fine.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(target: TAG, "Couldn't kill pid {}: {:?}", child.id(), e);
    }
    match child.wait() {
        Ok(status) => debug!(target: TAG, "Pid {} finished with {}", child.id(), status),
        Err(e) => warn!(target: TAG, "Couldn't wait on pid {}: {:?}", child.id(), e),
    }
}

/// Passes `res` through, reaping `child` first if it's an error so it isn't left running.
fn or_reap<T>(res: std::io::Result<T>, child: &mut Child) -> DbgResult<T> {
    res.or_else(|e| {
        reap(child);
        Err(e.into())
    })
}
