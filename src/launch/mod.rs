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

use crate::common::err::{DbgError, DbgResult};
use crate::common::settings::config::LaunchConfig;
use crate::rewrite::{CommandLine, PathRewriter};
use log::{debug, info};
use std::path::Path;
use std::process::Stdio;

pub mod pipeline;

pub use pipeline::{Pipeline, Stage};

const TAG: &str = "launch";

/// Changes into the local root. Everything after this runs relative to it, which is what makes
/// `.` a valid replacement for the remote prefix. The old directory is not restored.
pub fn enter_local_root(local_root: &Path) -> DbgResult<()> {
    debug!(target: TAG, "Changing directory to {}", local_root.display());
    nix::unistd::chdir(local_root).map_err(|source| DbgError::LocalRoot {
        path: local_root.to_owned(),
        source,
    })
}

/// Builds the filter and debugger stages for `command`, which should already be rewritten.
pub fn build_pipeline(
    config: &LaunchConfig,
    rewriter: &PathRewriter,
    command: &CommandLine,
) -> Pipeline {
    let mut filter_args = config.filter.flags.clone();
    for expr in rewriter.sed_script() {
        filter_args.push("-e".to_string());
        filter_args.push(expr);
    }

    Pipeline::new(
        Stage::new(command.binary(), command.args().to_vec()),
        Stage::new(&config.filter.binary, filter_args),
        config.filter.placement,
    )
}

/// Enters the local root, rewrites `args` and runs the debugger pipeline on the terminal. Returns
/// the debugger's exit code.
pub fn launch<I, S>(config: &LaunchConfig, args: I) -> DbgResult<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    launch_with(config, args, Stdio::inherit(), Stdio::inherit())
}

/// `launch`, with the outer ends of the pipeline connected to `stdin` and `stdout` instead of the
/// terminal.
pub fn launch_with<I, S>(
    config: &LaunchConfig,
    args: I,
    stdin: Stdio,
    stdout: Stdio,
) -> DbgResult<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    enter_local_root(&config.local_root)?;

    let rewriter = PathRewriter::new(&config.remote_prefix);
    let command = CommandLine::new(&config.debugger_binary, args);
    info!(
        target: TAG,
        "Launching {:?} from {}",
        rewriter.rewrite_command(&command.render()),
        config.local_root.display()
    );

    let rewritten = command.rewritten(&rewriter);
    build_pipeline(config, &rewriter, &rewritten)
        .stdin(stdin)
        .stdout(stdout)
        .run()
}
