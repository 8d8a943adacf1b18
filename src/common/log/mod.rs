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

use std::path::Path;

/// Maps the number of `-v` flags to a level. Zero means no logger at all, so the debugger's
/// session on the terminal isn't interleaved with our own output.
pub fn verbosity_level(occurrences: u64) -> Option<log::LevelFilter> {
    match occurrences {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

/// Collects the outputs for `setup_logger`. Stdout belongs to the debugger, so the terminal output
/// is always stderr.
pub fn outputs(log_file: Option<&Path>) -> std::io::Result<Vec<fern::Output>> {
    let mut outputs: Vec<fern::Output> = vec![std::io::stderr().into()];
    if let Some(path) = log_file {
        outputs.push(fern::log_file(path)?.into());
    }
    Ok(outputs)
}

pub fn setup_logger(
    level: log::LevelFilter,
    outputs: Vec<fern::Output>,
) -> Result<(), fern::InitError> {
    let mut logger = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[Pid: {}][{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S][%s%.3f]"),
                std::process::id(),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level);

    for output in outputs {
        logger = logger.chain(output);
    }

    logger.apply()?;

    Ok(())
}
