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

#![warn(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::expect_used,
    clippy::multiple_crate_versions,
    clippy::implicit_return,
    clippy::missing_docs_in_private_items,
    clippy::missing_inline_in_public_items,
    clippy::shadow_reuse,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::wildcard_enum_match_arm
)]

use std::error::Error;
use std::sync::Arc;

use dbgmap::common::constants;
use dbgmap::common::err::DbgError;
use dbgmap::common::settings::{config, Settings};
use dbgmap::{cli, common, launch};

fn main() -> Result<(), Box<dyn Error>> {
    let version_str = common::version_str();
    let matches = cli::app(&version_str).get_matches();

    let pd = Arc::new(cli::project_dirs().ok_or("Unable to determine the config directory")?);
    let mut settings = Settings::new(pd)?;

    let config_files = cli::config_files(&settings, &matches);
    let cwd = std::env::current_dir()?;
    let conf = config::build(config_files, cli::overrides(&matches), &cwd)?;
    settings.update_config(conf)?;
    let launch_config = settings.get_config();

    // stays silent by default, the terminal belongs to the debugger
    if let Some(log_level) = common::log::verbosity_level(matches.occurrences_of("verbosity")) {
        let outputs = common::log::outputs(launch_config.log_file.as_deref())?;
        common::log::setup_logger(log_level, outputs)?;
    }

    if matches.is_present("show-config") {
        println!("{}", cli::render_config(&launch_config)?);
        return Ok(());
    }

    let code = match launch::launch(&launch_config, cli::debugger_args(&matches)) {
        Ok(code) => code,
        Err(e @ DbgError::Spawn { .. }) => {
            eprintln!("{}: {}", constants::APP_NAME, e);
            e.exit_code()
        }
        Err(e) => return Err(e.into()),
    };
    std::process::exit(code)
}
