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

//! The commandline surface. Everything we don't recognize is handed to the debugger untouched
//! (apart from path rewriting).

use crate::common::constants;
use crate::common::settings::config::{FilterPlacement, HashMapSource, LaunchConfig};
use crate::common::settings::Settings;
use clap::{App, AppSettings, Arg, ArgMatches};
use log::debug;
use std::path::PathBuf;

const CLI_TAG: &str = "cli";

/// Options that map straight onto a config key
const CONFIG_OPTIONS: &[(&str, &str)] = &[
    ("local-root", "local_root"),
    ("remote-prefix", "remote_prefix"),
    ("debugger", "debugger_binary"),
    ("filter", "filter.placement"),
];

pub fn app<'a, 'b>(version: &'b str) -> App<'a, 'b> {
    App::new("Dbgmap")
        .version(version)
        .author("Andrew Moffat <arwmoffat@gmail.com>")
        .about("Runs a debugger from a local checkout, mapping network-share paths onto it")
        .settings(&[AppSettings::TrailingVarArg, AppSettings::DontCollapseArgsInUsage])
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("Additional TOML config file, applied over the user config"),
        )
        .arg(
            Arg::with_name("local-root")
                .long("local-root")
                .value_name("DIR")
                .takes_value(true)
                .help("Local checkout to run the debugger from"),
        )
        .arg(
            Arg::with_name("remote-prefix")
                .long("remote-prefix")
                .value_name("PREFIX")
                .takes_value(true)
                .help("Network-share path rewritten to the local checkout, e.g. Z:/source/hainan"),
        )
        .arg(
            Arg::with_name("debugger")
                .long("debugger")
                .value_name("BIN")
                .takes_value(true)
                .help("Debugger executable"),
        )
        .arg(
            Arg::with_name("filter")
                .long("filter")
                .value_name("PLACEMENT")
                .takes_value(true)
                .possible_values(&[
                    FilterPlacement::Input.as_str(),
                    FilterPlacement::Output.as_str(),
                    FilterPlacement::None.as_str(),
                ])
                .help("Rewrite what's typed into the debugger (input), what it prints (output), or neither (none)"),
        )
        .arg(
            Arg::with_name("show-config")
                .long("show-config")
                .help("Prints the resolved configuration and exits"),
        )
        .arg(
            Arg::with_name("args")
                .help("Arguments for the debugger. Use -- before any that start with a dash.")
                .multiple(true),
        )
}

/// The debugger's arguments, in the order given.
pub fn debugger_args(matches: &ArgMatches) -> Vec<String> {
    matches.values_of_lossy("args").unwrap_or_default()
}

/// Config values given as options. These win over every other layer.
pub fn overrides(matches: &ArgMatches) -> HashMapSource {
    let mut cli_source = HashMapSource(Default::default());
    for (option, key) in CONFIG_OPTIONS {
        if let Some(value) = matches.value_of(option) {
            debug!(target: CLI_TAG, "Overriding {} with {:?}", key, value);
            cli_source.0.insert(key.to_string(), value.into());
        }
    }
    cli_source
}

/// The config files, lowest precedence first: the user's config file, then the `--config` file.
/// Defaults, environment variables and `overrides` are layered around these by `config::build`.
pub fn config_files(
    settings: &Settings,
    matches: &ArgMatches,
) -> Vec<Box<dyn config::Source + Send + Sync>> {
    let mut config_sources: Vec<Box<dyn config::Source + Send + Sync>> =
        vec![Box::new(config::File::from(settings.base_config_file()))];

    if let Some(extra) = matches.value_of("config") {
        debug!(target: CLI_TAG, "Adding config file {}", extra);
        config_sources.push(Box::new(config::File::from(PathBuf::from(extra))));
    }
    config_sources
}

/// What `--show-config` prints: the resolved config as pretty JSON.
pub fn render_config(config: &LaunchConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(config)
}

/// Where the user config file lives
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", constants::ORG, constants::APP_NAME)
}
