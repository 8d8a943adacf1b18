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

pub const VERSION: (&str, &str, &str) = (
    env!("CARGO_PKG_VERSION_MAJOR"),
    env!("CARGO_PKG_VERSION_MINOR"),
    env!("CARGO_PKG_VERSION_PATCH"),
);
pub const ENV_PREFIX: &str = "DBGMAP";
pub const ENV_SEPARATOR: &str = "__";
pub const APP_NAME: &str = "dbgmap";
pub const ORG: &str = "ai.dbgmap";

pub const CONFIG_FILE_NAME: &str = "dbgmap.toml";

/// What a remote prefix is rewritten to. The launcher chdirs into the local root first, so the
/// current directory stands in for it.
pub const LOCAL_ROOT_ALIAS: &str = ".";

/// Delimiter for the generated `s` commands. Chosen because it can't appear in a path on either
/// side of the mapping.
pub const SED_DELIMITER: char = '|';

// shell conventions for a command that couldn't be run
pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
pub const EXIT_SIGNAL_BASE: i32 = 128;

pub const DEFAULT_CONFIG_TOML: &str = r###"
remote_prefix = "Z:/source/hainan"
debugger_binary = "gdb"

[filter]
binary = "sed"
flags = ["-u"]
placement = "input"
"###;
