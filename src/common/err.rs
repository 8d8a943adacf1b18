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

use super::constants;
use std::error::Error;
use std::io::ErrorKind;
use std::path::PathBuf;

pub type DbgResult<T> = Result<T, DbgError>;

pub enum DbgError {
    /// The local root couldn't be entered. Nothing has been spawned when this is returned.
    LocalRoot {
        path: PathBuf,
        source: nix::Error,
    },
    Spawn {
        program: String,
        source: std::io::Error,
    },
    BadPlacement(String),
    Config(config::ConfigError),
    IOError(std::io::Error),
}

impl DbgError {
    /// The exit code a shell would have produced for this failure. Spawn failures follow the
    /// 127/126 convention, everything else is a generic 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DbgError::Spawn { source, .. } => match source.kind() {
                ErrorKind::NotFound => constants::EXIT_NOT_FOUND,
                _ => constants::EXIT_NOT_EXECUTABLE,
            },
            _ => 1,
        }
    }
}

impl From<std::io::Error> for DbgError {
    fn from(e: std::io::Error) -> Self {
        DbgError::IOError(e)
    }
}

impl From<config::ConfigError> for DbgError {
    fn from(e: config::ConfigError) -> Self {
        DbgError::Config(e)
    }
}

impl Error for DbgError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DbgError::LocalRoot { source, .. } => Some(source),
            DbgError::Spawn { source, .. } => Some(source),
            DbgError::Config(e) => Some(e),
            DbgError::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for DbgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            DbgError::LocalRoot { path, source } => write!(
                f,
                "Local root {} is not usable: {}",
                path.display(),
                source
            ),
            DbgError::Spawn { program, source } => write!(f, "{}: {}", program, source),
            DbgError::BadPlacement(name) => write!(
                f,
                "Invalid filter placement {:?}, expected one of input, output, none",
                name
            ),
            DbgError::Config(e) => write!(f, "Configuration error: {}", e),
            DbgError::IOError(e) => write!(f, "IO error: {:?}", e),
        }
    }
}

impl std::fmt::Debug for DbgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(self, f)
    }
}
