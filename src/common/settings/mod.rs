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
use super::err::DbgResult;
use log::debug;
use parking_lot::RwLock;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config;
pub mod dirs;

const TAG: &str = "settings";

/// Settings ties together the two things configuration depends on: the merged layers of
/// configuration values, and the platform-specific directory where the user's config file lives.
pub struct Settings {
    config: RwLock<Option<config::LaunchConfig>>,
    merged_config: ::config::Config,
    project_dirs: Arc<dyn dirs::Dirs>,
}

fn ensure_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    debug!(
        target: TAG,
        "Ensuring dir {} exists",
        path.as_ref().display()
    );
    if !path.as_ref().exists() {
        debug!(
            target: TAG,
            "Dir {} doesn't exist, creating",
            path.as_ref().display()
        );
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

fn ensure_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    debug!(
        target: TAG,
        "Ensuring file {} exists",
        path.as_ref().display()
    );
    if !path.as_ref().exists() {
        debug!(
            target: TAG,
            "File {} doesn't exist, creating",
            path.as_ref().display()
        );
        let mut f = std::fs::File::create(&path)?;
        f.write_all(contents.as_ref())?;
    }
    Ok(())
}

impl Settings {
    pub fn new(project_dirs: Arc<dyn dirs::Dirs>) -> DbgResult<Self> {
        let settings = Settings {
            config: Default::default(),
            project_dirs,
            merged_config: Default::default(),
        };
        settings.ensure_config_files()?;
        Ok(settings)
    }

    fn ensure_config_files(&self) -> std::io::Result<()> {
        ensure_dir(self.config_dir())?;
        ensure_file(self.base_config_file(), constants::DEFAULT_CONFIG_TOML)?;
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        self.project_dirs.config_dir()
    }

    /// The user's own config file. It's created from the defaults on first run, so there is always
    /// something to edit.
    pub fn base_config_file(&self) -> PathBuf {
        self.config_dir().join(constants::CONFIG_FILE_NAME)
    }

    /// Merges `merged_config` over whatever we've already merged, then freezes the result into a
    /// `LaunchConfig`. A deserialization failure leaves the previous config in place.
    pub fn update_config<T>(&mut self, merged_config: T) -> DbgResult<()>
    where
        T: ::config::Source + Send + Sync + 'static,
    {
        let mut guard = self.config.write();
        self.merged_config.merge(merged_config)?;
        let frozen: config::LaunchConfig = self.merged_config.clone().try_into()?;
        debug!(target: TAG, "Resolved config {:?}", frozen);
        *guard = Some(frozen);
        Ok(())
    }

    pub fn get_config(&self) -> config::LaunchConfig {
        let guard = self.config.read();
        guard.as_ref().expect("Config not set!").clone()
    }
}
