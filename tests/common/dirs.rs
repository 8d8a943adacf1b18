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

use dbgmap::common::settings::dirs::Dirs;
use std::path::{Path, PathBuf};

pub struct TestDirectories {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Dirs for TestDirectories {
    fn config_dir(&self) -> &Path {
        &self.config
    }
}

impl TestDirectories {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new().prefix("pd-").tempdir().unwrap();
        let config = dir.path().join("config");
        Self { dir, config }
    }

    pub fn base(&self) -> PathBuf {
        self.dir.path().to_owned()
    }
}
