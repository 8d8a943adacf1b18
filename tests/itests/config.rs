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

use crate::common::dirs::TestDirectories;
use crate::common::TestResult;
use dbgmap::cli;
use dbgmap::common::constants;
use dbgmap::common::settings::config::{self, FilterPlacement};
use dbgmap::common::settings::Settings;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// the environment layer reads process-wide variables, so a test that sets them must not overlap
// with any other test resolving a config
static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Sets environment variables for as long as it lives
struct EnvVars(Vec<&'static str>);

impl EnvVars {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, val) in vars {
            std::env::set_var(key, val);
        }
        Self(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvVars {
    fn drop(&mut self) {
        for key in &self.0 {
            std::env::remove_var(key);
        }
    }
}

fn settings_from(
    dirs: Arc<TestDirectories>,
    argv: &[&str],
) -> Result<(Settings, Vec<String>), Box<dyn std::error::Error>> {
    let _env = ENV_LOCK.lock();
    resolve(dirs, argv)
}

fn resolve(
    dirs: Arc<TestDirectories>,
    argv: &[&str],
) -> Result<(Settings, Vec<String>), Box<dyn std::error::Error>> {
    let mut settings = Settings::new(dirs)?;
    let matches = cli::app("0.0.0").get_matches_from_safe(argv)?;
    let conf = config::build(
        cli::config_files(&settings, &matches),
        cli::overrides(&matches),
        Path::new("/home/user/source/hainan"),
    )?;
    settings.update_config(conf)?;
    Ok((settings, cli::debugger_args(&matches)))
}

#[test]
fn test_defaults_written_and_used() -> TestResult {
    let dirs = Arc::new(TestDirectories::new());
    let (settings, args) = settings_from(dirs.clone(), &["dbgmap", "myprog", "core"])?;

    assert_eq!(
        std::fs::read_to_string(dirs.base().join("config").join(constants::CONFIG_FILE_NAME))?,
        constants::DEFAULT_CONFIG_TOML
    );

    let conf = settings.get_config();
    assert_eq!(conf.local_root, PathBuf::from("/home/user/source/hainan"));
    assert_eq!(conf.remote_prefix, "Z:/source/hainan");
    assert_eq!(conf.debugger_binary, "gdb");
    assert_eq!(conf.filter.placement, FilterPlacement::Input);
    assert_eq!(args, vec!["myprog", "core"]);
    Ok(())
}

#[test]
fn test_layer_precedence() -> TestResult {
    let dirs = Arc::new(TestDirectories::new());
    // create the user config first so we can edit it
    Settings::new(dirs.clone())?;
    std::fs::write(
        dirs.base().join("config").join(constants::CONFIG_FILE_NAME),
        r#"
local_root = "/srv/user-config"
remote_prefix = "U:/user"
debugger_binary = "gdb-multiarch"
"#,
    )?;

    let extra = dirs.base().join("extra.toml");
    std::fs::write(
        &extra,
        r#"
remote_prefix = "X:/extra"
[filter]
placement = "output"
"#,
    )?;

    let (settings, _) = settings_from(
        dirs.clone(),
        &[
            "dbgmap",
            "--config",
            &extra.to_string_lossy(),
            "--remote-prefix",
            "C:/cli",
        ],
    )?;
    let conf = settings.get_config();

    // user file over the defaults
    assert_eq!(conf.local_root, PathBuf::from("/srv/user-config"));
    assert_eq!(conf.debugger_binary, "gdb-multiarch");
    // --config file over the user file
    assert_eq!(conf.filter.placement, FilterPlacement::Output);
    // options over everything
    assert_eq!(conf.remote_prefix, "C:/cli");
    // untouched defaults survive
    assert_eq!(conf.filter.binary, "sed");
    Ok(())
}

#[test]
fn test_missing_extra_config() -> TestResult {
    let dirs = Arc::new(TestDirectories::new());
    let missing = dirs.base().join("missing.toml");
    let res = settings_from(dirs.clone(), &["dbgmap", "-c", &missing.to_string_lossy()]);
    assert!(res.is_err());
    Ok(())
}

#[test]
fn test_env_layer() -> TestResult {
    let dirs = Arc::new(TestDirectories::new());
    Settings::new(dirs.clone())?;
    std::fs::write(
        dirs.base().join("config").join(constants::CONFIG_FILE_NAME),
        r#"
remote_prefix = "U:/user"
[filter]
placement = "input"
"#,
    )?;

    let _lock = ENV_LOCK.lock();
    let _vars = EnvVars::set(&[
        ("DBGMAP_REMOTE_PREFIX", "E:/env"),
        ("DBGMAP_FILTER__PLACEMENT", "output"),
    ]);

    // environment over the user file
    let (settings, _) = resolve(dirs.clone(), &["dbgmap", "myprog"])?;
    let conf = settings.get_config();
    assert_eq!(conf.remote_prefix, "E:/env");
    assert_eq!(conf.filter.placement, FilterPlacement::Output);
    assert_eq!(conf.filter.binary, "sed");

    // options over the environment
    let (settings, _) = resolve(
        dirs.clone(),
        &["dbgmap", "--remote-prefix", "C:/cli", "--filter", "none", "myprog"],
    )?;
    let conf = settings.get_config();
    assert_eq!(conf.remote_prefix, "C:/cli");
    assert_eq!(conf.filter.placement, FilterPlacement::None);

    // only one of them overridden on the command line
    let (settings, _) = resolve(dirs, &["dbgmap", "--filter", "none", "myprog"])?;
    let conf = settings.get_config();
    assert_eq!(conf.remote_prefix, "E:/env");
    assert_eq!(conf.filter.placement, FilterPlacement::None);
    Ok(())
}

#[test]
fn test_show_config_output() -> TestResult {
    let dirs = Arc::new(TestDirectories::new());
    let (settings, _) = settings_from(dirs, &["dbgmap", "--filter", "none", "--show-config"])?;
    let rendered = cli::render_config(&settings.get_config())?;
    // pretty printed, one key per line
    assert!(rendered.contains("\n  \"remote_prefix\": \"Z:/source/hainan\""));

    let json: serde_json::Value = serde_json::from_str(&rendered)?;
    assert_eq!(json["filter"]["placement"], "none");
    assert_eq!(json["filter"]["flags"], serde_json::json!(["-u"]));
    assert_eq!(json["remote_prefix"], "Z:/source/hainan");
    assert_eq!(json["local_root"], "/home/user/source/hainan");
    assert!(json["log_file"].is_null());
    Ok(())
}
