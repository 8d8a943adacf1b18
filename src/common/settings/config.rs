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
use crate::common::constants;
use crate::common::err::DbgError;
use ::config::{ConfigError, Source, Value};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct HashMapSource(pub HashMap<String, config::Value>);

impl config::Source for HashMapSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<HashMap<String, Value>, ConfigError> {
        Ok(self.0.clone())
    }
}

/// Where the filter stage sits relative to the debugger.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterPlacement {
    /// `filter | debugger`: what's typed at the terminal is rewritten before the debugger reads it
    Input,
    /// `debugger | filter`: the debugger's stdout is rewritten on its way to the terminal
    Output,
    /// No filter stage at all, only the arguments are rewritten
    None,
}

impl FilterPlacement {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterPlacement::Input => "input",
            FilterPlacement::Output => "output",
            FilterPlacement::None => "none",
        }
    }
}

impl Default for FilterPlacement {
    fn default() -> Self {
        FilterPlacement::Input
    }
}

impl fmt::Display for FilterPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPlacement {
    type Err = DbgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" => Ok(FilterPlacement::Input),
            "output" => Ok(FilterPlacement::Output),
            "none" => Ok(FilterPlacement::None),
            _ => Err(DbgError::BadPlacement(s.to_string())),
        }
    }
}

struct PlacementVisitor;

impl<'de> Visitor<'de> for PlacementVisitor {
    type Value = FilterPlacement;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("one of input, output, none")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(|e: DbgError| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        self.visit_str(&v)
    }
}

impl Serialize for FilterPlacement {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterPlacement {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(PlacementVisitor)
    }
}

/// The stream editor that rewrites paths flowing through the pipeline.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FilterConfig {
    pub binary: String,
    /// Flags that make the filter flush per line, so an interactive session isn't held back
    pub flags: Vec<String>,
    pub placement: FilterPlacement,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            binary: "sed".to_string(),
            flags: vec!["-u".to_string()],
            placement: FilterPlacement::default(),
        }
    }
}

/// Everything `launch` needs to know. Built once from the merged configuration layers and passed
/// in explicitly.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LaunchConfig {
    pub local_root: PathBuf,
    pub remote_prefix: String,
    pub debugger_binary: String,
    pub filter: FilterConfig,
    pub log_file: Option<PathBuf>,
}

impl LaunchConfig {
    pub fn new(
        local_root: impl Into<PathBuf>,
        remote_prefix: impl Into<String>,
        debugger_binary: impl Into<String>,
    ) -> Self {
        Self {
            local_root: local_root.into(),
            remote_prefix: remote_prefix.into(),
            debugger_binary: debugger_binary.into(),
            filter: FilterConfig::default(),
            log_file: None,
        }
    }

    pub fn with_placement(mut self, placement: FilterPlacement) -> Self {
        self.filter.placement = placement;
        self
    }
}

/// Builds the merged config, lowest precedence first: our default toml, `source` (the config
/// files), environment variables, then `overrides` from the command line. `local_root` falls back
/// to `cwd`.
pub fn build<T>(
    source: T,
    overrides: HashMapSource,
    cwd: &Path,
) -> Result<::config::Config, ConfigError>
where
    T: config::Source + Send + Sync + 'static,
{
    let mut merged_config = config::Config::new();

    merged_config
        .merge(config::File::from_str(
            constants::DEFAULT_CONFIG_TOML,
            config::FileFormat::Toml,
        ))?
        .merge(source)?
        .merge(
            config::Environment::with_prefix(constants::ENV_PREFIX)
                .separator(constants::ENV_SEPARATOR),
        )?
        .merge(overrides)?
        .set_default("local_root", cwd.to_string_lossy().to_string())?;

    Ok(merged_config)
}
