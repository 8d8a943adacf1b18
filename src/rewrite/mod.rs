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

//! Textual path rewriting. Windows-hosted tools hand us paths like `Z:\source\hainan\main.c`; the
//! debugger runs from the local checkout, where the same file is `./main.c`.

use crate::common::constants::{LOCAL_ROOT_ALIAS, SED_DELIMITER};

/// Characters that mean something in a POSIX basic regular expression
const BRE_SPECIAL: &[char] = &['\\', '.', '*', '[', '^', '$'];

pub fn normalize_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewriter {
    remote_prefix: String,
}

impl PathRewriter {
    /// The prefix is matched after backslashes have already become forward slashes, so a prefix
    /// configured as `Z:\source\hainan` is normalized the same way.
    pub fn new(remote_prefix: &str) -> Self {
        Self {
            remote_prefix: normalize_slashes(remote_prefix),
        }
    }

    pub fn remote_prefix(&self) -> &str {
        &self.remote_prefix
    }

    fn replace_prefix(&self, s: String) -> String {
        // replacing "" would put a "." between every character
        if self.remote_prefix.is_empty() {
            s
        } else {
            s.replace(self.remote_prefix.as_str(), LOCAL_ROOT_ALIAS)
        }
    }

    /// The substitutions applied to the debugger's command line: backslashes to forward slashes,
    /// the remote prefix to `.`, and CRLF line endings to LF, in that order. A run of `\r` ending
    /// in `\n` collapses to a single `\n`.
    pub fn rewrite_command(&self, command: &str) -> String {
        let mut rewritten = self.replace_prefix(normalize_slashes(command));
        while rewritten.contains("\r\n") {
            rewritten = rewritten.replace("\r\n", "\n");
        }
        rewritten
    }

    /// What the filter stage does to each line of the stream. Line endings are left alone.
    pub fn rewrite_line(&self, line: &str) -> String {
        self.replace_prefix(normalize_slashes(line))
    }

    /// `sed` expressions equivalent to `rewrite_line`, one per `-e`.
    pub fn sed_script(&self) -> Vec<String> {
        let mut script = vec![r"s/\\/\//g".to_string()];
        if !self.remote_prefix.is_empty() {
            script.push(format!(
                "s{d}{pattern}{d}{replacement}{d}g",
                d = SED_DELIMITER,
                pattern = sed_escape(&self.remote_prefix),
                replacement = LOCAL_ROOT_ALIAS,
            ));
        }
        script
    }
}

/// Escapes `literal` so that sed matches it verbatim inside an `s` command using `SED_DELIMITER`.
pub fn sed_escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if BRE_SPECIAL.contains(&c) || c == SED_DELIMITER {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A debugger invocation: the binary and its argument tokens, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    binary: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(binary: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            binary: binary.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `<binary> <joined-args>`, with single spaces between tokens. With no args this is just the
    /// binary.
    pub fn render(&self) -> String {
        let mut rendered = self.binary.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    /// Applies `rewrite_command` to every token. The binary is left as configured.
    pub fn rewritten(&self, rewriter: &PathRewriter) -> Self {
        Self {
            binary: self.binary.clone(),
            args: self
                .args
                .iter()
                .map(|arg| rewriter.rewrite_command(arg))
                .collect(),
        }
    }
}
