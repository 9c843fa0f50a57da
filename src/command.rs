// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Script files → listener command lines.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SendError};

/// Line ending the listener's input parser treats as "submit".
pub const LINE_END: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    MaxScript,
    Python,
}

impl ScriptKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "ms" | "mcr" => Ok(ScriptKind::MaxScript),
            "py" => Ok(ScriptKind::Python),
            _ => Err(SendError::UnsupportedFileType {
                extension: if ext.is_empty() { String::new() } else { format!(".{ext}") },
            }),
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            ScriptKind::MaxScript => "fileIn",
            ScriptKind::Python => "python.executeFile",
        }
    }
}

/// MAXScript string literal for a path. JSON escaping is a subset of what
/// MAXScript accepts inside double quotes.
fn quote(path: &Path) -> String {
    serde_json::Value::String(path.to_string_lossy().into_owned()).to_string()
}

/// Listener command for one script file, without line ending.
pub fn build_command(path: &Path) -> Result<String> {
    let kind = ScriptKind::from_path(path)?;
    Ok(format!("{} {}", kind.keyword(), quote(path)))
}

/// Absolutize every input and check it exists. Nothing is returned unless
/// all of them exist.
pub fn resolve_files<P: AsRef<Path>>(files: &[P]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(files.len());
    for f in files {
        let f = f.as_ref();
        let abs = std::path::absolute(f)
            .map_err(|source| SendError::InvalidPath { path: f.to_path_buf(), source })?;
        if !abs.is_file() {
            return Err(SendError::FileNotFound(abs));
        }
        debug!("resolved {} -> {}", f.display(), abs.display());
        resolved.push(abs);
    }
    Ok(resolved)
}

/// `resolve_files` then `build_command` for each, in input order.
pub fn prepare_commands<P: AsRef<Path>>(files: &[P]) -> Result<Vec<String>> {
    resolve_files(files)?
        .iter()
        .map(|p| build_command(p))
        .collect()
}
