// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Everything that can stop a send run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::locator::MaxProcess;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not resolve path {}: {source}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No 3ds Max instance found.")]
    ApplicationNotFound,

    /// More than one candidate window and no `--pid` to pick one.
    #[error("Multiple 3ds Max instances found ({}); pass --pid to select one.", .0.len())]
    MultipleInstances(Vec<MaxProcess>),

    #[error("StatusPanel not found.")]
    StatusPanelNotFound,

    #[error("Mini_Edit_Box not found.")]
    EditBoxNotFound,

    #[error("MAXScript listener window not found.")]
    ListenerNotFound,

    /// A synthetic message was aborted because the target is hung.
    #[error("Timed out during {operation}: 3ds Max did not process the message.")]
    Timeout { operation: &'static str },

    #[error("3ds Max not responding after {}s.", .0.as_secs_f64())]
    NotResponding(Duration),

    #[error("{context}: {message}")]
    Os { context: &'static str, message: String },
}

impl SendError {
    pub fn os(context: &'static str, err: impl std::fmt::Display) -> Self {
        SendError::Os { context, message: err.to_string() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Timeout { .. } | SendError::NotResponding(_))
    }

    /// Process exit status for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            SendError::Os { .. } => 1,
            SendError::UnsupportedFileType { .. } => 3,
            SendError::FileNotFound(_) | SendError::InvalidPath { .. } => 4,
            SendError::ApplicationNotFound => 5,
            SendError::MultipleInstances(_) => 6,
            SendError::StatusPanelNotFound
            | SendError::EditBoxNotFound
            | SendError::ListenerNotFound => 7,
            SendError::Timeout { .. } | SendError::NotResponding(_) => 8,
        }
    }
}

pub type Result<T, E = SendError> = std::result::Result<T, E>;
