// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Run MAXScript / Python files in an already running 3ds Max by typing
//! `fileIn` / `python.executeFile` into its MAXScript mini listener.

pub mod cli;
pub mod command;
pub mod desktop;
pub mod dispatch;
pub mod error;
pub mod locator;
pub mod logging;
pub mod probe;
pub mod send;

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod fake;

pub use error::{Result, SendError};
pub use send::{send, SendOptions};
