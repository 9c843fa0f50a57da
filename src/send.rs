// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::command::prepare_commands;
use crate::desktop::{AutomationTree, WindowSystem};
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::error::Result;
use crate::locator::Strategy;

/// One invocation's worth of input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub files: Vec<PathBuf>,
    pub pid: Option<u32>,
    pub strategy: Strategy,
    pub dispatch: DispatchSettings,
}

/// Validate every file, find the listener, then send the files one by one.
///
/// Nothing touches the desktop until all files exist and have a supported
/// extension.
pub fn send<D>(desktop: &D, options: &SendOptions, out: &mut dyn Write) -> Result<()>
where
    D: WindowSystem + AutomationTree,
{
    let commands = prepare_commands(&options.files)?;
    debug!("{} command(s) prepared, strategy {:?}", commands.len(), options.strategy);

    let locator = options.strategy.locator(desktop);
    let (_, listener) = locator.locate(options.pid)?;

    Dispatcher::new(desktop, &options.dispatch).dispatch(listener, &commands, out)
}
