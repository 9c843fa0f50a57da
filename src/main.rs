// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::process::ExitCode;

use clap::Parser;
use sendto3dsmax::cli::Cli;
use sendto3dsmax::{logging, SendError};

#[cfg(windows)]
fn run(cli: &Cli) -> Result<(), SendError> {
    let desktop = sendto3dsmax::win32::Win32Desktop::new();
    let stdout = std::io::stdout();
    sendto3dsmax::send(&desktop, &cli.to_options(), &mut stdout.lock())
}

#[cfg(not(windows))]
fn run(cli: &Cli) -> Result<(), SendError> {
    // Fail the same way as on Windows for bad input, before the platform check.
    sendto3dsmax::command::prepare_commands(&cli.files)?;
    Err(SendError::os("sendto3dsmax", "3ds Max automation is only available on Windows"))
}

fn report(err: &SendError) {
    if let SendError::MultipleInstances(list) = err {
        eprintln!("Multiple instances found. Please select one of the following:");
        for p in list {
            eprintln!("{p}");
        }
        return;
    }
    eprintln!("sendto3dsmax: {err}");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("{cli:?}");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("exit on {e:?}");
            report(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
