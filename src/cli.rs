// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::dispatch::DispatchSettings;
use crate::locator::Strategy;
use crate::send::SendOptions;

#[derive(Parser, Debug)]
#[command(
    name = "sendto3dsmax",
    version,
    about = "Send script files to the MAXScript listener of a running 3ds Max"
)]
pub struct Cli {
    /// Script files to run (.ms, .mcr, .py), sent in the given order
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Process ID of the 3ds Max instance to target
    #[arg(long)]
    pub pid: Option<u32>,

    /// Seconds to wait for 3ds Max to become responsive after each file
    #[arg(long, value_name = "SECONDS", default_value = "60", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// How to find the listener: automation (UI Automation) or legacy (window classes)
    #[arg(long, default_value = "automation")]
    pub strategy: Strategy,

    /// Don't echo commands or listener output
    #[arg(long, short, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("timeout must be a non-negative, finite number of seconds, got {s}"))
}

impl Cli {
    pub fn to_options(&self) -> SendOptions {
        let defaults = DispatchSettings::default();
        SendOptions {
            files: self.files.clone(),
            pid: self.pid,
            strategy: self.strategy,
            dispatch: DispatchSettings {
                response_timeout: self.timeout,
                echo: !self.quiet,
                readback_len: if self.quiet { 0 } else { defaults.readback_len },
                ..defaults
            },
        }
    }
}
