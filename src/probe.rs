// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Waiting for the listener to finish a command.
//!
//! The listener runs one command at a time on the UI thread. While it runs,
//! `WM_NULL` with `SMTO_ABORTIFHUNG` keeps timing out; the first answered
//! probe means the message loop is free again.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::desktop::{MessageError, WindowHandle, WindowMessage, WindowSystem};
use crate::error::{Result, SendError};

/// Per-attempt cap for one `WM_NULL`.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(1000);

pub fn wait_responsive<W: WindowSystem + ?Sized>(
    windows: &W,
    target: WindowHandle,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!("probe: gave up on {target} after {attempts} attempt(s)");
            return Err(SendError::NotResponding(timeout));
        }
        let wait = interval.min(timeout - elapsed).max(Duration::from_millis(1));
        let attempt_start = Instant::now();
        attempts += 1;
        match windows.send_message(target, WindowMessage::Null, wait) {
            Ok(_) => {
                trace!("probe: {target} answered after {attempts} attempt(s), {:?}", start.elapsed());
                return Ok(());
            }
            // A hung window fails at once; pace the retries to one per interval.
            Err(MessageError::TimedOut) => {
                let spent = attempt_start.elapsed();
                if spent < wait {
                    thread::sleep(wait - spent);
                }
            }
            Err(MessageError::Os(e)) => return Err(SendError::os("SendMessageTimeout(WM_NULL)", e)),
        }
    }
}
