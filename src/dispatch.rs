// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typing commands into the listener, one at a time.

use std::io::Write;
use std::time::Duration;

use tracing::{info, warn};

use crate::command::LINE_END;
use crate::desktop::{MessageError, MessageReply, WindowHandle, WindowMessage, WindowSystem};
use crate::error::{Result, SendError};
use crate::probe::{wait_responsive, PROBE_INTERVAL};

pub const MESSAGE_TIMEOUT: Duration = Duration::from_millis(2000);
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);
pub const READBACK_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Timeout for each `WM_SETTEXT` / `WM_CHAR` / `WM_GETTEXT`.
    pub message_timeout: Duration,
    /// How long a command may keep the listener busy.
    pub response_timeout: Duration,
    pub probe_interval: Duration,
    /// `WM_GETTEXT` buffer size in UTF-16 units. The snapshot is written to
    /// the output after each command; 0 disables readback entirely.
    pub readback_len: usize,
    /// Write `>>> command` before each command. Does not affect readback.
    pub echo: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            message_timeout: MESSAGE_TIMEOUT,
            response_timeout: RESPONSE_TIMEOUT,
            probe_interval: PROBE_INTERVAL,
            readback_len: READBACK_LEN,
            echo: true,
        }
    }
}

pub struct Dispatcher<'a, W: ?Sized> {
    windows: &'a W,
    settings: &'a DispatchSettings,
}

impl<'a, W: WindowSystem + ?Sized> Dispatcher<'a, W> {
    pub fn new(windows: &'a W, settings: &'a DispatchSettings) -> Self {
        Self { windows, settings }
    }

    fn send(&self, target: WindowHandle, message: WindowMessage<'_>) -> Result<MessageReply> {
        self.windows
            .send_message(target, message, self.settings.message_timeout)
            .map_err(|e| match e {
                MessageError::TimedOut => SendError::Timeout { operation: message.name() },
                MessageError::Os(msg) => SendError::Os { context: message.name(), message: msg },
            })
    }

    /// Submit one command and block until the listener is idle again.
    /// Returns the listener text snapshot, if readback is enabled.
    pub fn submit(&self, listener: WindowHandle, command: &str) -> Result<Option<String>> {
        info!("dispatch: {command}");
        let line = format!("{command}{LINE_END}");
        self.send(listener, WindowMessage::SetText(&line))?;
        self.send(listener, WindowMessage::Enter)?;

        wait_responsive(
            self.windows,
            listener,
            self.settings.response_timeout,
            self.settings.probe_interval,
        )?;

        if self.settings.readback_len == 0 {
            return Ok(None);
        }
        match self.send(listener, WindowMessage::GetText(self.settings.readback_len)) {
            Ok(reply) => Ok(Some(reply.text)),
            Err(e @ SendError::Timeout { .. }) => Err(e),
            Err(e) => {
                warn!("readback failed: {e}");
                Ok(None)
            }
        }
    }

    /// Send every command in order. Stops at the first failure; later
    /// commands are never sent.
    pub fn dispatch(&self, listener: WindowHandle, commands: &[String], out: &mut dyn Write) -> Result<()> {
        for command in commands {
            if self.settings.echo {
                writeln!(out, ">>> {command}").map_err(|e| SendError::os("write output", e))?;
            }
            let feedback = self.submit(listener, command)?;
            if let Some(text) = feedback {
                writeln!(out, "{text}").map_err(|e| SendError::os("write output", e))?;
            }
        }
        Ok(())
    }
}
