// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! OS capabilities the locators and the dispatcher are written against.
//!
//! `win32::Win32Desktop` is the real implementation. Tests use a fake that
//! records every message.

use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Raw window handle value. Owned by the target process; never closed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0 as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelWindow {
    pub handle: WindowHandle,
    pub process_id: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildWindow {
    pub handle: WindowHandle,
    pub class_name: String,
}

/// Property match for an automation element. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementQuery<'a> {
    pub process_id: Option<u32>,
    pub name: Option<&'a str>,
    pub class_name: Option<&'a str>,
}

/// The window messages this tool ever sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage<'a> {
    /// `WM_NULL`: does nothing, answered once the message loop is free.
    Null,
    /// `WM_SETTEXT`.
    SetText(&'a str),
    /// `WM_CHAR` with `VK_RETURN`.
    Enter,
    /// `WM_GETTEXT` into a buffer of this many UTF-16 units (NUL included).
    GetText(usize),
}

impl WindowMessage<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            WindowMessage::Null => "WM_NULL",
            WindowMessage::SetText(_) => "WM_SETTEXT",
            WindowMessage::Enter => "WM_CHAR",
            WindowMessage::GetText(_) => "WM_GETTEXT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageReply {
    /// Text copied out by `GetText`; empty for everything else.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// `ERROR_TIMEOUT`: the target did not answer inside the timeout or is hung.
    TimedOut,
    Os(String),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::TimedOut => f.write_str("This operation returned because the timeout period expired."),
            MessageError::Os(msg) => f.write_str(msg),
        }
    }
}

pub trait WindowSystem {
    fn top_level_windows(&self) -> Result<Vec<TopLevelWindow>>;

    /// All descendants of `parent`, depth first.
    fn descendant_windows(&self, parent: WindowHandle) -> Result<Vec<ChildWindow>>;

    /// `SendMessageTimeout` with abort-if-hung semantics.
    fn send_message(
        &self,
        target: WindowHandle,
        message: WindowMessage<'_>,
        timeout: Duration,
    ) -> std::result::Result<MessageReply, MessageError>;
}

pub trait AutomationTree {
    type Element;

    fn root(&self) -> Result<Self::Element>;

    /// Automation class name of a top-level window.
    fn class_name(&self, window: WindowHandle) -> Result<String>;

    /// First immediate child of `parent` matching every set field of `query`.
    fn find_first_child(
        &self,
        parent: &Self::Element,
        query: &ElementQuery<'_>,
    ) -> Result<Option<Self::Element>>;

    fn native_handle(&self, element: &Self::Element) -> Result<WindowHandle>;
}
