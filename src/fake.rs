// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory desktop for tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::desktop::{
    AutomationTree, ChildWindow, ElementQuery, MessageError, MessageReply, TopLevelWindow,
    WindowHandle, WindowMessage, WindowSystem,
};
use crate::error::{Result, SendError};
use crate::locator::{APP_WINDOW_CLASS, EDIT_BOX_CLASS, EDIT_BOX_NAME, STATUS_PANEL_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Null,
    SetText(String),
    Enter,
    GetText(usize),
}

struct FakeElement {
    parent: usize,
    pid: Option<u32>,
    name: String,
    class: String,
    handle: Option<WindowHandle>,
}

pub struct FakeDesktop {
    windows: Vec<TopLevelWindow>,
    classes: HashMap<WindowHandle, String>,
    broken_classes: HashSet<WindowHandle>,
    children: HashMap<WindowHandle, Vec<ChildWindow>>,
    // index 0 is the desktop root
    elements: Vec<FakeElement>,

    sent: RefCell<Vec<(WindowHandle, Sent)>>,
    queries: Cell<usize>,
    buffer: RefCell<String>,
    /// `WM_NULL` probes that time out before one is answered.
    pub busy_probes: Cell<usize>,
    /// Once set, every probe times out.
    pub hung: Cell<bool>,
    /// Go hung after this many `WM_SETTEXT`s have been received.
    pub hang_after_commands: Cell<Option<usize>>,
    /// Messages with this name fail with `ERROR_TIMEOUT`.
    pub time_out_on: Cell<Option<&'static str>>,
    /// Messages with this name fail with a non-timeout error.
    pub fail_on: Cell<Option<&'static str>>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        FakeDesktop {
            windows: Vec::new(),
            classes: HashMap::new(),
            broken_classes: HashSet::new(),
            children: HashMap::new(),
            elements: vec![FakeElement {
                parent: usize::MAX,
                pid: None,
                name: "Desktop".into(),
                class: "#32769".into(),
                handle: None,
            }],
            sent: RefCell::new(Vec::new()),
            queries: Cell::new(0),
            buffer: RefCell::new(String::new()),
            busy_probes: Cell::new(0),
            hung: Cell::new(false),
            hang_after_commands: Cell::new(None),
            time_out_on: Cell::new(None),
            fail_on: Cell::new(None),
        }
    }

    pub fn add_window(&mut self, handle: isize, pid: u32, title: &str, class: &str) {
        let handle = WindowHandle(handle);
        self.windows.push(TopLevelWindow { handle, process_id: pid, title: title.into() });
        self.classes.insert(handle, class.into());
    }

    pub fn fail_class_lookup(&mut self, handle: WindowHandle) {
        self.broken_classes.insert(handle);
    }

    pub fn add_child(&mut self, parent: WindowHandle, handle: isize, class: &str) {
        self.children
            .entry(parent)
            .or_default()
            .push(ChildWindow { handle: WindowHandle(handle), class_name: class.into() });
    }

    pub fn add_element(
        &mut self,
        parent: usize,
        pid: Option<u32>,
        name: &str,
        class: &str,
        handle: Option<WindowHandle>,
    ) -> usize {
        self.elements.push(FakeElement {
            parent,
            pid,
            name: name.into(),
            class: class.into(),
            handle,
        });
        self.elements.len() - 1
    }

    /// App window → StatusPanel → Mini_Edit_Box, as 3ds Max exposes it.
    pub fn add_listener_tree(&mut self, pid: u32, app: WindowHandle, edit: Option<WindowHandle>) {
        let app = self.add_element(0, Some(pid), "Autodesk 3ds Max", APP_WINDOW_CLASS, Some(app));
        self.add_element(app, Some(pid), "Command Panel", "QWidget", None);
        let panel = self.add_element(app, Some(pid), STATUS_PANEL_NAME, "QWidget", None);
        self.add_element(panel, Some(pid), "Prompt", "QLabel", None);
        self.add_element(panel, Some(pid), EDIT_BOX_NAME, EDIT_BOX_CLASS, edit);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.borrow().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn targets(&self) -> Vec<WindowHandle> {
        self.sent.borrow().iter().map(|(h, _)| *h).collect()
    }

    /// Number of window/automation lookups made so far.
    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    fn touch(&self) {
        self.queries.set(self.queries.get() + 1);
    }

    fn commands_received(&self) -> usize {
        self.sent.borrow().iter().filter(|(_, s)| matches!(s, Sent::SetText(_))).count()
    }
}

impl WindowSystem for FakeDesktop {
    fn top_level_windows(&self) -> Result<Vec<TopLevelWindow>> {
        self.touch();
        Ok(self.windows.clone())
    }

    fn descendant_windows(&self, parent: WindowHandle) -> Result<Vec<ChildWindow>> {
        self.touch();
        Ok(self.children.get(&parent).cloned().unwrap_or_default())
    }

    fn send_message(
        &self,
        target: WindowHandle,
        message: WindowMessage<'_>,
        _timeout: Duration,
    ) -> std::result::Result<MessageReply, MessageError> {
        let record = match message {
            WindowMessage::Null => Sent::Null,
            WindowMessage::SetText(t) => Sent::SetText(t.to_string()),
            WindowMessage::Enter => Sent::Enter,
            WindowMessage::GetText(n) => Sent::GetText(n),
        };
        self.sent.borrow_mut().push((target, record));

        if self.time_out_on.get() == Some(message.name()) {
            return Err(MessageError::TimedOut);
        }
        if self.fail_on.get() == Some(message.name()) {
            return Err(MessageError::Os("Invalid window handle.".into()));
        }

        match message {
            WindowMessage::Null => {
                if let Some(n) = self.hang_after_commands.get() {
                    if self.commands_received() >= n {
                        self.hung.set(true);
                    }
                }
                if self.hung.get() {
                    return Err(MessageError::TimedOut);
                }
                let busy = self.busy_probes.get();
                if busy > 0 {
                    self.busy_probes.set(busy - 1);
                    return Err(MessageError::TimedOut);
                }
                Ok(MessageReply::default())
            }
            WindowMessage::SetText(t) => {
                *self.buffer.borrow_mut() = t.to_string();
                Ok(MessageReply::default())
            }
            WindowMessage::Enter => Ok(MessageReply::default()),
            WindowMessage::GetText(n) => {
                let text: String = self.buffer.borrow().chars().take(n.saturating_sub(1)).collect();
                Ok(MessageReply { text })
            }
        }
    }
}

impl AutomationTree for FakeDesktop {
    type Element = usize;

    fn root(&self) -> Result<usize> {
        Ok(0)
    }

    fn class_name(&self, window: WindowHandle) -> Result<String> {
        self.touch();
        if self.broken_classes.contains(&window) {
            return Err(SendError::os("ElementFromHandle", "element not available"));
        }
        Ok(self.classes.get(&window).cloned().unwrap_or_default())
    }

    fn find_first_child(&self, parent: &usize, query: &ElementQuery<'_>) -> Result<Option<usize>> {
        self.touch();
        Ok(self.elements.iter().enumerate().skip(1).find_map(|(i, e)| {
            let hit = e.parent == *parent
                && query.process_id.map_or(true, |p| e.pid == Some(p))
                && query.name.map_or(true, |n| e.name == n)
                && query.class_name.map_or(true, |c| e.class == c);
            hit.then_some(i)
        }))
    }

    fn native_handle(&self, element: &usize) -> Result<WindowHandle> {
        self.elements
            .get(*element)
            .and_then(|e| e.handle)
            .ok_or_else(|| SendError::os("CurrentNativeWindowHandle", "element has no window handle"))
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = LogBuffer::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
    (value, logs)
}
