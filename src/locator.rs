// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Finding 3ds Max and the listener input control inside it.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::desktop::{AutomationTree, ElementQuery, WindowHandle, WindowSystem};
use crate::error::{Result, SendError};

// ── UI names (3ds Max 2017+) ────────────────────────
pub const TITLE_SUBSTRING: &str = "3ds Max";
pub const APP_WINDOW_CLASS: &str = "QmaxApplicationWindow";
pub const STATUS_PANEL_NAME: &str = "StatusPanel";
pub const EDIT_BOX_NAME: &str = "Mini_Edit_Box";
pub const EDIT_BOX_CLASS: &str = "MXS_Scintilla";
pub const LISTENER_CLASS_SUBSTRING: &str = "MXS_Scintilla";

/// One running 3ds Max main window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxProcess {
    pub pid: u32,
    pub hwnd: WindowHandle,
    pub title: String,
}

impl fmt::Display for MaxProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.pid)
    }
}

/// Window + control lookup. Two implementations, picked by [`Strategy`].
pub trait ListenerLocator {
    fn find_instances(&self, pid: Option<u32>) -> Result<Vec<MaxProcess>>;

    /// Reduce candidates to the one to talk to.
    fn choose(&self, instances: Vec<MaxProcess>) -> Result<MaxProcess>;

    /// Window handle of the listener input control.
    fn find_listener(&self, process: &MaxProcess) -> Result<WindowHandle>;

    fn locate(&self, pid: Option<u32>) -> Result<(MaxProcess, WindowHandle)> {
        let process = self.choose(self.find_instances(pid)?)?;
        info!("using 3ds Max pid={} hwnd={} title='{}'", process.pid, process.hwnd, process.title);
        let listener = self.find_listener(&process)?;
        info!("listener hwnd={listener}");
        Ok((process, listener))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// UI Automation: exact class names, named status panel + edit box.
    #[default]
    Automation,
    /// Title substring + child class substring. Works without UIA.
    Legacy,
}

impl Strategy {
    pub fn locator<'a, D>(self, desktop: &'a D) -> Box<dyn ListenerLocator + 'a>
    where
        D: WindowSystem + AutomationTree,
    {
        match self {
            Strategy::Automation => Box::new(AutomationLocator::new(desktop)),
            Strategy::Legacy => Box::new(LegacyLocator::new(desktop)),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automation" | "uia" => Ok(Strategy::Automation),
            "legacy" => Ok(Strategy::Legacy),
            other => Err(format!("unknown strategy '{other}' (expected automation or legacy)")),
        }
    }
}

fn filter_pid(instances: Vec<MaxProcess>, pid: Option<u32>) -> Vec<MaxProcess> {
    match pid {
        Some(pid) => instances.into_iter().filter(|p| p.pid == pid).collect(),
        None => instances,
    }
}

// ── Legacy: window titles + class names ─────────────

pub struct LegacyLocator<'a, W> {
    windows: &'a W,
}

impl<'a, W: WindowSystem> LegacyLocator<'a, W> {
    pub fn new(windows: &'a W) -> Self {
        Self { windows }
    }
}

impl<W: WindowSystem> ListenerLocator for LegacyLocator<'_, W> {
    fn find_instances(&self, pid: Option<u32>) -> Result<Vec<MaxProcess>> {
        let found: Vec<MaxProcess> = self
            .windows
            .top_level_windows()?
            .into_iter()
            .filter(|w| w.title.contains(TITLE_SUBSTRING))
            .map(|w| MaxProcess { pid: w.process_id, hwnd: w.handle, title: w.title })
            .collect();
        debug!("legacy: {} window(s) titled '*{TITLE_SUBSTRING}*'", found.len());
        Ok(filter_pid(found, pid))
    }

    fn choose(&self, instances: Vec<MaxProcess>) -> Result<MaxProcess> {
        let count = instances.len();
        let first = instances.into_iter().next().ok_or(SendError::ApplicationNotFound)?;
        if count > 1 {
            warn!("{count} 3ds Max windows found, using the first: {first}");
        }
        Ok(first)
    }

    fn find_listener(&self, process: &MaxProcess) -> Result<WindowHandle> {
        self.windows
            .descendant_windows(process.hwnd)?
            .into_iter()
            .find(|c| c.class_name.contains(LISTENER_CLASS_SUBSTRING))
            .map(|c| c.handle)
            .ok_or(SendError::ListenerNotFound)
    }
}

// ── Automation tree ─────────────────────────────────

pub struct AutomationLocator<'a, D> {
    desktop: &'a D,
}

impl<'a, D: WindowSystem + AutomationTree> AutomationLocator<'a, D> {
    pub fn new(desktop: &'a D) -> Self {
        Self { desktop }
    }
}

impl<D: WindowSystem + AutomationTree> ListenerLocator for AutomationLocator<'_, D> {
    fn find_instances(&self, pid: Option<u32>) -> Result<Vec<MaxProcess>> {
        let mut found = Vec::new();
        for w in self.desktop.top_level_windows()? {
            if pid.is_some_and(|pid| pid != w.process_id) {
                continue;
            }
            // Windows can vanish between enumeration and the class query.
            let class = match self.desktop.class_name(w.handle) {
                Ok(c) => c,
                Err(e) => {
                    debug!("automation: class of {} unavailable: {e}", w.handle);
                    continue;
                }
            };
            if class == APP_WINDOW_CLASS {
                found.push(MaxProcess { pid: w.process_id, hwnd: w.handle, title: w.title });
            }
        }
        debug!("automation: {} {APP_WINDOW_CLASS} window(s)", found.len());
        Ok(found)
    }

    fn choose(&self, instances: Vec<MaxProcess>) -> Result<MaxProcess> {
        let mut instances = instances;
        match instances.len() {
            0 => Err(SendError::ApplicationNotFound),
            1 => Ok(instances.remove(0)),
            _ => Err(SendError::MultipleInstances(instances)),
        }
    }

    fn find_listener(&self, process: &MaxProcess) -> Result<WindowHandle> {
        let d = self.desktop;
        let root = d.root()?;

        let app = d
            .find_first_child(
                &root,
                &ElementQuery {
                    process_id: Some(process.pid),
                    class_name: Some(APP_WINDOW_CLASS),
                    ..Default::default()
                },
            )?
            .ok_or(SendError::ApplicationNotFound)?;

        let panel = d
            .find_first_child(&app, &ElementQuery { name: Some(STATUS_PANEL_NAME), ..Default::default() })?
            .ok_or(SendError::StatusPanelNotFound)?;
        debug!("automation: {STATUS_PANEL_NAME} found");

        let edit = d
            .find_first_child(
                &panel,
                &ElementQuery {
                    name: Some(EDIT_BOX_NAME),
                    class_name: Some(EDIT_BOX_CLASS),
                    ..Default::default()
                },
            )?
            .ok_or(SendError::EditBoxNotFound)?;

        d.native_handle(&edit)
    }
}
