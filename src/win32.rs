// sendto3dsmax — Send script files to a running 3ds Max listener
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Win32 + UI Automation backend.

use std::cell::OnceCell;
use std::ffi::c_void;
use std::time::Duration;

use tracing::{debug, trace};
use windows::core::{BSTR, VARIANT};
use windows::Win32::Foundation::*;
use windows::Win32::System::Com::*;
use windows::Win32::UI::Accessibility::*;
use windows::Win32::UI::Input::KeyboardAndMouse::VK_RETURN;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::desktop::{
    AutomationTree, ChildWindow, ElementQuery, MessageError, MessageReply, TopLevelWindow,
    WindowHandle, WindowMessage, WindowSystem,
};
use crate::error::{Result, SendError};

fn hwnd(h: WindowHandle) -> HWND {
    HWND(h.0 as *mut c_void)
}

fn handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

unsafe extern "system" fn collect_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let vec = &mut *(lparam.0 as *mut Vec<isize>);
    vec.push(hwnd.0 as isize);
    TRUE
}

unsafe fn window_text(hwnd: HWND) -> String {
    let mut buf = [0u16; 512];
    let len = GetWindowTextW(hwnd, &mut buf);
    if len <= 0 { return String::new(); }
    String::from_utf16_lossy(&buf[..len as usize])
}

unsafe fn class_of(hwnd: HWND) -> String {
    let mut buf = [0u16; 256];
    let len = GetClassNameW(hwnd, &mut buf);
    if len <= 0 { return String::new(); }
    String::from_utf16_lossy(&buf[..len as usize])
}

/// COM apartment + lazily created `IUIAutomation` client for this thread.
///
/// Not `Send`: COM objects stay on the thread that initialized them.
pub struct Win32Desktop {
    automation: OnceCell<IUIAutomation>,
    com_initialized: bool,
}

impl Win32Desktop {
    pub fn new() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        // RPC_E_CHANGED_MODE: someone else owns the apartment; usable, but not ours to close.
        debug!("CoInitializeEx: {hr:?}");
        Win32Desktop { automation: OnceCell::new(), com_initialized: hr.is_ok() }
    }

    fn automation(&self) -> Result<&IUIAutomation> {
        if let Some(uia) = self.automation.get() {
            return Ok(uia);
        }
        let uia: IUIAutomation = unsafe { CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER) }
            .map_err(|e| SendError::os("CoCreateInstance(CUIAutomation)", e))?;
        debug!("UI Automation client created");
        Ok(self.automation.get_or_init(|| uia))
    }

    fn condition(&self, query: &ElementQuery<'_>) -> Result<IUIAutomationCondition> {
        let uia = self.automation()?;
        let mut parts: Vec<IUIAutomationCondition> = Vec::new();
        unsafe {
            if let Some(pid) = query.process_id {
                parts.push(
                    uia.CreatePropertyCondition(UIA_ProcessIdPropertyId, &VARIANT::from(pid as i32))
                        .map_err(|e| SendError::os("CreatePropertyCondition(ProcessId)", e))?,
                );
            }
            if let Some(name) = query.name {
                parts.push(
                    uia.CreatePropertyCondition(UIA_NamePropertyId, &VARIANT::from(BSTR::from(name)))
                        .map_err(|e| SendError::os("CreatePropertyCondition(Name)", e))?,
                );
            }
            if let Some(class) = query.class_name {
                parts.push(
                    uia.CreatePropertyCondition(UIA_ClassNamePropertyId, &VARIANT::from(BSTR::from(class)))
                        .map_err(|e| SendError::os("CreatePropertyCondition(ClassName)", e))?,
                );
            }
            let mut parts = parts.into_iter();
            let Some(mut cond) = parts.next() else {
                return uia.CreateTrueCondition().map_err(|e| SendError::os("CreateTrueCondition", e));
            };
            for next in parts {
                cond = uia
                    .CreateAndCondition(&cond, &next)
                    .map_err(|e| SendError::os("CreateAndCondition", e))?;
            }
            Ok(cond)
        }
    }
}

impl Default for Win32Desktop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Win32Desktop {
    fn drop(&mut self) {
        // Release the client before the apartment goes away.
        drop(self.automation.take());
        if self.com_initialized {
            unsafe { CoUninitialize() };
        }
    }
}

impl WindowSystem for Win32Desktop {
    fn top_level_windows(&self) -> Result<Vec<TopLevelWindow>> {
        let mut raw: Vec<isize> = Vec::new();
        unsafe {
            EnumWindows(Some(collect_cb), LPARAM(&mut raw as *mut Vec<isize> as isize))
                .map_err(|e| SendError::os("EnumWindows", e))?;
        }
        let windows = raw
            .into_iter()
            .map(|r| {
                let h = HWND(r as *mut c_void);
                let mut pid: u32 = 0;
                unsafe { GetWindowThreadProcessId(h, Some(&mut pid)) };
                TopLevelWindow { handle: WindowHandle(r), process_id: pid, title: unsafe { window_text(h) } }
            })
            .collect::<Vec<_>>();
        trace!("EnumWindows: {} top-level window(s)", windows.len());
        Ok(windows)
    }

    fn descendant_windows(&self, parent: WindowHandle) -> Result<Vec<ChildWindow>> {
        let mut raw: Vec<isize> = Vec::new();
        // EnumChildWindows already recurses into grandchildren.
        unsafe {
            let _ = EnumChildWindows(hwnd(parent), Some(collect_cb), LPARAM(&mut raw as *mut Vec<isize> as isize));
        }
        Ok(raw
            .into_iter()
            .map(|r| ChildWindow { handle: WindowHandle(r), class_name: unsafe { class_of(HWND(r as *mut c_void)) } })
            .collect())
    }

    fn send_message(
        &self,
        target: WindowHandle,
        message: WindowMessage<'_>,
        timeout: Duration,
    ) -> std::result::Result<MessageReply, MessageError> {
        let millis = timeout.as_millis().clamp(1, u32::MAX as u128) as u32;
        let mut result: usize = 0;
        let mut text_buf: Vec<u16> = Vec::new();
        let wide: Vec<u16>;

        let (msg, wparam, lparam) = match message {
            WindowMessage::Null => (WM_NULL, WPARAM(0), LPARAM(0)),
            WindowMessage::SetText(text) => {
                wide = text.encode_utf16().chain(std::iter::once(0)).collect();
                (WM_SETTEXT, WPARAM(0), LPARAM(wide.as_ptr() as isize))
            }
            WindowMessage::Enter => (WM_CHAR, WPARAM(VK_RETURN.0 as usize), LPARAM(0)),
            WindowMessage::GetText(len) => {
                text_buf = vec![0u16; len.max(1)];
                (WM_GETTEXT, WPARAM(text_buf.len()), LPARAM(text_buf.as_mut_ptr() as isize))
            }
        };

        let ok = unsafe {
            SendMessageTimeoutW(hwnd(target), msg, wparam, lparam, SMTO_ABORTIFHUNG, millis, Some(&mut result as *mut usize))
        };
        if ok.0 == 0 {
            let err = unsafe { GetLastError() };
            if err == ERROR_TIMEOUT {
                return Err(MessageError::TimedOut);
            }
            if err != ERROR_SUCCESS {
                let e = windows_core::Error::from(err.to_hresult());
                return Err(MessageError::Os(format!("{} failed: {e}", message.name())));
            }
        }

        let text = match message {
            WindowMessage::GetText(_) => {
                let end = text_buf.iter().position(|&c| c == 0).unwrap_or(text_buf.len());
                String::from_utf16_lossy(&text_buf[..end])
            }
            _ => String::new(),
        };
        Ok(MessageReply { text })
    }
}

impl AutomationTree for Win32Desktop {
    type Element = IUIAutomationElement;

    fn root(&self) -> Result<IUIAutomationElement> {
        unsafe { self.automation()?.GetRootElement() }.map_err(|e| SendError::os("GetRootElement", e))
    }

    fn class_name(&self, window: WindowHandle) -> Result<String> {
        let uia = self.automation()?;
        unsafe {
            let elem = uia
                .ElementFromHandle(hwnd(window))
                .map_err(|e| SendError::os("ElementFromHandle", e))?;
            let class = elem.CurrentClassName().map_err(|e| SendError::os("CurrentClassName", e))?;
            Ok(class.to_string())
        }
    }

    fn find_first_child(
        &self,
        parent: &IUIAutomationElement,
        query: &ElementQuery<'_>,
    ) -> Result<Option<IUIAutomationElement>> {
        let cond = self.condition(query)?;
        match unsafe { parent.FindFirst(TreeScope_Children, &cond) } {
            Ok(found) => Ok(Some(found)),
            // No match comes back as a null element.
            Err(e) if e.code().is_ok() || e.code() == E_POINTER => {
                debug!("FindFirst {query:?}: no match");
                Ok(None)
            }
            Err(e) => Err(SendError::os("FindFirst", e)),
        }
    }

    fn native_handle(&self, element: &IUIAutomationElement) -> Result<WindowHandle> {
        let h = unsafe { element.CurrentNativeWindowHandle() }
            .map_err(|e| SendError::os("CurrentNativeWindowHandle", e))?;
        if h.0.is_null() {
            return Err(SendError::os("CurrentNativeWindowHandle", "element has no window handle"));
        }
        Ok(handle(h))
    }
}
