// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Headless Shell
/// In-memory Shell that records every call instead of drawing
///
/// Backs the dry-run mode (GODOT_LAUNCHER_HEADLESS=1) and the lifecycle tests.
/// Tray clicks and menu selections are simulated through the same UiDispatch
/// a native tray would post to.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::glge_error::LaunchError;
use crate::glgg_geometry::{Display, DisplaySource, Rect};
use crate::glgl_lifecycle::{IconImage, Shell};
use crate::glgm_menu::{MenuDefinition, MenuNode};
use crate::glgq_queue::{UiDispatch, UiEvent};
use crate::glgs_section::{Tab, TabContainer};

pub struct TrayState {
    pub tooltip: String,
    pub icon_size: (u32, u32),
    pub menu: MenuDefinition,
    pub dispatch: Arc<dyn UiDispatch>,
}

pub struct HeadlessShell {
    displays: Vec<Display>,
    tray_supported: bool,

    pub title: String,
    pub icon_size: Option<(u32, u32)>,
    pub decorated: bool,
    pub always_on_top: bool,
    pub placement: Option<Rect>,
    pub stylesheets: Vec<String>,
    pub tabs: Vec<Tab>,
    pub tabs_focused: bool,
    pub visible: bool,
    pub focused: bool,
    pub closed: bool,
    pub tray: Option<TrayState>,
    pub tray_detach_count: u32,
    pub dialogs: Vec<(String, String)>,
    pub exit_code: Option<i32>,
}

impl HeadlessShell {
    pub fn new(displays: Vec<Display>, tray_supported: bool) -> Self {
        HeadlessShell {
            displays,
            tray_supported,
            title: String::new(),
            icon_size: None,
            decorated: true,
            always_on_top: false,
            placement: None,
            stylesheets: Vec::new(),
            tabs: Vec::new(),
            tabs_focused: false,
            visible: false,
            focused: false,
            closed: false,
            tray: None,
            tray_detach_count: 0,
            dialogs: Vec::new(),
            exit_code: None,
        }
    }

    /// Single 1920x1080 display with a 40px taskbar at the bottom
    pub fn desktop(tray_supported: bool) -> Self {
        let display = Display {
            name: "headless-0".to_string(),
            bounds: Rect::new(0.0, 0.0, 1920.0, 1080.0),
            visible_bounds: Rect::new(0.0, 0.0, 1920.0, 1040.0),
            primary: true,
        };
        Self::new(vec![display], tray_supported)
    }

    #[cfg(test)]
    pub fn tab_labels(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.label.as_str()).collect()
    }

    /// Simulate a primary click on the tray icon
    #[cfg(test)]
    pub fn click_tray(&self) {
        if let Some(tray) = &self.tray {
            tray.dispatch.post(UiEvent::TrayActivated);
        }
    }

    /// Simulate picking the first enabled menu entry labelled `label`
    pub fn select_menu(&self, label: &str) -> bool {
        let Some(tray) = &self.tray else {
            return false;
        };

        match tray.menu.leaves().into_iter().find(|l| l.enabled && l.label == label) {
            Some(leaf) => {
                tray.dispatch.post(UiEvent::MenuAction(leaf.action.clone()));
                true
            }
            None => false,
        }
    }

    /// Human-readable dump of the composed state
    pub fn summary(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "window: {:?}", self.title);
        if let Some(r) = self.placement {
            let _ = writeln!(out, "  placement: {:.0}x{:.0} at ({:.0}, {:.0})", r.width, r.height, r.x, r.y);
        }
        if let Some((w, h)) = self.icon_size {
            let _ = writeln!(out, "  icon: {}x{}", w, h);
        }
        let _ = writeln!(out, "  decorated: {}  always_on_top: {}  visible: {}  focused: {}  closed: {}",
            self.decorated, self.always_on_top, self.visible, self.focused, self.closed);
        for sheet in &self.stylesheets {
            let _ = writeln!(out, "  stylesheet: {}", sheet);
        }
        for tab in &self.tabs {
            let _ = writeln!(out, "  tab: {:<12} #{:<10} {}",
                tab.label, tab.fragment.id().unwrap_or("-"), tab.fragment.source);
        }
        if self.tabs_focused {
            let _ = writeln!(out, "  tabs focused");
        }

        match &self.tray {
            Some(tray) => {
                let _ = writeln!(out, "tray: {:?} icon {}x{}", tray.tooltip, tray.icon_size.0, tray.icon_size.1);
                write_menu(&mut out, &tray.menu.nodes, 1);
            }
            None => {
                let _ = writeln!(out, "tray: none");
            }
        }

        for (title, message) in &self.dialogs {
            let _ = writeln!(out, "dialog: {}: {}", title, message);
        }
        if let Some(code) = self.exit_code {
            let _ = writeln!(out, "exit: {}", code);
        }
        out
    }
}

fn write_menu(out: &mut String, nodes: &[MenuNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            MenuNode::Leaf(leaf) => {
                let state = if leaf.enabled { "" } else { " (disabled)" };
                let _ = writeln!(out, "{}{} -> {:?}{}", indent, leaf.label, leaf.action, state);
            }
            MenuNode::Separator => {
                let _ = writeln!(out, "{}---", indent);
            }
            MenuNode::SubMenu { label, children } => {
                let _ = writeln!(out, "{}{} >", indent, label);
                write_menu(out, children, depth + 1);
            }
        }
    }
}

impl TabContainer for HeadlessShell {
    fn add_tab(&mut self, tab: Tab) {
        self.tabs.push(tab);
    }

    fn request_focus(&mut self) {
        self.tabs_focused = true;
    }
}

impl DisplaySource for HeadlessShell {
    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }
}

impl Shell for HeadlessShell {
    fn tray_supported(&self) -> bool {
        self.tray_supported
    }

    fn attach_tray(
        &mut self,
        icon: &IconImage,
        tooltip: &str,
        menu: &MenuDefinition,
        dispatch: Arc<dyn UiDispatch>,
    ) -> Result<(), LaunchError> {
        if !self.tray_supported {
            return Err(LaunchError::Tray("system tray not available".to_string()));
        }
        self.tray = Some(TrayState {
            tooltip: tooltip.to_string(),
            icon_size: (icon.width, icon.height),
            menu: menu.clone(),
            dispatch,
        });
        Ok(())
    }

    fn detach_tray(&mut self) {
        if self.tray.take().is_some() {
            self.tray_detach_count += 1;
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_icon(&mut self, icon: &IconImage) -> Result<(), LaunchError> {
        if icon.rgba.len() != (icon.width as usize) * (icon.height as usize) * 4 {
            return Err(LaunchError::Window(format!(
                "icon buffer holds {} bytes, expected {}x{} RGBA", icon.rgba.len(), icon.width, icon.height)));
        }
        self.icon_size = Some((icon.width, icon.height));
        Ok(())
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.decorated = decorated;
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.always_on_top = on_top;
    }

    fn place_window(&mut self, rect: Rect) {
        self.placement = Some(rect);
    }

    fn apply_stylesheet(&mut self, url: &str) {
        self.stylesheets.push(url.to_string());
    }

    fn show_window(&mut self) {
        self.visible = true;
    }

    fn hide_window(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    fn focus_window(&mut self) {
        self.focused = true;
    }

    fn close_window(&mut self) {
        self.visible = false;
        self.closed = true;
    }

    fn show_error_dialog(&mut self, title: &str, message: &str) {
        log::error!("DIALOG: {}: {}", title, message);
        self.dialogs.push((title.to_string(), message.to_string()));
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
