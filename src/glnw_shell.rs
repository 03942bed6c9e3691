// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Native Shell (feature "native")
/// tao window + event loop, tray-icon tray with a context menu, rfd dialogs
///
/// Thread model:
/// - tray and menu callbacks may run off the UI thread; they only translate
///   the native event into a UiEvent and post it through the event-loop proxy
/// - the launcher lives inside the event-loop closure and is only touched there
///
/// tao has no work-area query; visible bounds come from GetMonitorInfoW on
/// Windows and from the GDK monitor workarea on Linux.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use tao::monitor::MonitorHandle;
use tao::window::{Window, WindowBuilder};
use tray_icon::menu::{IsMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

use crate::glge_error::LaunchError;
use crate::glgg_geometry::{self, Display, DisplaySource, Rect};
use crate::glgl_lifecycle::{IconImage, Launcher, Shell};
use crate::glgm_menu::{MenuDefinition, MenuNode, TrayAction};
use crate::glgp_platform::Platform;
use crate::glgq_queue::{UiDispatch, UiEvent};
use crate::glgr_resource::Resources;
use crate::glgs_section::{Tab, TabContainer};
use crate::glgv_environment::AppEnvironment;
use crate::glgw_window::MainWindow;

// ============================================================================
// SECTION 1: Event-loop dispatch
// ============================================================================

/// Posts UiEvents into the tao event loop from any thread
pub struct ProxyDispatch {
    proxy: Mutex<EventLoopProxy<UiEvent>>,
}

impl UiDispatch for ProxyDispatch {
    fn post(&self, event: UiEvent) {
        let sent = match self.proxy.lock() {
            Ok(proxy) => proxy.send_event(event).is_ok(),
            Err(_) => false,
        };
        if !sent {
            log::debug!("QUEUE: event loop closed, event dropped");
        }
    }
}

// ============================================================================
// SECTION 2: Shell
// ============================================================================

pub struct NativeShell {
    window: Window,
    tray: Option<TrayIcon>,
    tabs: Vec<Tab>,
    stylesheet: Option<String>,
    exit_code: Option<i32>,
}

impl NativeShell {
    pub fn new(window: Window) -> Self {
        NativeShell {
            window,
            tray: None,
            tabs: Vec::new(),
            stylesheet: None,
            exit_code: None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

fn same_monitor(a: &MonitorHandle, b: &MonitorHandle) -> bool {
    a.name() == b.name() && a.position() == b.position()
}

fn to_display(index: usize, monitor: &MonitorHandle, primary: Option<&MonitorHandle>) -> Display {
    let scale = monitor.scale_factor();
    let position: LogicalPosition<f64> = monitor.position().to_logical(scale);
    let size: LogicalSize<f64> = monitor.size().to_logical(scale);
    let bounds = Rect::new(position.x, position.y, size.width, size.height);

    Display {
        name: monitor.name().unwrap_or_else(|| format!("monitor-{}", index)),
        bounds,
        visible_bounds: glgg_geometry::clip_work_area(bounds, work_area(monitor, bounds)),
        primary: primary.is_some_and(|p| same_monitor(p, monitor)),
    }
}

/// Work area in logical pixels, taskbar excluded
#[cfg(target_os = "windows")]
fn work_area(monitor: &MonitorHandle, bounds: Rect) -> Rect {
    use tao::platform::windows::MonitorHandleExtWindows;
    use windows::Win32::Graphics::Gdi::{GetMonitorInfoW, HMONITOR, MONITORINFO};

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    let hmonitor = HMONITOR(monitor.hmonitor() as *mut std::ffi::c_void);

    if !unsafe { GetMonitorInfoW(hmonitor, &mut info) }.as_bool() {
        log::warn!("LAYOUT: GetMonitorInfoW failed, using full monitor bounds");
        return bounds;
    }

    let scale = monitor.scale_factor();
    let rc = info.rcWork;
    Rect::new(
        rc.left as f64 / scale,
        rc.top as f64 / scale,
        (rc.right - rc.left) as f64 / scale,
        (rc.bottom - rc.top) as f64 / scale,
    )
}

/// Work area in logical pixels, panels excluded
#[cfg(target_os = "linux")]
fn work_area(_monitor: &MonitorHandle, bounds: Rect) -> Rect {
    let Some(display) = gdk::Display::default() else {
        return bounds;
    };

    for i in 0..display.n_monitors() {
        let Some(candidate) = display.monitor(i) else {
            continue;
        };
        let geometry = candidate.geometry();
        if geometry.x() == bounds.x.round() as i32 && geometry.y() == bounds.y.round() as i32 {
            let work = candidate.workarea();
            return Rect::new(work.x() as f64, work.y() as f64, work.width() as f64, work.height() as f64);
        }
    }

    log::warn!("LAYOUT: no GDK monitor at ({:.0}, {:.0}), using full bounds", bounds.x, bounds.y);
    bounds
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn work_area(_monitor: &MonitorHandle, bounds: Rect) -> Rect {
    bounds
}

fn tray_error(e: impl std::fmt::Display) -> LaunchError {
    LaunchError::Tray(e.to_string())
}

/// Build native menu items for one level, recording each leaf's action by id
fn build_items(
    nodes: &[MenuNode],
    actions: &mut HashMap<MenuId, TrayAction>,
) -> Result<Vec<Box<dyn IsMenuItem>>, tray_icon::menu::Error> {
    let mut items: Vec<Box<dyn IsMenuItem>> = Vec::new();

    for node in nodes {
        match node {
            MenuNode::Leaf(leaf) => {
                let item = MenuItem::new(&leaf.label, leaf.enabled, None);
                actions.insert(item.id().clone(), leaf.action.clone());
                items.push(Box::new(item));
            }
            MenuNode::Separator => items.push(Box::new(PredefinedMenuItem::separator())),
            MenuNode::SubMenu { label, children } => {
                let submenu = Submenu::new(label, true);
                for child in build_items(children, actions)? {
                    submenu.append(child.as_ref())?;
                }
                items.push(Box::new(submenu));
            }
        }
    }

    Ok(items)
}

impl TabContainer for NativeShell {
    fn add_tab(&mut self, tab: Tab) {
        log::debug!("WINDOW: tab {} from {}", tab.label, tab.fragment.source);
        self.tabs.push(tab);
    }

    fn request_focus(&mut self) {
        self.window.set_focus();
    }
}

impl DisplaySource for NativeShell {
    fn displays(&self) -> Vec<Display> {
        let primary = self.window.primary_monitor();
        self.window.available_monitors()
            .enumerate()
            .map(|(i, m)| to_display(i, &m, primary.as_ref()))
            .collect()
    }
}

impl Shell for NativeShell {
    fn tray_supported(&self) -> bool {
        cfg!(any(target_os = "windows", target_os = "linux"))
    }

    fn attach_tray(
        &mut self,
        icon: &IconImage,
        tooltip: &str,
        menu: &MenuDefinition,
        dispatch: Arc<dyn UiDispatch>,
    ) -> Result<(), LaunchError> {
        let mut actions = HashMap::new();
        let context_menu = Menu::new();
        for item in build_items(&menu.nodes, &mut actions).map_err(tray_error)? {
            context_menu.append(item.as_ref()).map_err(tray_error)?;
        }

        let tray_icon = tray_icon::Icon::from_rgba(icon.rgba.clone(), icon.width, icon.height)
            .map_err(tray_error)?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(context_menu))
            .with_menu_on_left_click(false)
            .with_tooltip(tooltip)
            .with_icon(tray_icon)
            .build()
            .map_err(tray_error)?;

        MenuEvent::set_event_handler(Some({
            let dispatch = Arc::clone(&dispatch);
            move |event: MenuEvent| {
                if let Some(action) = actions.get(&event.id) {
                    dispatch.post(UiEvent::MenuAction(action.clone()));
                }
            }
        }));

        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let TrayIconEvent::Click { button: MouseButton::Left, button_state: MouseButtonState::Up, .. } = event {
                dispatch.post(UiEvent::TrayActivated);
            }
        }));

        self.tray = Some(tray);
        Ok(())
    }

    fn detach_tray(&mut self) {
        if self.tray.take().is_some() {
            MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
            TrayIconEvent::set_event_handler(None::<fn(TrayIconEvent)>);
            log::info!("TRAY: detached");
        }
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_icon(&mut self, icon: &IconImage) -> Result<(), LaunchError> {
        let window_icon = tao::window::Icon::from_rgba(icon.rgba.clone(), icon.width, icon.height)
            .map_err(|e| LaunchError::Window(e.to_string()))?;
        self.window.set_window_icon(Some(window_icon));
        Ok(())
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.window.set_decorations(decorated);
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.window.set_always_on_top(on_top);
    }

    fn place_window(&mut self, rect: Rect) {
        self.window.set_inner_size(LogicalSize::new(rect.width, rect.height));
        self.window.set_outer_position(LogicalPosition::new(rect.x, rect.y));
    }

    fn apply_stylesheet(&mut self, url: &str) {
        log::debug!("THEME: stylesheet {}", url);
        self.stylesheet = Some(url.to_string());
    }

    fn show_window(&mut self) {
        log::debug!("WINDOW: showing {} tabs, stylesheet {:?}", self.tabs.len(), self.stylesheet);
        self.window.set_visible(true);
    }

    fn hide_window(&mut self) {
        self.window.set_visible(false);
    }

    fn focus_window(&mut self) {
        self.window.set_focus();
    }

    fn close_window(&mut self) {
        self.window.set_visible(false);
    }

    fn show_error_dialog(&mut self, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_buttons(rfd::MessageButtons::Ok)
            .set_title(title)
            .set_description(message)
            .show();
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

// ============================================================================
// SECTION 3: Run loop
// ============================================================================

/// Own the UI thread until the launcher terminates
pub fn run(resources: Resources, environment: AppEnvironment, platform: Platform) -> Result<(), LaunchError> {
    let event_loop = EventLoopBuilder::<UiEvent>::with_user_event().build();

    let window = WindowBuilder::new()
        .with_visible(false)
        .build(&event_loop)
        .map_err(|e| LaunchError::Window(e.to_string()))?;

    let dispatch = Arc::new(ProxyDispatch { proxy: Mutex::new(event_loop.create_proxy()) });

    let mut launcher = Launcher::new(
        NativeShell::new(window),
        Box::new(resources),
        Box::new(environment),
        Box::new(MainWindow::new()),
        dispatch,
        platform,
    );

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => launcher.start(),
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                launcher.handle(UiEvent::CloseRequested);
            }
            Event::WindowEvent { event: WindowEvent::Focused(false), .. } => {
                launcher.handle(UiEvent::FocusLost);
            }
            Event::UserEvent(ui_event) => launcher.handle(ui_event),
            _ => {}
        }

        if let Some(code) = launcher.shell().exit_code() {
            *control_flow = ControlFlow::ExitWithCode(code);
        }
    })
}
