// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Lifecycle Controller
/// Startup sequencing, tray integration, event handling and shutdown
///
/// Startup order (strict):
///   1. platform gate
///   2. environment initialize
///   3. application icon
///   4. tray attach + tray menu (when the shell supports a tray)
///   5. ready hook composes the main window, then it is shown
///
/// Any error in 1-5 is caught once in `start`: logged, shown in a blocking
/// dialog, then the launcher terminates (teardown, exit status 0).

use std::sync::Arc;

use crate::glgc_config::{AppConfig, TRAY_MENU};
use crate::glge_error::LaunchError;
use crate::glgg_geometry::{DisplaySource, Rect};
use crate::glgm_menu::{MenuDefinition, TrayAction};
use crate::glgp_platform::Platform;
use crate::glgq_queue::{UiDispatch, UiEvent};
use crate::glgr_resource::{ResourceHandle, ResourceResolver};
use crate::glgs_section::TabContainer;
use crate::glgv_environment::Environment;

const ERROR_DIALOG_TITLE: &str = "Launcher error";

// ============================================================================
// SECTION 1: Phases and icon
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    PlatformChecked,
    EnvironmentReady,
    WindowComposed,
    Visible,
    Hidden,
    Terminating,
    Terminated,
}

/// Decoded RGBA application icon
#[derive(Debug, Clone)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl IconImage {
    pub fn load(handle: &ResourceHandle) -> Result<Self, LaunchError> {
        let bytes = handle.read_bytes()?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| LaunchError::Image { path: handle.path().to_string(), message: e.to_string() })?
            .into_rgba8();

        let (width, height) = image.dimensions();
        Ok(IconImage { width, height, rgba: image.into_raw() })
    }
}

// ============================================================================
// SECTION 2: Shell seam
// ============================================================================

/// Window, tray and dialog primitives of the host toolkit
pub trait Shell: TabContainer + DisplaySource {
    fn tray_supported(&self) -> bool;
    /// Native menu selections and tray clicks must be posted through `dispatch`
    fn attach_tray(
        &mut self,
        icon: &IconImage,
        tooltip: &str,
        menu: &MenuDefinition,
        dispatch: Arc<dyn UiDispatch>,
    ) -> Result<(), LaunchError>;
    fn detach_tray(&mut self);

    fn set_title(&mut self, title: &str);
    fn set_icon(&mut self, icon: &IconImage) -> Result<(), LaunchError>;
    fn set_decorated(&mut self, decorated: bool);
    fn set_always_on_top(&mut self, on_top: bool);
    fn place_window(&mut self, rect: Rect);
    fn apply_stylesheet(&mut self, url: &str);

    fn show_window(&mut self);
    fn hide_window(&mut self);
    fn focus_window(&mut self);
    fn close_window(&mut self);

    /// Blocks until the user acknowledges
    fn show_error_dialog(&mut self, title: &str, message: &str);
    fn exit(&mut self, code: i32);
}

/// What the ready hook may touch while composing the window
pub struct ReadyContext<'a, S: Shell> {
    pub shell: &'a mut S,
    pub resources: &'a dyn ResourceResolver,
    pub config: &'a AppConfig,
    pub icon: &'a IconImage,
    pub tray_attached: bool,
}

pub trait ReadyHook<S: Shell> {
    fn on_ready(&mut self, ctx: ReadyContext<'_, S>) -> Result<(), LaunchError>;
}

// ============================================================================
// SECTION 3: Launcher
// ============================================================================

pub struct Launcher<S: Shell> {
    shell: S,
    resources: Box<dyn ResourceResolver>,
    environment: Box<dyn Environment>,
    hook: Box<dyn ReadyHook<S>>,
    dispatch: Arc<dyn UiDispatch>,
    platform: Platform,
    phase: Phase,
    tray_attached: bool,
    stopped: bool,
}

impl<S: Shell> Launcher<S> {
    pub fn new(
        shell: S,
        resources: Box<dyn ResourceResolver>,
        environment: Box<dyn Environment>,
        hook: Box<dyn ReadyHook<S>>,
        dispatch: Arc<dyn UiDispatch>,
        platform: Platform,
    ) -> Self {
        Launcher {
            shell,
            resources,
            environment,
            hook,
            dispatch,
            platform,
            phase: Phase::Uninitialized,
            tray_attached: false,
            stopped: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    #[cfg(test)]
    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    #[cfg(test)]
    pub fn tray_attached(&self) -> bool {
        self.tray_attached
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Uninitialized {
            log::warn!("LIFECYCLE: start ignored in phase {:?}", self.phase);
            return;
        }

        if let Err(err) = self.startup() {
            self.fail(err);
        }
    }

    fn startup(&mut self) -> Result<(), LaunchError> {
        let platform = self.platform.check_supported()?;
        self.phase = Phase::PlatformChecked;
        log::info!("LIFECYCLE: platform {} supported", platform.name());

        self.environment.initialize()?;
        self.phase = Phase::EnvironmentReady;

        let config = AppConfig::load(self.resources.as_ref());
        let icon = IconImage::load(&self.resources.require(&config.icon)?)?;

        if self.shell.tray_supported() {
            let menu = MenuDefinition::load(self.resources.as_ref(), TRAY_MENU)?;
            self.shell.attach_tray(&icon, &config.name, &menu, Arc::clone(&self.dispatch))?;
            self.tray_attached = true;
            log::info!("TRAY: attached with {} menu entries", menu.leaves().len());
        } else {
            log::info!("TRAY: not supported, window close will exit");
        }

        self.hook.on_ready(ReadyContext {
            shell: &mut self.shell,
            resources: self.resources.as_ref(),
            config: &config,
            icon: &icon,
            tray_attached: self.tray_attached,
        })?;
        self.phase = Phase::WindowComposed;

        self.shell.show_window();
        self.phase = Phase::Visible;
        log::info!("LIFECYCLE: window visible");
        Ok(())
    }

    fn fail(&mut self, err: LaunchError) {
        log::error!("LIFECYCLE: startup failed: {}", err);
        self.phase = Phase::Terminating;
        self.shell.show_error_dialog(ERROR_DIALOG_TITLE, &err.to_string());
        self.terminate();
    }

    /// Apply one UI event; must run on the UI thread
    pub fn handle(&mut self, event: UiEvent) {
        match self.phase {
            Phase::Terminating | Phase::Terminated => {
                log::debug!("LIFECYCLE: {:?} ignored while shutting down", event);
                return;
            }
            Phase::Visible | Phase::Hidden => {}
            _ if event == UiEvent::MenuAction(TrayAction::Quit) => {}
            _ => {
                log::debug!("LIFECYCLE: {:?} ignored before window is composed", event);
                return;
            }
        }

        match event {
            UiEvent::TrayActivated => self.bring_to_front(),
            UiEvent::MenuAction(action) => self.dispatch_action(action),
            UiEvent::CloseRequested => self.close_requested(),
            UiEvent::FocusLost => {
                if self.tray_attached && self.phase == Phase::Visible {
                    self.shell.hide_window();
                    self.phase = Phase::Hidden;
                }
            }
        }
    }

    fn dispatch_action(&mut self, action: TrayAction) {
        match action {
            TrayAction::Open => self.bring_to_front(),
            TrayAction::Config => log::info!("TRAY: config is not available yet"),
            TrayAction::Quit => {
                log::info!("TRAY: quit requested");
                self.terminate();
            }
            TrayAction::Unrecognized(command) => {
                log::debug!("TRAY: no handler for command {:?}", command);
            }
        }
    }

    fn bring_to_front(&mut self) {
        self.shell.show_window();
        self.shell.focus_window();
        self.phase = Phase::Visible;
    }

    fn close_requested(&mut self) {
        if self.tray_attached {
            self.shell.hide_window();
            self.phase = Phase::Hidden;
        } else {
            self.shell.close_window();
            self.terminate();
        }
    }

    /// Teardown then exit with status 0
    pub fn terminate(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        self.phase = Phase::Terminating;
        self.stop();
        self.shell.exit(0);
        self.phase = Phase::Terminated;
    }

    /// Detach the tray and tear the environment down; runs once
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if self.tray_attached {
            self.shell.detach_tray();
            self.tray_attached = false;
        }
        self.environment.teardown();
        log::info!("LIFECYCLE: stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::glgh_headless::HeadlessShell;
    use crate::glgq_queue::UiQueue;
    use crate::glgr_resource::testing::MemoryResources;
    use crate::glgs_section::{Fragment, Tab};
    use crate::glgx_xml::XmlElement;

    #[derive(Default)]
    struct Calls {
        initialize: u32,
        teardown: u32,
    }

    struct RecordingEnvironment {
        calls: Rc<RefCell<Calls>>,
        fail: bool,
    }

    impl Environment for RecordingEnvironment {
        fn initialize(&mut self) -> Result<(), LaunchError> {
            self.calls.borrow_mut().initialize += 1;
            if self.fail {
                return Err(LaunchError::Environment("disk full".to_string()));
            }
            Ok(())
        }

        fn teardown(&mut self) {
            self.calls.borrow_mut().teardown += 1;
        }
    }

    struct OneTab {
        fail: bool,
    }

    impl ReadyHook<HeadlessShell> for OneTab {
        fn on_ready(&mut self, ctx: ReadyContext<'_, HeadlessShell>) -> Result<(), LaunchError> {
            if self.fail {
                return Err(LaunchError::not_found("scenes/main_scene.xml"));
            }
            ctx.shell.set_title(&ctx.config.name);
            ctx.shell.add_tab(Tab {
                label: "Engines".to_string(),
                fragment: Fragment {
                    source: "memory:/sections/engines.xml".to_string(),
                    root: XmlElement::parse("<section/>").unwrap(),
                },
            });
            Ok(())
        }
    }

    struct Fixture {
        launcher: Launcher<HeadlessShell>,
        calls: Rc<RefCell<Calls>>,
        queue: UiQueue,
    }

    fn fixture(platform: Platform, tray: bool, resources: MemoryResources, env_fails: bool, hook_fails: bool) -> Fixture {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let queue = UiQueue::new();
        let launcher = Launcher::new(
            HeadlessShell::desktop(tray),
            Box::new(resources),
            Box::new(RecordingEnvironment { calls: Rc::clone(&calls), fail: env_fails }),
            Box::new(OneTab { fail: hook_fails }),
            Arc::new(queue.sender()),
            platform,
        );
        Fixture { launcher, calls, queue }
    }

    fn started(tray: bool) -> Fixture {
        let mut f = fixture(Platform::Linux, tray, MemoryResources::defaults(), false, false);
        f.launcher.start();
        f
    }

    fn pump(f: &mut Fixture) {
        for event in f.queue.drain() {
            f.launcher.handle(event);
        }
    }

    #[test]
    fn test_startup_with_tray() {
        let f = started(true);
        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert!(f.launcher.tray_attached());

        let shell = f.launcher.shell();
        assert!(shell.visible);
        assert_eq!(shell.title, "Godot Launcher");
        assert_eq!(shell.tab_labels(), vec!["Engines"]);
        let tray = shell.tray.as_ref().unwrap();
        assert_eq!(tray.tooltip, "Godot Launcher");
        assert_eq!(tray.icon_size, (32, 32));
        assert_eq!(f.calls.borrow().initialize, 1);
    }

    #[test]
    fn test_startup_without_tray() {
        let f = started(false);
        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert!(!f.launcher.tray_attached());
        assert!(f.launcher.shell().tray.is_none());
    }

    #[test]
    fn test_unsupported_platform_is_fatal() {
        let mut f = fixture(Platform::MacOS, true, MemoryResources::defaults(), false, false);
        f.launcher.start();

        let shell = f.launcher.shell();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(shell.dialogs.len(), 1);
        assert!(shell.dialogs[0].1.contains("macos"));
        assert_eq!(shell.exit_code, Some(0));
        // Environment never initialized but teardown still runs once
        assert_eq!(f.calls.borrow().initialize, 0);
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_missing_icon_is_fatal() {
        let resources = MemoryResources::defaults().without("icons/app_icon.png");
        let mut f = fixture(Platform::Windows, true, resources, false, false);
        f.launcher.start();

        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert!(f.launcher.shell().dialogs[0].1.contains("icons/app_icon.png"));
        assert!(f.launcher.shell().tray.is_none());
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_corrupt_icon_is_fatal() {
        let resources = MemoryResources::defaults().with("icons/app_icon.png", b"not a png");
        let mut f = fixture(Platform::Linux, false, resources, false, false);
        f.launcher.start();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(f.launcher.shell().exit_code, Some(0));
    }

    #[test]
    fn test_environment_failure_is_fatal() {
        let mut f = fixture(Platform::Linux, true, MemoryResources::defaults(), true, false);
        f.launcher.start();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert!(f.launcher.shell().dialogs[0].1.contains("disk full"));
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_hook_failure_detaches_tray() {
        let mut f = fixture(Platform::Linux, true, MemoryResources::defaults(), false, true);
        f.launcher.start();

        let shell = f.launcher.shell();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert!(shell.tray.is_none());
        assert_eq!(shell.tray_detach_count, 1);
        assert!(!shell.visible);
    }

    #[test]
    fn test_missing_tray_menu_is_fatal() {
        let resources = MemoryResources::defaults().without("menus/tray_menu.xml");
        let mut f = fixture(Platform::Linux, true, resources, false, false);
        f.launcher.start();

        let shell = f.launcher.shell();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(shell.dialogs.len(), 1);
        assert!(shell.dialogs[0].1.contains("menus/tray_menu.xml"));
        assert!(shell.tray.is_none());
        assert_eq!(shell.exit_code, Some(0));
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_broken_tray_menu_is_fatal() {
        let resources = MemoryResources::defaults()
            .with("menus/tray_menu.xml", "<menu><item name=\"Open\"></menu>");
        let mut f = fixture(Platform::Windows, true, resources, false, false);
        f.launcher.start();

        let shell = f.launcher.shell();
        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(shell.dialogs.len(), 1);
        assert!(shell.dialogs[0].1.starts_with("invalid XML in menus/tray_menu.xml"));
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_tray_menu_ignored_without_tray() {
        let resources = MemoryResources::defaults().without("menus/tray_menu.xml");
        let mut f = fixture(Platform::Linux, false, resources, false, false);
        f.launcher.start();
        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert!(f.launcher.shell().dialogs.is_empty());
    }

    #[test]
    fn test_upper_case_quit_command() {
        let menu = r#"<menu name="Tray"><item name="Exit" command="QUIT"/></menu>"#;
        let resources = MemoryResources::defaults().with("menus/tray_menu.xml", menu);
        let mut f = fixture(Platform::Linux, true, resources, false, false);
        f.launcher.start();
        assert_eq!(f.launcher.phase(), Phase::Visible);

        assert!(f.launcher.shell().select_menu("Exit"));
        pump(&mut f);

        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(f.launcher.shell().exit_code, Some(0));
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_close_with_tray_hides() {
        let mut f = started(true);
        f.launcher.handle(UiEvent::CloseRequested);

        assert_eq!(f.launcher.phase(), Phase::Hidden);
        assert!(!f.launcher.shell().visible);
        assert_eq!(f.launcher.shell().exit_code, None);
        assert_eq!(f.calls.borrow().teardown, 0);
    }

    #[test]
    fn test_close_without_tray_terminates() {
        let mut f = started(false);
        f.launcher.handle(UiEvent::CloseRequested);

        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert!(f.launcher.shell().closed);
        assert_eq!(f.launcher.shell().exit_code, Some(0));
        assert_eq!(f.calls.borrow().teardown, 1);
    }

    #[test]
    fn test_tray_click_restores_window() {
        let mut f = started(true);
        f.launcher.handle(UiEvent::CloseRequested);
        f.launcher.shell_mut().focused = false;

        f.launcher.shell().click_tray();
        pump(&mut f);

        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert!(f.launcher.shell().visible);
        assert!(f.launcher.shell().focused);
    }

    #[test]
    fn test_menu_open_from_native_thread() {
        let mut f = started(true);
        f.launcher.handle(UiEvent::FocusLost);
        assert_eq!(f.launcher.phase(), Phase::Hidden);

        let dispatch = f.launcher.shell().tray.as_ref().unwrap().dispatch.clone();
        std::thread::spawn(move || dispatch.post(UiEvent::MenuAction(TrayAction::parse("OPEN"))))
            .join()
            .unwrap();
        pump(&mut f);

        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert!(f.launcher.shell().focused);
    }

    #[test]
    fn test_quit_tears_down_and_exits() {
        let mut f = started(true);
        assert!(f.launcher.shell().select_menu("Quit"));
        pump(&mut f);

        assert_eq!(f.launcher.phase(), Phase::Terminated);
        assert_eq!(f.launcher.shell().exit_code, Some(0));
        assert_eq!(f.launcher.shell().tray_detach_count, 1);
        assert_eq!(f.calls.borrow().teardown, 1);

        // Late events are ignored
        f.launcher.handle(UiEvent::TrayActivated);
        assert_eq!(f.launcher.phase(), Phase::Terminated);
    }

    #[test]
    fn test_config_and_unknown_are_noops() {
        let mut f = started(true);
        f.launcher.handle(UiEvent::MenuAction(TrayAction::Config));
        f.launcher.handle(UiEvent::MenuAction(TrayAction::parse("foo")));
        assert_eq!(f.launcher.phase(), Phase::Visible);
        assert_eq!(f.launcher.shell().exit_code, None);
    }

    #[test]
    fn test_focus_loss_without_tray_keeps_window() {
        let mut f = started(false);
        f.launcher.handle(UiEvent::FocusLost);
        assert_eq!(f.launcher.phase(), Phase::Visible);
    }

    #[test]
    fn test_repeated_stop_is_harmless() {
        let mut f = started(true);
        f.launcher.stop();
        f.launcher.stop();
        f.launcher.terminate();
        f.launcher.terminate();
        assert_eq!(f.calls.borrow().teardown, 1);
        assert_eq!(f.launcher.shell().exit_code, Some(0));
    }

    #[test]
    fn test_start_runs_once() {
        let mut f = started(true);
        f.launcher.start();
        assert_eq!(f.calls.borrow().initialize, 1);
        assert_eq!(f.launcher.shell().tab_labels().len(), 1);
    }
}
