// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

// Generic modules (toolkit-independent)
mod glge_error;
mod glgp_platform;
mod glgx_xml;
mod glgr_resource;
mod glgc_config;
mod glgs_section;
mod glgm_menu;
mod glgg_geometry;
mod glgq_queue;
mod glgv_environment;
mod glgl_lifecycle;
mod glgw_window;
mod glgh_headless;

// Native toolkit backend
#[cfg(feature = "native")] mod glnw_shell;

use std::sync::Arc;

use glgh_headless::HeadlessShell;
use glgl_lifecycle::Launcher;
use glgp_platform::Platform;
use glgq_queue::UiQueue;
use glgr_resource::Resources;
use glgv_environment::AppEnvironment;
use glgw_window::MainWindow;

const INSTANCE_NAME: &str = "godot-launcher";

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v.trim() == "1").unwrap_or(false)
}

/// Compose everything against the headless shell, print it, exit
fn run_headless(resources: Resources, environment: AppEnvironment, platform: Platform) {
    let queue = UiQueue::new();
    let mut launcher = Launcher::new(
        HeadlessShell::desktop(true),
        Box::new(resources),
        Box::new(environment),
        Box::new(MainWindow::new()),
        Arc::new(queue.sender()),
        platform,
    );

    launcher.start();
    for event in queue.drain() {
        launcher.handle(event);
    }

    print!("{}", launcher.shell().summary());

    // Leave through the tray's Quit entry, as a user would
    if launcher.shell().select_menu("Quit") {
        for event in queue.drain() {
            launcher.handle(event);
        }
    }
    launcher.terminate();
    log::info!("LIFECYCLE: dry run finished in phase {:?}", launcher.phase());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let resources = Resources::new(Some(glgc_config::resource_override_dir()));
    if env_flag("GODOT_LAUNCHER_DEPLOY") {
        match resources.deploy_defaults() {
            Ok(written) => log::info!("RESOURCES: deployed {} default files into {:?}", written, resources.override_dir()),
            Err(e) => log::error!("RESOURCES: deploy failed: {}", e),
        }
    }

    let environment = AppEnvironment::new(glgc_config::config_dir(), INSTANCE_NAME);
    let platform = Platform::current();

    #[cfg(feature = "native")]
    {
        if !env_flag("GODOT_LAUNCHER_HEADLESS") {
            if let Err(e) = glnw_shell::run(resources, environment, platform) {
                log::error!("LIFECYCLE: native shell failed: {}", e);
            }
            std::process::exit(0);
        }
    }

    #[cfg(not(feature = "native"))]
    log::info!("LIFECYCLE: built without the native feature, running headless");

    run_headless(resources, environment, platform);
}
