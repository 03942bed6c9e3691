// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Main Window Composer
/// Default ready hook: title, icon, chrome, placement, tabs, stylesheet
///
/// Scene format (scenes/main_scene.xml):
///   <scene tabs="menus/tab_menu.xml"
///          width="32" height="95"            (percent of the work area)
///          marginRight="60" marginBottom="10"/>
///
/// Every attribute is optional and falls back to the values above.

use crate::glgc_config::MAIN_SCENE;
use crate::glge_error::LaunchError;
use crate::glgg_geometry::{self, Margins};
use crate::glgl_lifecycle::{ReadyContext, ReadyHook, Shell};
use crate::glgr_resource::ResourceResolver;
use crate::glgs_section::{SectionLoader, XmlFragmentFactory};
use crate::glgx_xml::XmlElement;

const DEFAULT_TAB_MENU: &str = "menus/tab_menu.xml";
const DEFAULT_WIDTH_PERCENT: f64 = 32.0;
const DEFAULT_HEIGHT_PERCENT: f64 = 95.0;

// ============================================================================
// SECTION 1: Scene description
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub tabs: String,
    pub width_percent: f64,
    pub height_percent: f64,
    pub margins: Margins,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            tabs: DEFAULT_TAB_MENU.to_string(),
            width_percent: DEFAULT_WIDTH_PERCENT,
            height_percent: DEFAULT_HEIGHT_PERCENT,
            margins: Margins::default(),
        }
    }
}

impl Scene {
    pub fn load(resolver: &dyn ResourceResolver, path: &str) -> Result<Self, LaunchError> {
        let xml = resolver.require(path)?.read_string()?;
        Self::from_xml(&xml).map_err(|e| LaunchError::xml(path, e))
    }

    pub fn from_xml(xml: &str) -> Result<Self, String> {
        let root = XmlElement::parse(xml)?;
        if root.name != "scene" {
            return Err(format!("expected <scene> root, found <{}>", root.name));
        }

        let defaults = Scene::default();
        Ok(Scene {
            tabs: root.non_empty_attr("tabs").unwrap_or(&defaults.tabs).to_string(),
            width_percent: number(&root, "width", defaults.width_percent)?,
            height_percent: number(&root, "height", defaults.height_percent)?,
            margins: Margins {
                right: number(&root, "marginRight", defaults.margins.right)?,
                bottom: number(&root, "marginBottom", defaults.margins.bottom)?,
            },
        })
    }
}

fn number(e: &XmlElement, key: &str, default: f64) -> Result<f64, String> {
    match e.non_empty_attr(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(format!("attribute {}=\"{}\" is not a non-negative number", key, raw)),
        },
    }
}

// ============================================================================
// SECTION 2: Ready hook
// ============================================================================

pub struct MainWindow {
    scene_path: String,
}

impl MainWindow {
    pub fn new() -> Self {
        Self::with_scene(MAIN_SCENE)
    }

    pub fn with_scene(path: &str) -> Self {
        MainWindow { scene_path: path.to_string() }
    }
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shell> ReadyHook<S> for MainWindow {
    fn on_ready(&mut self, ctx: ReadyContext<'_, S>) -> Result<(), LaunchError> {
        ctx.shell.set_title(&ctx.config.name);
        ctx.shell.set_icon(ctx.icon)?;

        // Borderless only in tray mode; always pinned above other windows
        if ctx.tray_attached {
            ctx.shell.set_decorated(false);
        }
        ctx.shell.set_always_on_top(true);

        let scene = Scene::load(ctx.resources, &self.scene_path)?;

        let display = glgg_geometry::active_display(&*ctx.shell).ok_or(LaunchError::NoDisplay)?;
        log::info!("LAYOUT: display {} {:.0}x{:.0}", display.name, display.bounds.width, display.bounds.height);

        let screen = glgg_geometry::visible_bounds(&*ctx.shell, Some(&display)).ok_or(LaunchError::NoDisplay)?;
        let size = glgg_geometry::percent_of(&*ctx.shell, Some(&display), (scene.width_percent, scene.height_percent))
            .ok_or(LaunchError::NoDisplay)?;
        let placement = glgg_geometry::anchor_bottom_right(screen, size, scene.margins);
        log::info!("LAYOUT: window {:.0}x{:.0} at ({:.0}, {:.0})",
            placement.width, placement.height, placement.x, placement.y);
        ctx.shell.place_window(placement);

        let factory = XmlFragmentFactory;
        let report = SectionLoader::new(ctx.resources, &factory).load(&scene.tabs, &mut *ctx.shell)?;
        if report.loaded.is_empty() {
            log::warn!("LAYOUT: main window has no tabs ({} entries skipped)", report.skipped.len());
        }

        match ctx.resources.locate(ctx.config.stylesheet()) {
            Some(handle) => ctx.shell.apply_stylesheet(&handle.url()),
            None => log::warn!("THEME: stylesheet {} not found, using toolkit defaults", ctx.config.stylesheet()),
        }

        Ok(())
    }
}
