// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Launcher Configuration
/// Handles property files, application settings, and config path resolution
///
/// Responsibilities:
/// - Config directory resolution (~/.config/godot-launcher)
/// - Property file parsing (key=value / key: value, # and ! comments)
/// - Application settings read from strings/information.properties

use std::path::PathBuf;

use crate::glgr_resource::ResourceResolver;

// ============================================================================
// SECTION 1: Resource paths and defaults
// ============================================================================

pub const INFORMATION_PROPERTIES: &str = "strings/information.properties";
pub const TRAY_MENU: &str = "menus/tray_menu.xml";
pub const MAIN_SCENE: &str = "scenes/main_scene.xml";

const DEFAULT_APP_NAME: &str = "Godot Launcher";
const DEFAULT_APP_ICON: &str = "icons/app_icon.png";
const DEFAULT_THEME_DARK: &str = "themes/dark.css";
const DEFAULT_THEME_LIGHT: &str = "themes/light.css";

// ============================================================================
// SECTION 2: Config path resolution
// ============================================================================

/// Resolve the launcher config directory
pub fn config_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("godot-launcher");
    path
}

/// Directory whose files override the embedded resources
pub fn resource_override_dir() -> PathBuf {
    match std::env::var_os("GODOT_LAUNCHER_RESOURCES") {
        Some(dir) => PathBuf::from(dir),
        None => config_dir().join("resources"),
    }
}

// ============================================================================
// SECTION 3: Property files
// ============================================================================

/// Read-only key → string lookup, in file order
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn parse(content: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let split = line.find(|c| c == '=' || c == ':');
            let (key, value) = match split {
                Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
                None => (line, ""),
            };

            // Later definitions win
            entries.retain(|(k, _)| k != key);
            entries.push((key.to_string(), value.to_string()));
        }

        Properties { entries }
    }

    /// Load from a resource; a missing or unreadable file yields empty properties
    pub fn load(resolver: &dyn ResourceResolver, path: &str) -> Self {
        let Some(handle) = resolver.locate(path) else {
            log::warn!("CONFIG: {} not found, using defaults", path);
            return Properties::default();
        };

        match handle.read_string() {
            Ok(content) => {
                let props = Properties::parse(&content);
                log::debug!("CONFIG: {} entries from {}", props.len(), handle.url());
                props
            }
            Err(e) => {
                log::warn!("CONFIG: failed to read {}: {}", path, e);
                Properties::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).filter(|v| !v.is_empty()).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// SECTION 4: Application settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub icon: String,
    pub theme: Theme,
    pub theme_dark: String,
    pub theme_light: String,
}

impl AppConfig {
    pub fn from_properties(props: &Properties) -> Self {
        let theme = match props.get_or("app.theme", "dark").to_lowercase().as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        };

        AppConfig {
            name: props.get_or("app.name", DEFAULT_APP_NAME).to_string(),
            icon: props.get_or("app.icon", DEFAULT_APP_ICON).to_string(),
            theme,
            theme_dark: props.get_or("app.theme.dark", DEFAULT_THEME_DARK).to_string(),
            theme_light: props.get_or("app.theme.light", DEFAULT_THEME_LIGHT).to_string(),
        }
    }

    pub fn load(resolver: &dyn ResourceResolver) -> Self {
        Self::from_properties(&Properties::load(resolver, INFORMATION_PROPERTIES))
    }

    /// Stylesheet resource for the selected theme
    pub fn stylesheet(&self) -> &str {
        match self.theme {
            Theme::Dark => &self.theme_dark,
            Theme::Light => &self.theme_light,
        }
    }
}
