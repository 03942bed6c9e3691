// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Resource Resolution
/// Maps logical resource paths ("scenes/main_scene.xml") to readable handles
///
/// Lookup order:
/// - user override directory (files placed there win)
/// - resources embedded in the binary at compile time
///
/// Whether a miss is fatal is the caller's call: `require` for startup
/// resources, `locate` where a miss means skip.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::glge_error::LaunchError;

// ============================================================================
// SECTION 1: Embedded defaults
// ============================================================================

lazy_static::lazy_static! {
    static ref EMBEDDED: HashMap<&'static str, &'static [u8]> = {
        let mut map: HashMap<&'static str, &'static [u8]> = HashMap::new();
        map.insert("strings/information.properties",
                   include_bytes!("../resources/strings/information.properties"));
        map.insert("icons/app_icon.png", include_bytes!("../resources/icons/app_icon.png"));
        map.insert("menus/tab_menu.xml", include_bytes!("../resources/menus/tab_menu.xml"));
        map.insert("menus/tray_menu.xml", include_bytes!("../resources/menus/tray_menu.xml"));
        map.insert("scenes/main_scene.xml", include_bytes!("../resources/scenes/main_scene.xml"));
        map.insert("sections/engines_section.xml",
                   include_bytes!("../resources/sections/engines_section.xml"));
        map.insert("sections/projects_section.xml",
                   include_bytes!("../resources/sections/projects_section.xml"));
        map.insert("themes/dark.css", include_bytes!("../resources/themes/dark.css"));
        map.insert("themes/light.css", include_bytes!("../resources/themes/light.css"));
        map
    };
}

// ============================================================================
// SECTION 2: Handles
// ============================================================================

#[derive(Debug, Clone)]
enum Origin {
    Embedded(&'static [u8]),
    File(PathBuf),
    #[cfg(test)]
    Memory(Vec<u8>),
}

/// A located resource; reading happens on demand
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    path: String,
    origin: Origin,
}

impl ResourceHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stable identifier usable as a stylesheet/source reference
    pub fn url(&self) -> String {
        match &self.origin {
            Origin::Embedded(_) => format!("embedded:/{}", self.path),
            Origin::File(file) => format!("file://{}", file.display()),
            #[cfg(test)]
            Origin::Memory(_) => format!("memory:/{}", self.path),
        }
    }

    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>, LaunchError> {
        match &self.origin {
            Origin::Embedded(bytes) => Ok(Cow::Borrowed(*bytes)),
            Origin::File(file) => Ok(Cow::Owned(fs::read(file)?)),
            #[cfg(test)]
            Origin::Memory(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }

    pub fn read_string(&self) -> Result<String, LaunchError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.into_owned())
            .map_err(|_| LaunchError::xml(&self.path, "resource is not valid UTF-8"))
    }
}

// ============================================================================
// SECTION 3: Resolution
// ============================================================================

pub trait ResourceResolver {
    /// Locate a resource; `None` when it does not exist or the path is unsafe
    fn locate(&self, path: &str) -> Option<ResourceHandle>;

    /// Locate a resource whose absence is fatal
    fn require(&self, path: &str) -> Result<ResourceHandle, LaunchError> {
        self.locate(path).ok_or_else(|| LaunchError::not_found(path))
    }
}

/// Relative, forward-only paths: no roots, drive letters or ".." segments
pub fn is_safe_path(path: &str) -> bool {
    if path.trim().is_empty() || path.starts_with('/') || path.starts_with('\\') || path.contains(':') {
        return false;
    }
    !path.split(|c| c == '/' || c == '\\').any(|segment| segment == "..")
}

pub struct Resources {
    override_dir: Option<PathBuf>,
}

impl Resources {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Resources { override_dir }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Write embedded defaults into the override directory, keeping existing files
    /// Returns the number of files written
    pub fn deploy_defaults(&self) -> Result<usize, LaunchError> {
        let Some(dir) = &self.override_dir else {
            return Ok(0);
        };

        let mut written = 0;
        let mut paths: Vec<_> = EMBEDDED.keys().copied().collect();
        paths.sort_unstable();

        for path in paths {
            let target = dir.join(path);
            if target.exists() {
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, EMBEDDED[path])?;
            log::info!("RESOURCES: deployed {}", target.display());
            written += 1;
        }

        Ok(written)
    }
}

impl ResourceResolver for Resources {
    fn locate(&self, path: &str) -> Option<ResourceHandle> {
        if !is_safe_path(path) {
            log::warn!("RESOURCES: rejected unsafe path {:?}", path);
            return None;
        }

        if let Some(dir) = &self.override_dir {
            let file = dir.join(path);
            if file.is_file() {
                return Some(ResourceHandle { path: path.to_string(), origin: Origin::File(file) });
            }
        }

        EMBEDDED.get(path).map(|bytes| ResourceHandle {
            path: path.to_string(),
            origin: Origin::Embedded(*bytes),
        })
    }
}

// ============================================================================
// SECTION 4: In-memory resolver for tests
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("godot-launcher-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_embedded_lookup() {
        let resources = Resources::new(None);
        let handle = resources.locate("menus/tab_menu.xml").unwrap();
        assert_eq!(handle.url(), "embedded:/menus/tab_menu.xml");
        assert!(handle.read_string().unwrap().contains("<item"));
        assert!(resources.locate("menus/nope.xml").is_none());
    }

    #[test]
    fn test_require_missing_is_error() {
        let resources = Resources::new(None);
        assert!(matches!(
            resources.require("icons/missing.png"),
            Err(LaunchError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_unsafe_paths_never_resolve() {
        assert!(!is_safe_path("../secret"));
        assert!(!is_safe_path("menus/../../secret"));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path("C:\\Windows"));
        assert!(!is_safe_path(""));
        assert!(is_safe_path("sections/engines_section.xml"));

        let resources = Resources::new(None);
        assert!(resources.locate("menus/../menus/tab_menu.xml").is_none());
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = scratch_dir("override");
        fs::create_dir_all(dir.join("menus")).unwrap();
        fs::write(dir.join("menus/tab_menu.xml"), "<tabs/>").unwrap();

        let resources = Resources::new(Some(dir.clone()));
        let handle = resources.locate("menus/tab_menu.xml").unwrap();
        assert!(handle.url().starts_with("file://"));
        assert_eq!(handle.read_string().unwrap(), "<tabs/>");

        // Files absent from the override fall back to embedded
        let handle = resources.locate("menus/tray_menu.xml").unwrap();
        assert!(handle.url().starts_with("embedded:"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_deploy_keeps_user_files() {
        let dir = scratch_dir("deploy");
        fs::create_dir_all(dir.join("menus")).unwrap();
        fs::write(dir.join("menus/tab_menu.xml"), "<tabs/>").unwrap();

        let resources = Resources::new(Some(dir.clone()));
        let written = resources.deploy_defaults().unwrap();
        assert_eq!(written, EMBEDDED.len() - 1);
        assert_eq!(fs::read_to_string(dir.join("menus/tab_menu.xml")).unwrap(), "<tabs/>");
        assert!(dir.join("icons/app_icon.png").is_file());

        // Second deployment has nothing left to write
        assert_eq!(resources.deploy_defaults().unwrap(), 0);

        let _ = fs::remove_dir_all(&dir);
    }
}
