// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Host platform detection and the supported-platform gate

use crate::glge_error::LaunchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
    Unknown,
}

impl Platform {
    /// Classify an OS name ("windows", "Windows 10", "linux", "macos", "Darwin", ...)
    pub fn from_os_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("win") && !name.contains("darwin") {
            Platform::Windows
        } else if name.contains("linux") || name.contains("nux") {
            Platform::Linux
        } else if name.contains("darwin") || name.contains("mac") {
            Platform::MacOS
        } else {
            Platform::Unknown
        }
    }

    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
            Platform::Unknown => "unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux)
    }

    pub fn check_supported(self) -> Result<Self, LaunchError> {
        if self.is_supported() {
            Ok(self)
        } else {
            Err(LaunchError::UnsupportedPlatform { platform: self.name().to_string() })
        }
    }
}
