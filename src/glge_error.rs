// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Launcher error taxonomy
///
/// `LaunchError` is everything that can abort the startup sequence. Per-entry
/// section failures use `SkipReason` instead and never leave the loader.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("\"{platform}\" platform is not supported yet")]
    UnsupportedPlatform { platform: String },

    #[error("resource not found: {path}")]
    ResourceNotFound { path: String },

    #[error("invalid XML in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("cannot decode image {path}: {message}")]
    Image { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment error: {0}")]
    Environment(String),

    #[error("another launcher instance is already running")]
    AlreadyRunning,

    #[error("no display available")]
    NoDisplay,

    #[error("tray error: {0}")]
    Tray(String),

    #[error("window error: {0}")]
    Window(String),
}

impl LaunchError {
    pub fn xml(path: &str, message: impl Into<String>) -> Self {
        LaunchError::Xml { path: path.to_string(), message: message.into() }
    }

    pub fn not_found(path: &str) -> Self {
        LaunchError::ResourceNotFound { path: path.to_string() }
    }
}

/// Why a single manifest entry produced no tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingSection,
    Unresolved(String),
    Instantiation(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "missing name attribute"),
            SkipReason::MissingSection => write!(f, "missing section attribute"),
            SkipReason::Unresolved(path) => write!(f, "section resource {} not found", path),
            SkipReason::Instantiation(msg) => write!(f, "section failed to build: {}", msg),
        }
    }
}
