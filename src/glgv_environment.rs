// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Launcher Environment
/// Process-wide state with an explicit initialize/teardown pairing
///
/// - config directory creation
/// - single-instance lock (a second launcher refuses to start)
///
/// Both calls are idempotent; teardown is safe after a failed or partial
/// initialize and safe to repeat.

use std::fs;
use std::path::PathBuf;

use single_instance::SingleInstance;

use crate::glge_error::LaunchError;

pub trait Environment {
    fn initialize(&mut self) -> Result<(), LaunchError>;
    fn teardown(&mut self);
}

pub struct AppEnvironment {
    root: PathBuf,
    instance_name: String,
    lock: Option<SingleInstance>,
}

impl AppEnvironment {
    pub fn new(root: PathBuf, instance_name: &str) -> Self {
        AppEnvironment {
            root,
            instance_name: instance_name.to_string(),
            lock: None,
        }
    }
}

impl Environment for AppEnvironment {
    fn initialize(&mut self) -> Result<(), LaunchError> {
        if self.lock.is_some() {
            return Ok(());
        }

        fs::create_dir_all(&self.root)?;

        let instance = SingleInstance::new(&self.instance_name)
            .map_err(|e| LaunchError::Environment(format!("single-instance lock failed: {}", e)))?;
        if !instance.is_single() {
            return Err(LaunchError::AlreadyRunning);
        }

        log::info!("ENV: initialized at {}", self.root.display());
        self.lock = Some(instance);
        Ok(())
    }

    fn teardown(&mut self) {
        if self.lock.take().is_some() {
            log::info!("ENV: released {}", self.instance_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> AppEnvironment {
        let root = std::env::temp_dir().join(format!("godot-launcher-env-{}-{}", name, std::process::id()));
        AppEnvironment::new(root, &format!("godot-launcher-test-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut environment = env("idempotent");
        environment.initialize().unwrap();
        environment.initialize().unwrap();
        assert!(environment.lock.is_some());
        assert!(environment.root.is_dir());
        environment.teardown();
        assert!(!environment.lock.is_some());
    }

    #[test]
    fn test_teardown_without_initialize() {
        let mut environment = env("teardown");
        environment.teardown();
        environment.teardown();
        assert!(!environment.lock.is_some());
    }

    #[test]
    fn test_second_instance_refused() {
        let mut first = env("second");
        first.initialize().unwrap();

        let mut second = env("second");
        assert!(matches!(second.initialize(), Err(LaunchError::AlreadyRunning)));
        second.teardown();

        first.teardown();
        // Lock released, a fresh instance may start
        let mut third = env("second");
        third.initialize().unwrap();
        third.teardown();
    }
}
