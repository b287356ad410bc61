//! Diagnostics sink handed to the editor and the build coordinator.
//!
//! Components never log through a global; they receive an
//! `Arc<dyn Diagnostics>` at construction and report through it. The default
//! sink forwards to the `log` facade, so binaries still configure output with
//! `env_logger`.

use std::sync::{Arc, Mutex};

use log::Level;

pub trait Diagnostics: Send + Sync {
    fn emit(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }
}

/// Forwards every message to the `log` facade under a fixed target.
#[derive(Debug, Clone)]
pub struct LogDiagnostics {
    target: String,
}

impl LogDiagnostics {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn shared(target: impl Into<String>) -> Arc<dyn Diagnostics> {
        Arc::new(Self::new(target))
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new("foundry")
    }
}

impl Diagnostics for LogDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<(Level, String)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, m)| m).collect()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((level, message.to_string()));
    }
}
