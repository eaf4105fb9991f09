//! Environment injection
//!
//! Writing into the process-wide environment is the whole point of the crate,
//! but it is also global mutable state, so it sits behind the [`EnvSink`]
//! trait. Production code uses [`ProcessEnv`]; tests swap in [`MemoryEnv`].

use std::collections::HashMap;
use std::sync::Mutex;

/// Destination for resolved secret values
pub trait EnvSink: Send + Sync {
    /// Assign a variable. Existing values are overwritten.
    fn set(&self, key: &str, value: &str);
}

/// The real process environment
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// In-memory environment double for tests and embedders that want to
/// inspect resolved values without touching the process environment
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

impl MemoryEnv {
    /// Create an empty in-memory environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable, if set
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.lock().expect("env lock poisoned").get(key).cloned()
    }

    /// Number of variables set
    pub fn len(&self) -> usize {
        self.vars.lock().expect("env lock poisoned").len()
    }

    /// Whether no variables have been set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EnvSink for MemoryEnv {
    fn set(&self, key: &str, value: &str) {
        self.vars
            .lock()
            .expect("env lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}
