use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::{HookError, HookResult};

/// Settings for the `hookable` demo binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_event_name")]
    pub event_name: String,

    /// Listeners registered per thread.
    #[serde(default = "default_listeners")]
    pub listeners: usize,

    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Triggers fired in each round.
    #[serde(default = "default_triggers")]
    pub triggers: usize,

    /// Every n-th hook is released between the two rounds. 0 keeps all.
    #[serde(default = "default_release_every")]
    pub release_every: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            event_name: default_event_name(),
            listeners: default_listeners(),
            threads: default_threads(),
            triggers: default_triggers(),
            release_every: default_release_every(),
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> HookResult<T> {
    let file = File::open(path.as_ref())
        .map_err(|e| HookError::config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| HookError::config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> HookResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| HookError::config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

/// Reads `path` if it exists, otherwise returns the defaults.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> HookResult<DemoConfig> {
    if path.as_ref().exists() {
        from_file(path)
    } else {
        Ok(DemoConfig::default())
    }
}

fn default_event_name() -> String {
    "Demo".to_string()
}

fn default_listeners() -> usize {
    4
}

fn default_threads() -> usize {
    2
}

fn default_triggers() -> usize {
    3
}

fn default_release_every() -> usize {
    2
}
