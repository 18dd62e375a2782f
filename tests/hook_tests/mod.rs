mod concurrency_test;

use std::sync::{Arc, Mutex};

/// Shared log that listeners append to.
pub type Recorder = Arc<Mutex<Vec<String>>>;

pub fn recorder() -> Recorder {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn recorded(log: &Recorder) -> Vec<String> {
    log.lock().unwrap().clone()
}
