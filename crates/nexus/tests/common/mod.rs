//! In-memory `log` backend shared by the integration tests
//!
//! Records are tagged with the emitting thread so tests running in parallel
//! only see their own output.

#![allow(dead_code)]

use std::sync::{Mutex, Once, PoisonError};
use std::thread::{self, ThreadId};

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((thread::current().id(), record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

/// Install the capturing backend once per test binary
pub fn install() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other backend in this test binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Records emitted by the current thread, oldest first
pub fn records() -> Vec<(Level, String)> {
    let current = thread::current().id();
    CAPTURE
        .records
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .filter(|(thread, _, _)| *thread == current)
        .map(|(_, level, message)| (*level, message.clone()))
        .collect()
}

/// Warning messages emitted by the current thread
pub fn warnings() -> Vec<String> {
    records()
        .into_iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message)
        .collect()
}
