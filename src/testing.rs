//! Log capture for unit tests.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Routes every record into the current thread's buffer. The test harness
/// runs each test on its own thread, so tests never see each other's logs.
struct ThreadLogger;

impl Log for ThreadLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadLogger = ThreadLogger;
static INSTALL: Once = Once::new();

#[derive(Debug, Default)]
pub struct Logs(Vec<(Level, String)>);

impl Logs {
    pub fn warnings(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

/// Runs `f`, returning its result and everything it logged on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Logs) {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
    let result = f();
    let logs = RECORDS.with(|records| std::mem::take(&mut *records.borrow_mut()));
    (result, Logs(logs))
}
