//! Captures `log` records emitted on the current test thread.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct ThreadCapture;

impl Log for ThreadCapture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static CAPTURE: ThreadCapture = ThreadCapture;
static INIT: Once = Once::new();

/// Run `f` and return its value together with the records it logged.
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other logger in unit tests");
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.take();
    let value = f();
    (value, RECORDS.take())
}

/// True if some record at `level` contains `needle`.
pub(crate) fn logged(records: &[(Level, String)], level: Level, needle: &str) -> bool {
    records.iter().any(|(l, msg)| *l == level && msg.contains(needle))
}
