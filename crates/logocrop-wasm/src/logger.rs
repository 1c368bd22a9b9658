//! `log` backend writing to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use web_sys::console;

/// Filters on the global max level, so `log::set_max_level` changes what
/// reaches the console after installation.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record).into();
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!(
        "{} [{}:{}] {}",
        record.level(),
        record.module_path().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// Route `log` records at `level` and above to the console.
///
/// Only the first call installs the logger; later calls return `false`.
pub fn init_console_logger(level: Level) -> bool {
    if log::set_boxed_logger(Box::new(ConsoleLogger)).is_err() {
        return false;
    }
    log::set_max_level(level.to_level_filter());
    true
}

/// Current maximum level, as a lowercase name.
pub fn max_level_name() -> String {
    match log::max_level() {
        LevelFilter::Off => "off".to_string(),
        level => level.as_str().to_ascii_lowercase(),
    }
}
