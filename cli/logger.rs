use std::io::Write;

use log::Level;
use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;

use crate::print::RESET;

struct Logger;

static LOGGER: Logger = Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_str = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        let color = match record.level() {
            Level::Error => "\x1b[91m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[96m",
            Level::Debug | Level::Trace => RESET,
        };

        // stdout may carry the document, so diagnostics go to stderr.
        let _ = writeln!(
            std::io::stderr().lock(),
            "{}{:6}{} {}",
            color,
            level_str,
            RESET,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs the logger. Calling it more than once keeps the first level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
