// A tiny stderr logger for the `log` crate. Filtering is left to
// `log::set_max_level`, so the verbosity flag is the only knob.

use log::{self, Log};

#[derive(Debug)]
pub struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Logger {
    /// Install the logger globally at the level picked by `-v` count
    pub fn init(verbosity: u8) -> Result<(), log::SetLoggerError> {
        log::set_logger(LOGGER)?;
        log::set_max_level(level_for(verbosity));
        Ok(())
    }
}

/// No flag shows warnings only, `-v` adds debug output, `-vv` adds tracing
fn level_for(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        match record.line() {
            Some(line) => eprintln!(
                "{}|{}:{}: {}",
                record.level(),
                record.target(),
                line,
                record.args()
            ),
            None => eprintln!("{}|{}: {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), log::LevelFilter::Warn);
        assert_eq!(level_for(1), log::LevelFilter::Debug);
        assert_eq!(level_for(2), log::LevelFilter::Trace);
        assert_eq!(level_for(9), log::LevelFilter::Trace);
    }
}
