use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can log messages at various levels.
///
/// Hosts that embed storekit without a `log` backend of their own implement
/// this trait and install it once with [`set_logger`].
///
/// # Examples
///
/// ```rust
/// use storekit_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    ///
    /// # Arguments
    ///
    /// * `level` - The severity level of the log message.
    /// * `message` - The log message to be recorded.
    fn log(&self, level: LogLevel, message: String);
}

/// Enumeration of possible log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Designates very low priority, often extremely detailed messages.
    Trace,
    /// Designates lower priority debugging information.
    Debug,
    /// Designates informational messages that highlight the progress of the application.
    Info,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates error events that might still allow the application to continue running.
    Error,
}

/// A logger that forwards `log` records to the host-provided [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let is_record_from_storekit = record
            .module_path()
            .is_some_and(|module_path| module_path.starts_with("storekit"));

        let is_debug_or_trace_level =
            record.level() == log::Level::Debug || record.level() == log::Level::Trace;

        // Debug/trace chatter from other crates is dropped.
        if is_debug_or_trace_level && !is_record_from_storekit {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Converts a `log::Level` to a [`LogLevel`].
const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

/// The host-provided logger, set once.
static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Only the first call takes effect; later calls print a notice and return.
/// If another `log` backend is already installed, records keep going there.
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

/// Installs [`ForeignLogger`] as the `log` backend.
///
/// # Errors
///
/// Returns a `log::SetLoggerError` if another backend was already installed.
fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const MARKER: &str = "bridge-check";

    #[derive(Default)]
    struct CapturingLogger {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl CapturingLogger {
        /// Records emitted by this module's test; other tests in the binary
        /// log through the same global backend.
        fn marked(&self) -> Vec<(LogLevel, String)> {
            self.records
                .lock()
                .expect("records lock")
                .iter()
                .filter(|(_, message)| message.starts_with(MARKER))
                .cloned()
                .collect()
        }
    }

    impl Logger for CapturingLogger {
        fn log(&self, level: LogLevel, message: String) {
            self.records
                .lock()
                .expect("records lock")
                .push((level, message));
        }
    }

    fn emit(level: log::Level, module: &'static str, text: &str) {
        log::Log::log(
            &ForeignLogger,
            &log::Record::builder()
                .level(level)
                .module_path_static(Some(module))
                .args(format_args!("{MARKER} {text}"))
                .build(),
        );
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(log::Level::Error), LogLevel::Error);
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Info), LogLevel::Info);
        assert_eq!(log_level(log::Level::Debug), LogLevel::Debug);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_set_logger_forwards_and_filters_records() {
        let first = Arc::new(CapturingLogger::default());
        let second = Arc::new(CapturingLogger::default());
        set_logger(first.clone());
        set_logger(second.clone());

        emit(log::Level::Debug, "storekit_core::sqlite", "own debug");
        emit(log::Level::Trace, "storekit_db::connection", "own trace");
        emit(log::Level::Debug, "hyper::client", "foreign debug");
        emit(log::Level::Trace, "mio::poll", "foreign trace");
        emit(log::Level::Warn, "hyper::client", "foreign warn");
        emit(log::Level::Info, "storekit_cli", "own info");

        assert_eq!(
            first.marked(),
            vec![
                (LogLevel::Debug, format!("{MARKER} own debug")),
                (LogLevel::Trace, format!("{MARKER} own trace")),
                (LogLevel::Warn, format!("{MARKER} foreign warn")),
                (LogLevel::Info, format!("{MARKER} own info")),
            ]
        );
        assert!(second.marked().is_empty());
        assert_eq!(log::max_level(), log::LevelFilter::Trace);
    }
}
