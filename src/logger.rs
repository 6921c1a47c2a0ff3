//! Structured terminal logging with box-drawing output.
//!
//! Every line the CLI prints goes through the `log_*!` macros defined here so that
//! output keeps one visual shape:
//!
//! ```text
//! ┏ skycycle v0.1.0 ━━╸
//! ┃
//! ┣ Sun position
//! ┃   Sunrise: 05:00:00
//! ┣[WARNING] Settings could not be persisted
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - **`log_decorated!`** continues a block (`┣ message`).
//! - **`log_indented!`** prints details that belong to the line above (`┃   message`).
//! - **`log_pipe!`** inserts an empty `┃` line, mainly before a semantic message.
//! - **`log_version!`** / **`log_end!`** print the header and the final `╹`.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`** carry a
//!   colored `[LEVEL]` tag and should be preceded by `log_pipe!` when they start a block.
//! - **`log_error_exit!`** closes the output with `┗[ERROR]`.
//!
//! Logging can be switched off at runtime (tests, `--json` output) and redirected to a
//! file through [`Log::start_file_logging`]. When a simulated clock has been registered
//! with [`Log::set_time_source`], each line is prefixed with the simulated wall-clock time.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, OnceLock};

use crate::time_source::TimeSource;

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Clock used for simulation timestamps
static TIME_SOURCE: OnceLock<Arc<dyn TimeSource>> = OnceLock::new();

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Visual shape of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Decorated,
    Indented,
    BlockStart,
    Pipe,
    Version,
    End,
    Info,
    Debug,
    Warning,
    Error,
    ErrorExit,
    Critical,
}

/// Runtime controls for the logger.
pub struct Log;

impl Log {
    /// Enable or disable logging.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Register the clock whose time is stamped on every line while it is simulated.
    ///
    /// Only the first registration takes effect.
    pub fn set_time_source(source: Arc<dyn TimeSource>) {
        let _ = TIME_SOURCE.set(source);
    }

    /// Start file logging to the specified path.
    ///
    /// Output is written by a background thread until the returned guard is dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix for simulation mode, `[HH:MM:SS] `, or an empty string.
    pub fn timestamp_prefix() -> String {
        match TIME_SOURCE.get() {
            Some(source) if source.is_simulated() => {
                format!("[{}] ", source.now().format("%H:%M:%S"))
            }
            _ => String::new(),
        }
    }
}

/// Guard for file logging that flushes and joins the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Render one line in the given style, without the trailing newline handling of `emit`.
pub fn render(style: LineStyle, prefix: &str, message: &str) -> String {
    match style {
        LineStyle::Decorated => format!("{prefix}┣ {message}\n"),
        LineStyle::Indented => format!("{prefix}┃   {message}\n"),
        LineStyle::BlockStart => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        LineStyle::Pipe => format!("{prefix}┃\n"),
        LineStyle::Version => format!("{prefix}┏ {message} ━━╸\n"),
        LineStyle::End => format!("{prefix}╹\n"),
        LineStyle::Info => format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
        LineStyle::Debug => format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
        LineStyle::Warning => format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
        LineStyle::Error => format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
        LineStyle::ErrorExit => format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
        LineStyle::Critical => format!("{prefix}┣[\x1b[31mCRITICAL\x1b[0m] {message}\n"),
    }
}

/// Format and route a line. Used by the macros.
pub fn emit(style: LineStyle, args: fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    let line = render(style, &prefix, &args.to_string());
    write_output(&line);
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Skip through the terminating 'm'
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Send text to the log file when file logging is active, otherwise to stdout.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_style {
    ($style:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::LineStyle::$style, format_args!($fmt $($arg)*))
    };
    ($style:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::LineStyle::$style, format_args!("{}", $expr))
    };
}

/// Log a message that continues the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => { $crate::__log_with_style!(Decorated, $($arg)+) };
}

/// Log a detail line nested under the previous message.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_with_style!(Indented, $($arg)+) };
}

/// Log a message that starts a new block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_with_style!(BlockStart, $($arg)+) };
}

/// Log an empty pipe line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::LineStyle::Pipe, format_args!(""))
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            $crate::logger::LineStyle::Version,
            format_args!("skycycle v{}", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::LineStyle::End, format_args!(""))
    };
}

/// Log an informational message.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_with_style!(Info, $($arg)+) };
}

/// Log a debug message.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_with_style!(Debug, $($arg)+) };
}

/// Log a warning message.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log_with_style!(Warning, $($arg)+) };
}

/// Log an error message.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_with_style!(Error, $($arg)+) };
}

/// Log an error that terminates the output.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => { $crate::__log_with_style!(ErrorExit, $($arg)+) };
}

/// Log a critical message.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => { $crate::__log_with_style!(Critical, $($arg)+) };
}
