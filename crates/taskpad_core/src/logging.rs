//! Process-wide log sink for taskpad.
//!
//! # Responsibility
//! - Route the `log` facade into rotating files under a host-chosen directory.
//! - Record panics as single-line log events.
//!
//! # Invariants
//! - The sink starts at most once; repeating the same settings is a no-op.
//! - Different settings after start are an error, never a silent switch.
//! - Log lines carry ids and sizes only, never note text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_BASENAME: &str = "taskpad";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 3;
const PANIC_SUMMARY_CHARS: usize = 160;

/// Accepted level spellings and the filter each one maps to.
const LEVEL_ALIASES: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
];

static ACTIVE: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    AlreadyActive {
        active: LogSettings,
        requested: LogSettings,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active as {} in `{}`; refusing {} in `{}`",
                active.level,
                active.dir.display(),
                requested.level,
                requested.dir.display()
            ),
            Self::Backend(message) => write!(f, "log backend failed: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Validated sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: &'static str,
    /// Absolute directory holding `taskpad*.log` files.
    pub dir: PathBuf,
}

impl LogSettings {
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, LoggingError> {
        let level = normalize_level(level)?;
        let raw_dir = log_dir.trim();
        if raw_dir.is_empty() {
            return Err(LoggingError::InvalidDirectory("path is empty".to_string()));
        }
        let dir = Path::new(raw_dir);
        if !dir.is_absolute() {
            return Err(LoggingError::InvalidDirectory(format!(
                "`{raw_dir}` is not absolute"
            )));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

struct ActiveSink {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts the file sink, or confirms it already runs with these settings.
///
/// # Errors
/// - `UnsupportedLevel` / `InvalidDirectory` for bad input.
/// - `AlreadyActive` when a different level or directory is running.
/// - `Backend` when the directory or logger cannot be set up.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let requested = LogSettings::parse(level, log_dir)?;
    let sink = ACTIVE.get_or_try_init(|| start_sink(requested.clone()))?;
    if sink.settings == requested {
        return Ok(());
    }
    Err(LoggingError::AlreadyActive {
        active: sink.settings.clone(),
        requested,
    })
}

/// Settings of the running sink, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|sink| sink.settings.clone())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .map(|(_, filter)| *filter)
        .ok_or(LoggingError::UnsupportedLevel(wanted))
}

fn start_sink(settings: LogSettings) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        LoggingError::Backend(format!("create `{}`: {err}", settings.dir.display()))
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(&settings.dir)
                .basename(LOG_BASENAME)
                .suppress_timestamp(),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=logging_start module=logging status=ok version={} os={} level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        settings.level,
        settings.dir.display()
    );

    Ok(ActiveSink {
        settings,
        _handle: handle,
    })
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        error!(
            "event=panic module=logging status=error location={} summary={}",
            location,
            summarize_panic(info.payload())
        );
        chained(info);
    }));
}

fn summarize_panic(payload: &(dyn Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>");
    one_line(text, PANIC_SUMMARY_CHARS)
}

/// Collapses whitespace runs and caps the result at `limit` characters.
fn one_line(text: &str, limit: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}
