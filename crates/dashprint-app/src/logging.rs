//! Per-run file logger behind the `log` facade.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::AppError;

static RUN_LOGGER: OnceLock<RunLogger> = OnceLock::new();

/// Appends one line per record to a file created for this process run.
pub struct RunLogger {
    file: Mutex<File>,
    path: PathBuf,
    echo_stderr: bool,
}

impl RunLogger {
    /// Creates `<yyyymmdd_hhmmss>_log.txt` inside `dir`.
    ///
    /// # Errors
    /// Returns [`AppError::LogFile`] when the directory or file cannot be
    /// created.
    pub fn create(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(format!("{}_log.txt", timestamp_compact_utc()));
        fs::create_dir_all(dir).map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AppError::LogFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            echo_stderr: cfg!(debug_assertions),
        })
    }

    /// Path of this run's log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.echo_stderr {
            eprint!("{line}");
        }
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Info || metadata.target().starts_with("dashprint")
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            &timestamp_rfc3339_utc(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );
        self.write_line(&line);
        if record.level() == Level::Error {
            self.flush();
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Formats one log line: `timestamp | LEVEL | target | message`.
pub fn format_line(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("{timestamp} | {level} | {target} | {message}\n")
}

/// Directory holding run logs: `<local data>/dashprint/logs`.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dashprint")
        .join("logs")
}

/// Creates the run log in `dir` and installs it as the global logger.
///
/// Returns the log file path.
///
/// # Errors
/// Returns [`AppError::LogFile`] when the file cannot be created and
/// [`AppError::LoggerInstalled`] when a logger is already active.
pub fn install_run_logger(dir: &Path) -> Result<&'static Path, AppError> {
    let logger = RunLogger::create(dir)?;
    if RUN_LOGGER.set(logger).is_err() {
        return Err(AppError::LoggerInstalled);
    }
    let logger = RUN_LOGGER.get().ok_or(AppError::LoggerInstalled)?;
    log::set_logger(logger).map_err(|_| AppError::LoggerInstalled)?;
    log::set_max_level(if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    Ok(logger.path())
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn timestamp_rfc3339_utc() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp_compact_utc())
}
