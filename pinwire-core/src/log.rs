//! Debug log sink
//!
//! The router reports what it does through a [`LogSink`]. The in-band sink
//! is [`DebugLog`]: a fixed buffer a client can read (and thereby clear)
//! via `GET /debug`. Firmware wraps it to echo entries to its own log.

use core::fmt::{self, Write};

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest single log line kept; longer lines are cut
pub const MAX_LINE_LEN: usize = 160;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Tag written in front of each line
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Leveled, append-only text log with drain-on-read
pub trait LogSink {
    /// Append one entry
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>);

    /// Write out everything buffered and clear it
    fn drain<W: Write>(&mut self, out: &mut W) -> fmt::Result;

    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

/// Debug log behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugSettings {
    /// Master switch
    pub enabled: bool,
    /// Accumulate entries; when off only the latest entry is kept
    pub store: bool,
    /// Also forward entries to the firmware's own log output
    pub echo: bool,
    /// Keep info entries
    pub info: bool,
    /// Keep warn entries
    pub warn: bool,
    /// Keep error entries
    pub error: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            store: false,
            echo: false,
            info: true,
            warn: true,
            error: true,
        }
    }
}

impl DebugSettings {
    /// Whether entries of `level` pass the filters
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.enabled
            && match level {
                LogLevel::Info => self.info,
                LogLevel::Warn => self.warn,
                LogLevel::Error => self.error,
            }
    }
}

/// In-memory debug log holding up to `N` bytes
///
/// When full, the oldest lines are dropped to make room.
pub struct DebugLog<const N: usize> {
    settings: DebugSettings,
    buffer: String<N>,
}

impl<const N: usize> DebugLog<N> {
    pub fn new(settings: DebugSettings) -> Self {
        Self {
            settings,
            buffer: String::new(),
        }
    }

    /// Buffered text
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Format one entry as a line, or `None` if the filters reject it
    pub fn format_line(
        &self,
        level: LogLevel,
        args: fmt::Arguments<'_>,
    ) -> Option<String<MAX_LINE_LEN>> {
        if !self.settings.accepts(level) {
            return None;
        }

        let mut line = String::<MAX_LINE_LEN>::new();
        // A line that does not fit is kept truncated
        let _ = write!(TruncatingWriter(&mut line), "[{}] {}", level.as_str(), args);
        if line.push('\n').is_err() {
            line.pop();
            let _ = line.push('\n');
        }
        Some(line)
    }

    fn append(&mut self, line: &str) {
        if !self.settings.store {
            self.buffer.clear();
        }

        while self.buffer.len() + line.len() > N && !self.buffer.is_empty() {
            self.drop_oldest_line();
        }

        let _ = self.buffer.push_str(line);
    }

    fn drop_oldest_line(&mut self) {
        let cut = match self.buffer.find('\n') {
            Some(i) => i + 1,
            None => self.buffer.len(),
        };
        let rest = String::try_from(&self.buffer[cut..]).unwrap_or_default();
        self.buffer = rest;
    }
}

impl<const N: usize> LogSink for DebugLog<N> {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        if let Some(line) = self.format_line(level, args) {
            self.append(&line);
        }
    }

    fn drain<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        let result = out.write_str(&self.buffer);
        self.buffer.clear();
        result
    }
}

/// Writes as much as fits and silently drops the rest
struct TruncatingWriter<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for TruncatingWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}
