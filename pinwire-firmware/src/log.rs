//! Debug log that also echoes to defmt

use core::fmt::{self, Write};

use defmt::Display2Format;
use pinwire_core::log::{DebugLog, DebugSettings, LogLevel, LogSink};

/// Bytes of debug log kept between `GET /debug` reads
pub const DEBUG_LOG_SIZE: usize = 1024;

/// [`DebugLog`] that forwards every entry to the defmt logger when
/// `echo` is set
pub struct EchoLog {
    inner: DebugLog<DEBUG_LOG_SIZE>,
    echo: bool,
}

impl EchoLog {
    pub fn new(settings: DebugSettings) -> Self {
        Self {
            inner: DebugLog::new(settings),
            echo: settings.echo,
        }
    }
}

impl LogSink for EchoLog {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        if self.echo {
            match level {
                LogLevel::Info => defmt::info!("{}", Display2Format(&args)),
                LogLevel::Warn => defmt::warn!("{}", Display2Format(&args)),
                LogLevel::Error => defmt::error!("{}", Display2Format(&args)),
            }
        }
        self.inner.log(level, args);
    }

    fn drain<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        self.inner.drain(out)
    }
}
