//! Progress line sinks.
//!
//! Every component reports through a shared [`LineSink`]. The binary fans
//! each line out to the `log` facade (console) and to the run's log file.

use log::Level;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub trait LineSink: Send + Sync {
    fn emit(&self, level: Level, line: &str);

    fn info(&self, line: &str) {
        self.emit(Level::Info, line);
    }

    fn warn(&self, line: &str) {
        self.emit(Level::Warn, line);
    }

    fn error(&self, line: &str) {
        self.emit(Level::Error, line);
    }

    fn debug(&self, line: &str) {
        self.emit(Level::Debug, line);
    }
}

pub type SharedSink = Arc<dyn LineSink>;

/// Forwards lines to whatever logger the process installed
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LineSink for LogSink {
    fn emit(&self, level: Level, line: &str) {
        log::log!(level, "{}", line);
    }
}

/// Writes `[LEVEL] line` and flushes after each line
pub struct WriterSink {
    writer: Mutex<Box<dyn Write + Send>>,
    max_level: Level,
}

impl WriterSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            max_level: Level::Info,
        }
    }

    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

impl LineSink for WriterSink {
    fn emit(&self, level: Level, line: &str) {
        if level > self.max_level {
            return;
        }
        // write failures are logged, never propagated
        if let Ok(mut writer) = self.writer.lock() {
            if writeln!(writer, "[{}] {}", level, line).and_then(|_| writer.flush()).is_err() {
                log::warn!("Failed to write progress line to sink");
            }
        }
    }
}

/// Duplicates every line to each child, in the order they were added
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<SharedSink>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LineSink for FanOut {
    fn emit(&self, level: Level, line: &str) {
        for sink in &self.sinks {
            sink.emit(level, line);
        }
    }
}
