//! Category/level logging shared by all emulated components.
//!
//! # Architecture
//!
//! - **LogConfig**: process-wide configuration held in atomics
//! - **LogLevel**: hierarchical levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: which part of the machine is speaking (Bus, Cartridge, Video, Stubs)
//! - **log()**: lazy logging entry point used everywhere
//!
//! The bus decoder calls into this module on every cycle, so the disabled path
//! must stay at one atomic load and a compare. Message text is built by a
//! closure that only runs when the message will actually be written.
//!
//! # Usage
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Cartridge, LogLevel::Debug, || {
//!     format!("F8: switched to bank {}", 1)
//! });
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for different emulator components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Address decoding, mirroring, open bus
    Bus,
    /// Bank switching and cartridge RAM
    Cartridge,
    /// Video timing and display geometry
    Video,
    /// Unimplemented features/stubs
    Stubs,
}

impl LogCategory {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            LogCategory::Bus => 0,
            LogCategory::Cartridge => 1,
            LogCategory::Video => 2,
            LogCategory::Stubs => 3,
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Level applied to categories without an override
    global_level: AtomicU8,
    /// Per-category overrides (Off means "use the global level")
    category_levels: [AtomicU8; LogCategory::COUNT],
    /// Set while `sink` holds an open file
    file_logging_enabled: AtomicBool,
    sink: Mutex<Option<File>>,
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: [
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
            ],
            file_logging_enabled: AtomicBool::new(false),
            sink: Mutex::new(None),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    /// Set log level for a specific category
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    /// Get log level for a specific category
    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    ///
    /// A category override wins over the global level; an override of Off
    /// falls back to the global level.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for level in &self.category_levels {
            level.store(LogLevel::Off as u8, Ordering::Relaxed);
        }
    }

    /// Append log output to a file instead of stderr
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if let Ok(mut sink) = self.sink.lock() {
            *sink = Some(file);
            self.file_logging_enabled.store(true, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Close the log file and go back to stderr
    pub fn clear_log_file(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            *sink = None;
        }
        self.file_logging_enabled.store(false, Ordering::Relaxed);
    }

    fn write_message(&self, category: LogCategory, level: LogLevel, message: &str) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            if let Ok(mut sink) = self.sink.lock() {
                if let Some(file) = sink.as_mut() {
                    // Logging must never take the emulator down
                    if writeln!(file, "[{:?}/{:?}] {}", category, level, message).is_ok() {
                        return;
                    }
                }
            }
        }
        eprintln!("[{:?}/{:?}] {}", category, level, message);
    }
}

/// Log a message with the specified category and level
///
/// `message_fn` is only called when the category/level pair is enabled.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if config.should_log(category, level) {
        config.write_message(category, level, &message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("ERR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("3"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("verbose"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_category_override_wins() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Cartridge, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Cartridge, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Cartridge, LogLevel::Trace));

        // Bus has no override and follows the global level
        assert!(config.should_log(LogCategory::Bus, LogLevel::Error));
        assert!(!config.should_log(LogCategory::Bus, LogLevel::Warn));
    }

    #[test]
    fn test_off_messages_never_logged() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        assert!(!config.should_log(LogCategory::Video, LogLevel::Off));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Video, LogLevel::Info);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Video), LogLevel::Off);
    }

    #[test]
    fn test_disabled_log_skips_message_closure() {
        // The global config starts with everything off
        let mut called = false;
        log(LogCategory::Stubs, LogLevel::Trace, || {
            called = true;
            String::new()
        });
        assert!(!called);
    }
}
