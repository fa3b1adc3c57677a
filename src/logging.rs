use chrono::Utc;
use serde_json::json;

use crate::utils::serialize_date;

/// Logger struct for handling structured logging
#[derive(Clone, Debug)]
pub struct Logger {
    request_id: String,
}

impl Logger {
    /// Create a new Logger instance
    ///
    /// # Arguments
    ///
    /// * `request_id` - A unique identifier for the current request
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Log an info message
    ///
    /// # Arguments
    ///
    /// * `message` - The log message
    /// * `data` - Optional additional data to include in the log
    pub fn info(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Info, message, data);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Warn, message, data);
    }

    /// Log an error message
    pub fn error(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(Level::Error, message, data);
    }

    fn log(&self, level: Level, message: &str, data: Option<serde_json::Value>) {
        let line = json!({
            "timestamp": serialize_date(&Utc::now()),
            "level": level.as_str(),
            "request_id": self.request_id,
            "message": message,
            "data": data
        })
        .to_string();

        emit(level, &line);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        fn emit(level: Level, line: &str) {
            match level {
                Level::Info => worker::console_log!("{}", line),
                Level::Warn => worker::console_warn!("{}", line),
                Level::Error => worker::console_error!("{}", line),
            }
        }
    } else {
        // Native builds (tests, tooling) have no JS console.
        fn emit(_level: Level, line: &str) {
            eprintln!("{}", line);
        }
    }
}

/// Macro to create a JSON object for additional log data
///
/// Usage: log_data!("key1" => "value1", "key2" => 42)
#[macro_export]
macro_rules! log_data {
    ($($key:literal => $value:expr),* $(,)?) => {
        Some(serde_json::json!({ $($key: $value),* }))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_data_builds_an_object() {
        let data = crate::log_data!("file" => "a.png", "size" => 42);
        assert_eq!(data, Some(json!({ "file": "a.png", "size": 42 })));
    }

    #[test]
    fn logger_keeps_request_id() {
        let logger = Logger::new("req-1");
        assert_eq!(logger.request_id(), "req-1");
        logger.info("hello", None);
    }
}
