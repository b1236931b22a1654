use chrono::{DateTime, Local};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;

pub const LOG_LEVEL_ENV: &str = "RGENPROMPT_LOG_LEVEL";

static PROMPT_LOGGER: Lazy<PromptLogger> = Lazy::new(PromptLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::from_env())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level;
    PROMPT_LOGGER.update_config(config)?;

    log::set_logger(&*PROMPT_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    fn admits(&self, level: Level) -> bool {
        LogLevel::from(level) >= *self
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

/// One rendered log line. Serialized as-is when JSON output is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
    pub request_id: Option<String>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            timestamp: Local::now(),
            level: record.level().into(),
            message: record.args().to_string(),
            module: record.module_path().unwrap_or("unknown").to_string(),
            file: record.file().unwrap_or("unknown").to_string(),
            line: record.line().unwrap_or(0),
            request_id: current_request_id(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_module: bool,
    pub show_file_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_module: true,
            show_file_location: false,
            timestamp_format: "%H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the level taken from `RGENPROMPT_LOG_LEVEL`. An
    /// unreadable value falls back to info.
    pub fn from_env() -> Self {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(LogLevel::Info);
        Self::default().with_level(level)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            log_file_path: Some("rgenprompt.log".to_string()),
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

/// Colored `log` backend. Writes to stderr so the interactive form on
/// stdout stays readable.
pub struct PromptLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl PromptLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };

        *self
            .log_file
            .lock()
            .map_err(|_| "log file lock poisoned".to_string())? = file;
        *self
            .config
            .lock()
            .map_err(|_| "logger config lock poisoned".to_string())? = new_config;
        Ok(())
    }

    fn render(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(entry).unwrap_or_default();
        }

        let paint = |text: String, style: fn(ColoredString) -> ColoredString| {
            if config.show_colors {
                style(text.normal()).to_string()
            } else {
                text
            }
        };

        let mut output = paint(
            entry.timestamp.format(&config.timestamp_format).to_string(),
            |s| s.bright_black(),
        );

        let level = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };
        if config.show_colors {
            output.push_str(&format!(" [{}] ", level.color(entry.level.color()).bold()));
        } else {
            output.push_str(&format!(" [{}] ", level));
        }

        if config.show_module && !entry.module.is_empty() {
            output.push_str(&paint(format!("{}: ", entry.module), |s| s.bright_blue()));
        }

        output.push_str(&entry.message);

        if let Some(request_id) = &entry.request_id {
            output.push_str(&paint(format!(" [req:{}]", request_id), |s| s.bright_yellow()));
        }

        if config.show_file_location {
            output.push_str(&paint(
                format!(" ({}:{})", entry.file, entry.line),
                |s| s.bright_black(),
            ));
        }

        output
    }
}

impl log::Log for PromptLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .lock()
            .map(|config| config.min_level.admits(metadata.level()))
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(config) = self.config.lock() else {
            return;
        };

        let entry = LogEntry::from_record(record);
        let line = self.render(&entry, &config);
        eprintln!("{}", line);

        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                // Files never get ANSI escapes.
                let plain = if config.show_colors && !config.output_json {
                    self.render(&entry, &config.clone().with_colors(false))
                } else {
                    line
                };
                let _ = writeln!(file, "{}", plain);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

static REQUEST_ID: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

fn current_request_id() -> Option<String> {
    REQUEST_ID.lock().ok().and_then(|id| id.clone())
}

/// Tags every log line with a fresh request id until dropped. Interactions
/// run one at a time, so a single slot is enough.
pub struct RequestScope {
    id: String,
}

impl RequestScope {
    pub fn begin() -> Self {
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        if let Ok(mut slot) = REQUEST_ID.lock() {
            *slot = Some(id.clone());
        }
        Self { id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        if let Ok(mut slot) = REQUEST_ID.lock() {
            if slot.as_deref() == Some(self.id.as_str()) {
                *slot = None;
            }
        }
    }
}

/// Logs how long a block took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} finished in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
}

pub fn log_config_info(config: &Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Endpoint: {}", config.gemini.base_url);
    log::info!("   Timeout: {}s", config.gemini.timeout_secs);
    log::info!(
        "   API key: {}",
        if config.gemini.resolve_api_key().is_ok() {
            "✅"
        } else {
            "❌"
        }
    );
    log::info!("   Default model: {}", config.default_model.id());
    log::info!("   Profile: {:?}", config.profile);
    log::info!("   Form layout: {:?}", config.form_layout);
    log::info!("   Wrap width: {}", config.wrap_width);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level: LogLevel::Warn,
            message: message.to_string(),
            module: "rgenprompt::studio".to_string(),
            file: "src/studio.rs".to_string(),
            line: 42,
            request_id: Some("abcd1234".to_string()),
        }
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Error.emoji(), "❌");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_filtering() {
        assert!(LogLevel::Info.admits(Level::Error));
        assert!(LogLevel::Info.admits(Level::Info));
        assert!(!LogLevel::Info.admits(Level::Debug));
        assert!(LogLevel::Trace.admits(Level::Trace));
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
        assert!(prod_config.log_file_path.is_some());
    }

    #[test]
    fn test_plain_render() {
        let logger = PromptLogger::new();
        let config = LoggerConfig::new().with_colors(false);
        let line = logger.render(&entry("slow reply"), &config);

        assert!(line.contains("[⚠️ WARN]"));
        assert!(line.contains("rgenprompt::studio: slow reply"));
        assert!(line.contains("[req:abcd1234]"));
        assert!(!line.contains("src/studio.rs"));
    }

    #[test]
    fn test_json_render() {
        let logger = PromptLogger::new();
        let config = LoggerConfig::new().with_json_output(true);
        let line = logger.render(&entry("slow reply"), &config);

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["message"], "slow reply");
        assert_eq!(value["request_id"], "abcd1234");
    }

    #[test]
    fn test_request_scope_sets_and_clears_id() {
        let id = {
            let scope = RequestScope::begin();
            assert_eq!(scope.id().len(), 8);
            scope.id().to_string()
        };
        assert_ne!(current_request_id(), Some(id));
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::development();
        assert!(init_with_config(config).is_ok());
    }
}
