use serde::{Deserialize, Serialize};

/// Main configuration structure for resume-ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Ingestion run settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Vision-model extraction endpoint configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Ingestion run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestConfig {
    /// Worker pool ceiling (1-64); a static limit, not elastic.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Filename marker that designates a profile sheet (metadata phase input).
    #[serde(default = "default_metadata_marker")]
    pub metadata_marker: String,

    /// Resume file extensions considered qualifying input.
    #[serde(default = "default_resume_extensions")]
    pub resume_extensions: Vec<String>,

    /// Directory for detailed per-session run log artifacts.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

const fn default_max_workers() -> usize {
    4
}

fn default_metadata_marker() -> String {
    "mikomiko".to_string()
}

fn default_resume_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string()]
}

fn default_logs_dir() -> String {
    ".resume-ingest/logs".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            metadata_marker: default_metadata_marker(),
            resume_extensions: default_resume_extensions(),
            logs_dir: default_logs_dir(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".resume-ingest/resume-ingest.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Vision-model extraction endpoint configuration.
///
/// The endpoint is an OpenAI-compatible chat completion service (vLLM serving
/// Qwen2.5-VL by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractionConfig {
    /// Hostname or IP where the model server is listening.
    #[serde(default = "default_extraction_host")]
    pub host: String,

    /// Port the OpenAI-compatible API is bound to.
    #[serde(default = "default_extraction_port")]
    pub port: u16,

    /// Model string passed to the server.
    #[serde(default = "default_extraction_model")]
    pub model: String,

    /// Sampling temperature for generation.
    #[serde(default = "default_extraction_temperature")]
    pub temperature: f64,

    /// Request timeout in seconds.
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_extraction_host() -> String {
    "http://localhost".to_string()
}

const fn default_extraction_port() -> u16 {
    8001
}

fn default_extraction_model() -> String {
    "Qwen/Qwen2.5-VL-7B-Instruct".to_string()
}

const fn default_extraction_temperature() -> f64 {
    0.1
}

const fn default_extraction_timeout_secs() -> u64 {
    120
}

impl ExtractionConfig {
    /// Full chat-completions endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/v1/chat/completions", self.host, self.port)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            host: default_extraction_host(),
            port: default_extraction_port(),
            model: default_extraction_model(),
            temperature: default_extraction_temperature(),
            timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.ingest.max_workers, 4);
        assert_eq!(config.ingest.metadata_marker, "mikomiko");
        assert_eq!(config.database.path, ".resume-ingest/resume-ingest.db");
        assert_eq!(
            config.extraction.endpoint(),
            "http://localhost:8001/v1/chat/completions"
        );
    }

    #[test]
    fn config_survives_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.ingest.max_workers, config.ingest.max_workers);
        assert_eq!(parsed.extraction.model, config.extraction.model);
    }
}
