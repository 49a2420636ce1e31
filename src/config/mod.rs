// Process configuration
//
// Options come from CLI flags or environment variables (clap `env`), with a
// `.env` file loaded by the binary before parsing. The result is a read-only
// `AppConfig` built once at startup and handed to the server and pipeline.

pub mod credentials;

pub use credentials::ApiKey;

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is required. Set it in your environment or a local .env file.")]
    MissingCredential,

    #[error("Invalid temperature {0}: must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
}

/// LLM options shared by `serve` and `analyze`
#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used by both agents
    #[arg(long, env = "OPENAI_MODEL_NAME", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long, env = "OPENAI_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout for LLM calls, in seconds (unset = client default)
    #[arg(long, env = "OPENAI_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// HTTP server options
#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    /// Port to bind the server to
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Comma-separated list of allowed CORS origins ("*" allows any)
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:5173,http://localhost:8000"
    )]
    pub cors_origins: Vec<String>,

    /// Maximum request body size for uploads, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

/// Settings for the chat-completions client
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl LlmSettings {
    pub fn from_args(args: &LlmArgs) -> Result<Self, ConfigError> {
        if !(0.0..=2.0).contains(&args.temperature) {
            return Err(ConfigError::InvalidTemperature(args.temperature));
        }

        let base_url = args.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(args.base_url.clone()));
        }

        Ok(Self {
            model: args.model.trim().to_string(),
            temperature: args.temperature,
            base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Which origins the CORS layer lets through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse the configured origin list.
    ///
    /// Blank entries are dropped and trailing slashes removed, since browsers
    /// send `Origin` without one. A `*` entry anywhere means any origin.
    pub fn parse(raw: &[String]) -> Result<Self, ConfigError> {
        let mut origins = Vec::new();
        for entry in raw {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if entry == "*" {
                return Ok(CorsOrigins::Any);
            }
            if !(entry.starts_with("http://") || entry.starts_with("https://")) {
                return Err(ConfigError::InvalidCorsOrigin(entry.to_string()));
            }
            origins.push(entry.trim_end_matches('/').to_string());
        }
        Ok(CorsOrigins::List(origins))
    }

    pub fn display(&self) -> String {
        match self {
            CorsOrigins::Any => "*".to_string(),
            CorsOrigins::List(origins) if origins.is_empty() => "(none)".to_string(),
            CorsOrigins::List(origins) => origins.join(", "),
        }
    }
}

/// Settings for the HTTP listener
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: CorsOrigins,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: CorsOrigins::List(Vec::new()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerSettings {
    pub fn from_args(args: &ServerArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            cors_origins: CorsOrigins::parse(&args.cors_origins)?,
            max_upload_bytes: args.max_upload_bytes,
        })
    }
}

/// Read-only process configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub api_key: Option<ApiKey>,
    pub llm: LlmSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn new(api_key: Option<ApiKey>, llm: LlmSettings, server: ServerSettings) -> Self {
        Self {
            api_key,
            llm,
            server,
        }
    }

    /// Whether a non-empty credential was supplied at startup
    pub fn openai_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The credential, or the fatal startup error when it is absent
    pub fn require_credential(&self) -> Result<&ApiKey, ConfigError> {
        self.api_key.as_ref().ok_or(ConfigError::MissingCredential)
    }
}
