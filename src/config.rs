use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub summary: SummaryConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    /// Overrides the provider's default endpoint when set.
    pub api_base: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    /// Source characters sent to the model; longer documents are cut.
    pub max_source_chars: usize,
    /// Summaries a single session may request per minute (0 disables the limit).
    pub generate_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_secs: u64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub directory: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: String::new(),
            api_base: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_source_chars: 120_000,
            generate_per_minute: 6,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: "change-me".to_string(),
            ttl_secs: 3600,
            cookie_secure: false,
        }
    }
}

impl LLMConfig {
    /// The configured API key, if any. Without one the summarizer runs offline.
    pub fn active_api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", defaults.server.port)?,
                host: env::var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
                max_upload_bytes: parse_var::<usize>("MAX_UPLOAD_MB", 50)? * 1024 * 1024,
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or(defaults.llm.provider),
                api_key: env::var("LLM_API_KEY")
                    .or_else(|_| env::var("OPENAI_API_KEY"))
                    .unwrap_or_default(),
                api_base: env::var("LLM_API_BASE").ok().filter(|s| !s.trim().is_empty()),
                model: env::var("LLM_MODEL")
                    .or_else(|_| env::var("OPENAI_MODEL"))
                    .unwrap_or(defaults.llm.model),
                temperature: parse_var("LLM_TEMPERATURE", defaults.llm.temperature)?,
                timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
            },
            summary: SummaryConfig {
                max_source_chars: parse_var("MAX_SOURCE_CHARS", defaults.summary.max_source_chars)?,
                generate_per_minute: parse_var(
                    "GENERATE_PER_MINUTE",
                    defaults.summary.generate_per_minute,
                )?,
            },
            session: SessionConfig {
                secret: env::var("SECRET_KEY").unwrap_or(defaults.session.secret),
                ttl_secs: parse_var("SESSION_TTL_SECS", defaults.session.ttl_secs)?,
                cookie_secure: parse_var("SESSION_COOKIE_SECURE", defaults.session.cookie_secure)?,
            },
            logging: LoggingConfig {
                directory: env::var("LOG_DIR").ok().filter(|s| !s.trim().is_empty()),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
