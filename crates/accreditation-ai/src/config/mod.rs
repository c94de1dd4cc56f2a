use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub artifacts: ArtifactConfig,
    pub assessment: AssessmentConfig,
    pub advisory: AdvisoryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let artifacts = ArtifactConfig {
            model_path: path_var("ACCREDITATION_MODEL_PATH", "artifacts/accreditation_model.json"),
            labels_path: path_var("ACCREDITATION_LABELS_PATH", "artifacts/label_encoder.json"),
            columns_path: path_var(
                "ACCREDITATION_COLUMNS_PATH",
                "artifacts/training_columns.json",
            ),
            importance_component: env::var("ACCREDITATION_IMPORTANCE_COMPONENT")
                .unwrap_or_else(|_| "rf".to_string()),
        };

        let top_weaknesses = parse_var::<usize>("ACCREDITATION_TOP_WEAKNESSES", "10")?;

        let temperature = parse_var::<f32>("ADVISORY_TEMPERATURE", "0.7")?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidTemperature { value: temperature });
        }

        let advisory = AdvisoryConfig {
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .map(|raw| sanitize_api_key(&raw))
                .filter(|key| !key.is_empty()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("ADVISORY_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            temperature,
            timeout_secs: parse_var::<u64>("ADVISORY_TIMEOUT_SECS", "60")?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
            assessment: AssessmentConfig { top_weaknesses },
            advisory,
        })
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(name).unwrap_or_else(|_| default.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { name, value: raw })
}

/// Keys pasted from dashboards often carry zero-width spaces.
pub fn sanitize_api_key(raw: &str) -> String {
    raw.replace('\u{200b}', "").trim().to_string()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the pre-trained model artifacts loaded at startup.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub columns_path: PathBuf,
    /// Named sub-estimator consulted for feature importances on composite models.
    pub importance_component: String,
}

#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub top_weaknesses: usize,
}

/// Text-generation collaborator settings.
#[derive(Clone)]
pub struct AdvisoryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for AdvisoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidTemperature { value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be numeric, got '{value}'")
            }
            ConfigError::InvalidTemperature { value } => {
                write!(f, "ADVISORY_TEMPERATURE must be between 0 and 2, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidTemperature { .. } => None,
        }
    }
}
