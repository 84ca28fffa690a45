use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::scoring::{LengthPolicy, DEFAULT_SEED};
use crate::sealing::{DEFAULT_KEY_BITS, MIN_KEY_BITS};

pub const DEFAULT_DB_PATH: &str = "base_datos_candidatos.json";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Deployment stage; only affects defaults and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the service and CLI read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub scoring: ScoringConfig,
    pub sealing: SealingConfig,
    pub notify: NotifyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let path = PathBuf::from(var_or("CANDIDATE_DB_PATH", DEFAULT_DB_PATH));

        let seed_raw = var_or("SCORING_SEED", &DEFAULT_SEED.to_string());
        let seed = seed_raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidSeed(seed_raw.clone()))?;

        let policy_raw = var_or("SCORING_LENGTH_POLICY", "strict");
        let length_policy = policy_raw
            .parse::<LengthPolicy>()
            .map_err(|_| ConfigError::InvalidLengthPolicy(policy_raw.clone()))?;

        let bits_raw = var_or("SEALING_KEY_BITS", &DEFAULT_KEY_BITS.to_string());
        let key_bits = bits_raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|bits| *bits >= MIN_KEY_BITS && bits % 8 == 0)
            .ok_or_else(|| ConfigError::InvalidKeyBits(bits_raw.clone()))?;

        let key_path = optional_var("SEALING_KEY_PATH").map(PathBuf::from);

        let smtp_server = var_or("SMTP_SERVER", DEFAULT_SMTP_SERVER).trim().to_string();
        let smtp_port_raw = var_or("SMTP_PORT", &DEFAULT_SMTP_PORT.to_string());
        let smtp_port = smtp_port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidSmtpPort(smtp_port_raw.clone()))?;
        let username = optional_var("EMAIL_USUARIO");
        let password = env::var("EMAIL_PASSWORD").ok().filter(|value| !value.is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig { path },
            scoring: ScoringConfig {
                seed,
                length_policy,
            },
            sealing: SealingConfig { key_bits, key_path },
            notify: NotifyConfig {
                smtp_server,
                smtp_port,
                username,
                password,
            },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
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

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the candidate database file.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub seed: u32,
    pub length_policy: LengthPolicy,
}

/// Key size for fresh key pairs; with a key path the pair is reused across runs.
#[derive(Debug, Clone)]
pub struct SealingConfig {
    pub key_bits: usize,
    pub key_path: Option<PathBuf>,
}

/// SMTP delivery settings. The account user doubles as the sender address.
#[derive(Clone)]
pub struct NotifyConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl NotifyConfig {
    /// User and password, when both are set; otherwise delivery stays disabled.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }
}

impl fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSeed(String),
    InvalidLengthPolicy(String),
    InvalidKeyBits(String),
    InvalidSmtpPort(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSeed(value) => {
                write!(f, "SCORING_SEED must be an unsigned 32-bit integer, got '{value}'")
            }
            ConfigError::InvalidLengthPolicy(value) => write!(
                f,
                "SCORING_LENGTH_POLICY must be 'strict' or 'repair', got '{value}'"
            ),
            ConfigError::InvalidKeyBits(value) => write!(
                f,
                "SEALING_KEY_BITS must be a multiple of 8 no smaller than {MIN_KEY_BITS}, got '{value}'"
            ),
            ConfigError::InvalidSmtpPort(value) => {
                write!(f, "SMTP_PORT must be a valid u16, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
