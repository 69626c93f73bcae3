use std::str::FromStr;

use qrcode::EcLevel;
use serde::{Deserialize, Serialize};

use crate::observability::logging::{LogFormat, LogLevel};

/// Longest validity SigV4 allows for a presigned URL (7 days).
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Pixels per module; keeps the largest symbol well inside `u32` image dimensions.
pub const MAX_BOX_SIZE: u32 = 100;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub qr: QrConfig,
    pub cors: CorsConfig,
    pub log_format: LogFormat,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub key_prefix: String,
    pub presign_expiry_secs: u64,
}

// Credentials stay out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("key_prefix", &self.key_prefix)
            .field("presign_expiry_secs", &self.presign_expiry_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    pub max_version: i16,
    pub error_correction: ErrorCorrection,
    pub box_size: u32,
    pub quiet_zone: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// QR error-correction level as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn as_ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            _ => Err(ConfigError::InvalidValue {
                name: "QR_ERROR_CORRECTION",
                value: s.to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var(&var, "SERVER_PORT", defaults.server.port)?,
            },
            storage: StorageConfig {
                region: var("AWS_REGION").unwrap_or(defaults.storage.region),
                bucket: var("S3_BUCKET").unwrap_or(defaults.storage.bucket),
                access_key_id: var("AWS_ACCESS_KEY"),
                secret_access_key: var("AWS_SECRET_KEY"),
                endpoint: var("S3_ENDPOINT"),
                force_path_style: parse_var(
                    &var,
                    "S3_FORCE_PATH_STYLE",
                    defaults.storage.force_path_style,
                )?,
                key_prefix: var("QR_KEY_PREFIX")
                    .map(|p| p.trim_matches('/').to_string())
                    .unwrap_or(defaults.storage.key_prefix),
                presign_expiry_secs: parse_var(
                    &var,
                    "PRESIGN_EXPIRY_SECS",
                    defaults.storage.presign_expiry_secs,
                )?,
            },
            qr: QrConfig {
                max_version: parse_var(&var, "QR_MAX_VERSION", defaults.qr.max_version)?,
                error_correction: match var("QR_ERROR_CORRECTION") {
                    Some(raw) => raw.parse()?,
                    None => defaults.qr.error_correction,
                },
                box_size: parse_var(&var, "QR_BOX_SIZE", defaults.qr.box_size)?,
                quiet_zone: parse_var(&var, "QR_QUIET_ZONE", defaults.qr.quiet_zone)?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|raw| {
                        raw.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.cors.allowed_origins),
            },
            log_format: match var("LOG_FORMAT") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "LOG_FORMAT",
                    value: raw,
                })?,
                None => defaults.log_format,
            },
            log_level: parse_var(&var, "LOG_LEVEL", defaults.log_level)?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("Bucket name must not be empty".to_string()));
        }

        if self.storage.access_key_id.is_some() != self.storage.secret_access_key.is_some() {
            return Err(ConfigError::InvalidConfig(
                "AWS_ACCESS_KEY and AWS_SECRET_KEY must be set together".to_string(),
            ));
        }

        if self.storage.presign_expiry_secs == 0
            || self.storage.presign_expiry_secs > MAX_PRESIGN_EXPIRY_SECS
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Presign expiry must be between 1 and {} seconds",
                MAX_PRESIGN_EXPIRY_SECS
            )));
        }

        if !(1..=40).contains(&self.qr.max_version) {
            return Err(ConfigError::InvalidConfig(
                "QR max version must be between 1 and 40".to_string(),
            ));
        }

        if self.qr.box_size == 0 || self.qr.box_size > MAX_BOX_SIZE {
            return Err(ConfigError::InvalidConfig(format!(
                "QR box size must be between 1 and {}",
                MAX_BOX_SIZE
            )));
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "At least one CORS origin is required".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            storage: StorageConfig {
                region: "ap-south-1".to_string(),
                bucket: "qrcodebucket123".to_string(),
                access_key_id: None,
                secret_access_key: None,
                endpoint: None,
                force_path_style: false,
                key_prefix: "qr_codes".to_string(),
                presign_expiry_secs: 3600,
            },
            qr: QrConfig {
                max_version: 1,
                error_correction: ErrorCorrection::L,
                box_size: 10,
                quiet_zone: true,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            log_format: LogFormat::Pretty,
            log_level: LogLevel::Info,
        }
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
