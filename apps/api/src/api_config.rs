use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use userhub_core::AppError;

const MIN_CLAIMS_SECRET_LENGTH: usize = 32;

/// Key material used to verify identity-provider tokens.
#[derive(Debug, Clone)]
pub enum TokenKeyConfig {
    /// PEM encoded RSA public key, RS256 tokens.
    Rs256PublicKey(String),
    /// Shared secret, HS256 tokens.
    Hs256Secret(String),
}

#[derive(Debug, Clone)]
pub enum EventPublisherConfig {
    Logging,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub token_key: TokenKeyConfig,
    pub jwt_audience: Option<String>,
    pub jwt_issuer: Option<String>,
    pub claims_shared_secret: String,
    pub bootstrap_token: String,
    pub event_publisher: EventPublisherConfig,
    pub event_topic_prefix: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let token_key = match (optional_env("JWT_PUBLIC_KEY"), optional_env("JWT_HS256_SECRET")) {
            (Some(public_key), _) => TokenKeyConfig::Rs256PublicKey(public_key),
            (None, Some(secret)) => TokenKeyConfig::Hs256Secret(secret),
            (None, None) => {
                return Err(AppError::Validation(
                    "JWT_PUBLIC_KEY or JWT_HS256_SECRET is required".to_owned(),
                ));
            }
        };

        let claims_shared_secret = required_non_empty_env("CLAIMS_SHARED_SECRET")?;
        if claims_shared_secret.len() < MIN_CLAIMS_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "CLAIMS_SHARED_SECRET must be at least {MIN_CLAIMS_SECRET_LENGTH} characters"
            )));
        }

        let event_publisher = match env::var("EVENT_PUBLISHER")
            .unwrap_or_else(|_| "logging".to_owned())
            .as_str()
        {
            "logging" => EventPublisherConfig::Logging,
            "redis" => EventPublisherConfig::Redis {
                redis_url: required_non_empty_env("REDIS_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "EVENT_PUBLISHER must be either 'logging' or 'redis', got '{other}'"
                )));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            token_key,
            jwt_audience: optional_env("JWT_AUDIENCE"),
            jwt_issuer: optional_env("JWT_ISSUER"),
            claims_shared_secret,
            bootstrap_token: required_non_empty_env("BOOTSTRAP_TOKEN")?,
            event_publisher,
            event_topic_prefix: optional_env("EVENT_TOPIC_PREFIX")
                .unwrap_or_else(|| "userhub".to_owned()),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
