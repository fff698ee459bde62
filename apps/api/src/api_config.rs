use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tenura_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCacheBackend {
    InMemory,
    Redis,
}

impl FromStr for AccessCacheBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "in_memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "ACCESS_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub password: String,
    pub institution_code: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub access_token_secret: String,
    pub access_token_ttl_hours: u32,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub access_cache_backend: AccessCacheBackend,
    pub redis_url: Option<String>,
    pub access_cache_key_prefix: String,
    pub access_cache_ttl_seconds: Option<u64>,
    pub access_resolution_timeout: Duration,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let access_token_secret = lookup("ACCESS_TOKEN_SECRET")
            .ok_or_else(|| AppError::Validation("ACCESS_TOKEN_SECRET is required".to_owned()))?;

        let access_cache_backend = lookup("ACCESS_CACHE_BACKEND")
            .map(|value| value.parse::<AccessCacheBackend>())
            .transpose()?
            .unwrap_or(AccessCacheBackend::InMemory);
        let redis_url = lookup("REDIS_URL");
        if access_cache_backend == AccessCacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when ACCESS_CACHE_BACKEND=redis".to_owned(),
            ));
        }

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
            lookup("BOOTSTRAP_INSTITUTION_CODE"),
        ) {
            (Some(username), Some(password), Some(institution_code)) => {
                Some(BootstrapAdminConfig {
                    username,
                    password,
                    institution_code,
                })
            }
            (None, None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_USERNAME, BOOTSTRAP_ADMIN_PASSWORD and \
                     BOOTSTRAP_INSTITUTION_CODE must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            access_token_secret,
            access_token_ttl_hours: parsed(&lookup, "ACCESS_TOKEN_TTL_HOURS", 24)?,
            api_host: lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: parsed(&lookup, "API_PORT", 3000)?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
            access_cache_backend,
            redis_url,
            access_cache_key_prefix: lookup("ACCESS_CACHE_KEY_PREFIX")
                .unwrap_or_else(|| "tenura:access".to_owned()),
            access_cache_ttl_seconds: Some(parsed(&lookup, "ACCESS_CACHE_TTL_SECONDS", 0)?)
                .filter(|seconds| *seconds > 0),
            access_resolution_timeout: Duration::from_millis(parsed(
                &lookup,
                "ACCESS_RESOLUTION_TIMEOUT_MS",
                2000,
            )?),
            bootstrap_admin,
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
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parsed<T>(lookup: impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}
