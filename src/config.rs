use std::fmt;
use thiserror::Error;

pub const ENDPOINT_VAR: &str = "AMPLIFY_DATA_GRAPHQL_ENDPOINT";
pub const REGION_VAR: &str = "AMPLIFY_DATA_REGION";
pub const API_KEY_VAR: &str = "AMPLIFY_DATA_API_KEY";
pub const AUTH_MODE_VAR: &str = "AMPLIFY_DATA_AUTH_MODE";
pub const STORE_VAR: &str = "SCHEDULE_STORE";
pub const BIND_VAR: &str = "BIND_ADDRESS";
pub const PORT_VAR: &str = "PORT";

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Amplify Data env vars missing: {}. Set them to enable persistent storage.", .0.join(", "))]
    MissingVars(Vec<&'static str>),
    #[error("unknown Amplify Data auth mode '{0}' (expected apiKey, iam, userPool, oidc or lambda)")]
    UnknownAuthMode(String),
    #[error("auth mode {0} is not supported by this server; use apiKey")]
    UnsupportedAuthMode(AuthMode),
    #[error("unknown SCHEDULE_STORE '{0}' (expected amplify or memory)")]
    UnknownStore(String),
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
}

/// Amplify Data authorization modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    ApiKey,
    Iam,
    UserPool,
    Oidc,
    Lambda,
}

impl AuthMode {
    pub fn parse(value: &str) -> Result<AuthMode, ConfigError> {
        match value {
            "apiKey" => Ok(AuthMode::ApiKey),
            "iam" => Ok(AuthMode::Iam),
            "userPool" => Ok(AuthMode::UserPool),
            "oidc" => Ok(AuthMode::Oidc),
            "lambda" => Ok(AuthMode::Lambda),
            other => Err(ConfigError::UnknownAuthMode(other.to_string())),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::ApiKey => "apiKey",
            AuthMode::Iam => "iam",
            AuthMode::UserPool => "userPool",
            AuthMode::Oidc => "oidc",
            AuthMode::Lambda => "lambda",
        };
        f.write_str(name)
    }
}

/// Connection settings for the hosted GraphQL store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmplifySettings {
    pub endpoint: String,
    pub region: String,
    pub api_key: String,
    pub auth_mode: AuthMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Amplify(AmplifySettings),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub bind_address: String,
    pub port: u16,
}

impl Config {
    /// Reads the process environment
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; blank values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = match var(STORE_VAR).as_deref().unwrap_or("amplify") {
            "amplify" => StoreConfig::Amplify(amplify_settings(&var)?),
            "memory" => StoreConfig::Memory,
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let port = match var(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            store,
            bind_address: var(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
        })
    }
}

fn amplify_settings<F>(var: &F) -> Result<AmplifySettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<&'static str> = [ENDPOINT_VAR, REGION_VAR, API_KEY_VAR]
        .into_iter()
        .filter(|name| var(*name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingVars(missing));
    }

    let auth_mode = match var(AUTH_MODE_VAR) {
        Some(mode) => AuthMode::parse(mode.trim())?,
        None => AuthMode::ApiKey,
    };
    if auth_mode != AuthMode::ApiKey {
        return Err(ConfigError::UnsupportedAuthMode(auth_mode));
    }

    Ok(AmplifySettings {
        endpoint: var(ENDPOINT_VAR).unwrap_or_default(),
        region: var(REGION_VAR).unwrap_or_default(),
        api_key: var(API_KEY_VAR).unwrap_or_default(),
        auth_mode,
    })
}
