use anyhow::{Context, Result};
use std::{fmt::Display, str::FromStr};

use super::config_model::{Auth, BackendServer, Database, DotEnvyConfig};

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let backend_server = BackendServer {
        port: parsed(&lookup, "SERVER_PORT")?,
        body_limit: parsed(&lookup, "SERVER_BODY_LIMIT")?,
        timeout: parsed(&lookup, "SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required(&lookup, "DATABASE_URL")?,
        max_connections: parsed_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?,
    };

    let auth = Auth {
        jwt_secret: required(&lookup, "JWT_SECRET")?,
        token_ttl_seconds: parsed_or(&lookup, "JWT_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
    })
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("{key} is not set"))
}

fn parsed<F, T>(lookup: &F, key: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = required(lookup, key)?;
    raw.trim()
        .parse()
        .map_err(|err| anyhow::anyhow!("{key} is invalid: {err}"))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(_) => parsed(lookup, key),
        None => Ok(default),
    }
}
