use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, GeocodeStrategy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_positive = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_value::<u64>(var, &or_default(var, default))?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let gmail_address = require("GMAIL_ADDRESS")?;
    let gmail_app_password = require("GMAIL_APP_PASSWORD")?;
    let geoapify_api_key = require("GEOAPIFY_KEY")?;
    let groq_api_key = require("GROQ_API_KEY")?;

    let env = parse_environment(&or_default("CAREASSIST_ENV", "development"))?;
    let bind_addr = parse_value::<SocketAddr>(
        "CAREASSIST_BIND_ADDR",
        &or_default("CAREASSIST_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("CAREASSIST_LOG_LEVEL", "info");

    let http_timeout_secs = parse_positive("CAREASSIST_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "CAREASSIST_USER_AGENT",
        "careassist/0.1 (healthcare-assistant)",
    );
    let geoapify_base_url = or_default("CAREASSIST_GEOAPIFY_BASE_URL", "https://api.geoapify.com/");
    let chat_base_url = or_default(
        "CAREASSIST_CHAT_BASE_URL",
        "https://api.groq.com/openai/v1/",
    );
    let chat_model = or_default("CAREASSIST_CHAT_MODEL", "llama3-70b-8192");

    let smtp_host = or_default("CAREASSIST_SMTP_HOST", "smtp.gmail.com");
    let smtp_port = parse_value::<u16>(
        "CAREASSIST_SMTP_PORT",
        &or_default("CAREASSIST_SMTP_PORT", "465"),
    )?;

    let hospital_radius_m = narrow::<u32>(
        "CAREASSIST_HOSPITAL_RADIUS_M",
        parse_positive("CAREASSIST_HOSPITAL_RADIUS_M", "35000")?,
    )?;
    let hospital_limit = narrow::<u32>(
        "CAREASSIST_HOSPITAL_LIMIT",
        parse_positive("CAREASSIST_HOSPITAL_LIMIT", "10")?,
    )?;
    let route_concurrency = narrow::<usize>(
        "CAREASSIST_ROUTE_CONCURRENCY",
        parse_positive("CAREASSIST_ROUTE_CONCURRENCY", "1")?,
    )?;
    let geocode_strategy =
        parse_geocode_strategy(&or_default("CAREASSIST_GEOCODE_STRATEGY", "first"))?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gmail_address,
        gmail_app_password,
        geoapify_api_key,
        groq_api_key,
        http_timeout_secs,
        user_agent,
        geoapify_base_url,
        chat_base_url,
        chat_model,
        smtp_host,
        smtp_port,
        hospital_radius_m,
        hospital_limit,
        route_concurrency,
        geocode_strategy,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn narrow<T: TryFrom<u64>>(var: &str, value: u64) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: format!("{value} is out of range"),
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values are rejected so a typo cannot silently fall back to
/// development behaviour.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAREASSIST_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_geocode_strategy(s: &str) -> Result<GeocodeStrategy, ConfigError> {
    match s {
        "first" => Ok(GeocodeStrategy::FirstMatch),
        "confidence" => Ok(GeocodeStrategy::HighestConfidence),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAREASSIST_GEOCODE_STRATEGY".to_string(),
            reason: format!("expected \"first\" or \"confidence\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
