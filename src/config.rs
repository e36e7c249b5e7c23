use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub payment_delay_ms: u64,
    pub payment_success_rate: f64,
    pub platform_fee: f64,
    pub flat_delivery_cost: f64,
    pub default_distance_km: f64,
    pub delivery_eta_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            event_buffer_size: 1024,
            payment_delay_ms: 2000,
            payment_success_rate: 0.9,
            platform_fee: 2.0,
            flat_delivery_cost: 165.0,
            default_distance_km: 50.0,
            delivery_eta_minutes: 45,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            payment_delay_ms: parse_or_default("PAYMENT_DELAY_MS", defaults.payment_delay_ms)?,
            payment_success_rate: parse_or_default(
                "PAYMENT_SUCCESS_RATE",
                defaults.payment_success_rate,
            )?
            .clamp(0.0, 1.0),
            platform_fee: parse_or_default("PLATFORM_FEE", defaults.platform_fee)?,
            flat_delivery_cost: parse_or_default("FLAT_DELIVERY_COST", defaults.flat_delivery_cost)?,
            default_distance_km: parse_or_default(
                "DEFAULT_DISTANCE_KM",
                defaults.default_distance_km,
            )?,
            delivery_eta_minutes: parse_or_default(
                "DELIVERY_ETA_MINUTES",
                defaults.delivery_eta_minutes,
            )?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
