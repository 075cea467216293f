use crate::data::{DEFAULT_TIME_LIMIT_SECONDS, DEFAULT_WORKERS, GenerationParams};
use log::warn;
use std::env;
use std::str::FromStr;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Service settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: String,
    pub workers: u32,
    pub time_limit_seconds: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            workers: DEFAULT_WORKERS,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
        }
    }
}

impl ServiceConfig {
    /// Loads `.env` if present, then reads `TIMETABLE_*` variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind: lookup("TIMETABLE_BIND").unwrap_or(defaults.bind),
            workers: parse_or("TIMETABLE_WORKERS", &lookup, defaults.workers, |w| *w > 0),
            time_limit_seconds: parse_or(
                "TIMETABLE_TIME_LIMIT_SECS",
                &lookup,
                defaults.time_limit_seconds,
                |t: &f64| t.is_finite() && *t > 0.0,
            ),
        }
    }

    /// Fills the time limit when the request left it unset. The worker count
    /// is always the service's own.
    pub fn apply_defaults(&self, params: &mut GenerationParams) {
        params.workers = Some(self.workers);
        params.time_limit_seconds = params.time_limit_seconds.or(Some(self.time_limit_seconds));
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Debug>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if valid(&value) => value,
            _ => {
                warn!("Ignoring invalid {}={:?}; using {:?}.", key, raw, default);
                default
            }
        },
    }
}
