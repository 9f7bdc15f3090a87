use crate::models::ActivityType;
use crate::validation::ActivityLimits;
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/activities.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub limits: ActivityLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            limits: ActivityLimits::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("ignoring invalid PORT {port:?}"),
            }
        }

        if let Some(path) = lookup("APP_DATA_PATH").filter(|path| !path.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }

        for activity_type in ActivityType::ALL {
            let key = limit_env_key(activity_type);
            let Some(raw) = lookup(&key) else {
                continue;
            };
            match raw.trim().parse::<f64>() {
                Ok(max) if max.is_finite() && max > 0.0 => {
                    config.limits = config.limits.with_max(activity_type, max);
                }
                _ => warn!("ignoring invalid {key} {raw:?}"),
            }
        }

        config
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// `HEALTH_MAX_WATER`, `HEALTH_MAX_STEPS`, `HEALTH_MAX_SLEEP`
pub fn limit_env_key(activity_type: ActivityType) -> String {
    format!("HEALTH_MAX_{}", activity_type.as_str().to_ascii_uppercase())
}
