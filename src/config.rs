//! Environment configuration
//!
//! Everything comes from environment variables; there are no CLI flags
//! and no config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::AppError;

/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Sweep period used when a room TTL is set without an interval
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Abandoned-room expiry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomExpiry {
    /// How long a room may wait for a second player
    pub ttl: Duration,
    /// How often to look for expired rooms
    pub sweep_interval: Duration,
}

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `None` keeps waiting rooms until their creator disconnects
    pub expiry: Option<RoomExpiry>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            expiry: None,
        }
    }
}

impl RelayConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }

        if let Some(host) = lookup("RELAY_HOST") {
            config.host = parse_var("RELAY_HOST", &host)?;
        }

        if let Some(ttl) = lookup("RELAY_ROOM_TTL_SECS") {
            let ttl: u64 = parse_var("RELAY_ROOM_TTL_SECS", &ttl)?;
            let sweep_interval = match lookup("RELAY_SWEEP_INTERVAL_SECS") {
                Some(secs) => {
                    let secs: u64 = parse_var("RELAY_SWEEP_INTERVAL_SECS", &secs)?;
                    if secs == 0 {
                        return Err(AppError::Config(
                            "RELAY_SWEEP_INTERVAL_SECS must be positive".to_string(),
                        ));
                    }
                    Duration::from_secs(secs)
                }
                None => DEFAULT_SWEEP_INTERVAL,
            };
            config.expiry = Some(RoomExpiry {
                ttl: Duration::from_secs(ttl),
                sweep_interval,
            });
        }

        Ok(config)
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {name} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RelayConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
        assert!(config.expiry.is_none());
    }

    #[test]
    fn test_port_and_host() {
        let config = load(&[("PORT", "8080"), ("RELAY_HOST", "127.0.0.1")]).unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(load(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("PORT", "70000")]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_room_expiry() {
        let config = load(&[("RELAY_ROOM_TTL_SECS", "600")]).unwrap();
        assert_eq!(
            config.expiry,
            Some(RoomExpiry {
                ttl: Duration::from_secs(600),
                sweep_interval: DEFAULT_SWEEP_INTERVAL,
            })
        );

        let config = load(&[
            ("RELAY_ROOM_TTL_SECS", "600"),
            ("RELAY_SWEEP_INTERVAL_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.expiry.unwrap().sweep_interval, Duration::from_secs(5));

        assert!(load(&[
            ("RELAY_ROOM_TTL_SECS", "600"),
            ("RELAY_SWEEP_INTERVAL_SECS", "0"),
        ])
        .is_err());
    }
}
