use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{bail, Context};

#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub websocket: WebsocketSettings,
}

#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct WebsocketSettings {
    /// How often heartbeat pings are sent
    pub heartbeat_interval_secs: u64,
    /// How long before lack of client response causes a timeout
    pub client_timeout_secs: u64,
    /// Largest accepted inbound frame, in bytes
    pub max_frame_size: usize,
}

impl Default for WebsocketSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 10,
            client_timeout_secs: 20,
            max_frame_size: 1_000_000,
        }
    }
}

impl WebsocketSettings {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl Settings {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let application = ApplicationSettings::default();
        let websocket = WebsocketSettings::default();
        let settings = Settings {
            application: ApplicationSettings {
                host: parse_var(&lookup, "RELAY_HOST", application.host)?,
                port: parse_var(&lookup, "PORT", application.port)?,
            },
            websocket: WebsocketSettings {
                heartbeat_interval_secs: parse_var(
                    &lookup,
                    "RELAY_HEARTBEAT_INTERVAL_SECS",
                    websocket.heartbeat_interval_secs,
                )?,
                client_timeout_secs: parse_var(
                    &lookup,
                    "RELAY_CLIENT_TIMEOUT_SECS",
                    websocket.client_timeout_secs,
                )?,
                max_frame_size: parse_var(
                    &lookup,
                    "RELAY_MAX_FRAME_SIZE",
                    websocket.max_frame_size,
                )?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let ws = &self.websocket;
        if ws.heartbeat_interval_secs == 0 {
            bail!("RELAY_HEARTBEAT_INTERVAL_SECS must be positive");
        }
        if ws.client_timeout_secs <= ws.heartbeat_interval_secs {
            bail!(
                "RELAY_CLIENT_TIMEOUT_SECS ({}) must exceed the heartbeat interval ({})",
                ws.client_timeout_secs,
                ws.heartbeat_interval_secs
            );
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value {raw:?} for {key}")),
        None => Ok(default),
    }
}
