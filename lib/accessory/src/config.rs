use std::net::Ipv4Addr;

use crypto::{parse_token, Token};
use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_NAME: &str = "Vacuum Cleaner";

/// Accessory block as written by the user, either in JSON or through the
/// `VACUUM_*` environment variables. Nothing is checked until [`Config::validate`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "address")]
    pub ip: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub pause: bool,
}

/// Validated configuration the adapter runs with.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub name: String,
    pub ip: Ipv4Addr,
    pub token: Token<16>,
    pub pause: bool,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_env() -> Config {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let pause = lookup("VACUUM_PAUSE")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Config {
            name: lookup("VACUUM_NAME"),
            ip: lookup("VACUUM_IP"),
            token: lookup("VACUUM_TOKEN"),
            pause,
        }
    }

    pub fn validate(&self) -> Result<Settings> {
        let ip = self.ip.as_deref().ok_or(Error::MissingAddress)?;
        let token = self.token.as_deref().ok_or(Error::MissingToken)?;

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_NAME.to_string(),
        };

        Ok(Settings {
            name,
            ip: ip.trim().parse()?,
            token: parse_token::<16>(token.trim())?,
            pause: self.pause,
        })
    }
}
