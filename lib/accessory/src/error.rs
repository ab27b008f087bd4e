use std::fmt;

use crate::{CharacteristicId, Value};

#[derive(Debug)]
pub enum Error {
    MissingAddress,
    MissingToken,
    InvalidAddress(std::net::AddrParseError),
    InvalidToken(crypto::InvalidToken),
    Json(serde_json::Error),
    NotDiscovered,
    UnknownCharacteristic(CharacteristicId),
    ReadOnly(CharacteristicId),
    InvalidValue(CharacteristicId, Value),
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Self::InvalidAddress(err)
    }
}

impl From<crypto::InvalidToken> for Error {
    fn from(err: crypto::InvalidToken) -> Self {
        Self::InvalidToken(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "device ip address is not configured"),
            Self::MissingToken => write!(f, "device token is not configured"),
            Self::InvalidAddress(err) => write!(f, "invalid device ip address: {err}"),
            Self::InvalidToken(err) => write!(f, "invalid device token: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::NotDiscovered => write!(f, "device is not discovered yet"),
            Self::UnknownCharacteristic(id) => write!(f, "unknown characteristic {id}"),
            Self::ReadOnly(id) => write!(f, "characteristic {id} is read-only"),
            Self::InvalidValue(id, value) => write!(f, "invalid value {value:?} for {id}"),
        }
    }
}

impl std::error::Error for Error {}
