use std::fmt;
use std::net::Ipv4Addr;

use crate::device::DeviceError;

#[derive(Debug)]
pub enum Error {
    DevicesNotFound(Ipv4Addr),
    InvalidPacket(usize),
    InvalidChecksum,
    Device(DeviceError),
    UnexpectedResult(serde_json::Value),
    Io(std::io::Error),
    Json(serde_json::Error),
    Timeout(tokio::time::error::Elapsed),
    CryptoEncrypt(crypto::PadError),
    CryptoDecrypt(crypto::UnpadError),
}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        Self::Device(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::Timeout(err)
    }
}

impl From<crypto::PadError> for Error {
    fn from(err: crypto::PadError) -> Self {
        Self::CryptoEncrypt(err)
    }
}

impl From<crypto::UnpadError> for Error {
    fn from(err: crypto::UnpadError) -> Self {
        Self::CryptoDecrypt(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DevicesNotFound(ip) => {
                if ip.is_broadcast() {
                    write!(f, "devices not found")
                } else {
                    write!(f, "device {ip} not found")
                }
            }
            Self::InvalidPacket(size) => write!(f, "invalid packet of size {size}"),
            Self::InvalidChecksum => write!(f, "invalid data checksum"),
            Self::Device(err) => write!(f, "device error code {}: {}", err.code, err.message),
            Self::UnexpectedResult(value) => write!(f, "unexpected result {value}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Timeout(err) => write!(f, "timeout error: {err}"),
            Self::CryptoEncrypt(err) => write!(f, "crypto encrypt error: {err}"),
            Self::CryptoDecrypt(err) => write!(f, "crypto decrypt error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
