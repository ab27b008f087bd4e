use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use crypto::Token;
use tokio::sync::mpsc;

use crate::DeviceState;

pub type ErasedError = Box<dyn std::error::Error + Send + Sync>;
pub type DeviceResult<T> = std::result::Result<T, ErasedError>;

/// State read from the device right after connecting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub mode: DeviceState,
    pub cleaning: bool,
    pub charging: bool,
    pub fan_speed: u8,
    pub battery_level: u8,
}

/// A property change pushed by the device, e.g. `batteryLevel = 42`.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug)]
pub enum ConnectError {
    Unreachable(ErasedError),
    UnsupportedDevice(String),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(err) => write!(f, "device unreachable: {err}"),
            Self::UnsupportedDevice(model) => write!(f, "unsupported device model {model}"),
        }
    }
}

impl std::error::Error for ConnectError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        address: Ipv4Addr,
        token: Token<16>,
        expected_model: &str,
    ) -> Result<Arc<dyn DeviceHandle>, ConnectError>;
}

/// Live connection to the vacuum.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    async fn state(&self) -> DeviceResult<Snapshot>;

    /// Stream of pushed property changes. Meant to be called once per handle.
    fn subscribe(&self) -> mpsc::Receiver<Event>;

    async fn start_cleaning(&self) -> DeviceResult<()>;
    async fn stop(&self) -> DeviceResult<()>;
    async fn pause(&self) -> DeviceResult<()>;
    async fn resume_cleaning(&self) -> DeviceResult<()>;
    async fn return_to_dock(&self) -> DeviceResult<()>;
    async fn set_fan_power(&self, level: u8) -> DeviceResult<()>;

    /// Asks the device to report its state again.
    async fn refresh(&self) -> DeviceResult<()>;
}
