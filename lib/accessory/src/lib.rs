mod adapter;
mod characteristic;
mod config;
mod device;
mod error;
mod fan_speed;
mod retry;
mod service;
mod state;
mod vacuum;

#[cfg(test)]
mod fake;

pub use adapter::{Accessory, Adapter};
pub use characteristic::{
    CharacteristicId, CharacteristicType, ChargingState, Notification, StatusLowBattery, Value,
};
pub use config::{Config, Settings};
pub use device::{ConnectError, Connector, DeviceHandle, DeviceResult, ErasedError, Event, Snapshot};
pub use error::Error;
pub use fan_speed::FanSpeed;
pub use retry::RetryPolicy;
pub use service::{Service, ServiceType};
pub use state::{AccessoryState, DeviceState, Field, Source, StateUpdate, Tracked};
pub use vacuum::{MiioConnector, MiioHandle};

pub type Result<T> = std::result::Result<T, Error>;
