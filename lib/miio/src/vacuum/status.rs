use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Status {
    pub battery: u8,
    pub state: State,
    pub fan_power: u8,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub clean_area: u64,
    #[serde(default)]
    pub clean_time: u64,
}

impl Status {
    /// `get_status` answers with a single-element array.
    pub fn from_result(result: Value) -> Result<Status> {
        let status = match result {
            Value::Array(mut values) if !values.is_empty() => values.swap_remove(0),
            other => return Err(Error::UnexpectedResult(other)),
        };

        Ok(serde_json::from_value(status)?)
    }

    pub fn is_cleaning(&self) -> bool {
        self.state.is_cleaning()
    }

    pub fn is_charging(&self) -> bool {
        self.state.is_charging()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "battery {}", self.battery)?;
        writeln!(f, "state {}", self.state)?;
        writeln!(f, "fan_power {}", self.fan_power)?;
        writeln!(f, "error_code {}", self.error_code)?;

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(from = "i64")]
pub enum State {
    Initiating,
    ChargerOffline,
    Waiting,
    RemoteControl,
    Cleaning,
    Returning,
    ManualControl,
    Charging,
    ChargingError,
    Paused,
    SpotCleaning,
    Error,
    ShuttingDown,
    Updating,
    Docking,
    GoingToLocation,
    ZoneCleaning,
    RoomCleaning,
    Full,
    Unknown(i64),
}

impl State {
    pub fn code(self) -> i64 {
        match self {
            State::Initiating => 1,
            State::ChargerOffline => 2,
            State::Waiting => 3,
            State::RemoteControl => 4,
            State::Cleaning => 5,
            State::Returning => 6,
            State::ManualControl => 7,
            State::Charging => 8,
            State::ChargingError => 9,
            State::Paused => 10,
            State::SpotCleaning => 11,
            State::Error => 12,
            State::ShuttingDown => 13,
            State::Updating => 14,
            State::Docking => 15,
            State::GoingToLocation => 16,
            State::ZoneCleaning => 17,
            State::RoomCleaning => 18,
            State::Full => 100,
            State::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            State::Initiating => "initiating",
            State::ChargerOffline => "charger-offline",
            State::Waiting => "waiting",
            State::RemoteControl => "remote-control",
            State::Cleaning => "cleaning",
            State::Returning => "returning",
            State::ManualControl => "manual-control",
            State::Charging => "charging",
            State::ChargingError => "charging-error",
            State::Paused => "paused",
            State::SpotCleaning => "spot-cleaning",
            State::Error => "error",
            State::ShuttingDown => "shutting-down",
            State::Updating => "updating",
            State::Docking => "docking",
            State::GoingToLocation => "going-to-location",
            State::ZoneCleaning => "zone-cleaning",
            State::RoomCleaning => "room-cleaning",
            State::Full => "full",
            State::Unknown(_) => "unknown",
        }
    }

    pub fn is_cleaning(self) -> bool {
        matches!(
            self,
            State::Cleaning | State::Returning | State::Paused | State::SpotCleaning
        )
    }

    pub fn is_charging(self) -> bool {
        matches!(self, State::Charging)
    }
}

impl From<i64> for State {
    fn from(code: i64) -> Self {
        match code {
            1 => State::Initiating,
            2 => State::ChargerOffline,
            3 => State::Waiting,
            4 => State::RemoteControl,
            5 => State::Cleaning,
            6 => State::Returning,
            7 => State::ManualControl,
            8 => State::Charging,
            9 => State::ChargingError,
            10 => State::Paused,
            11 => State::SpotCleaning,
            12 => State::Error,
            13 => State::ShuttingDown,
            14 => State::Updating,
            15 => State::Docking,
            16 => State::GoingToLocation,
            17 => State::ZoneCleaning,
            18 => State::RoomCleaning,
            100 => State::Full,
            _ => State::Unknown(code),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Unknown(code) => write!(f, "unknown ({code})"),
            _ => write!(f, "{}", self.name()),
        }
    }
}
