use std::fmt;
use std::str::FromStr;

use log::trace;
use serde::{
    de::{value, IntoDeserializer},
    Deserialize, Serialize,
};

use crate::{Event, Snapshot};

/// Activity the vacuum reports, by the names the device client uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceState {
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
    #[default]
    Unknown,
}

impl DeviceState {
    pub fn from_name(name: &str) -> DeviceState {
        name.parse().unwrap_or(DeviceState::Unknown)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl FromStr for DeviceState {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s.into_deserializer())
    }
}

/// Where a value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Device,
    Optimistic,
}

/// A value together with whether the device has confirmed it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tracked<T> {
    pub value: T,
    pub confirmed: bool,
}

impl<T: PartialEq> Tracked<T> {
    fn update(&mut self, value: T, source: Source) -> bool {
        let changed = self.value != value;

        self.value = value;
        self.confirmed = source == Source::Device;

        changed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Mode,
    Cleaning,
    Charging,
    FanSpeed,
    BatteryLevel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StateUpdate {
    Snapshot(Snapshot),
    /// Mode and cleaning flag together, as a start or stop request sets them.
    Activity { mode: DeviceState, cleaning: bool },
    Mode(DeviceState),
    Cleaning(bool),
    Charging(bool),
    FanSpeed(u8),
    BatteryLevel(u8),
}

impl StateUpdate {
    /// Maps a pushed event to an update. Unknown keys and values of the wrong
    /// type yield `None`.
    pub fn from_event(event: &Event) -> Option<StateUpdate> {
        let value = &event.value;

        match event.key.as_str() {
            "state" => value.as_str().map(DeviceState::from_name).map(Self::Mode),
            "cleaning" => value.as_bool().map(Self::Cleaning),
            "charging" => value.as_bool().map(Self::Charging),
            "fanSpeed" => percent(value).map(Self::FanSpeed),
            "batteryLevel" => percent(value).map(Self::BatteryLevel),
            _ => None,
        }
    }
}

fn percent(value: &serde_json::Value) -> Option<u8> {
    value
        .as_u64()
        .filter(|value| *value <= 100)
        .map(|value| value as u8)
}

/// Last known state of the vacuum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccessoryState {
    pub connected: bool,
    pub mode: Tracked<DeviceState>,
    pub cleaning: Tracked<bool>,
    pub charging: Tracked<bool>,
    pub fan_speed: Tracked<u8>,
    pub battery_level: Tracked<u8>,
}

pub const LOW_BATTERY_THRESHOLD: u8 = 30;

impl AccessoryState {
    /// The only way state changes. Returns the fields whose value changed.
    pub fn apply(&mut self, update: StateUpdate, source: Source) -> Vec<Field> {
        trace!("applying {:?} from {:?}", update, source);

        let mut changed = vec![];
        let mut mark = |field, did_change| {
            if did_change {
                changed.push(field);
            }
        };

        match update {
            StateUpdate::Snapshot(snapshot) => {
                mark(Field::Mode, self.mode.update(snapshot.mode, source));
                mark(Field::Cleaning, self.cleaning.update(snapshot.cleaning, source));
                mark(Field::Charging, self.charging.update(snapshot.charging, source));
                mark(Field::FanSpeed, self.fan_speed.update(snapshot.fan_speed, source));
                mark(
                    Field::BatteryLevel,
                    self.battery_level.update(snapshot.battery_level, source),
                );
                self.connected = true;
            }
            StateUpdate::Activity { mode, cleaning } => {
                mark(Field::Mode, self.mode.update(mode, source));
                mark(Field::Cleaning, self.cleaning.update(cleaning, source));
            }
            StateUpdate::Mode(mode) => mark(Field::Mode, self.mode.update(mode, source)),
            StateUpdate::Cleaning(cleaning) => {
                mark(Field::Cleaning, self.cleaning.update(cleaning, source))
            }
            StateUpdate::Charging(charging) => {
                mark(Field::Charging, self.charging.update(charging, source))
            }
            StateUpdate::FanSpeed(speed) => {
                mark(Field::FanSpeed, self.fan_speed.update(speed, source))
            }
            StateUpdate::BatteryLevel(level) => {
                mark(Field::BatteryLevel, self.battery_level.update(level, source))
            }
        }

        changed
    }

    pub fn is_low_battery(&self) -> bool {
        self.battery_level.value < LOW_BATTERY_THRESHOLD
    }

    pub fn is_paused(&self) -> bool {
        self.mode.value == DeviceState::Paused
    }
}
