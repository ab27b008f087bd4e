use std::fmt;
use std::str::FromStr;

use serde::{
    de::{value, IntoDeserializer},
    Deserialize, Serialize,
};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::ServiceType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicType {
    On,
    RotationSpeed,
    BatteryLevel,
    ChargingState,
    StatusLowBattery,
    Manufacturer,
    Model,
    SerialNumber,
    Name,
}

impl fmt::Display for CharacteristicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl FromStr for CharacteristicType {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s.into_deserializer())
    }
}

/// A characteristic of a particular service, e.g. `fan/on`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct CharacteristicId {
    pub service: ServiceType,
    pub characteristic: CharacteristicType,
}

impl CharacteristicId {
    pub const fn new(service: ServiceType, characteristic: CharacteristicType) -> Self {
        Self {
            service,
            characteristic,
        }
    }
}

impl fmt::Display for CharacteristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.characteristic)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ChargingState {
    NotCharging = 0,
    Charging = 1,
    NotChargeable = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum StatusLowBattery {
    Normal = 0,
    Low = 1,
}

/// Characteristic value in its host representation. Enum codes come back as
/// [`Value::Int`] when parsed, since they are plain integers on the wire.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    ChargingState(ChargingState),
    StatusLowBattery(StatusLowBattery),
    String(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub id: CharacteristicId,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_id_display() {
        let id = CharacteristicId::new(ServiceType::Fan, CharacteristicType::RotationSpeed);
        assert_eq!(id.to_string(), "fan/rotation_speed");
    }

    #[test]
    fn test_characteristic_from_str() {
        assert_eq!(
            CharacteristicType::from_str("status_low_battery").unwrap(),
            CharacteristicType::StatusLowBattery
        );
        assert!(CharacteristicType::from_str("brightness").is_err());
    }

    #[test]
    fn test_value_serialization() {
        assert_eq!(serde_json::to_value(Value::Bool(true)).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(Value::Int(60)).unwrap(), json!(60));
        assert_eq!(
            serde_json::to_value(Value::ChargingState(ChargingState::NotChargeable)).unwrap(),
            json!(2)
        );
        assert_eq!(
            serde_json::to_value(Value::StatusLowBattery(StatusLowBattery::Low)).unwrap(),
            json!(1)
        );
        assert_eq!(
            serde_json::to_value(Value::String("Xiaomi".to_string())).unwrap(),
            json!("Xiaomi")
        );
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!(serde_json::from_str::<Value>("false").unwrap(), Value::Bool(false));
        assert_eq!(serde_json::from_str::<Value>("77").unwrap(), Value::Int(77));
        assert_eq!(serde_json::from_str::<Value>("-1").unwrap(), Value::Int(-1));
        assert_eq!(
            serde_json::from_str::<Value>("\"on\"").unwrap(),
            Value::String("on".to_string())
        );
        assert!(serde_json::from_str::<Value>("[1]").is_err());
    }
}
