use std::fmt;
use std::str::FromStr;

use serde::{
    de::{value, IntoDeserializer},
    Deserialize, Serialize,
};

use crate::CharacteristicType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    AccessoryInformation,
    Fan,
    Battery,
    PauseSwitch,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl FromStr for ServiceType {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s.into_deserializer())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Service {
    pub service_type: ServiceType,
    pub name: String,
    pub characteristics: Vec<CharacteristicType>,
}

impl Service {
    pub fn new(service_type: ServiceType, name: impl Into<String>) -> Self {
        Self {
            service_type,
            name: name.into(),
            characteristics: vec![],
        }
    }

    pub fn with(mut self, characteristic: CharacteristicType) -> Self {
        self.characteristics.push(characteristic);
        self
    }
}
