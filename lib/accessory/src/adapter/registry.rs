use std::collections::BTreeMap;

use crate::{
    AccessoryState, CharacteristicId, CharacteristicType, ChargingState, Error, Field, Result,
    Service, ServiceType, Settings, StatusLowBattery, Value,
};

pub const MANUFACTURER: &str = "Xiaomi";
pub const MODEL_NAME: &str = "Robot Vacuum Cleaner";

type ReadFn = fn(&AccessoryState) -> Value;

pub enum Read {
    Static(Value),
    State(ReadFn),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Write {
    Power,
    Pause,
    RotationSpeed,
}

pub struct Binding {
    pub read: Read,
    pub write: Option<Write>,
    /// State fields the read depends on.
    fields: &'static [Field],
}

impl Binding {
    fn fixed(value: impl Into<String>) -> Self {
        Self {
            read: Read::Static(Value::String(value.into())),
            write: None,
            fields: &[],
        }
    }

    fn state(read: ReadFn, fields: &'static [Field]) -> Self {
        Self {
            read: Read::State(read),
            write: None,
            fields,
        }
    }

    fn writable(mut self, write: Write) -> Self {
        self.write = Some(write);
        self
    }

    pub fn read(&self, state: &AccessoryState) -> Value {
        match &self.read {
            Read::Static(value) => value.clone(),
            Read::State(read) => read(state),
        }
    }
}

fn read_on(state: &AccessoryState) -> Value {
    Value::Bool(state.cleaning.value)
}

fn read_rotation_speed(state: &AccessoryState) -> Value {
    Value::Int(state.fan_speed.value.into())
}

fn read_battery_level(state: &AccessoryState) -> Value {
    Value::Int(state.battery_level.value.into())
}

fn read_charging_state(state: &AccessoryState) -> Value {
    if state.charging.value {
        Value::ChargingState(ChargingState::Charging)
    } else {
        Value::ChargingState(ChargingState::NotCharging)
    }
}

fn read_status_low_battery(state: &AccessoryState) -> Value {
    if state.is_low_battery() {
        Value::StatusLowBattery(StatusLowBattery::Low)
    } else {
        Value::StatusLowBattery(StatusLowBattery::Normal)
    }
}

fn read_paused(state: &AccessoryState) -> Value {
    Value::Bool(state.is_paused())
}

/// Every characteristic the accessory exposes, keyed by id.
pub struct Registry {
    bindings: BTreeMap<CharacteristicId, Binding>,
    services: Vec<Service>,
}

impl Registry {
    pub fn new(settings: &Settings) -> Self {
        use CharacteristicType as C;

        let mut registry = Self {
            bindings: BTreeMap::new(),
            services: vec![],
        };

        let name = settings.name.as_str();

        registry.add(
            ServiceType::AccessoryInformation,
            name,
            [
                (C::Manufacturer, Binding::fixed(MANUFACTURER)),
                (C::Model, Binding::fixed(MODEL_NAME)),
                (C::SerialNumber, Binding::fixed(settings.ip.to_string())),
                (C::Name, Binding::fixed(name)),
            ],
        );

        registry.add(
            ServiceType::Fan,
            name,
            [
                (
                    C::On,
                    Binding::state(read_on, &[Field::Cleaning]).writable(Write::Power),
                ),
                (
                    C::RotationSpeed,
                    Binding::state(read_rotation_speed, &[Field::FanSpeed])
                        .writable(Write::RotationSpeed),
                ),
            ],
        );

        registry.add(
            ServiceType::Battery,
            &format!("{name} Battery"),
            [
                (
                    C::BatteryLevel,
                    Binding::state(read_battery_level, &[Field::BatteryLevel]),
                ),
                (
                    C::ChargingState,
                    Binding::state(read_charging_state, &[Field::Charging]),
                ),
                (
                    C::StatusLowBattery,
                    Binding::state(read_status_low_battery, &[Field::BatteryLevel]),
                ),
            ],
        );

        if settings.pause {
            registry.add(
                ServiceType::PauseSwitch,
                &format!("{name} Pause"),
                [(
                    C::On,
                    Binding::state(read_paused, &[Field::Mode]).writable(Write::Pause),
                )],
            );
        }

        registry
    }

    fn add<const N: usize>(
        &mut self,
        service_type: ServiceType,
        name: &str,
        bindings: [(CharacteristicType, Binding); N],
    ) {
        let mut service = Service::new(service_type, name);

        for (characteristic, binding) in bindings {
            service = service.with(characteristic);
            self.bindings
                .insert(CharacteristicId::new(service_type, characteristic), binding);
        }

        self.services.push(service);
    }

    pub fn get(&self, id: CharacteristicId) -> Result<&Binding> {
        self.bindings
            .get(&id)
            .ok_or(Error::UnknownCharacteristic(id))
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Bindings whose value depends on any of `fields`.
    pub fn affected_by<'a>(
        &'a self,
        fields: &'a [Field],
    ) -> impl Iterator<Item = (CharacteristicId, &'a Binding)> + 'a {
        self.bindings
            .iter()
            .filter(|(_, binding)| binding.fields.iter().any(|field| fields.contains(field)))
            .map(|(id, binding)| (*id, binding))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::{DeviceState, Source, StateUpdate};

    fn settings(pause: bool) -> Settings {
        Settings {
            name: "Robby".to_string(),
            ip: Ipv4Addr::new(10, 0, 1, 150),
            token: [0; 16],
            pause,
        }
    }

    fn id(service: ServiceType, characteristic: CharacteristicType) -> CharacteristicId {
        CharacteristicId::new(service, characteristic)
    }

    #[test]
    fn test_services() {
        let registry = Registry::new(&settings(true));
        let names: Vec<_> = registry
            .services()
            .iter()
            .map(|service| (service.service_type, service.name.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![
                (ServiceType::AccessoryInformation, "Robby"),
                (ServiceType::Fan, "Robby"),
                (ServiceType::Battery, "Robby Battery"),
                (ServiceType::PauseSwitch, "Robby Pause"),
            ]
        );

        let registry = Registry::new(&settings(false));
        assert_eq!(registry.services().len(), 3);
        assert!(matches!(
            registry.get(id(ServiceType::PauseSwitch, CharacteristicType::On)),
            Err(Error::UnknownCharacteristic(_))
        ));
    }

    #[test]
    fn test_reads() {
        let registry = Registry::new(&settings(true));
        let mut state = AccessoryState::default();

        state.apply(StateUpdate::Mode(DeviceState::Paused), Source::Device);
        state.apply(StateUpdate::Cleaning(true), Source::Device);
        state.apply(StateUpdate::BatteryLevel(29), Source::Device);

        let read = |service, characteristic| {
            registry
                .get(id(service, characteristic))
                .unwrap()
                .read(&state)
        };

        assert_eq!(read(ServiceType::Fan, CharacteristicType::On), Value::Bool(true));
        assert_eq!(
            read(ServiceType::PauseSwitch, CharacteristicType::On),
            Value::Bool(true)
        );
        assert_eq!(
            read(ServiceType::Battery, CharacteristicType::StatusLowBattery),
            Value::StatusLowBattery(StatusLowBattery::Low)
        );
        assert_eq!(
            read(ServiceType::Battery, CharacteristicType::ChargingState),
            Value::ChargingState(ChargingState::NotCharging)
        );
        assert_eq!(
            read(ServiceType::AccessoryInformation, CharacteristicType::SerialNumber),
            Value::String("10.0.1.150".to_string())
        );
    }

    #[test]
    fn test_affected_by() {
        let registry = Registry::new(&settings(false));

        let ids: Vec<_> = registry
            .affected_by(&[Field::BatteryLevel])
            .map(|(id, _)| id.characteristic)
            .collect();

        assert_eq!(
            ids,
            vec![
                CharacteristicType::BatteryLevel,
                CharacteristicType::StatusLowBattery
            ]
        );
        assert_eq!(registry.affected_by(&[Field::Mode]).count(), 0);
    }
}
