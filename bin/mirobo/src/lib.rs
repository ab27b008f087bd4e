mod error;
pub use error::Error;

mod topic;
pub use topic::{Topic, TopicKind};

use accessory::{Accessory, Config, Value};
use log::debug;

pub type ErasedError = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, ErasedError>;

pub const DEFAULT_TOPIC_PREFIX: &str = "vacuum";

/// Reads the accessory block from the JSON file in `MIROBO_CONFIG`, falling
/// back to the `VACUUM_*` variables.
pub fn read_config() -> std::result::Result<Config, Error> {
    match std::env::var("MIROBO_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(Config::from_json(&json)?)
        }
        Err(_) => Ok(Config::from_env()),
    }
}

/// Answers a get or set request. Returns the value to publish on the
/// characteristic's value topic, or `None` for anything that is not a request.
pub async fn handle_request<A>(
    accessory: &A,
    topic: &Topic,
    payload: &[u8],
) -> std::result::Result<Option<Value>, Error>
where
    A: Accessory + ?Sized,
{
    match topic.kind {
        TopicKind::Value => Ok(None),
        TopicKind::Get => {
            debug!("get {}", topic.id);
            Ok(Some(accessory.get(topic.id).await?))
        }
        TopicKind::Set => {
            let value: Value = serde_json::from_slice(payload)?;
            debug!("set {} = {:?}", topic.id, value);

            Ok(Some(accessory.set(topic.id, value).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use accessory::{
        CharacteristicId, CharacteristicType, Notification, Service, ServiceType,
    };
    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use super::*;

    const SPEED: CharacteristicId =
        CharacteristicId::new(ServiceType::Fan, CharacteristicType::RotationSpeed);
    const BATTERY: CharacteristicId =
        CharacteristicId::new(ServiceType::Battery, CharacteristicType::BatteryLevel);

    #[derive(Default)]
    struct FakeAccessory {
        writes: Mutex<Vec<(CharacteristicId, Value)>>,
    }

    #[async_trait]
    impl Accessory for FakeAccessory {
        fn services(&self) -> Vec<Service> {
            vec![]
        }

        async fn get(&self, id: CharacteristicId) -> accessory::Result<Value> {
            match id {
                BATTERY => Ok(Value::Int(87)),
                _ => Err(accessory::Error::UnknownCharacteristic(id)),
            }
        }

        async fn set(&self, id: CharacteristicId, value: Value) -> accessory::Result<Value> {
            if id == BATTERY {
                return Err(accessory::Error::ReadOnly(id));
            }

            self.writes.lock().unwrap().push((id, value));
            Ok(Value::Int(60))
        }

        fn subscribe(&self) -> broadcast::Receiver<Notification> {
            broadcast::channel(1).1
        }
    }

    #[tokio::test]
    async fn test_get() {
        let accessory = FakeAccessory::default();
        let topic = Topic::new("vacuum", BATTERY, TopicKind::Get);

        let value = handle_request(&accessory, &topic, b"").await.unwrap();
        assert_eq!(value, Some(Value::Int(87)));
    }

    #[tokio::test]
    async fn test_set() {
        let accessory = FakeAccessory::default();
        let topic = Topic::new("vacuum", SPEED, TopicKind::Set);

        let value = handle_request(&accessory, &topic, b"50").await.unwrap();

        assert_eq!(value, Some(Value::Int(60)));
        assert_eq!(
            *accessory.writes.lock().unwrap(),
            vec![(SPEED, Value::Int(50))]
        );
    }

    #[tokio::test]
    async fn test_value_topic_is_ignored() {
        let accessory = FakeAccessory::default();
        let topic = Topic::new("vacuum", SPEED, TopicKind::Value);

        let value = handle_request(&accessory, &topic, b"50").await.unwrap();

        assert_eq!(value, None);
        assert!(accessory.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_errors() {
        let accessory = FakeAccessory::default();

        let topic = Topic::new("vacuum", SPEED, TopicKind::Set);
        let error = handle_request(&accessory, &topic, b"fast").await.unwrap_err();
        assert!(matches!(error, Error::Json(_)));

        let topic = Topic::new("vacuum", BATTERY, TopicKind::Set);
        let error = handle_request(&accessory, &topic, b"1").await.unwrap_err();
        assert!(matches!(
            error,
            Error::Accessory(accessory::Error::ReadOnly(BATTERY))
        ));

        let topic = Topic::new("vacuum", SPEED, TopicKind::Get);
        let error = handle_request(&accessory, &topic, b"").await.unwrap_err();
        assert!(matches!(
            error,
            Error::Accessory(accessory::Error::UnknownCharacteristic(_))
        ));
    }
}
