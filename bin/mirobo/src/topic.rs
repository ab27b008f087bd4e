use std::fmt;
use std::str::FromStr;

use accessory::{CharacteristicId, CharacteristicType, ServiceType};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TopicKind {
    /// Current value, published by the gateway.
    Value,
    Get,
    Set,
}

/// `<prefix>/<service>/<characteristic>[/get|/set]`
#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    pub prefix: String,
    pub id: CharacteristicId,
    pub kind: TopicKind,
}

impl Topic {
    pub fn new(prefix: &str, id: CharacteristicId, kind: TopicKind) -> Self {
        Self {
            prefix: prefix.to_string(),
            id,
            kind,
        }
    }

    pub fn value(&self) -> Topic {
        Topic::new(&self.prefix, self.id, TopicKind::Value)
    }

    /// Wildcard filters for every get and set request under `prefix`.
    pub fn request_filters(prefix: &str) -> [String; 2] {
        [format!("{prefix}/+/+/get"), format!("{prefix}/+/+/set")]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.prefix, self.id.service, self.id.characteristic
        )?;

        match self.kind {
            TopicKind::Value => Ok(()),
            TopicKind::Get => write!(f, "/get"),
            TopicKind::Set => write!(f, "/set"),
        }
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Topic, Self::Err> {
        let invalid = || Error::InvalidTopic(s.to_string());

        let (rest, kind) = if let Some(rest) = s.strip_suffix("/get") {
            (rest, TopicKind::Get)
        } else if let Some(rest) = s.strip_suffix("/set") {
            (rest, TopicKind::Set)
        } else {
            (s, TopicKind::Value)
        };

        let mut split = rest.rsplitn(3, '/');

        let characteristic = split.next().ok_or_else(invalid)?;
        let characteristic = CharacteristicType::from_str(characteristic).map_err(|_| invalid())?;

        let service = split.next().ok_or_else(invalid)?;
        let service = ServiceType::from_str(service).map_err(|_| invalid())?;

        let prefix = split.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;

        Ok(Topic::new(
            prefix,
            CharacteristicId::new(service, characteristic),
            kind,
        ))
    }
}
