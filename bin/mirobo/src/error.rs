use std::fmt;

#[derive(Debug)]
pub enum Error {
    Accessory(accessory::Error),
    Json(serde_json::Error),
    Mqtt(paho_mqtt::Error),
    Io(std::io::Error),
    Join(tokio::task::JoinError),
    MissingVariable(&'static str),
    InvalidTopic(String),
}

impl From<accessory::Error> for Error {
    fn from(err: accessory::Error) -> Self {
        Self::Accessory(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accessory(err) => write!(f, "accessory error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Join(err) => write!(f, "join error: {err}"),
            Self::MissingVariable(name) => write!(f, "set ENV variable {name}"),
            Self::InvalidTopic(topic) => write!(f, "invalid topic {topic}"),
        }
    }
}

impl std::error::Error for Error {}
