use serde::ser::{Serialize, SerializeSeq, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    GetStatus,
    Start,
    Stop,
    Pause,
    Charge,
    SetFanPower(u8),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetStatus => "get_status",
            Command::Start => "app_start",
            Command::Stop => "app_stop",
            Command::Pause => "app_pause",
            Command::Charge => "app_charge",
            Command::SetFanPower(_) => "set_custom_mode",
        }
    }
}

impl Serialize for Command {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Command::SetFanPower(power) => {
                let mut seq = serializer.serialize_seq(Some(1))?;

                seq.serialize_element(power)?;

                seq.end()
            }
            Command::GetStatus
            | Command::Start
            | Command::Stop
            | Command::Pause
            | Command::Charge => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}
