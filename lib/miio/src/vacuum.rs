mod command;
use command::Command;

mod status;
pub use status::{State, Status};

mod watcher;
pub use watcher::Change;

use std::net::Ipv4Addr;
use std::sync::Arc;

use log::{info, trace};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::device::{Device, DeviceInfo};
use crate::{Result, Token};

#[derive(Clone)]
pub struct Vacuum {
    device: Arc<Mutex<Device>>,
    info: DeviceInfo,
}

impl Vacuum {
    pub async fn connect(ip: Ipv4Addr, token: Token<16>) -> Result<Vacuum> {
        let mut device = Device::new(ip, token);
        let info = device.info().await?;

        info!("connected {} ({}) at {}", info.model, info.fw_ver, ip);

        Ok(Vacuum {
            device: Arc::new(Mutex::new(device)),
            info,
        })
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn is_vacuum(&self) -> bool {
        self.info.model.contains("vacuum")
    }

    pub async fn status(&self) -> Result<Status> {
        let result = self.execute(Command::GetStatus).await?;
        Status::from_result(result)
    }

    pub async fn start(&self) -> Result<()> {
        self.execute(Command::Start).await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        self.execute(Command::Stop).await?;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        self.execute(Command::Pause).await?;
        Ok(())
    }

    pub async fn go_home(&self) -> Result<()> {
        self.execute(Command::Charge).await?;
        Ok(())
    }

    pub async fn set_fan_power(&self, power: u8) -> Result<()> {
        self.execute(Command::SetFanPower(power)).await?;
        Ok(())
    }

    async fn execute(&self, command: Command) -> Result<Value> {
        let mut device = self.device.lock().await;

        let result = device.send(command.name(), command).await?;
        trace!("{} -> {}", command.name(), result);

        Ok(result)
    }
}
