use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use crypto::Token;
use log::{info, warn};
use miio::{Change, Status, Vacuum};
use tokio::{
    sync::{mpsc, Notify},
    task,
    time::Duration,
};

use crate::{ConnectError, Connector, DeviceHandle, DeviceResult, DeviceState, Event, Snapshot};

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const EVENTS_CAPACITY: usize = 16;

/// Connects to a vacuum over miIO.
pub struct MiioConnector {
    poll_interval: Duration,
}

impl MiioConnector {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for MiioConnector {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

#[async_trait]
impl Connector for MiioConnector {
    async fn connect(
        &self,
        address: Ipv4Addr,
        token: Token<16>,
        expected_model: &str,
    ) -> Result<Arc<dyn DeviceHandle>, ConnectError> {
        let vacuum = Vacuum::connect(address, token)
            .await
            .map_err(|err| ConnectError::Unreachable(err.into()))?;

        let model = &vacuum.info().model;

        if !vacuum.is_vacuum() {
            return Err(ConnectError::UnsupportedDevice(model.clone()));
        }

        if model != expected_model {
            warn!("expected {}, found {}; treating it as one", expected_model, model);
        }

        let handle: Arc<dyn DeviceHandle> = Arc::new(MiioHandle::new(vacuum, self.poll_interval));
        Ok(handle)
    }
}

/// [`DeviceHandle`] backed by status polling. Changes between polls are
/// reported as events.
pub struct MiioHandle {
    vacuum: Vacuum,
    poll_interval: Duration,
    refresh: Arc<Notify>,
}

impl MiioHandle {
    pub fn new(vacuum: Vacuum, poll_interval: Duration) -> Self {
        Self {
            vacuum,
            poll_interval,
            refresh: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl DeviceHandle for MiioHandle {
    async fn state(&self) -> DeviceResult<Snapshot> {
        let status = self.vacuum.status().await?;
        info!("vacuum status: {}", status.state);

        Ok(snapshot(&status))
    }

    fn subscribe(&self) -> mpsc::Receiver<Event> {
        let mut changes = self.vacuum.watch(self.poll_interval, self.refresh.clone());
        let (tx, rx) = mpsc::channel(EVENTS_CAPACITY);

        task::spawn(async move {
            while let Some(change) = changes.recv().await {
                if tx.send(event(change)).await.is_err() {
                    break;
                }
            }
        });

        rx
    }

    async fn start_cleaning(&self) -> DeviceResult<()> {
        Ok(self.vacuum.start().await?)
    }

    async fn stop(&self) -> DeviceResult<()> {
        Ok(self.vacuum.stop().await?)
    }

    async fn pause(&self) -> DeviceResult<()> {
        Ok(self.vacuum.pause().await?)
    }

    /// `app_start` picks up a paused cleanup where it left off.
    async fn resume_cleaning(&self) -> DeviceResult<()> {
        Ok(self.vacuum.start().await?)
    }

    async fn return_to_dock(&self) -> DeviceResult<()> {
        Ok(self.vacuum.go_home().await?)
    }

    async fn set_fan_power(&self, level: u8) -> DeviceResult<()> {
        Ok(self.vacuum.set_fan_power(level).await?)
    }

    async fn refresh(&self) -> DeviceResult<()> {
        self.refresh.notify_one();
        Ok(())
    }
}

fn snapshot(status: &Status) -> Snapshot {
    Snapshot {
        mode: DeviceState::from_name(status.state.name()),
        cleaning: status.is_cleaning(),
        charging: status.is_charging(),
        fan_speed: status.fan_power.min(100),
        battery_level: status.battery.min(100),
    }
}

fn event(change: Change) -> Event {
    Event {
        key: change.key.to_string(),
        value: change.value,
    }
}
