use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crypto::Token;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::{ConnectError, Connector, DeviceHandle, DeviceResult, Event, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Call {
    StartCleaning,
    Stop,
    Pause,
    ResumeCleaning,
    ReturnToDock,
    SetFanPower(u8),
    Refresh,
}

/// Device that records every command together with the time it was issued.
pub struct FakeDevice {
    snapshot: Snapshot,
    fail_stop: bool,
    calls: Mutex<Vec<(Call, Instant)>>,
    events: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl FakeDevice {
    pub fn new(snapshot: Snapshot) -> (FakeDevice, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(16);

        let device = FakeDevice {
            snapshot,
            fail_stop: false,
            calls: Mutex::new(vec![]),
            events: Mutex::new(Some(rx)),
        };

        (device, tx)
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.timed_calls().into_iter().map(|(call, _)| call).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> DeviceResult<()> {
        self.calls.lock().unwrap().push((call, Instant::now()));
        Ok(())
    }
}

#[async_trait]
impl DeviceHandle for FakeDevice {
    async fn state(&self) -> DeviceResult<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn subscribe(&self) -> mpsc::Receiver<Event> {
        match self.events.lock().unwrap().take() {
            Some(events) => events,
            None => mpsc::channel(1).1,
        }
    }

    async fn start_cleaning(&self) -> DeviceResult<()> {
        self.record(Call::StartCleaning)
    }

    async fn stop(&self) -> DeviceResult<()> {
        self.record(Call::Stop)?;

        if self.fail_stop {
            Err("stop timed out".into())
        } else {
            Ok(())
        }
    }

    async fn pause(&self) -> DeviceResult<()> {
        self.record(Call::Pause)
    }

    async fn resume_cleaning(&self) -> DeviceResult<()> {
        self.record(Call::ResumeCleaning)
    }

    async fn return_to_dock(&self) -> DeviceResult<()> {
        self.record(Call::ReturnToDock)
    }

    async fn set_fan_power(&self, level: u8) -> DeviceResult<()> {
        self.record(Call::SetFanPower(level))
    }

    async fn refresh(&self) -> DeviceResult<()> {
        self.record(Call::Refresh)
    }
}

/// Connector that fails a given number of times before handing out the device.
pub struct FakeConnector {
    device: Arc<FakeDevice>,
    failures: Mutex<u32>,
    attempts: Mutex<Vec<Instant>>,
}

impl FakeConnector {
    pub fn new(device: Arc<FakeDevice>) -> Self {
        Self::failing(device, 0)
    }

    pub fn failing(device: Arc<FakeDevice>, failures: u32) -> Self {
        Self {
            device,
            failures: Mutex::new(failures),
            attempts: Mutex::new(vec![]),
        }
    }

    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        _address: Ipv4Addr,
        _token: Token<16>,
        _expected_model: &str,
    ) -> Result<Arc<dyn DeviceHandle>, ConnectError> {
        self.attempts.lock().unwrap().push(Instant::now());

        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(ConnectError::Unreachable("no response".into()));
        }

        let device: Arc<dyn DeviceHandle> = self.device.clone();
        Ok(device)
    }
}
