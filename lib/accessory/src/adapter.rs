mod registry;
use registry::{Read, Registry, Write};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, trace, warn};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::{self, JoinHandle},
    time::{sleep, Duration},
};

use crate::{
    AccessoryState, CharacteristicId, Config, ConnectError, Connector, DeviceHandle, DeviceResult,
    DeviceState, Error, Event, FanSpeed, Notification, Result, RetryPolicy, Service, Settings,
    Source, StateUpdate, Value,
};

/// Model the adapter asks the connector for.
pub const MODEL: &str = "rockrobo.vacuum.v1";

pub const DISCOVERY_RETRY: RetryPolicy = RetryPolicy::fixed(Duration::from_secs(30));

const DOCK_DELAY: Duration = Duration::from_secs(2);
const REFRESH_DELAY: Duration = Duration::from_secs(1);

const NOTIFICATIONS_CAPACITY: usize = 32;
const COMMANDS_CAPACITY: usize = 16;

/// What the home-automation host sees.
#[async_trait]
pub trait Accessory: Send + Sync {
    fn services(&self) -> Vec<Service>;

    async fn get(&self, id: CharacteristicId) -> Result<Value>;

    /// Returns the value the characteristic reports after the write.
    async fn set(&self, id: CharacteristicId, value: Value) -> Result<Value>;

    fn subscribe(&self) -> broadcast::Receiver<Notification>;
}

/// Exposes a vacuum as Fan, Battery and optional Pause switch services.
///
/// Construction only validates the configuration and spawns discovery, so it
/// has to happen inside a Tokio runtime. Until the device answers, every
/// device-backed read or write fails with [`Error::NotDiscovered`]. Dropping
/// the adapter stops discovery, event handling and pending commands.
pub struct Adapter {
    shared: Arc<Shared>,
    commands: mpsc::Sender<Command>,
    discovery: JoinHandle<()>,
}

struct Shared {
    settings: Settings,
    registry: Registry,
    state: Mutex<AccessoryState>,
    notifications: broadcast::Sender<Notification>,
}

/// What a write asks of the vacuum. Commands run one at a time, in the order
/// the writes were accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    StartCleaning,
    /// Stop, then dock, then refresh the state.
    PowerOff,
    Pause,
    ResumeCleaning,
    SetFanPower(u8),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartCleaning => write!(f, "start cleaning"),
            Self::PowerOff => write!(f, "power off"),
            Self::Pause => write!(f, "pause"),
            Self::ResumeCleaning => write!(f, "resume cleaning"),
            Self::SetFanPower(level) => write!(f, "set fan power to {}", level),
        }
    }
}

impl Command {
    async fn run(self, device: &dyn DeviceHandle) -> DeviceResult<()> {
        match self {
            Self::StartCleaning => device.start_cleaning().await,
            Self::PowerOff => {
                power_off(device).await;
                Ok(())
            }
            Self::Pause => device.pause().await,
            Self::ResumeCleaning => device.resume_cleaning().await,
            Self::SetFanPower(level) => device.set_fan_power(level).await,
        }
    }
}

impl Adapter {
    pub fn new(config: &Config, connector: Arc<dyn Connector>) -> Result<Adapter> {
        Self::with_retry_policy(config, connector, DISCOVERY_RETRY)
    }

    pub fn with_retry_policy(
        config: &Config,
        connector: Arc<dyn Connector>,
        policy: RetryPolicy,
    ) -> Result<Adapter> {
        let settings = config.validate()?;
        let registry = Registry::new(&settings);
        let (notifications, _) = broadcast::channel(NOTIFICATIONS_CAPACITY);
        let (commands, pending) = mpsc::channel(COMMANDS_CAPACITY);

        info!("{} waiting for vacuum at {}", settings.name, settings.ip);

        let shared = Arc::new(Shared {
            settings,
            registry,
            state: Mutex::new(AccessoryState::default()),
            notifications,
        });

        let discovery = task::spawn(discover(shared.clone(), connector, policy, pending));

        Ok(Adapter {
            shared,
            commands,
            discovery,
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.settings.name
    }

    pub async fn state(&self) -> AccessoryState {
        self.shared.state.lock().await.clone()
    }

    async fn send(&self, command: Command) {
        match self.commands.send(command).await {
            Ok(()) => trace!("queued {}", command),
            Err(_) => error!("unable to {}: vacuum connection is gone", command),
        }
    }

    async fn set_power(&self, on: bool) {
        let (command, mode) = if on {
            (Command::StartCleaning, DeviceState::Cleaning)
        } else {
            (Command::PowerOff, DeviceState::Returning)
        };

        self.send(command).await;

        self.shared
            .apply(StateUpdate::Activity { mode, cleaning: on }, Source::Optimistic)
            .await;
    }

    async fn set_paused(&self, paused: bool) -> bool {
        let mode = self.shared.state.lock().await.mode.value;

        let (command, mode) = match (paused, mode) {
            (true, DeviceState::Cleaning) => (Command::Pause, DeviceState::Paused),
            (false, DeviceState::Paused) => (Command::ResumeCleaning, DeviceState::Cleaning),
            _ => {
                debug!("ignoring pause = {} while {}", paused, mode);
                return mode == DeviceState::Paused;
            }
        };

        self.send(command).await;

        self.shared
            .apply(StateUpdate::Mode(mode), Source::Optimistic)
            .await;

        mode == DeviceState::Paused
    }

    async fn set_rotation_speed(&self, requested: u8) -> FanSpeed {
        let level = FanSpeed::from_requested(requested);
        debug!("requested fan speed {}, using {:?}", requested, level);

        self.send(Command::SetFanPower(level.power())).await;

        self.shared
            .apply(StateUpdate::FanSpeed(level.power()), Source::Optimistic)
            .await;

        level
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        self.discovery.abort();
    }
}

#[async_trait]
impl Accessory for Adapter {
    fn services(&self) -> Vec<Service> {
        self.shared.registry.services().to_vec()
    }

    async fn get(&self, id: CharacteristicId) -> Result<Value> {
        let binding = self.shared.registry.get(id)?;

        match &binding.read {
            Read::Static(value) => Ok(value.clone()),
            Read::State(read) => {
                let state = self.shared.state.lock().await;

                if !state.connected {
                    return Err(Error::NotDiscovered);
                }

                Ok(read(&state))
            }
        }
    }

    /// Commands are queued for the vacuum and their failures are only
    /// logged. Turning the power off stops the vacuum and sends it to the
    /// dock two seconds later; writes accepted meanwhile wait for that
    /// sequence to finish.
    async fn set(&self, id: CharacteristicId, value: Value) -> Result<Value> {
        let binding = self.shared.registry.get(id)?;
        let write = binding.write.ok_or(Error::ReadOnly(id))?;

        if !self.shared.state.lock().await.connected {
            return Err(Error::NotDiscovered);
        }

        let invalid = || Error::InvalidValue(id, value.clone());

        match write {
            Write::Power => {
                let on = value.as_bool().ok_or_else(invalid)?;
                self.set_power(on).await;

                Ok(Value::Bool(on))
            }
            Write::Pause => {
                let paused = value.as_bool().ok_or_else(invalid)?;
                let paused = self.set_paused(paused).await;

                Ok(Value::Bool(paused))
            }
            Write::RotationSpeed => {
                let requested = value
                    .as_int()
                    .and_then(|value| u8::try_from(value).ok())
                    .filter(|value| *value <= 100)
                    .ok_or_else(invalid)?;
                let level = self.set_rotation_speed(requested).await;

                Ok(Value::Int(level.power().into()))
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }
}

impl Shared {
    async fn connect(
        &self,
        connector: &dyn Connector,
    ) -> std::result::Result<Arc<dyn DeviceHandle>, ConnectError> {
        let device = connector
            .connect(self.settings.ip, self.settings.token, MODEL)
            .await?;

        let snapshot = device.state().await.map_err(ConnectError::Unreachable)?;
        info!("connected to vacuum at {}: {:?}", self.settings.ip, snapshot);

        self.apply(StateUpdate::Snapshot(snapshot), Source::Device)
            .await;

        Ok(device)
    }

    async fn apply(&self, update: StateUpdate, source: Source) {
        let notifications: Vec<_> = {
            let mut state = self.state.lock().await;
            let changed = state.apply(update, source);

            self.registry
                .affected_by(&changed)
                .map(|(id, binding)| Notification {
                    id,
                    value: binding.read(&state),
                })
                .collect()
        };

        for notification in notifications {
            debug!("{} = {:?}", notification.id, notification.value);

            if self.notifications.send(notification).is_err() {
                trace!("no one is observing notifications");
            }
        }
    }
}

async fn discover(
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    policy: RetryPolicy,
    commands: mpsc::Receiver<Command>,
) {
    let ip = shared.settings.ip;
    let mut attempts = 0;

    let device = loop {
        match shared.connect(connector.as_ref()).await {
            Ok(device) => break device,
            Err(ConnectError::UnsupportedDevice(model)) => {
                error!("{} is {}, which is not a supported vacuum", ip, model);
                return;
            }
            Err(err) => {
                attempts += 1;

                match policy.next_delay(attempts) {
                    Some(delay) => {
                        error!("{}, retrying in {}s", err, delay.as_secs());
                        sleep(delay).await;
                    }
                    None => {
                        error!("{}, giving up after {} attempts", err, attempts);
                        return;
                    }
                }
            }
        }
    };

    let events = device.subscribe();

    tokio::join!(
        follow(&shared, events),
        execute(device.as_ref(), commands)
    );
}

async fn follow(shared: &Shared, mut events: mpsc::Receiver<Event>) {
    while let Some(event) = events.recv().await {
        match StateUpdate::from_event(&event) {
            Some(update) => shared.apply(update, Source::Device).await,
            None => trace!("ignoring event {} = {}", event.key, event.value),
        }
    }

    warn!("vacuum at {} stopped sending events", shared.settings.ip);
}

async fn execute(device: &dyn DeviceHandle, mut commands: mpsc::Receiver<Command>) {
    while let Some(command) = commands.recv().await {
        match command.run(device).await {
            Ok(()) => debug!("{} sent", command),
            Err(err) => error!("unable to {}: {}", command, err),
        }
    }
}

async fn power_off(device: &dyn DeviceHandle) {
    if let Err(err) = device.stop().await {
        error!("unable to stop: {}", err);
    }

    sleep(DOCK_DELAY).await;

    if let Err(err) = device.return_to_dock().await {
        error!("unable to return to dock: {}", err);
    }

    sleep(REFRESH_DELAY).await;

    if let Err(err) = device.refresh().await {
        error!("unable to refresh state: {}", err);
    }
}
