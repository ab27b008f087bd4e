use std::sync::Arc;

use log::{debug, info, trace};
use serde_json::{json, Value};
use tokio::{
    sync::{mpsc, Notify},
    task,
    time::{interval, Duration, MissedTickBehavior},
};

use super::{Status, Vacuum};

/// A single property of the vacuum that changed between two polls.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub key: &'static str,
    pub value: Value,
}

impl Change {
    fn new(key: &'static str, value: Value) -> Self {
        Self { key, value }
    }
}

impl Vacuum {
    /// Polls the status every `period` (or right away when `refresh` is
    /// notified) and sends a [`Change`] for every property that differs from
    /// the previous poll. The first poll only sets the baseline. Polling stops
    /// once the receiver is dropped.
    pub fn watch(&self, period: Duration, refresh: Arc<Notify>) -> mpsc::Receiver<Change> {
        let vacuum = self.clone();
        let (tx, rx) = mpsc::channel::<Change>(16);

        task::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut last: Option<Status> = None;

            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    _ = refresh.notified() => trace!("status refresh requested"),
                    _ = tx.closed() => break,
                }

                let status = match vacuum.status().await {
                    Ok(status) => status,
                    Err(err) => {
                        debug!("unable to poll status: {}", err);
                        continue;
                    }
                };

                if let Some(previous) = &last {
                    for change in status.changes_since(previous) {
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                }

                last = Some(status);
            }

            info!("status observer has been dropped, aborting timer");
        });

        rx
    }
}

impl Status {
    /// Properties that differ from `previous`, in a fixed order. Keys are the
    /// ones consumers of [`Vacuum::watch`] receive.
    pub fn changes_since(&self, previous: &Status) -> Vec<Change> {
        let (old, new) = (previous, self);
        let mut changes = vec![];

        if old.state != new.state {
            changes.push(Change::new("state", json!(new.state.name())));
        }

        if old.is_cleaning() != new.is_cleaning() {
            changes.push(Change::new("cleaning", json!(new.is_cleaning())));
        }

        if old.is_charging() != new.is_charging() {
            changes.push(Change::new("charging", json!(new.is_charging())));
        }

        if old.fan_power != new.fan_power {
            changes.push(Change::new("fanSpeed", json!(new.fan_power)));
        }

        if old.battery != new.battery {
            changes.push(Change::new("batteryLevel", json!(new.battery)));
        }

        if old.error_code != new.error_code {
            changes.push(Change::new("error", json!(new.error_code)));
        }

        changes
    }
}
