// Mall hub: owner of the authoritative MallState
//
// Every mutation happens under the write lock and is broadcast before the
// lock is released, so a client that subscribes together with its snapshot
// sees every later change exactly once. A poisoned lock is recovered: no
// mutation leaves the state half-written.

use crate::config::HubConfig;
use crate::protocol::PushEvent;
use crate::state::{MallAnalytics, MallState, ParkingMap, SlotStatus};
use std::fmt;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Hub operation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    InvalidSlot(String),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::InvalidSlot(slot) => write!(f, "invalid slot '{}'", slot),
        }
    }
}

impl std::error::Error for HubError {}

/// Authoritative mall state with push fan-out.
pub struct MallHub {
    state: RwLock<MallState>,

    /// Broadcast channel for push events
    events_tx: broadcast::Sender<PushEvent>,
}

impl MallHub {
    /// Hub with the given parking layout and zeroed crowd counters.
    pub fn new(parking: ParkingMap, capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        let mall = MallAnalytics {
            entered: Some(0),
            exited: Some(0),
            inside: Some(0),
            ..MallAnalytics::default()
        };
        Self {
            state: RwLock::new(MallState {
                parking: Some(parking),
                mall: Some(mall),
            }),
            events_tx,
        }
    }

    pub fn from_config(config: &HubConfig) -> Self {
        Self::new(config.parking.clone(), config.broadcast_capacity)
    }

    /// Current state
    pub fn snapshot(&self) -> MallState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Current mall analytics
    pub fn mall(&self) -> Option<MallAnalytics> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .mall
            .clone()
    }

    /// Subscribe to push events
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.events_tx.subscribe()
    }

    /// Snapshot plus a receiver positioned right after it.
    pub fn subscribe_with_snapshot(&self) -> (MallState, broadcast::Receiver<PushEvent>) {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        (state.clone(), self.events_tx.subscribe())
    }

    /// Flip a slot: `booked` becomes `free`, anything else becomes
    /// `booked`. Broadcasts `parking_update` and returns the new parking map.
    pub fn toggle_slot(&self, slot: &str) -> Result<ParkingMap, HubError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let parking = state.parking.get_or_insert_with(ParkingMap::new);
        let status = parking
            .get_mut(slot)
            .ok_or_else(|| HubError::InvalidSlot(slot.to_string()))?;

        let next = if *status == SlotStatus::Booked {
            SlotStatus::Free
        } else {
            SlotStatus::Booked
        };
        *status = next;
        info!(slot = %slot, status = %status, "Parking slot toggled");

        let parking = parking.clone();
        self.broadcast(PushEvent::ParkingUpdate(parking.clone()));
        Ok(parking)
    }

    /// Replace the mall analytics and broadcast `mall_update`.
    pub fn publish_mall(&self, mall: MallAnalytics) -> MallAnalytics {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.mall = Some(mall.clone());
        info!(
            entered = ?mall.entered,
            inside = ?mall.inside,
            exited = ?mall.exited,
            "Mall analytics updated"
        );
        self.broadcast(PushEvent::MallUpdate(mall.clone()));
        mall
    }

    fn broadcast(&self, event: PushEvent) {
        // No receivers is fine
        let receivers = self.events_tx.send(event).unwrap_or(0);
        debug!(receivers, "Push event broadcast");
    }
}
