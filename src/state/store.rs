use crate::protocol::PushEvent;
use crate::state::model::{MallAnalytics, MallState, ParkingMap, SlotStatus};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Views a state change must be re-rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    Parking,
    Mall,
    All,
}

impl RenderRequest {
    pub fn includes_parking(self) -> bool {
        matches!(self, RenderRequest::Parking | RenderRequest::All)
    }

    pub fn includes_mall(self) -> bool {
        matches!(self, RenderRequest::Mall | RenderRequest::All)
    }
}

/// Single owner of the session's `MallState`.
///
/// Only the `apply_*` methods write; everything else reads through
/// `state()`. Each apply returns the views that need re-rendering.
#[derive(Debug, Default)]
pub struct StateStore {
    state: MallState,

    /// Number of push events applied this session
    applied: u64,

    /// Server timestamp of the last applied push, when the hub sent one
    last_push_at: Option<DateTime<Utc>>,
}

impl StateStore {
    /// Empty store (session start)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MallState {
        &self.state
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn last_push_at(&self) -> Option<DateTime<Utc>> {
        self.last_push_at
    }

    /// Last known status of `slot`, if the slot has been seen.
    pub fn status_of(&self, slot: &str) -> Option<&SlotStatus> {
        self.state.parking.as_ref().and_then(|p| p.get(slot))
    }

    /// Replace everything with `snapshot`.
    pub fn apply_full_state(&mut self, snapshot: MallState) -> RenderRequest {
        debug!(
            slots = snapshot.parking.as_ref().map_or(0, |p| p.len()),
            has_mall = snapshot.mall.is_some(),
            "Applying full state"
        );
        self.state = snapshot;
        self.applied += 1;
        RenderRequest::All
    }

    /// Replace only the `parking` sub-field.
    pub fn apply_parking_delta(&mut self, parking: ParkingMap) -> RenderRequest {
        debug!(slots = parking.len(), "Applying parking update");
        self.state.parking = Some(parking);
        self.applied += 1;
        RenderRequest::Parking
    }

    /// Replace only the `mall` sub-field (the whole analytics object).
    pub fn apply_mall_delta(&mut self, mall: MallAnalytics) -> RenderRequest {
        debug!(has_ages = mall.ages.is_some(), "Applying mall update");
        self.state.mall = Some(mall);
        self.applied += 1;
        RenderRequest::Mall
    }

    /// Route a push event to the matching apply.
    pub fn apply(&mut self, event: PushEvent) -> RenderRequest {
        match event {
            PushEvent::FullState(snapshot) => self.apply_full_state(snapshot),
            PushEvent::ParkingUpdate(parking) => self.apply_parking_delta(parking),
            PushEvent::MallUpdate(mall) => self.apply_mall_delta(mall),
        }
    }

    /// Apply with the frame's server timestamp.
    pub fn apply_at(&mut self, event: PushEvent, timestamp: Option<DateTime<Utc>>) -> RenderRequest {
        if timestamp.is_some() {
            self.last_push_at = timestamp;
        }
        self.apply(event)
    }
}
