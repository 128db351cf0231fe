// Dashboard session: owns the state store and the retained view values

use crate::channel::ChannelEvent;
use crate::protocol::PushFrame;
use crate::state::{MallState, RenderRequest, StateStore};
use crate::view::{
    render_mall, render_parking, render_summary, ChartBackend, ChartHost, MallSummary,
    ParkingView,
};
use tracing::{info, warn};

/// One dashboard session.
///
/// Created empty when the page (or console) starts and dropped when it
/// ends. Push events go through `handle`; the latest view values are
/// replaced, never appended to.
pub struct Dashboard<B: ChartBackend> {
    store: StateStore,
    parking: ParkingView,
    summary: MallSummary,
    charts: ChartHost<B>,
    connected: bool,
}

impl<B: ChartBackend> Dashboard<B> {
    pub fn new(chart_backend: B) -> Self {
        Self {
            store: StateStore::new(),
            parking: ParkingView::default(),
            summary: MallSummary::default(),
            charts: ChartHost::new(chart_backend),
            connected: false,
        }
    }

    pub fn state(&self) -> &MallState {
        self.store.state()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn parking(&self) -> &ParkingView {
        &self.parking
    }

    pub fn summary(&self) -> &MallSummary {
        &self.summary
    }

    pub fn charts(&self) -> &B {
        self.charts.backend()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Handle one channel event. Returns the views that were re-rendered.
    pub fn handle(&mut self, event: ChannelEvent) -> Option<RenderRequest> {
        match event {
            ChannelEvent::Connected => {
                info!("Realtime channel connected");
                self.connected = true;
                None
            }
            ChannelEvent::Disconnected { reason } => {
                warn!(reason = %reason, "Realtime channel disconnected");
                self.connected = false;
                None
            }
            ChannelEvent::Push(frame) => Some(self.apply_push(frame)),
        }
    }

    /// Apply a push frame and re-render the affected views only.
    pub fn apply_push(&mut self, frame: PushFrame) -> RenderRequest {
        let request = self.store.apply_at(frame.event, frame.timestamp);
        self.render(request);
        request
    }

    /// Re-render from the current state.
    pub fn render(&mut self, request: RenderRequest) {
        let state = self.store.state();
        if request.includes_parking() {
            self.parking = render_parking(state);
        }
        if request.includes_mall() {
            self.summary = render_summary(state);
            self.charts.show(render_mall(state).as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_push, PushEvent};
    use crate::state::{MallAnalytics, SlotStatus};
    use crate::view::{ChartBoard, ChartSlot};

    fn push(text: &str) -> ChannelEvent {
        ChannelEvent::Push(parse_push(text).unwrap())
    }

    #[test]
    fn test_connect_signal_does_not_touch_state() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        assert_eq!(dashboard.handle(ChannelEvent::Connected), None);
        assert!(dashboard.is_connected());
        assert_eq!(dashboard.state(), &MallState::default());
        assert!(!dashboard.parking().has_data);
    }

    #[test]
    fn test_full_state_renders_all_views() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        let rendered = dashboard.handle(push(
            r#"{"type":"full_state","data":{"parking":{"A1":"free","A2":"booked"},"mall":{"in":3,"inside":2,"out":1,"ages":{"20-25":2}}}}"#,
        ));

        assert_eq!(rendered, Some(RenderRequest::All));
        assert_eq!(dashboard.parking().slots.len(), 2);
        assert!(dashboard.summary().has_data);
        assert!(dashboard.charts().chart(ChartSlot::Age).is_some());
    }

    #[test]
    fn test_parking_update_leaves_mall_views_alone() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        dashboard.handle(push(r#"{"type":"full_state","data":{"parking":{"A1":"free"}}}"#));
        let summary_before = dashboard.summary().clone();

        let rendered = dashboard.handle(push(r#"{"type":"parking_update","data":{"A1":"booked"}}"#));

        assert_eq!(rendered, Some(RenderRequest::Parking));
        assert_eq!(dashboard.parking().slots[0].status, "booked");
        assert_eq!(dashboard.summary(), &summary_before);
    }

    #[test]
    fn test_mall_update_leaves_parking_view_alone() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        dashboard.handle(push(r#"{"type":"full_state","data":{"parking":{"A1":"free"}}}"#));

        let rendered = dashboard.apply_push(PushFrame {
            event: PushEvent::MallUpdate(MallAnalytics {
                inside: Some(7),
                ..Default::default()
            }),
            timestamp: None,
        });

        assert_eq!(rendered, RenderRequest::Mall);
        assert_eq!(dashboard.parking().slots.len(), 1);
        assert_eq!(dashboard.summary().rows[0].value, "7");
        // No ages yet: charts stay empty
        assert!(dashboard.charts().chart(ChartSlot::Age).is_none());
    }

    #[test]
    fn test_last_parking_write_wins_in_view() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        dashboard.handle(push(r#"{"type":"parking_update","data":{"A1":"free"}}"#));
        dashboard.handle(push(r#"{"type":"full_state","data":{"parking":{"B1":"booked","B2":"free"}}}"#));
        dashboard.handle(push(r#"{"type":"mall_update","data":{"in":1}}"#));

        let ids: Vec<&str> = dashboard.parking().slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2"]);
        assert_eq!(
            dashboard.store().status_of("B1"),
            Some(&SlotStatus::Booked)
        );
    }

    #[test]
    fn test_disconnect_keeps_state() {
        let mut dashboard = Dashboard::new(ChartBoard::new());
        dashboard.handle(ChannelEvent::Connected);
        dashboard.handle(push(r#"{"type":"parking_update","data":{"A1":"free"}}"#));
        dashboard.handle(ChannelEvent::Disconnected {
            reason: "connection reset".to_string(),
        });

        assert!(!dashboard.is_connected());
        assert_eq!(dashboard.parking().slots.len(), 1);
    }
}
