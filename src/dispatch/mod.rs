// Outbound actions: slot toggle and media upload
//
// Dispatch never writes local state. A toggle shows up on screen only when
// the hub's next `parking_update` arrives through the channel.

#[cfg(feature = "native")]
pub mod http;

pub use crate::protocol::ToggleRequest;

use crate::state::{MallState, SlotStatus};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

pub const TOGGLE_PATH: &str = "/api/toggle_parking";
pub const UPLOAD_PATH: &str = "/api/upload_video";

/// File to submit for analysis.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw upload response, shown as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult(pub Value);

impl UploadResult {
    /// Pretty-printed JSON for display
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// Hub HTTP API.
///
/// Dashboards run on a single-threaded event loop (browser or tokio
/// `LocalSet`), so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait MallApi {
    /// `POST /api/toggle_parking`. The response body is not interpreted.
    async fn toggle_parking(&self, request: &ToggleRequest) -> Result<()>;

    /// `POST /api/upload_video` as multipart with a `file` field. Returns
    /// the parsed JSON body whatever the HTTP status.
    async fn upload_video(&self, upload: MediaUpload) -> Result<Value>;
}

/// Turns user interactions into hub requests.
pub struct ActionDispatcher<A: MallApi> {
    api: A,
}

impl<A: MallApi> ActionDispatcher<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Request that flips `slot` from its last known status.
    ///
    /// Only `free` becomes `booked`; any other status, and a slot never
    /// seen, asks for `free`.
    pub fn plan_toggle(state: &MallState, slot: &str) -> ToggleRequest {
        let status = match state.parking.as_ref().and_then(|p| p.get(slot)) {
            Some(current) => current.toggled(),
            None => SlotStatus::Free,
        };
        ToggleRequest {
            slot: slot.to_string(),
            status,
        }
    }

    /// Send one toggle request. No retry.
    pub async fn send_toggle(&self, request: &ToggleRequest) -> Result<()> {
        info!(slot = %request.slot, status = %request.status, "Requesting slot toggle");
        self.api.toggle_parking(request).await
    }

    /// Plan and send in one step. Returns the request that was sent.
    pub async fn toggle_slot(&self, state: &MallState, slot: &str) -> Result<ToggleRequest> {
        let request = Self::plan_toggle(state, slot);
        self.send_toggle(&request).await?;
        Ok(request)
    }

    /// Submit a file for analysis and hand back the raw response.
    pub async fn upload_media(&self, upload: MediaUpload) -> Result<UploadResult> {
        info!(file = %upload.file_name, bytes = upload.bytes.len(), "Uploading media");
        let body = self.api.upload_video(upload).await?;
        Ok(UploadResult(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ParkingMap;
    use serde_json::json;
    use std::cell::RefCell;

    /// Records requests instead of sending them.
    #[derive(Default)]
    struct RecordingApi {
        toggles: RefCell<Vec<ToggleRequest>>,
        uploads: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl MallApi for RecordingApi {
        async fn toggle_parking(&self, request: &ToggleRequest) -> Result<()> {
            self.toggles.borrow_mut().push(request.clone());
            Ok(())
        }

        async fn upload_video(&self, upload: MediaUpload) -> Result<Value> {
            self.uploads.borrow_mut().push(upload.file_name);
            Ok(json!({"success": false, "message": "Failed to open video"}))
        }
    }

    fn state(entries: &[(&str, &str)]) -> MallState {
        MallState {
            parking: Some(
                entries
                    .iter()
                    .map(|(id, s)| (*id, SlotStatus::from(*s)))
                    .collect::<ParkingMap>(),
            ),
            mall: None,
        }
    }

    #[test]
    fn test_plan_toggle_free_becomes_booked() {
        let req = ActionDispatcher::<RecordingApi>::plan_toggle(&state(&[("3", "free")]), "3");
        assert_eq!(
            req,
            ToggleRequest {
                slot: "3".to_string(),
                status: SlotStatus::Booked
            }
        );
    }

    #[test]
    fn test_plan_toggle_anything_else_becomes_free() {
        let s = state(&[("3", "booked"), ("4", "reserved")]);
        assert_eq!(
            ActionDispatcher::<RecordingApi>::plan_toggle(&s, "3").status,
            SlotStatus::Free
        );
        assert_eq!(
            ActionDispatcher::<RecordingApi>::plan_toggle(&s, "4").status,
            SlotStatus::Free
        );
        // Unknown slot
        assert_eq!(
            ActionDispatcher::<RecordingApi>::plan_toggle(&s, "99").status,
            SlotStatus::Free
        );
        assert_eq!(
            ActionDispatcher::<RecordingApi>::plan_toggle(&MallState::default(), "1").status,
            SlotStatus::Free
        );
    }

    #[tokio::test]
    async fn test_toggle_issues_single_request_without_touching_state() {
        let dispatcher = ActionDispatcher::new(RecordingApi::default());
        let s = state(&[("A1", "free")]);

        let sent = dispatcher.toggle_slot(&s, "A1").await.unwrap();

        assert_eq!(sent.status, SlotStatus::Booked);
        assert_eq!(dispatcher.api().toggles.borrow().as_slice(), &[sent]);
        // Local state is only updated by the next push
        assert_eq!(s.parking.unwrap().get("A1"), Some(&SlotStatus::Free));
    }

    #[tokio::test]
    async fn test_upload_returns_response_verbatim() {
        let dispatcher = ActionDispatcher::new(RecordingApi::default());
        let result = dispatcher
            .upload_media(MediaUpload {
                file_name: "gate.mp4".to_string(),
                content_type: Some("video/mp4".to_string()),
                bytes: vec![0, 1, 2],
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            UploadResult(json!({"success": false, "message": "Failed to open video"}))
        );
        assert!(result.pretty().contains("\"message\": \"Failed to open video\""));
        assert_eq!(dispatcher.api().uploads.borrow().as_slice(), &["gate.mp4".to_string()]);
    }
}
