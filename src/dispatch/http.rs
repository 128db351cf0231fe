use super::{MallApi, MediaUpload, ToggleRequest, TOGGLE_PATH, UPLOAD_PATH};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// `MallApi` over HTTP.
#[derive(Clone)]
pub struct HttpMallApi {
    http_client: Client,
    base_url: String,
}

impl HttpMallApi {
    /// Client for the hub at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("smartmall-dashboard/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl MallApi for HttpMallApi {
    async fn toggle_parking(&self, request: &ToggleRequest) -> Result<()> {
        let response = self
            .http_client
            .post(self.url(TOGGLE_PATH))
            .json(request)
            .send()
            .await
            .context("Failed to send toggle request")?;
        debug!(status = %response.status(), "Toggle request answered");
        Ok(())
    }

    async fn upload_video(&self, upload: MediaUpload) -> Result<Value> {
        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            part = part
                .mime_str(&content_type)
                .context("Invalid upload content type")?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;
        debug!(status = %response.status(), "Upload request answered");

        response
            .json::<Value>()
            .await
            .context("Failed to parse upload response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SlotStatus;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_toggle_posts_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/toggle_parking")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"slot": "A3", "status": "booked"})))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let api = HttpMallApi::new(server.url()).unwrap();
        api.toggle_parking(&ToggleRequest {
            slot: "A3".to_string(),
            status: SlotStatus::Booked,
        })
        .await
        .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_toggle_ignores_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/toggle_parking")
            .with_status(400)
            .with_body(r#"{"success":false,"message":"Invalid slot"}"#)
            .create_async()
            .await;

        let api = HttpMallApi::new(format!("{}/", server.url())).unwrap();
        let result = api
            .toggle_parking(&ToggleRequest {
                slot: "Z9".to_string(),
                status: SlotStatus::Free,
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload_video")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"name="file"; filename="gate.mp4""#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"result":{"in":5,"out":2,"inside":3}}"#)
            .create_async()
            .await;

        let api = HttpMallApi::new(server.url()).unwrap();
        let body = api
            .upload_video(MediaUpload {
                file_name: "gate.mp4".to_string(),
                content_type: Some("video/mp4".to_string()),
                bytes: b"fake video".to_vec(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body["result"]["inside"], 3);
    }

    #[tokio::test]
    async fn test_upload_error_body_is_returned() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/upload_video")
            .with_status(403)
            .with_body(r#"{"success":false,"message":"Admin access required"}"#)
            .create_async()
            .await;

        let api = HttpMallApi::new(server.url()).unwrap();
        let body = api
            .upload_video(MediaUpload {
                file_name: "x.mp4".to_string(),
                content_type: None,
                bytes: vec![],
            })
            .await
            .unwrap();

        assert_eq!(body["message"], "Admin access required");
    }

    #[tokio::test]
    async fn test_upload_non_json_body_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/upload_video")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let api = HttpMallApi::new(server.url()).unwrap();
        let result = api
            .upload_video(MediaUpload {
                file_name: "x.mp4".to_string(),
                content_type: None,
                bytes: vec![1],
            })
            .await;

        assert!(result.is_err());
    }
}
