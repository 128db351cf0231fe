use std::rc::Rc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gloo_net::http::Request;
use js_sys::{Array, Uint8Array};
use serde_json::Value;
use smartmall::channel::ChannelEvent;
use smartmall::dispatch::{MallApi, MediaUpload, ToggleRequest, TOGGLE_PATH, UPLOAD_PATH};
use smartmall::protocol::parse_push;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, FormData, WebSocket};

fn log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

// ─── URLs ───────────────────────────────────────────────────────────────────

pub fn get_base_url() -> String {
    let Some(win) = web_sys::window() else {
        return "http://localhost:5000".to_string();
    };
    let loc = win.location();
    let proto = loc.protocol().unwrap_or_else(|_| "http:".to_string());
    let host = loc.host().unwrap_or_else(|_| "localhost:5000".to_string());
    format!("{}//{}", proto, host)
}

/// Value of `name` in the page's query string
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

// ─── HTTP API ───────────────────────────────────────────────────────────────

/// `MallApi` over the browser's fetch.
pub struct GlooMallApi {
    base_url: String,
}

impl GlooMallApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait(?Send)]
impl MallApi for GlooMallApi {
    async fn toggle_parking(&self, request: &ToggleRequest) -> Result<()> {
        Request::post(&format!("{}{}", self.base_url, TOGGLE_PATH))
            .json(request)?
            .send()
            .await?;
        Ok(())
    }

    async fn upload_video(&self, upload: MediaUpload) -> Result<Value> {
        let bytes = Uint8Array::from(upload.bytes.as_slice());
        let blob = Blob::new_with_u8_array_sequence(&Array::of1(&bytes))
            .map_err(|e| anyhow!("Failed to build upload blob: {:?}", e))?;
        let form = FormData::new().map_err(|e| anyhow!("Failed to build form: {:?}", e))?;
        form.append_with_blob_and_filename("file", &blob, &upload.file_name)
            .map_err(|e| anyhow!("Failed to attach file: {:?}", e))?;

        let response = Request::post(&format!("{}{}", self.base_url, UPLOAD_PATH))
            .body(form)?
            .send()
            .await?;
        Ok(response.json::<Value>().await?)
    }
}

// ─── WebSocket Connection ───────────────────────────────────────────────────

/// Connect to the hub and feed every channel event to `on_event`,
/// reconnecting after `reconnect_ms` whenever the socket drops.
pub fn connect_websocket(url: String, reconnect_ms: u32, on_event: Rc<dyn Fn(ChannelEvent)>) {
    log(&format!("Connecting to {}", url));

    let ws = match WebSocket::new(&url) {
        Ok(ws) => ws,
        Err(e) => {
            log(&format!("WS connect failed: {:?}", e));
            on_event(ChannelEvent::Disconnected {
                reason: format!("{:?}", e),
            });
            schedule_reconnect(url, reconnect_ms, on_event);
            return;
        }
    };

    let handler = on_event.clone();
    let onopen = Closure::wrap(Box::new(move |_e: web_sys::Event| {
        handler(ChannelEvent::Connected);
    }) as Box<dyn FnMut(_)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

    let handler = on_event.clone();
    let onmessage = Closure::wrap(Box::new(move |e: web_sys::MessageEvent| {
        let Ok(text) = e.data().dyn_into::<js_sys::JsString>() else {
            return;
        };
        match parse_push(&String::from(text)) {
            Ok(frame) => handler(ChannelEvent::Push(frame)),
            Err(e) => log(&format!("Skipping malformed push frame: {}", e)),
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

    let onerror = Closure::wrap(Box::new(move |_e: web_sys::Event| {
        log("WebSocket error");
    }) as Box<dyn FnMut(_)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    // A failed connection also fires close, so reconnect only from here
    let onclose = Closure::wrap(Box::new(move |e: web_sys::CloseEvent| {
        log("WebSocket closed, reconnecting...");
        on_event(ChannelEvent::Disconnected {
            reason: format!("closed ({})", e.code()),
        });
        schedule_reconnect(url.clone(), reconnect_ms, on_event.clone());
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

    // Keep closures alive
    onopen.forget();
    onmessage.forget();
    onerror.forget();
    onclose.forget();
}

fn schedule_reconnect(url: String, reconnect_ms: u32, on_event: Rc<dyn Fn(ChannelEvent)>) {
    let timeout = gloo_timers::callback::Timeout::new(reconnect_ms, move || {
        connect_websocket(url, reconnect_ms, on_event);
    });
    timeout.forget();
}
