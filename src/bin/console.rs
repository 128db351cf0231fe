use anyhow::{Context, Result};
use smartmall::channel::ws::RealtimeChannel;
use smartmall::channel::{ws_url, ChannelEvent};
use smartmall::chat::ChatSession;
use smartmall::config::{env::config_path, load_or_default, Role};
use smartmall::dashboard::Dashboard;
use smartmall::dispatch::http::HttpMallApi;
use smartmall::dispatch::{ActionDispatcher, MediaUpload};
use smartmall::speech::{Locale, SpeechCapabilities};
use smartmall::state::RenderRequest;
use smartmall::view::{render_transcript, ChartBoard, ChartSlot, PieChart, SlotStyle};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{error, info};

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Toggle(String),
    Upload(PathBuf),
    /// Simulated voice input
    Say(String),
    Lang(String),
    Help,
    Quit,
    Chat(String),
    Empty,
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match (head, rest.is_empty()) {
            ("", _) => Command::Empty,
            ("toggle", false) => Command::Toggle(rest.to_string()),
            ("upload", false) => Command::Upload(PathBuf::from(rest)),
            ("say", false) => Command::Say(rest.to_string()),
            ("lang", false) => Command::Lang(rest.to_string()),
            ("help", true) => Command::Help,
            ("quit", true) => Command::Quit,
            _ => Command::Chat(line.to_string()),
        }
    }
}

const HELP: &str = "\
Commands:
  toggle <slot>   flip a parking slot (admin)
  upload <path>   upload a video for analysis (admin)
  say <text>      speak to the assistant
  lang <locale>   select the chat language (en-IN, kn-IN, ...)
  help            show this help
  quit            leave
Anything else is sent to the mall assistant.";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartmall=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let local = LocalSet::new();
    local.block_on(&runtime, run())
}

async fn run() -> Result<()> {
    let path = config_path();
    let config = load_or_default(&path)?;
    let role = config.dashboard.role;
    info!(config = %path, server = %config.dashboard.server_url, role = %role, "Console starting");

    let api = HttpMallApi::new(config.dashboard.server_url.as_str())?;
    let dispatcher = Rc::new(ActionDispatcher::new(api));
    let mut dashboard = Dashboard::new(ChartBoard::new());
    let mut chat = ChatSession::new(&config.chat, SpeechCapabilities::none());
    let mut channel = RealtimeChannel::connect(
        ws_url(&config.dashboard.server_url),
        Duration::from_millis(config.dashboard.reconnect_delay_ms),
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Smart Mall {} dashboard ({})", role, config.dashboard.server_url);
    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            event = channel.next_event() => {
                let Some(event) = event else { break };
                match &event {
                    ChannelEvent::Connected => println!("[connected]"),
                    ChannelEvent::Disconnected { reason } => println!("[disconnected: {}]", reason),
                    ChannelEvent::Push(_) => {}
                }
                if let Some(request) = dashboard.handle(event) {
                    print_views(&dashboard, role, request);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else { break };
                match Command::parse(&line) {
                    Command::Empty => {}
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                    Command::Toggle(slot) => {
                        if !role.is_admin() {
                            println!("Admin access required");
                            continue;
                        }
                        let request = ActionDispatcher::<HttpMallApi>::plan_toggle(dashboard.state(), &slot);
                        let dispatcher = Rc::clone(&dispatcher);
                        tokio::task::spawn_local(async move {
                            if let Err(e) = dispatcher.send_toggle(&request).await {
                                error!(error = %e, slot = %request.slot, "Toggle failed");
                            }
                        });
                    }
                    Command::Upload(path) => {
                        if !role.is_admin() {
                            println!("Admin access required");
                            continue;
                        }
                        let dispatcher = Rc::clone(&dispatcher);
                        tokio::task::spawn_local(async move {
                            match upload_file(&dispatcher, &path).await {
                                Ok(pretty) => println!("Upload result:\n{}", pretty),
                                Err(e) => {
                                    error!(error = %e, "Upload failed");
                                    println!("Upload failed: {:#}", e);
                                }
                            }
                        });
                    }
                    Command::Lang(tag) => {
                        chat.select_locale(Locale::new(tag));
                        println!("Chat language: {}", chat.selected_locale());
                    }
                    Command::Say(text) => {
                        chat.on_recognized(&text);
                        print_last_exchange(&chat);
                    }
                    Command::Chat(text) => {
                        if chat.send_text(&text).is_some() {
                            print_last_exchange(&chat);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

async fn upload_file(dispatcher: &ActionDispatcher<HttpMallApi>, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let result = dispatcher
        .upload_media(MediaUpload {
            file_name,
            content_type: None,
            bytes,
        })
        .await?;
    Ok(result.pretty())
}

fn print_views(dashboard: &Dashboard<ChartBoard>, role: Role, request: RenderRequest) {
    if request.includes_parking() {
        let parking = dashboard.parking();
        if !parking.has_data {
            println!("Parking: no data yet");
        } else {
            println!("Parking ({} free of {}):", parking.free_count(), parking.slots.len());
            for card in &parking.slots {
                let marker = match card.style {
                    SlotStyle::Free => "[ ]",
                    SlotStyle::Occupied => "[X]",
                };
                if role.is_admin() {
                    println!("  {} {:<10} {:<8} (toggle {})", marker, card.title, card.status, card.toggle.slot);
                } else {
                    println!("  {} {:<10} {}", marker, card.title, card.status);
                }
            }
        }
    }

    if request.includes_mall() {
        if role.is_admin() {
            let summary = dashboard.summary();
            if summary.has_data {
                println!("Crowd:");
                for row in &summary.rows {
                    println!("  {:<18} {}", row.label, row.value);
                }
            } else {
                println!("Crowd: no data yet");
            }
        }
        let board = dashboard.charts();
        for slot in [ChartSlot::Age, ChartSlot::Gender] {
            if let Some(chart) = board.chart(slot) {
                print_chart(chart);
            }
        }
    }
}

fn print_chart(chart: &PieChart) {
    println!("{}:", chart.title);
    for slice in &chart.slices {
        let width = (slice.share * 30.0).round() as usize;
        println!(
            "  {:<10} {:>6} {:>5.1}% {}",
            slice.label,
            slice.value,
            slice.share * 100.0,
            "#".repeat(width)
        );
    }
}

fn print_last_exchange(chat: &ChatSession) {
    let messages = chat.transcript().messages();
    let start = messages.len().saturating_sub(2);
    for line in render_transcript(&messages[start..]) {
        println!("{}", line.plain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("toggle A3"), Command::Toggle("A3".to_string()));
        assert_eq!(
            Command::parse("upload  /tmp/gate cam.mp4 "),
            Command::Upload(PathBuf::from("/tmp/gate cam.mp4"))
        );
        assert_eq!(Command::parse("say where is parking"), Command::Say("where is parking".to_string()));
        assert_eq!(Command::parse("lang kn-IN"), Command::Lang("kn-IN".to_string()));
        assert_eq!(Command::parse(" help "), Command::Help);
        assert_eq!(Command::parse("quit"), Command::Quit);
        // "exit" is a question for the assistant
        assert_eq!(Command::parse("exit"), Command::Chat("exit".to_string()));
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_everything_else_is_chat() {
        assert_eq!(Command::parse("toggle"), Command::Chat("toggle".to_string()));
        assert_eq!(Command::parse("help me find food"), Command::Chat("help me find food".to_string()));
        assert_eq!(Command::parse("Hello there"), Command::Chat("Hello there".to_string()));
    }
}
