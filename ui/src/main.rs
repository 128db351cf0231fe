mod net;
mod speech;

use std::{cell::RefCell, collections::VecDeque, io::Result, rc::Rc};

use ratzilla::event::KeyCode;
use ratzilla::ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use smartmall::channel::{ws_url, ChannelEvent};
use smartmall::chat::ChatSession;
use smartmall::config::{ChatConfig, DashboardConfig, Role};
use smartmall::dashboard::Dashboard;
use smartmall::dispatch::{ActionDispatcher, MediaUpload};
use smartmall::speech::{Locale, Notice};
use smartmall::view::{render_transcript, ChartBoard, ChartSlot, PieChart, SlotStyle};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use net::GlooMallApi;
use speech::{SpeechEvent, SpeechInbox};

/// Languages offered by the chat language selector
const LANGUAGES: [&str; 2] = ["en-IN", "kn-IN"];

/// File input next to the terminal in index.html
const FILE_INPUT_ID: &str = "video-file";

// ─── App State ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum InputMode {
    Normal,
    Chat,
}

struct App {
    role: Role,
    dashboard: Dashboard<ChartBoard>,
    chat: ChatSession,
    speech_inbox: SpeechInbox,
    table_state: TableState,
    input: String,
    mode: InputMode,
    upload_status: Option<String>,
}

impl App {
    fn new(role: Role, chat: ChatSession, speech_inbox: SpeechInbox) -> Self {
        Self {
            role,
            dashboard: Dashboard::new(ChartBoard::new()),
            chat,
            speech_inbox,
            table_state: TableState::default().with_selected(Some(0)),
            input: String::new(),
            mode: InputMode::Normal,
            upload_status: None,
        }
    }

    fn selected_slot(&self) -> Option<String> {
        let index = self.table_state.selected()?;
        self.dashboard
            .parking()
            .slots
            .get(index)
            .map(|card| card.id.clone())
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.dashboard.parking().slots.len();
        if count == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0).min(count - 1);
        let next = if down {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn cycle_language(&mut self) {
        let current = self.chat.selected_locale().as_str().to_string();
        let index = LANGUAGES.iter().position(|l| *l == current).unwrap_or(0);
        let next = LANGUAGES[(index + 1) % LANGUAGES.len()];
        self.chat.select_locale(Locale::from(next));
    }

    /// Feed recognition results queued by the browser into the chat.
    fn drain_speech(&mut self) {
        let events: Vec<SpeechEvent> = self.speech_inbox.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                SpeechEvent::Recognized(text) => {
                    self.chat.on_recognized(&text);
                }
                SpeechEvent::Failed(reason) => {
                    let notice = self.chat.on_recognition_error(&reason);
                    show_notice(&notice);
                }
            }
        }
    }
}

fn show_notice(notice: &Notice) {
    if let Some(win) = web_sys::window() {
        let _ = win.alert_with_message(&notice.message);
    }
}

// ─── Colors ─────────────────────────────────────────────────────────────────

/// `#RRGGBB` -> ratatui color
fn hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0xFF)
    };
    Color::Rgb(channel(0), channel(2), channel(4))
}

// ─── UI Rendering ───────────────────────────────────────────────────────────

fn render_header(f: &mut ratzilla::ratatui::Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(56)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("▦ ", Style::default().fg(Color::Cyan)),
        Span::styled("Smart Mall", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {} dashboard", app.role), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));

    let mut status = vec![Span::styled(
        format!("lang {}  ", app.chat.selected_locale()),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(at) = app.dashboard.store().last_push_at() {
        status.push(Span::styled(
            format!("updated {}  ", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.dashboard.is_connected() {
        status.push(Span::styled("● LIVE", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)));
    } else {
        status.push(Span::styled("● DISCONNECTED", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)));
    }
    let status = Paragraph::new(Line::from(status))
        .alignment(ratzilla::ratatui::layout::Alignment::Right)
        .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));

    f.render_widget(title, chunks[0]);
    f.render_widget(status, chunks[1]);
}

fn render_parking(f: &mut ratzilla::ratatui::Frame, area: Rect, app: &mut App) {
    let view = app.dashboard.parking();
    let block = Block::default()
        .title(format!(" Parking ({} free) ", view.free_count()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if !view.has_data {
        let empty = Paragraph::new("No parking data yet").block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = view
        .slots
        .iter()
        .map(|card| {
            let color = match card.style {
                SlotStyle::Free => Color::Green,
                SlotStyle::Occupied => Color::Red,
            };
            Row::new(vec![
                Cell::from(card.title.clone()),
                Cell::from(card.status.clone()).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(10)])
        .header(Row::new(vec!["Slot", "Status"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn chart_lines(chart: &PieChart) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        chart.title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for slice in &chart.slices {
        let width = (slice.share * 20.0).round() as usize;
        lines.push(Line::from(vec![
            Span::styled("█".repeat(width.max(1)), Style::default().fg(hex_color(slice.color))),
            Span::raw(format!(" {} {} ({:.0}%)", slice.label, slice.value, slice.share * 100.0)),
        ]));
    }
    lines.push(Line::raw(""));
    lines
}

fn render_crowd(f: &mut ratzilla::ratatui::Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    if app.role.is_admin() {
        let summary = app.dashboard.summary();
        if summary.has_data {
            for row in &summary.rows {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<18}", row.label), Style::default().fg(Color::DarkGray)),
                    Span::raw(row.value.clone()),
                ]));
            }
        } else {
            lines.push(Line::raw("No crowd data yet"));
        }
        lines.push(Line::raw(""));
    }

    let board = app.dashboard.charts();
    for slot in [ChartSlot::Age, ChartSlot::Gender] {
        if let Some(chart) = board.chart(slot) {
            lines.extend(chart_lines(chart));
        }
    }

    if let Some(status) = &app.upload_status {
        lines.push(Line::from(Span::styled("Upload result", Style::default().add_modifier(Modifier::BOLD))));
        lines.extend(status.lines().map(|l| Line::raw(l.to_string())));
    }

    let crowd = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Crowd ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(crowd, area);
}

fn render_chat(f: &mut ratzilla::ratatui::Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let lines: Vec<Line> = render_transcript(app.chat.transcript().messages())
        .into_iter()
        .map(|line| {
            let color = if line.sender == "Bot" { Color::Cyan } else { Color::Yellow };
            Line::from(vec![
                Span::styled(format!("{}: ", line.sender), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(line.text),
            ])
        })
        .collect();
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let transcript = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Mall Assistant ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(transcript, chunks[0]);

    let (border, prompt) = match app.mode {
        InputMode::Chat => (Color::Yellow, format!("> {}▏", app.input)),
        InputMode::Normal => (Color::DarkGray, "press i to type".to_string()),
    };
    let input = Paragraph::new(prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, chunks[1]);
}

fn render_help(f: &mut ratzilla::ratatui::Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let label = |l: &'static str| Span::styled(l, Style::default().fg(Color::DarkGray));

    let mut spans = Vec::new();
    if app.role.is_admin() {
        spans.extend([key(" ↑↓"), label(" select  "), key("t"), label(" toggle  "), key("u"), label(" upload  ")]);
    }
    spans.extend([key(" i"), label(" chat  "), key("l"), label(" language  ")]);
    match app.chat.listen_control() {
        smartmall::speech::ListenControl::Enabled => spans.extend([key("m"), label(" speak")]),
        smartmall::speech::ListenControl::Disabled { reason } => {
            spans.push(Span::styled(format!("m speak ({})", reason), Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)))
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Actions ────────────────────────────────────────────────────────────────

fn toggle_selected(app: &App, dispatcher: &Rc<ActionDispatcher<GlooMallApi>>) {
    let Some(slot) = app.selected_slot() else {
        return;
    };
    let request = ActionDispatcher::<GlooMallApi>::plan_toggle(app.dashboard.state(), &slot);
    let dispatcher = dispatcher.clone();
    spawn_local(async move {
        if let Err(e) = dispatcher.send_toggle(&request).await {
            web_sys::console::log_1(&format!("Toggle failed: {:#}", e).into());
        }
    });
}

fn selected_file() -> Option<web_sys::File> {
    let input = web_sys::window()?
        .document()?
        .get_element_by_id(FILE_INPUT_ID)?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()?;
    input.files()?.get(0)
}

fn upload_selected(state: &Rc<RefCell<App>>, dispatcher: &Rc<ActionDispatcher<GlooMallApi>>) {
    let Some(file) = selected_file() else {
        state.borrow_mut().upload_status = Some("Choose a video file first".to_string());
        return;
    };
    state.borrow_mut().upload_status = Some(format!("Uploading {}...", file.name()));

    let state = state.clone();
    let dispatcher = dispatcher.clone();
    spawn_local(async move {
        let status = match read_file(&file).await {
            Ok(bytes) => {
                let upload = MediaUpload {
                    file_name: file.name(),
                    content_type: Some(file.type_()).filter(|t| !t.is_empty()),
                    bytes,
                };
                match dispatcher.upload_media(upload).await {
                    Ok(result) => result.pretty(),
                    Err(e) => format!("Upload failed: {:#}", e),
                }
            }
            Err(e) => format!("Failed to read file: {:?}", e),
        };
        state.borrow_mut().upload_status = Some(status);
    });
}

async fn read_file(file: &web_sys::File) -> std::result::Result<Vec<u8>, JsValue> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let dashboard_config = DashboardConfig {
        server_url: net::get_base_url(),
        role: net::query_param("role")
            .and_then(|r| r.parse().ok())
            .unwrap_or_default(),
        ..DashboardConfig::default()
    };
    let chat_config = ChatConfig {
        recognition_locale: net::query_param("lang")
            .map(Locale::new)
            .unwrap_or_default(),
        ..ChatConfig::default()
    };

    let speech_inbox: SpeechInbox = Rc::new(RefCell::new(VecDeque::new()));
    let chat = ChatSession::new(&chat_config, speech::detect(speech_inbox.clone()));
    let state = Rc::new(RefCell::new(App::new(dashboard_config.role, chat, speech_inbox)));
    let dispatcher = Rc::new(ActionDispatcher::new(GlooMallApi::new(
        dashboard_config.server_url.as_str(),
    )));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // ── Connect WebSocket ───────────────────────────────────────────────
    {
        let state_clone = state.clone();
        let on_event: Rc<dyn Fn(ChannelEvent)> = Rc::new(move |event| {
            state_clone.borrow_mut().dashboard.handle(event);
        });
        net::connect_websocket(
            ws_url(&dashboard_config.server_url),
            dashboard_config.reconnect_delay_ms as u32,
            on_event,
        );
    }

    // ── Key events ──────────────────────────────────────────────────────
    terminal.on_key_event({
        let state_clone = state.clone();
        move |key_event| {
            let mode = state_clone.borrow().mode;
            if mode == InputMode::Chat {
                let mut s = state_clone.borrow_mut();
                match key_event.code {
                    KeyCode::Char(c) => s.input.push(c),
                    KeyCode::Backspace => {
                        s.input.pop();
                    }
                    KeyCode::Enter => {
                        let text = std::mem::take(&mut s.input);
                        s.chat.send_text(&text);
                    }
                    KeyCode::Esc => s.mode = InputMode::Normal,
                    _ => {}
                }
                return;
            }

            let is_admin = state_clone.borrow().role.is_admin();
            match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => state_clone.borrow_mut().move_selection(false),
                KeyCode::Down | KeyCode::Char('j') => state_clone.borrow_mut().move_selection(true),
                KeyCode::Char('t') if is_admin => toggle_selected(&state_clone.borrow(), &dispatcher),
                KeyCode::Char('u') if is_admin => upload_selected(&state_clone, &dispatcher),
                KeyCode::Char('i') => state_clone.borrow_mut().mode = InputMode::Chat,
                KeyCode::Char('l') => state_clone.borrow_mut().cycle_language(),
                KeyCode::Char('m') => {
                    let result = state_clone.borrow_mut().chat.start_listening();
                    if let Err(notice) = result {
                        show_notice(&notice);
                    }
                }
                _ => {}
            }
        }
    });

    // ── Draw loop (runs on rAF) ─────────────────────────────────────────
    terminal.draw_web({
        let state_clone = state.clone();
        move |f| {
            let s = &mut *state_clone.borrow_mut();
            s.drain_speech();

            let outer = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2), // header
                    Constraint::Min(10),   // main content
                    Constraint::Length(1), // help
                ])
                .split(f.area());

            render_header(f, outer[0], s);

            // Main content: parking | crowd | chat
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(30),
                    Constraint::Percentage(35),
                    Constraint::Percentage(35),
                ])
                .split(outer[1]);

            render_parking(f, main_chunks[0], s);
            render_crowd(f, main_chunks[1], s);
            render_chat(f, main_chunks[2], s);
            render_help(f, outer[2], s);
        }
    });

    Ok(())
}
