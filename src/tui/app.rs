//! Interactive TUI application.
//!
//! Every external call runs on a spawned task and reports back through an
//! [`AppMessage`]; the draw loop never blocks on the network. While a job is
//! in flight the action keys are disabled.

#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::net::profiles::{profile_index, DNS_PROFILES};
use crate::net::{ActivationState, NetworkUtils, SpeedTestReport, StatsSnapshot};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// Entries kept in the activity log.
const ACTIVITY_LIMIT: usize = 50;

/// Initial stats label text, before the first refresh.
const STATS_PLACEHOLDER: &str = "Network Stats: ";

/// Messages sent from worker tasks to the main event loop.
#[derive(Debug)]
enum AppMessage {
    /// Periodic stats refresh.
    Stats(StatsSnapshot),
    /// DNS change finished.
    DnsChanged {
        primary: String,
        secondary: String,
        result: Result<()>,
    },
    /// MTU change finished.
    MtuApplied { mtu: u32, result: Result<()> },
    /// Ping finished.
    Ping { host: String, text: String },
    /// Speed test finished.
    SpeedTest(Result<SpeedTestReport>),
    /// Optimization finished.
    Optimized(Result<()>),
    /// A worker task died before reporting.
    JobFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    Info,
    Error,
}

/// Modal dialog; swallows input until dismissed.
#[derive(Debug, Clone)]
struct Dialog {
    kind: DialogKind,
    title: String,
    body: String,
}

impl Dialog {
    fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    fn error(body: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Error,
            title: "Error".into(),
            body: body.into(),
        }
    }
}

pub struct App {
    utils: NetworkUtils,
    settings: Settings,
    state: ActivationState,
    selected_profile: usize,
    stats_label: String,
    /// What is running, if anything.
    busy: Option<&'static str>,
    dialog: Option<Dialog>,
    last_ping: Option<String>,
    activity: Vec<String>,
    message_tx: mpsc::UnboundedSender<AppMessage>,
    message_rx: mpsc::UnboundedReceiver<AppMessage>,
    list_state: ListState,
}

impl App {
    #[must_use]
    pub fn new(utils: NetworkUtils, settings: Settings) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let selected_profile = profile_index(&settings.default_profile).unwrap_or(0);

        Self {
            utils,
            settings,
            state: ActivationState::Inactive,
            selected_profile,
            stats_label: STATS_PLACEHOLDER.to_string(),
            busy: None,
            dialog: None,
            last_ping: None,
            activity: Vec::new(),
            message_tx,
            message_rx,
            list_state: ListState::default().with_selected(Some(selected_profile)),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let ticker = self.spawn_stats_ticker(self.settings.stats_interval());

        // Initialize terminal with raw mode and alternate screen
        let mut terminal = ratatui::init();
        let res = self.run_loop(&mut terminal).await;

        // Restore terminal state
        ratatui::restore();
        ticker.abort();

        res
    }

    async fn run_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> Result<()> {
        loop {
            // 1. Apply results from worker tasks
            while let Ok(msg) = self.message_rx.try_recv() {
                self.handle_message(msg);
            }

            // 2. Render UI
            terminal
                .draw(|f| self.draw(f))
                .map_err(|e| Error::tui(e.to_string()))?;

            // 3. Handle keyboard events (non-blocking with 50ms timeout)
            if crossterm::event::poll(Duration::from_millis(50))? {
                if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                    if !self.handle_key(key) {
                        break;
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Overwrite the stats label every `period`, first after one period.
    fn spawn_stats_ticker(&self, period: Duration) -> JoinHandle<()> {
        let tx = self.message_tx.clone();
        let utils = self.utils.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(AppMessage::Stats(utils.get_network_stats())).is_err() {
                    break;
                }
            }
        })
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Stats(snapshot) => {
                self.stats_label = snapshot.label();
                return;
            }
            AppMessage::DnsChanged {
                primary,
                secondary,
                result,
            } => match result {
                Ok(()) => self.log_change(format!("DNS changed to {primary}, {secondary}")),
                Err(e) => self.show_error(&e),
            },
            AppMessage::MtuApplied { mtu, result } => match result {
                Ok(()) => {
                    let msg = format!("MTU set to {mtu} on {}", self.settings.interface);
                    self.log_change(msg);
                }
                Err(e) => self.show_error(&e),
            },
            AppMessage::Ping { host, text } => {
                let line = format!("Ping {host}: {text}");
                self.log_change(line.clone());
                self.last_ping = Some(line);
            }
            AppMessage::SpeedTest(result) => match result {
                Ok(report) => {
                    self.log_change(format!(
                        "Speed test via {}: {} down, {} up",
                        report.server,
                        report.download_text(),
                        report.upload_text()
                    ));
                    self.dialog = Some(Dialog::info("Speed Test Results", report.summary()));
                }
                Err(e) => self.show_error(&e),
            },
            AppMessage::Optimized(result) => match result {
                Ok(()) => {
                    self.dialog = Some(Dialog::info(
                        "Optimization",
                        "Network optimization complete.",
                    ));
                }
                Err(e) => self.show_error(&e),
            },
            AppMessage::JobFailed(reason) => {
                tracing::error!("{reason}");
                self.dialog = Some(Dialog::error(reason));
            }
        }

        // Every job result re-enables the actions
        self.busy = None;
    }

    /// Returns `false` when the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        if self.dialog.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'q')
            ) {
                self.dialog = None;
            }
            return true;
        }

        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Up | KeyCode::Char('k') => self.select_profile(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_profile(1),
            _ if self.busy.is_some() => {}
            KeyCode::Char('a') => self.activate(),
            KeyCode::Char('d') => self.deactivate(),
            KeyCode::Char('t') => self.run_speed_test(),
            KeyCode::Char('o') => self.optimize_network(),
            KeyCode::Char('m') => self.apply_mtu(),
            KeyCode::Char('p') => self.check_ping(),
            _ => {}
        }

        true
    }

    fn select_profile(&mut self, delta: isize) {
        let len = DNS_PROFILES.len() as isize;
        let next = (self.selected_profile as isize + delta).rem_euclid(len);
        self.selected_profile = next as usize;
        self.list_state.select(Some(self.selected_profile));
    }

    fn activate(&mut self) {
        let profile = DNS_PROFILES[self.selected_profile];
        self.state = ActivationState::Active;
        self.change_dns(profile.primary.to_string(), profile.secondary.to_string());
        self.log_change(format!("Activated with DNS: {}", profile.name));
    }

    fn deactivate(&mut self) {
        self.state = ActivationState::Inactive;
        self.change_dns(String::new(), String::new());
        self.log_change("Deactivated".to_string());
    }

    fn change_dns(&mut self, primary: String, secondary: String) {
        let utils = self.utils.clone();
        let interface = self.settings.interface.clone();
        self.spawn_job("Changing DNS", async move {
            let result = utils.change_dns(&primary, &secondary, &interface).await;
            AppMessage::DnsChanged {
                primary,
                secondary,
                result,
            }
        });
    }

    fn apply_mtu(&mut self) {
        let utils = self.utils.clone();
        let interface = self.settings.interface.clone();
        let mtu = self.settings.mtu;
        self.spawn_job("Setting MTU", async move {
            let result = utils.set_adapter_settings(&interface, mtu).await;
            AppMessage::MtuApplied { mtu, result }
        });
    }

    fn check_ping(&mut self) {
        let utils = self.utils.clone();
        let host = self.settings.ping_host.clone();
        self.spawn_job("Pinging", async move {
            let text = utils.check_ping(&host).await;
            AppMessage::Ping { host, text }
        });
    }

    fn run_speed_test(&mut self) {
        let utils = self.utils.clone();
        self.spawn_job("Running speed test", async move {
            AppMessage::SpeedTest(utils.run_speed_test().await)
        });
    }

    fn optimize_network(&mut self) {
        let utils = self.utils.clone();
        self.spawn_job("Optimizing network", async move {
            AppMessage::Optimized(utils.optimize_traffic().await)
        });
    }

    fn spawn_job<F>(&mut self, label: &'static str, job: F)
    where
        F: Future<Output = AppMessage> + Send + 'static,
    {
        self.busy = Some(label);
        let tx = self.message_tx.clone();
        let handle = tokio::spawn(job);
        tokio::spawn(async move {
            let msg = match handle.await {
                Ok(msg) => msg,
                Err(e) => AppMessage::JobFailed(format!("{label} failed: {e}")),
            };
            let _ = tx.send(msg);
        });
    }

    fn show_error(&mut self, error: &Error) {
        tracing::error!("{error}");
        self.dialog = Some(Dialog::error(error.to_string()));
    }

    fn log_change(&mut self, action: String) {
        tracing::info!(target: "netopt::changes", "{action}");
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.activity.push(format!("[{stamp}] {action}"));
        if self.activity.len() > ACTIVITY_LIMIT {
            self.activity.remove(0);
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(DNS_PROFILES.len() as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        let title = Paragraph::new("Network Optimization Tool")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(title, chunks[0]);

        self.draw_status(f, chunks[1]);
        self.draw_profiles(f, chunks[2]);

        let stats = Paragraph::new(self.stats_label.as_str())
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .title(format!(" {} ", self.settings.interface))
                    .border_type(BorderType::Rounded),
            );
        f.render_widget(stats, chunks[3]);

        let job_line = match (self.busy, &self.last_ping) {
            (Some(label), _) => Line::from(Span::styled(
                format!("{label}..."),
                Style::default().fg(Color::Yellow),
            )),
            (None, Some(ping)) => Line::from(ping.as_str()),
            (None, None) => Line::from(Span::styled("Idle", Style::default().fg(Color::DarkGray))),
        };
        let job = Paragraph::new(job_line).block(Block::bordered().border_type(BorderType::Rounded));
        f.render_widget(job, chunks[4]);

        self.draw_activity(f, chunks[5]);

        let keys = if self.busy.is_some() {
            "[j/k] select profile  [q] quit  (actions disabled while busy)"
        } else {
            "[a] activate  [d] deactivate  [t] speed test  [o] optimize  [m] MTU  [p] ping  [q] quit"
        };
        let footer = Paragraph::new(keys).style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[6]);

        if let Some(dialog) = &self.dialog {
            draw_dialog(f, dialog);
        }
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let color = if self.state.is_active() {
            Color::Green
        } else {
            Color::Red
        };
        let status = Paragraph::new(self.state.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::bordered().border_type(BorderType::Rounded));
        f.render_widget(status, area);
    }

    fn draw_profiles(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = DNS_PROFILES
            .iter()
            .map(|p| ListItem::new(format!("{:<20} {} / {}", p.name, p.primary, p.secondary)))
            .collect();

        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(" DNS profile ")
                    .border_type(BorderType::Rounded),
            )
            .highlight_style(Style::default().bg(Color::Blue))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_activity(&self, f: &mut Frame, area: Rect) {
        // Newest entries that fit, oldest first
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.activity.len().saturating_sub(visible);
        let lines: Vec<Line> = self.activity[start..]
            .iter()
            .map(|entry| Line::from(entry.as_str()))
            .collect();

        let log = Paragraph::new(lines).block(
            Block::bordered()
                .title(" Activity ")
                .border_type(BorderType::Rounded),
        );
        f.render_widget(log, area);
    }
}

fn draw_dialog(f: &mut Frame, dialog: &Dialog) {
    let height = dialog.body.lines().count() as u16 + 4;
    let area = centered_rect(60, height, f.area());
    let color = match dialog.kind {
        DialogKind::Info => Color::Cyan,
        DialogKind::Error => Color::Red,
    };

    f.render_widget(Clear, area);
    let body = Paragraph::new(format!("{}\n\n[Enter] close", dialog.body))
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(format!(" {} ", dialog.title))
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(body, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
