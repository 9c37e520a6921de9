use super::style::Palette;
use crate::api::{LogEntry, Message, Session};
use crate::app::ConversationView;
use crate::config::Theme;
use crate::conversation::{display_text, is_failed_result};
use crate::timer::format_elapsed;
use chrono::{DateTime, Local};
use std::io::Write;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Terminal projection of application state.
pub struct TerminalView {
    palette: Palette,
    ticker: Option<JoinHandle<()>>,
}

impl TerminalView {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: Palette::new(theme),
            ticker: None,
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl ConversationView for TerminalView {
    fn show_message(&mut self, message: &Message) {
        print_message(&self.palette, message);
    }

    fn show_snapshot(&mut self, messages: &[Message], logs: &[LogEntry]) {
        for message in messages {
            print_message(&self.palette, message);
        }
        if !logs.is_empty() {
            println!("{}", self.palette.dim(&format!("({} log entries; /logs to view)", logs.len())));
        }
    }

    fn show_sessions(&mut self, sessions: &[Session], current: Option<&str>) {
        for session in sessions {
            let marker = if Some(session.id.as_str()) == current {
                self.palette.accent("●")
            } else {
                self.palette.dim("○")
            };
            println!(
                "{marker} {} {}  {}",
                self.palette.value(&session.id),
                session.title,
                self.palette
                    .dim(&format!("{} | {}", session.model, session.permission_mode))
            );
        }
    }

    fn status(&mut self, line: &str) {
        eprintln!("{}", self.palette.dim(line));
    }

    fn timer_started(&mut self) {
        self.stop_ticker();
        let started_at = Instant::now();
        // Redraw the elapsed label in place ten times a second while the
        // response is in flight.
        self.ticker = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(std::time::Duration::from_millis(100));
            loop {
                tick.tick().await;
                eprint!("\rResponse: {} ", format_elapsed(started_at.elapsed()));
                let _ = std::io::stderr().flush();
            }
        }));
    }

    fn timer_stopped(&mut self, label: &str) {
        self.stop_ticker();
        eprintln!("\rResponse: {label}");
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn print_message(palette: &Palette, message: &Message) {
    let header = format!("{} · {}", message.role, message.message_type);
    let header = if is_failed_result(message) {
        palette.error(&header)
    } else {
        palette.accent(&header)
    };
    println!(
        "{header} {}",
        palette.dim(&format_time(message.created_at.as_deref()))
    );
    println!("{}", display_text(message));
}

pub fn print_log(palette: &Palette, entry: &LogEntry) {
    println!(
        "{} {}",
        palette.header(&entry.event_type),
        palette.dim(&format_time(entry.created_at.as_deref()))
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&entry.details).unwrap_or_default()
    );
}

/// Local-time rendering of a server timestamp; unparseable values pass
/// through unchanged.
fn format_time(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => value.to_string(),
    }
}
