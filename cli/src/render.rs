//! Terminal rendering of session updates.
//!
//! Messages are written only when the engine says the reader is at the live
//! edge; while scrolled back, new arrivals are held and counted instead.
//!
//! Each line carries the message time as local `HH:MM:SS`, and lines by the
//! session's own user are marked with `*`.

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

use std::io::{self, Write};

use client::net::session::SessionUpdate;
use client::state::chat::{ChatMessage, MessageLog};
use client::{ConnectionStatus, ViewportState};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::pager::Pager;

pub struct Renderer<W: Write> {
    out: W,
    own_username: String,
    offset: UtcOffset,
    /// Messages already written at the tail.
    printed: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, own_username: impl Into<String>, offset: UtcOffset) -> Self {
        Self { out, own_username: own_username.into(), offset, printed: 0 }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render a batch of updates produced by one engine call.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn apply(&mut self, updates: &[SessionUpdate], messages: &MessageLog, pager: &mut Pager) -> io::Result<()> {
        for update in updates {
            match update {
                SessionUpdate::StatusChanged(status) => self.status(*status)?,
                // Written on the following ScrollToTail, or held while away.
                SessionUpdate::MessageAppended(_) => {}
                SessionUpdate::ScrollToTail => {
                    pager.follow();
                    self.flush_tail(messages)?;
                }
                SessionUpdate::ViewportChanged(viewport) => self.viewport(*viewport, messages)?,
            }
        }
        self.out.flush()
    }

    /// Write the messages currently inside the pager window.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn page(&mut self, messages: &MessageLog, pager: &Pager, viewport: ViewportState) -> io::Result<()> {
        let range = pager.visible(messages.len());
        writeln!(
            self.out,
            "-- lines {}-{} of {} --",
            range.start + usize::from(!range.is_empty()),
            range.end,
            messages.len()
        )?;
        for message in &messages.as_slice()[range] {
            let line = self.format_message(message);
            writeln!(self.out, "{line}")?;
        }
        if !viewport.at_live_edge {
            self.unread(viewport.unread_count)?;
        }
        self.out.flush()
    }

    /// Write an informational line.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn status(&mut self, status: ConnectionStatus) -> io::Result<()> {
        writeln!(self.out, "* {status}")
    }

    fn viewport(&mut self, viewport: ViewportState, messages: &MessageLog) -> io::Result<()> {
        if viewport.at_live_edge {
            self.flush_tail(messages)
        } else if viewport.unread_count > 0 {
            self.unread(viewport.unread_count)
        } else {
            Ok(())
        }
    }

    fn unread(&mut self, count: u32) -> io::Result<()> {
        writeln!(self.out, "-- {count} unread (/bottom to jump) --")
    }

    fn flush_tail(&mut self, messages: &MessageLog) -> io::Result<()> {
        for message in messages.iter().skip(self.printed) {
            let line = self.format_message(message);
            writeln!(self.out, "{line}")?;
        }
        self.printed = messages.len();
        Ok(())
    }

    fn format_message(&self, message: &ChatMessage) -> String {
        let marker = if message.user == self.own_username { '*' } else { ' ' };
        format!("[{}] {marker} <{}> {}", clock(message.time, self.offset), message.user, message.text)
    }
}

/// Wall-clock `HH:MM:SS` for a millisecond timestamp; `--:--:--` when the
/// timestamp is out of range.
#[must_use]
pub fn clock(time_ms: i64, offset: UtcOffset) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(time_ms) * 1_000_000)
        .ok()
        .and_then(|t| t.checked_to_offset(offset))
        .and_then(|t| t.format(format_description!("[hour]:[minute]:[second]")).ok())
        .unwrap_or_else(|| "--:--:--".to_owned())
}
