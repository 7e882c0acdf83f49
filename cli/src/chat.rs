//! Chat page: one typed line in, rendered updates out.
//!
//! The input line is only "enabled" while the socket is connected. A chat
//! line typed at any other time is refused with a notice instead of being
//! shown as if it had been sent.

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::io::{self, Write};

use client::net::transport::Transport;
use client::{ChatSession, SessionUpdate};

use crate::input::{HELP, Input};
use crate::pager::Pager;
use crate::render::Renderer;

pub const NOT_CONNECTED: &str = "not connected; message not sent";

/// Apply one typed line. Returns false when the session is over.
///
/// # Errors
///
/// Returns the underlying terminal write error.
pub fn handle_line<T: Transport, W: Write>(
    session: &mut ChatSession<T>,
    pager: &mut Pager,
    renderer: &mut Renderer<W>,
    line: &str,
) -> io::Result<bool> {
    let total = session.messages().len();
    let updates: Vec<SessionUpdate> = match Input::parse(line) {
        Input::Leave => {
            let updates = session.leave();
            renderer.apply(&updates, session.messages(), pager)?;
            return Ok(false);
        }
        Input::Bottom => {
            pager.follow();
            session.jump_to_live_edge()
        }
        Input::Up(lines) => {
            let position = pager.up(lines.unwrap_or(pager.page_lines()), total);
            let updates = session.report_scroll(position);
            renderer.page(session.messages(), pager, session.viewport())?;
            updates
        }
        Input::Down(lines) => {
            let position = pager.down(lines.unwrap_or(pager.page_lines()), total);
            let updates = session.report_scroll(position);
            if !session.viewport().at_live_edge {
                renderer.page(session.messages(), pager, session.viewport())?;
            }
            updates
        }
        Input::Help => {
            renderer.notice(HELP)?;
            Vec::new()
        }
        Input::Send(text) if text.trim().is_empty() => Vec::new(),
        Input::Send(_) if !session.status().is_connected() => {
            renderer.notice(NOT_CONNECTED)?;
            Vec::new()
        }
        Input::Send(text) => session.send(&text),
        Input::Invalid(reason) => {
            renderer.notice(&reason)?;
            Vec::new()
        }
    };
    renderer.apply(&updates, session.messages(), pager)?;
    Ok(true)
}
