//! One-shot messages kept in the session until the next rendered page.

use serde::{Deserialize, Serialize};

use crate::consts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

/// Queues `text` for the next page. A session failure only loses the message.
pub fn push(session: &ntex_session::Session, level: Level, text: impl Into<String>) {
    let mut messages = session
        .get::<Vec<FlashMessage>>(consts::MESSAGES_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();

    messages.push(FlashMessage {
        level,
        text: text.into(),
    });

    if let Err(e) = session.set(consts::MESSAGES_SESSION_KEY, messages) {
        log::warn!("flash message couldnt be stored in the session: {e}");
    }
}

/// Drains the queued messages
pub fn take(session: &ntex_session::Session) -> Vec<FlashMessage> {
    let messages = session
        .get::<Vec<FlashMessage>>(consts::MESSAGES_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();

    if !messages.is_empty() {
        session.remove(consts::MESSAGES_SESSION_KEY);
    }

    messages
}

pub fn info(session: &ntex_session::Session, text: impl Into<String>) {
    push(session, Level::Info, text)
}

pub fn success(session: &ntex_session::Session, text: impl Into<String>) {
    push(session, Level::Success, text)
}

pub fn warning(session: &ntex_session::Session, text: impl Into<String>) {
    push(session, Level::Warning, text)
}

pub fn error(session: &ntex_session::Session, text: impl Into<String>) {
    push(session, Level::Error, text)
}
