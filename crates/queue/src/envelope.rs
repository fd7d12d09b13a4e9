//! Text envelope used to carry headers and body through the queue proxy.
//!
//! ```text
//! FTMSG/1.0
//! Message-Id: 3b4a...
//! X-Request-Id: tid_1234
//!
//! {"id": "..."}
//! ```
//!
//! The first line is the version marker, followed by `Name: value` header
//! lines, a blank line, and the body verbatim.

use std::collections::BTreeMap;

use crate::message::Message;

pub const ENVELOPE_VERSION: &str = "FTMSG/1.0";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Message envelope does not start with FTMSG/1.0")]
    MissingVersion,

    #[error("Malformed envelope header line: {0:?}")]
    MalformedHeader(String),
}

/// Render a message as an envelope.
pub fn encode(message: &Message) -> String {
    let mut out = String::with_capacity(message.body.len() + 64 * message.headers.len() + 16);
    out.push_str(ENVELOPE_VERSION);
    out.push('\n');
    for (name, value) in &message.headers {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&message.body);
    out
}

/// Parse an envelope back into a message.
///
/// Accepts `\r\n` line endings in the header section.
pub fn decode(raw: &str) -> Result<Message, EnvelopeError> {
    let (version, mut rest) = split_line(raw);
    if version.trim_end() != ENVELOPE_VERSION {
        return Err(EnvelopeError::MissingVersion);
    }

    let mut headers = BTreeMap::new();
    loop {
        let (line, remaining) = split_line(rest);
        rest = remaining;

        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| EnvelopeError::MalformedHeader(line.to_string()))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());

        if rest.is_empty() {
            break;
        }
    }

    Ok(Message::new(headers, rest))
}

fn split_line(input: &str) -> (&str, &str) {
    match input.split_once('\n') {
        Some((line, rest)) => (line, rest),
        None => (input, ""),
    }
}
