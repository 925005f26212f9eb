// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Communication-log types.
//!
//! Every booking carries an append-only log of what happened to it and who
//! talked to whom. Entries are immutable once created; the log is never
//! edited or truncated.

use ride_booking_domain::{DomainError, validate_message};
use std::str::FromStr;
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// The entity that wrote a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Author {
    /// The booking engine itself (state changes).
    System,
    /// The customer (self-service actions).
    Customer,
    /// An operator, identified by login name.
    Operator(String),
}

impl Author {
    /// Returns the stored representation of the author.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Customer => "customer",
            Self::Operator(login) => login,
        }
    }

    /// Reconstructs an author from its stored representation.
    ///
    /// Anything other than `system` or `customer` is an operator login.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        match value {
            "system" => Self::System,
            "customer" => Self::Customer,
            login => Self::Operator(login.to_string()),
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a log entry reached the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Generated by a state change.
    System,
    /// Phone call.
    Phone,
    /// `WhatsApp` message.
    WhatsApp,
    /// Email.
    Email,
    /// Text message.
    Sms,
    /// Internal operator note.
    Note,
}

impl Channel {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Phone => "phone",
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Note => "note",
        }
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "phone" => Ok(Self::Phone),
            "whatsapp" => Ok(Self::WhatsApp),
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "note" => Ok(Self::Note),
            _ => Err(DomainError::InvalidChannel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable entry in a booking's communication log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationEntry {
    /// When the entry was written.
    pub timestamp: OffsetDateTime,
    /// How it reached the booking.
    pub channel: Channel,
    /// The message body, trimmed.
    pub message: String,
    /// Who wrote it.
    pub author: Author,
}

impl CommunicationEntry {
    /// Creates a new entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCommunication` if the message is empty
    /// or too long.
    pub fn new(
        timestamp: OffsetDateTime,
        channel: Channel,
        message: &str,
        author: Author,
    ) -> Result<Self, DomainError> {
        let message: String = validate_message(message)?;
        Ok(Self {
            timestamp,
            channel,
            message,
            author,
        })
    }

    /// Creates a system-authored state-change entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCommunication` if the message is empty
    /// or too long.
    pub fn system(timestamp: OffsetDateTime, message: &str) -> Result<Self, DomainError> {
        Self::new(timestamp, Channel::System, message, Author::System)
    }
}
