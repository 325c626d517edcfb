// ABOUTME: Fully-qualified hostname validation for DNS registration.
// ABOUTME: Derives the hosted zone domain from the last two labels.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostNameError {
    #[error("hostname cannot be empty")]
    Empty,

    #[error("hostname label cannot be empty: {0}")]
    EmptyLabel(String),

    #[error("hostname label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("invalid character in hostname: '{0}'")]
    InvalidChar(char),
}

/// A fully-qualified hostname such as `app.prod.example.com`.
///
/// A single trailing dot is accepted and dropped, so `example.com.` and
/// `example.com` are the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostName(String);

impl HostName {
    pub fn new(value: &str) -> Result<Self, HostNameError> {
        let value = value.trim();
        let value = value.strip_suffix('.').unwrap_or(value);
        if value.is_empty() {
            return Err(HostNameError::Empty);
        }

        for (index, label) in value.split('.').enumerate() {
            if label.is_empty() {
                return Err(HostNameError::EmptyLabel(value.to_string()));
            }
            if label.len() > 63 {
                return Err(HostNameError::LabelTooLong(label.to_string()));
            }
            // Wildcard records are only valid as the whole leftmost label
            if index == 0 && label == "*" {
                continue;
            }
            if let Some(c) = label
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
            {
                return Err(HostNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hosted zone this name lives in: its last two labels.
    ///
    /// `app.prod.example.com` yields `example.com`. A name with fewer than
    /// two labels is its own zone.
    pub fn zone_domain(&self) -> &str {
        let mut dots = self.0.rmatch_indices('.').map(|(i, _)| i);
        match (dots.next(), dots.next()) {
            (Some(_), Some(second)) => &self.0[second + 1..],
            _ => &self.0,
        }
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
