// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types for the GS1 syntax engine and its CLI front end.

use std::fmt;

/// Categories of engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsErrorKind {
    /// Structurally malformed input: bad brackets, bad URI scheme, missing
    /// values, missing FNC1.
    Format,
    /// AI key not present in the AI table, or not permitted where it appears.
    UnknownAi,
    /// Value length outside the component bounds, or a buffer limit exceeded.
    Length,
    /// Character outside the permitted set for a component, or a stray FNC1.
    Charset,
    /// Mod-10 parity mismatch on a component carrying a check digit.
    CheckDigit,
    /// Extracted-AI table is full.
    Capacity,
    /// Invalid configuration value passed to an encoder setter.
    Config,
    Io,
    Cli,
}

/// An engine error with a kind and a human-readable message.
///
/// The message is the single diagnostic surfaced to callers; the kind exists
/// so that programmatic callers can branch without string matching.
#[derive(Debug, Clone)]
pub struct GsError {
    kind: GsErrorKind,
    message: String,
}

impl GsError {
    pub fn new(kind: GsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> GsErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GsError {}

impl From<std::io::Error> for GsError {
    fn from(err: std::io::Error) -> Self {
        Self::new(GsErrorKind::Io, err.to_string())
    }
}
