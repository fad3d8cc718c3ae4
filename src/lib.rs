// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! GS1 Application Identifier syntax engine and barcode data front end.
//!
//! The engine ingests barcode message content in any of three syntaxes,
//! validates it against the GS1 AI table, and exposes the canonical
//! element string together with an index of the extracted AIs:
//!
//! * raw element-string data, with `#` standing for FNC1;
//! * human-friendly bracketed AI syntax, `(01)12345678901231(10)ABC123`;
//! * GS1 Digital Link URIs.
//!
//! Symbology renderers consume the element string and the symbol
//! configuration held by [`Gs1Encoder`]; they are deliberately outside
//! this crate.

pub mod ai;
pub mod cli;
pub mod encoder;
pub mod error;
pub mod hri;

pub use encoder::{Gs1Encoder, ImageFormat, QrEcLevel, Symbology};
pub use error::{GsError, GsErrorKind};

/// Maximum barcode message content length in bytes.
pub const MAX_DATA: usize = 8191;
/// Maximum length of a single AI value.
pub const MAX_AI_LEN: usize = 90;
/// Maximum number of AIs in one message.
pub const MAX_AIS: usize = 64;
/// Maximum input and output filename length.
pub const MAX_FNAME: usize = 120;
