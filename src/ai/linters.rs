// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Component linters for AI values.
//!
//! Character-set linters are applied implicitly according to a component's
//! declared set; additional linters such as the mod-10 check digit are
//! declared per component in the AI table and dispatched by identity.

use crate::error::{GsError, GsErrorKind};

/// The 82 characters valid within "X"-typed AI components.
pub const CSET82: &[u8] =
    b"!\"%&'()*+,-./0123456789:;<=>?ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Additional linters attachable to an AI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linter {
    /// Trailing digit must be a valid GS1 mod-10 check digit.
    Csum,
}

pub(crate) fn lint_numeric(ai: &str, val: &[u8]) -> Result<(), GsError> {
    if !all_digits(val) {
        return Err(GsError::new(
            GsErrorKind::Charset,
            format!("AI ({ai}): Illegal non-digit character"),
        ));
    }
    Ok(())
}

pub(crate) fn lint_cset82(ai: &str, val: &[u8]) -> Result<(), GsError> {
    if !val.iter().all(|b| CSET82.contains(b)) {
        return Err(GsError::new(
            GsErrorKind::Charset,
            format!("AI ({ai}): Incorrect CSET 82 character"),
        ));
    }
    Ok(())
}

pub(crate) fn lint_csum(ai: &str, val: &[u8]) -> Result<(), GsError> {
    if !verify_parity(val) {
        return Err(GsError::new(
            GsErrorKind::CheckDigit,
            format!("AI ({ai}): Incorrect check digit"),
        ));
    }
    Ok(())
}

pub fn all_digits(val: &[u8]) -> bool {
    val.iter().all(u8::is_ascii_digit)
}

/// Compute the mod-10 check digit for a value that does not yet carry one.
///
/// Weights alternate 3 and 1 from the right, so the leftmost digit weighs 3
/// when the final length (body plus check digit) is even and 1 when it is
/// odd. Returns `None` when the body contains a non-digit.
pub fn compute_parity(body: &[u8]) -> Option<u8> {
    if !all_digits(body) {
        return None;
    }
    let mut weight = if (body.len() + 1) % 2 == 0 { 3u32 } else { 1u32 };
    let mut parity = 0u32;
    for &digit in body {
        parity += weight * u32::from(digit - b'0');
        weight = 4 - weight;
    }
    Some(b'0' + ((10 - parity % 10) % 10) as u8)
}

/// Verify the trailing mod-10 check digit of `val`. Pure: never rewrites.
pub fn verify_parity(val: &[u8]) -> bool {
    match val.split_last() {
        Some((check, body)) => compute_parity(body) == Some(*check),
        None => false,
    }
}

/// Append the computed mod-10 check digit to `body`.
///
/// This is the explicit recomputation path behind the encoder's
/// add-check-digit convenience mode; validation always goes through
/// [`verify_parity`] instead. Returns `None` when `body` is empty or
/// contains a non-digit.
pub fn with_check_digit(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let check = compute_parity(body.as_bytes())?;
    let mut out = String::with_capacity(body.len() + 1);
    out.push_str(body);
    out.push(char::from(check));
    Some(out)
}
