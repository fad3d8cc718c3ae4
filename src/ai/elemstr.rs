// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Processor for canonical element-string data ("#...").
//!
//! Validates the data against the AI table and appends one entry per AI to
//! the extracted-AI index. Value positions are stored as offsets into the
//! owning buffer, which therefore must not be rewritten while the index is
//! live.

use super::{lookup_ai_entry, table::AiEntry, validate_ai_val};
use crate::error::{GsError, GsErrorKind};
use crate::MAX_AIS;

/// One AI extracted from the element string.
#[derive(Debug, Clone, Copy)]
pub struct ExtractedAi {
    /// The matched AI table entry.
    pub entry: &'static AiEntry,
    /// Offset of the value within the owning element-string buffer.
    pub start: usize,
    /// Value length in bytes.
    pub len: u8,
}

/// Validate element-string data and extract its AIs.
///
/// `offset` is the position of `data` within the owning buffer, so that
/// extracted value offsets remain valid when a composite component follows
/// the linear component in the same buffer.
pub fn process_ai_data(
    data: &[u8],
    offset: usize,
    extracted: &mut Vec<ExtractedAi>,
) -> Result<(), GsError> {
    if data.first() != Some(&b'#') {
        return Err(GsError::new(
            GsErrorKind::Format,
            "Missing FNC1 in first position",
        ));
    }
    let mut pos = 1usize;
    if pos == data.len() {
        return Err(GsError::new(GsErrorKind::Format, "The AI data is empty"));
    }

    while pos < data.len() {
        let Some(entry) = lookup_ai_entry(&data[pos..], 0) else {
            let shown = String::from_utf8_lossy(&data[pos..data.len().min(pos + 4)]).into_owned();
            return Err(GsError::new(
                GsErrorKind::UnknownAi,
                format!("Unrecognised AI: {shown}"),
            ));
        };
        pos += entry.ai.len();

        // The value runs to the next FNC1 or the end of the data.
        let value_end = data[pos..]
            .iter()
            .position(|&b| b == b'#')
            .map(|rel| pos + rel)
            .unwrap_or(data.len());

        let consumed = validate_ai_val(entry, &data[pos..value_end])?;

        if extracted.len() >= MAX_AIS {
            return Err(GsError::new(GsErrorKind::Capacity, "Too many AIs"));
        }
        extracted.push(ExtractedAi {
            entry,
            start: offset + pos,
            len: consumed as u8,
        });
        pos += consumed;

        // An AI requiring FNC1 must be terminated by one unless the data
        // ends here.
        if entry.fnc1 && pos < data.len() && data[pos] != b'#' {
            return Err(GsError::new(
                GsErrorKind::Length,
                format!("AI ({}) data is too long", entry.ai),
            ));
        }

        // Skip FNC1, tolerating a spurious one after a pre-defined length
        // AI.
        if pos < data.len() && data[pos] == b'#' {
            pos += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(data: &str) -> Result<Vec<ExtractedAi>, GsError> {
        let mut extracted = Vec::new();
        process_ai_data(data.as_bytes(), 0, &mut extracted)?;
        Ok(extracted)
    }

    #[test]
    fn fnc1_must_lead() {
        assert!(process("").is_err());
        assert!(process("991234").is_err());
        assert!(process("#").is_err());
        assert!(process("#891234").is_err()); // no such AI
        assert!(process("#991234").is_ok());
    }

    #[test]
    fn charset_violations() {
        assert!(process("#99~ABC").is_err());
        assert!(process("#99ABC~").is_err());
    }

    #[test]
    fn fixed_length_ai() {
        assert!(process("#0112345678901231").is_ok());
        assert!(process("#01A2345678901231").is_err());
        assert!(process("#011234567890123A").is_err());
        assert!(process("#0112345678901234").is_err()); // parity
        assert!(process("#011234567890123").is_err()); // short
        assert!(process("#01123456789012312").is_err()); // trailing "2" is no AI
    }

    #[test]
    fn spurious_fnc1_after_fixed_ai_is_tolerated() {
        assert!(process("#0112345678901231#").is_ok());
        assert!(process("#011234567890123#").is_err());
        assert!(process("#01123456789012345#").is_err());
        assert!(process("#01123456789012345#991234").is_err());
        assert!(process("#0112345678901231991234").is_ok());
        assert!(process("#0112345678901231#991234").is_ok());
    }

    #[test]
    fn variable_length_ai_requires_separator() {
        for ok in ["#2421", "#24212", "#242123", "#2421234", "#24212345", "#242123456"] {
            assert!(process(ok).is_ok(), "{ok} should be accepted");
        }
        assert!(process("#242123456#10ABC123").is_ok());
        assert!(process("#242123456#").is_ok());
        let err = process("#2421234567").unwrap_err();
        assert_eq!(err.message(), "AI (242) data is too long");
    }

    #[test]
    fn exact_length_numeric_ai() {
        assert!(process("#81111234").is_ok());
        assert!(process("#8111123").is_err());
        assert!(process("#811112345").is_err());
        assert!(process("#81111234#10ABC123").is_ok());
    }

    #[test]
    fn multi_component_ai() {
        assert!(process("#800112341234512398").is_ok());
        assert!(process("#80011234123451239").is_err());
        assert!(process("#8001123412345123981").is_err());
        assert!(process("#800112341234512398#0112345678901231").is_ok());
        assert!(process("#80011234123451239#0112345678901231").is_err());
        assert!(process("#8001123412345123981#01123456789012312").is_err());
    }

    #[test]
    fn optional_trailing_component() {
        assert!(process("#800302112345678900ABC").is_ok());
        assert!(process("#800302112345678901ABC").is_err()); // parity on N13
        assert!(process("#800302112345678900").is_ok());
        assert!(process("#800302112345678900#10ABC123").is_ok());
        assert!(process("#800302112345678900ABCDEFGHIJKLMNOP").is_ok());
        assert!(process("#800302112345678900ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn two_component_cset82_ai() {
        assert!(process("#7230121234567890123456789012345678").is_ok());
        assert!(process("#72301212345678901234567890123456789").is_err());
        assert!(process("#7230123").is_ok());
        assert!(process("#723012").is_err());
    }

    #[test]
    fn extraction_records_positions() {
        let extracted = process("#01123456789012311012345").unwrap();
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].entry.ai, "01");
        assert_eq!(extracted[0].start, 3);
        assert_eq!(extracted[0].len, 14);
        assert_eq!(extracted[1].entry.ai, "10");
        assert_eq!(extracted[1].start, 19);
        assert_eq!(extracted[1].len, 5);
    }

    #[test]
    fn capacity_limit() {
        let mut data = String::from("#");
        for _ in 0..MAX_AIS {
            data.push_str("991#");
        }
        data.push_str("991");
        let err = process(&data).unwrap_err();
        assert_eq!(err.message(), "Too many AIs");
    }
}
