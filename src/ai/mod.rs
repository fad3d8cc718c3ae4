// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! GS1 Application Identifier syntax engine.
//!
//! Three ingesters produce the canonical element string, a byte string in
//! which `#` stands for FNC1: [`bracketed`] for `(ai)value` input, [`dl`]
//! for GS1 Digital Link URIs, and [`elemstr`] for data already in canonical
//! form. [`elemstr`] is the single validator and the single producer of the
//! extracted-AI index that rendering and HRI consumers read.

pub mod bracketed;
pub mod dl;
pub mod elemstr;
pub mod linters;
pub mod table;

pub use elemstr::ExtractedAi;
pub use linters::Linter;
pub use table::{fnc1_required, lookup_ai_entry, AiComponent, AiEntry, Cset, AI_TABLE};

use crate::error::{GsError, GsErrorKind};
use crate::MAX_DATA;

/// Validate a value slice against the component rules of an AI.
///
/// Components are consumed in order, each taking up to its `max` bytes of
/// the remaining value. Returns the number of bytes consumed; the caller
/// decides what any unconsumed tail means.
pub(crate) fn validate_ai_val(entry: &AiEntry, val: &[u8]) -> Result<usize, GsError> {
    if val.is_empty() {
        return Err(GsError::new(
            GsErrorKind::Length,
            format!("AI ({}) data is empty", entry.ai),
        ));
    }

    let mut consumed = 0usize;
    for part in &entry.parts {
        if part.cset == Cset::None {
            break;
        }

        let complen = (val.len() - consumed).min(part.max as usize);
        let component = &val[consumed..consumed + complen];
        consumed += complen;

        if complen < part.min as usize {
            return Err(GsError::new(
                GsErrorKind::Length,
                format!("AI ({}) data is too short", entry.ai),
            ));
        }

        match part.cset {
            Cset::Numeric => linters::lint_numeric(entry.ai, component)?,
            _ => linters::lint_cset82(entry.ai, component)?,
        }

        for linter in part.linters {
            match linter {
                Linter::Csum => linters::lint_csum(entry.ai, component)?,
            }
        }
    }

    Ok(consumed)
}

/// Whole-value length and content check run by the ingesting parsers before
/// component-level linting, so that an overlong value reports its length
/// rather than a misleading downstream failure such as a parity mismatch.
pub(crate) fn ai_val_length_content_check(entry: &AiEntry, val: &[u8]) -> Result<(), GsError> {
    let mut minlen = 0usize;
    let mut maxlen = 0usize;
    for part in &entry.parts {
        minlen += part.min as usize;
        maxlen += part.max as usize;
    }

    if val.len() < minlen {
        return Err(GsError::new(
            GsErrorKind::Length,
            format!("AI ({}) value is too short", entry.ai),
        ));
    }
    if val.len() > maxlen {
        return Err(GsError::new(
            GsErrorKind::Length,
            format!("AI ({}) value is too long", entry.ai),
        ));
    }

    // A data "#" would be indistinguishable from FNC1 in the element string.
    if val.contains(&b'#') {
        return Err(GsError::new(
            GsErrorKind::Charset,
            format!("AI ({}) contains illegal # character", entry.ai),
        ));
    }

    Ok(())
}

/// Append `bytes` to the element string under construction, enforcing the
/// fixed input capacity.
pub(crate) fn push_data(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), GsError> {
    if out.len() + bytes.len() > MAX_DATA {
        return Err(GsError::new(
            GsErrorKind::Length,
            "Maximum data length exceeded",
        ));
    }
    out.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> &'static AiEntry {
        lookup_ai_entry(key.as_bytes(), key.len()).unwrap()
    }

    #[test]
    fn fixed_numeric_component() {
        let gtin = entry("01");
        assert_eq!(validate_ai_val(gtin, b"12345678901231").unwrap(), 14);
        assert!(validate_ai_val(gtin, b"1234567890123").is_err()); // short
        assert!(validate_ai_val(gtin, b"1234567890123A").is_err()); // non-digit
        assert!(validate_ai_val(gtin, b"12345678901234").is_err()); // parity
        assert!(validate_ai_val(gtin, b"").is_err());
    }

    #[test]
    fn consumes_up_to_component_max() {
        // N14,csum then N4: trailing data beyond the components is left over.
        let itip = entry("8006");
        assert_eq!(validate_ai_val(itip, b"123456789012311234").unwrap(), 18);
        let gtin = entry("01");
        assert_eq!(validate_ai_val(gtin, b"123456789012312").unwrap(), 14);
    }

    #[test]
    fn optional_final_component() {
        let gdti = entry("253");
        assert_eq!(validate_ai_val(gdti, b"1231231231232").unwrap(), 13);
        assert_eq!(validate_ai_val(gdti, b"1231231231232TEST").unwrap(), 17);
    }

    #[test]
    fn length_content_precheck() {
        let gdti = entry("253");
        assert!(ai_val_length_content_check(gdti, b"1231231231232").is_ok());
        assert!(ai_val_length_content_check(gdti, &[b'1'; 12]).is_err());
        assert!(ai_val_length_content_check(gdti, &[b'1'; 31]).is_err());
        let batch = entry("10");
        assert!(ai_val_length_content_check(batch, b"").is_err());
        assert!(ai_val_length_content_check(batch, b"AB#C").is_err());
        assert!(ai_val_length_content_check(batch, b"ABC").is_ok());
    }

    #[test]
    fn data_capacity_is_enforced() {
        let mut out = vec![0u8; MAX_DATA - 2];
        assert!(push_data(&mut out, b"12").is_ok());
        assert!(push_data(&mut out, b"3").is_err());
    }
}
