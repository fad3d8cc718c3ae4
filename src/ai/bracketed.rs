// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Parser for bracketed AI syntax, `(ai)value(ai)value...`.
//!
//! Produces the canonical element string with FNC1 separators inserted
//! where the preceding AI does not have a pre-defined length. A `\(`
//! sequence inside a value is an escape for a literal bracket; no other
//! escape exists.

use super::{ai_val_length_content_check, lookup_ai_entry, push_data, table};
use crate::error::{GsError, GsErrorKind};

fn parse_failure() -> GsError {
    GsError::new(GsErrorKind::Format, "Failed to parse AI data")
}

/// Convert bracketed AI data to the canonical element string.
///
/// The output is structurally complete but not yet validated; callers run
/// it through the element-string processor afterwards.
pub fn parse_ai_data(ai_data: &str) -> Result<Vec<u8>, GsError> {
    let data = ai_data.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(data.len());
    let mut fnc1req = true;
    let mut pos = 0usize;

    while pos < data.len() {
        if data[pos] != b'(' {
            return Err(parse_failure());
        }
        pos += 1;

        let key_start = pos;
        let close = match data[pos..].iter().position(|&b| b == b')') {
            Some(rel) => pos + rel,
            None => return Err(parse_failure()),
        };
        let key = &data[key_start..close];

        let entry = lookup_ai_entry(key, key.len()).ok_or_else(|| {
            let shown: String = ai_data[key_start..].chars().take(4).collect();
            GsError::new(GsErrorKind::UnknownAi, format!("Unrecognised AI: {shown}"))
        })?;
        pos = close + 1;

        if fnc1req {
            push_data(&mut out, b"#")?;
        }
        push_data(&mut out, entry.ai.as_bytes())?;
        fnc1req = table::fnc1_required(entry.ai);

        // The message must not end right after an AI.
        if pos >= data.len() {
            return Err(parse_failure());
        }

        let val_start = out.len();
        loop {
            let open = match data[pos..].iter().position(|&b| b == b'(') {
                Some(rel) => pos + rel,
                None => data.len(),
            };
            if open < data.len() && data[open - 1] == b'\\' {
                // Escaped data bracket: emit up to the escape, then "(".
                push_data(&mut out, &data[pos..open - 1])?;
                push_data(&mut out, b"(")?;
                pos = open + 1;
                continue;
            }
            push_data(&mut out, &data[pos..open])?;
            pos = open;
            break;
        }

        ai_val_length_content_check(entry, &out[val_start..])?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<String, GsError> {
        parse_ai_data(input).map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn single_and_multiple_ais() {
        assert_eq!(parse("(01)12345678901231").unwrap(), "#0112345678901231");
        assert_eq!(parse("(10)12345").unwrap(), "#1012345");
        // No FNC1 after pre-defined length AIs.
        assert_eq!(
            parse("(01)12345678901231(10)12345").unwrap(),
            "#01123456789012311012345"
        );
        assert_eq!(parse("(3100)123456(10)12345").unwrap(), "#31001234561012345");
        // FNC1 after variable-length AIs.
        assert_eq!(parse("(10)12345(11)991225").unwrap(), "#1012345#11991225");
        assert_eq!(parse("(3900)12345(11)991225").unwrap(), "#390012345#11991225");
    }

    #[test]
    fn escaped_bracket_is_data() {
        assert_eq!(parse("(10)12345\\(11)991225").unwrap(), "#1012345(11)991225");
        assert_eq!(parse("(10)12345\\(").unwrap(), "#1012345(");
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(parse("(10)(11)98765").is_err());
        assert!(parse("(10)12345(11)").is_err());
    }

    #[test]
    fn malformed_structure_is_rejected() {
        assert!(parse("(1A)12345").is_err());
        assert!(parse("1(12345").is_err());
        assert!(parse("12345").is_err());
        assert!(parse("()12345").is_err());
        assert!(parse("(1)12345").is_err());
        assert!(parse("(12345)12345").is_err());
        assert!(parse("(15").is_err());
        assert!(parse("(1").is_err());
        assert!(parse("(").is_err());
    }

    #[test]
    fn length_precheck_runs_at_parse_time() {
        // Overlong value for a pre-defined length AI.
        let err = parse("(01)123456789012312(10)12345").unwrap_err();
        assert_eq!(err.message(), "AI (01) value is too long");
        // A one-digit value cannot satisfy N6, even though the rest of the
        // input would concatenate into something that looks parseable.
        assert!(parse("(17)9(90)217").is_err());
    }

    #[test]
    fn data_fnc1_character_is_rejected() {
        let err = parse("(10)12345#").unwrap_err();
        assert_eq!(err.kind(), GsErrorKind::Charset);
    }

    #[test]
    fn unknown_ai_diagnostic_names_the_key() {
        let err = parse("(89)1234").unwrap_err();
        assert_eq!(err.message(), "Unrecognised AI: 89)1");
    }
}
