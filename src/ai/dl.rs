// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Parser for GS1 Digital Link URIs.
//!
//! This is a lightweight parse, sufficient for extracting AIs for
//! validation and HRI purposes. It does not validate the overall URI
//! structure beyond what is needed, nor the data relationships between the
//! extracted AIs, and convenience strings for GS1 keys are not supported.
//!
//! Root discovery walks the path info right to left, but AIs are emitted
//! left to right starting from the discovered root. The walk is pure index
//! arithmetic; the input is never modified.

use super::{ai_val_length_content_check, lookup_ai_entry, linters, push_data, table};
use crate::error::{GsError, GsErrorKind};
use crate::MAX_AI_LEN;

/// Characters permissible in a URI, including percent.
pub const URI_CHARACTERS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~:/?#[]@!$&'()*+,;=%";

/// AIs that may serve as the primary key rooting a Digital Link path.
pub const DL_PATH_KEYS: &[&str] = &[
    "00",   // SSCC
    "01",   // GTIN; qualifiers 22, 10, 21 or 235
    "253",  // GDTI
    "255",  // GCN
    "401",  // GINC
    "402",  // GSIN
    "414",  // LOC NO.; qualifiers 254 or 7040
    "417",  // PARTY; qualifier 7040
    "8003", // GRAI
    "8004", // GIAI; qualifier 7040
    "8006", // ITIP; qualifiers 22, 10, 21
    "8010", // CPID; qualifier 8011
    "8013", // GMN
    "8017", // GSRN - PROVIDER; qualifier 8019
    "8018", // GSRN - RECIPIENT; qualifier 8019
];

fn is_dl_path_key(key: &str) -> bool {
    DL_PATH_KEYS.contains(&key)
}

fn parse_failure() -> GsError {
    GsError::new(GsErrorKind::Format, "Failed to parse DL data")
}

/// Reverse percent-encoding, bounded to `maxlen` output bytes.
///
/// A `%` not followed by two hex digits is copied through literally.
/// Returns `None` when the decoded output would exceed the bound.
pub fn uri_unescape(input: &[u8], maxlen: usize) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len().min(maxlen));
    let mut i = 0usize;
    while i < input.len() {
        if out.len() == maxlen {
            return None;
        }
        let b = input[i];
        if b == b'%'
            && i + 2 < input.len()
            && input[i + 1].is_ascii_hexdigit()
            && input[i + 2].is_ascii_hexdigit()
        {
            out.push(hex_value(input[i + 1]) * 16 + hex_value(input[i + 2]));
            i += 3;
        } else {
            out.push(b);
            i += 1;
        }
    }
    Some(out)
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

// GTIN values arriving as GTIN-8/12/13 are normalised to GTIN-14.
fn pad_gtin14(key: &str, val: Vec<u8>) -> Vec<u8> {
    if key == "01" && matches!(val.len(), 8 | 12 | 13) {
        let mut padded = vec![b'0'; 14 - val.len()];
        padded.extend_from_slice(&val);
        return padded;
    }
    val
}

struct Emitter {
    out: Vec<u8>,
    fnc1req: bool,
}

impl Emitter {
    fn emit(&mut self, entry: &table::AiEntry, val: &[u8]) -> Result<(), GsError> {
        if self.fnc1req {
            push_data(&mut self.out, b"#")?;
        }
        push_data(&mut self.out, entry.ai.as_bytes())?;
        self.fnc1req = table::fnc1_required(entry.ai);
        push_data(&mut self.out, val)?;
        ai_val_length_content_check(entry, val)
    }
}

/// Convert a GS1 Digital Link URI to the canonical element string.
///
/// As for the bracketed parser, the output still goes through the
/// element-string processor for component-level validation.
pub fn parse_dl_uri(uri: &str) -> Result<Vec<u8>, GsError> {
    if !uri.bytes().all(|b| URI_CHARACTERS.contains(&b)) {
        return Err(GsError::new(
            GsErrorKind::Format,
            "URI contains illegal characters",
        ));
    }

    let after_scheme = uri
        .strip_prefix("https://")
        .or_else(|| uri.strip_prefix("http://"))
        .ok_or_else(|| {
            GsError::new(GsErrorKind::Format, "Scheme must be http:// or https://")
        })?;

    let path_start = match after_scheme.find('/') {
        Some(idx) if idx >= 1 => idx,
        _ => {
            return Err(GsError::new(
                GsErrorKind::Format,
                "URI must contain a domain and path info",
            ))
        }
    };
    let rest = &after_scheme[path_start..];

    // The query marker ends the path info; a fragment marker ends the query.
    let (path, query) = match rest.find('?') {
        Some(q) => (&rest[..q], Some(&rest[q + 1..])),
        None => (rest, None),
    };
    let query = query.map(|q| match q.find('#') {
        Some(f) => &q[..f],
        None => q,
    });

    // Search backwards through the path for an "/AI/value" pair where the
    // AI is a Digital Link primary key. Pairs are peeled two segments at a
    // time; an unknown AI segment ends the search.
    let mut root: Option<usize> = None;
    let mut end = path.len();
    while let Some(value_slash) = path[..end].rfind('/') {
        let Some(ai_slash) = path[..value_slash].rfind('/') else {
            break;
        };
        let key = &path[ai_slash + 1..value_slash];
        let Some(entry) = lookup_ai_entry(key.as_bytes(), key.len()) else {
            break;
        };
        if is_dl_path_key(entry.ai) {
            root = Some(ai_slash);
            break;
        }
        end = ai_slash;
    }
    let Some(root) = root else {
        return Err(GsError::new(
            GsErrorKind::UnknownAi,
            "No GS1 DL keys found in path info",
        ));
    };

    let dlpath = &path[root..];
    let mut emitter = Emitter {
        out: Vec::new(),
        fnc1req: true,
    };

    // Process each AI/value pair of the DL path info in order.
    let mut pos = 0usize;
    while pos < dlpath.len() {
        debug_assert_eq!(dlpath.as_bytes()[pos], b'/');
        pos += 1;
        let value_slash = dlpath[pos..]
            .find('/')
            .map(|rel| pos + rel)
            .ok_or_else(parse_failure)?;
        let key = &dlpath[pos..value_slash];
        let entry = lookup_ai_entry(key.as_bytes(), key.len()).ok_or_else(parse_failure)?;

        pos = value_slash + 1;
        let value_end = dlpath[pos..]
            .find('/')
            .map(|rel| pos + rel)
            .unwrap_or(dlpath.len());
        let raw = &dlpath[pos..value_end];
        pos = value_end;

        let val = uri_unescape(raw.as_bytes(), MAX_AI_LEN).ok_or_else(|| {
            GsError::new(
                GsErrorKind::Length,
                format!("Decoded AI ({}) from DL path info too long", entry.ai),
            )
        })?;
        if val.is_empty() {
            return Err(GsError::new(
                GsErrorKind::Length,
                format!("AI ({}) data is empty", entry.ai),
            ));
        }
        let val = pad_gtin14(entry.ai, val);
        emitter.emit(entry, &val)?;
    }

    // Process query parameters. Parameters with no value, and parameters
    // whose key is not numeric, are ignored; a numeric key that is not a
    // known AI is an error.
    if let Some(query) = query {
        for token in query.split('&') {
            let Some(eq) = token.find('=') else {
                continue;
            };
            let (key, raw) = (&token[..eq], &token[eq + 1..]);
            if key.is_empty() || !linters::all_digits(key.as_bytes()) {
                continue;
            }
            let entry = lookup_ai_entry(key.as_bytes(), key.len()).ok_or_else(|| {
                GsError::new(
                    GsErrorKind::UnknownAi,
                    format!("Unknown AI ({key}) in query parameters"),
                )
            })?;

            let val = uri_unescape(raw.as_bytes(), MAX_AI_LEN).ok_or_else(|| {
                GsError::new(
                    GsErrorKind::Length,
                    format!("Decoded AI ({}) value from DL query params too long", entry.ai),
                )
            })?;
            if val.is_empty() {
                return Err(GsError::new(
                    GsErrorKind::Length,
                    format!("AI ({}) data is empty", entry.ai),
                ));
            }
            let val = pad_gtin14(entry.ai, val);
            emitter.emit(entry, &val)?;
        }
    }

    Ok(emitter.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(uri: &str) -> Result<String, GsError> {
        parse_dl_uri(uri).map(|bytes| String::from_utf8(bytes).unwrap())
    }

    fn unescape_str(input: &str) -> String {
        String::from_utf8(uri_unescape(input.as_bytes(), MAX_AI_LEN).unwrap()).unwrap()
    }

    #[test]
    fn rejects_non_dl_inputs() {
        assert!(parse("").is_err());
        assert!(parse("ftp://").is_err());
        assert!(parse("http://").is_err());
        assert!(parse("http:///").is_err()); // no domain
        assert!(parse("http://a").is_err()); // no path info
        assert!(parse("http://a/").is_err()); // no AI info
        assert!(parse("https://00/006141411234567890").is_err());
    }

    #[test]
    fn scheme_and_stems() {
        assert_eq!(
            parse("http://a/00/006141411234567890").unwrap(),
            "#00006141411234567890"
        );
        assert_eq!(
            parse("https://a/00/006141411234567890").unwrap(),
            "#00006141411234567890"
        );
        assert_eq!(
            parse("https://a/stem/00/006141411234567890").unwrap(),
            "#00006141411234567890"
        );
        assert_eq!(
            parse("https://a/more/stem/00/006141411234567890").unwrap(),
            "#00006141411234567890"
        );
        // A fake AI in the stem: the rightmost key wins.
        assert_eq!(
            parse("https://a/00/faux/00/006141411234567890").unwrap(),
            "#00006141411234567890"
        );
        // The path info cannot end in a slash.
        assert!(parse("https://a/stem/00/006141411234567890/").is_err());
    }

    #[test]
    fn gtin_is_padded_to_14_digits() {
        assert_eq!(parse("https://a/01/12312312312333").unwrap(), "#0112312312312333");
        assert_eq!(parse("https://a/01/2112345678900").unwrap(), "#0102112345678900");
        assert_eq!(parse("https://a/01/416000336108").unwrap(), "#0100416000336108");
        assert_eq!(parse("https://a/01/02345673").unwrap(), "#0100000002345673");
    }

    #[test]
    fn qualifier_path_components() {
        assert_eq!(
            parse("https://a/01/12312312312333/22/TEST/10/ABC/21/XYZ").unwrap(),
            "#011231231231233322TEST#10ABC#21XYZ"
        );
        assert_eq!(
            parse("https://a/01/12312312312333/235/TEST").unwrap(),
            "#0112312312312333235TEST"
        );
        assert_eq!(
            parse("https://a/8018/123456789012345675/8019/123").unwrap(),
            "#8018123456789012345675#8019123"
        );
    }

    #[test]
    fn optional_component_bounds() {
        assert_eq!(parse("https://a/253/1231231231232").unwrap(), "#2531231231231232");
        assert_eq!(
            parse("https://a/253/1231231231232TEST5678901234567").unwrap(),
            "#2531231231231232TEST5678901234567"
        );
        // N13 X0..17 exceeded.
        assert!(parse("https://a/253/1231231231232TEST56789012345678").is_err());
    }

    #[test]
    fn query_parameters() {
        assert_eq!(
            parse("https://a/stem/00/006141411234567890?99=ABC").unwrap(),
            "#0000614141123456789099ABC"
        );
        assert_eq!(
            parse("https://a/stem/401/12345678?99=ABC").unwrap(),
            "#40112345678#99ABC"
        );
        assert_eq!(
            parse("https://a/01/12312312312333?99=ABC&98=XYZ").unwrap(),
            "#011231231231233399ABC#98XYZ"
        );
        // Extraneous separators and non-AI parameters are skipped.
        assert_eq!(
            parse("https://a/01/12312312312333?&&&99=ABC&&&&&&98=XYZ&&&").unwrap(),
            "#011231231231233399ABC#98XYZ"
        );
        assert_eq!(
            parse("https://a/01/12312312312333?99=ABC&unknown=666&98=XYZ").unwrap(),
            "#011231231231233399ABC#98XYZ"
        );
        for uri in [
            "https://a/01/12312312312333?99=ABC&singleton&98=XYZ",
            "https://a/01/12312312312333?singleton&99=ABC&98=XYZ",
            "https://a/01/12312312312333?99=ABC&98=XYZ&singleton",
        ] {
            assert_eq!(parse(uri).unwrap(), "#011231231231233399ABC#98XYZ");
        }
        // A numeric query key that is not an AI is an error.
        let err = parse("https://a/01/12312312312333?99=ABC&999=faux").unwrap_err();
        assert_eq!(err.message(), "Unknown AI (999) in query parameters");
    }

    #[test]
    fn percent_escapes_in_values() {
        assert_eq!(
            parse("https://a/01/12312312312333/22/ABC%2d123?99=ABC&98=XYZ%2f987").unwrap(),
            "#011231231231233322ABC-123#99ABC#98XYZ/987"
        );
        assert_eq!(
            parse("https://id.gs1.org/414/9520123456788/254/32a%2Fb").unwrap(),
            "#414952012345678825432a/b"
        );
    }

    #[test]
    fn specification_examples() {
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788").unwrap(),
            "#0109520123456788"
        );
        assert_eq!(
            parse("https://brand.example.com/01/9520123456788").unwrap(),
            "#0109520123456788"
        );
        assert_eq!(
            parse("https://brand.example.com/some-extra/pathinfo/01/9520123456788").unwrap(),
            "#0109520123456788"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/22/2A").unwrap(),
            "#0109520123456788222A"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/10/ABC123").unwrap(),
            "#010952012345678810ABC123"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/21/12345").unwrap(),
            "#01095201234567882112345"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426").unwrap(),
            "#010952012345678810ABC1#2112345#17180426"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788?3103=000195").unwrap(),
            "#01095201234567883103000195"
        );
        assert_eq!(
            parse("https://example.com/01/9520123456788?3103=000195&3922=0299&17=201225").unwrap(),
            "#0109520123456788310300019539220299#17201225"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/9520123456788?17=201225&3103=000195&3922=0299").unwrap(),
            "#010952012345678817201225310300019539220299"
        );
        assert_eq!(
            parse("https://id.gs1.org/00/952012345678912345").unwrap(),
            "#00952012345678912345"
        );
        assert_eq!(
            parse("https://id.gs1.org/00/952012345678912345?02=09520123456788&37=25&10=ABC123")
                .unwrap(),
            "#0095201234567891234502095201234567883725#10ABC123"
        );
        assert_eq!(
            parse("https://id.gs1.org/414/9520123456788").unwrap(),
            "#4149520123456788"
        );
        assert_eq!(
            parse("https://example.com/8004/9520614141234567?01=9520123456788").unwrap(),
            "#80049520614141234567#0109520123456788"
        );
    }

    #[test]
    fn unescape_basics() {
        assert_eq!(unescape_str(""), "");
        assert_eq!(unescape_str("test"), "test");
        assert_eq!(unescape_str("%20"), " ");
        assert_eq!(unescape_str("%20AB"), " AB");
        assert_eq!(unescape_str("A%20B"), "A B");
        assert_eq!(unescape_str("AB%20"), "AB ");
        assert_eq!(unescape_str("A%20%20B"), "A  B");
        assert_eq!(unescape_str("A%4FB"), "AOB");
        assert_eq!(unescape_str("A%4fB"), "AOB");
    }

    #[test]
    fn unescape_malformed_passthrough() {
        assert_eq!(unescape_str("ABC%2"), "ABC%2"); // off the end
        assert_eq!(unescape_str("ABCD%"), "ABCD%");
        assert_eq!(unescape_str("A%4gB"), "A%4gB");
        assert_eq!(unescape_str("A%4GB"), "A%4GB");
        assert_eq!(unescape_str("A%g4B"), "A%g4B");
        assert_eq!(unescape_str("A%G4B"), "A%G4B");
    }

    #[test]
    fn unescape_byte_extremes() {
        assert_eq!(uri_unescape(b"A%01B", MAX_AI_LEN).unwrap(), b"A\x01B");
        assert_eq!(uri_unescape(b"A%00B", MAX_AI_LEN).unwrap(), b"A\x00B");
        for mixed in [&b"A%ffB"[..], b"A%FfB", b"A%fFB", b"A%FFB"] {
            assert_eq!(uri_unescape(mixed, MAX_AI_LEN).unwrap(), b"A\xFFB");
        }
    }

    #[test]
    fn unescape_output_bound() {
        assert_eq!(uri_unescape(b"ABCD", 4).unwrap(), b"ABCD");
        assert!(uri_unescape(b"ABCDE", 4).is_none());
        // Escapes count as one decoded byte.
        assert_eq!(uri_unescape(b"%41%42%43%44", 4).unwrap(), b"ABCD");
        assert!(uri_unescape(b"%41%42%43%44%45", 4).is_none());
    }
}
