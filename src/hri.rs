// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Human-readable interpretation of the extracted AIs.

use crate::encoder::Gs1Encoder;

/// One HRI line per extracted AI, in order of appearance, in the
/// conventional `(ai) value` form.
pub fn hri_lines(encoder: &Gs1Encoder) -> Vec<String> {
    encoder
        .extracted_ais()
        .iter()
        .map(|extracted| format!("({}) {}", extracted.ai, extracted.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_extraction_order() {
        let mut enc = Gs1Encoder::new();
        enc.set_gs1_data_str("(01)12345678901231(10)ABC123(99)XYZ").unwrap();
        assert_eq!(
            hri_lines(&enc),
            vec!["(01) 12345678901231", "(10) ABC123", "(99) XYZ"]
        );
    }

    #[test]
    fn no_lines_for_plain_data() {
        let mut enc = Gs1Encoder::new();
        enc.set_data_str("2112345678900").unwrap();
        assert!(hri_lines(&enc).is_empty());
    }
}
