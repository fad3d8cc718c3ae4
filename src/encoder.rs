// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The encoder context.
//!
//! A context owns all mutable state: the element-string buffer, the
//! extracted-AI index, the last error, and the symbol configuration that
//! downstream renderers consume. The AI table is static and shared, so any
//! number of contexts can operate concurrently without synchronisation.

use crate::ai::{bracketed, dl, elemstr, ExtractedAi};
use crate::error::{GsError, GsErrorKind};
use crate::{MAX_DATA, MAX_FNAME};

/// Highest supported pixels-per-module value.
pub const MAX_PIX_MULT: u32 = 12;
/// Highest supported GS1-128 linear symbol height in modules.
pub const MAX_UCC128_LIN_HEIGHT: u32 = 500;

/// Barcode symbology selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symbology {
    #[default]
    None,
    DataBarOmni,
    DataBarTruncated,
    DataBarStacked,
    DataBarStackedOmni,
    DataBarLimited,
    DataBarExpanded,
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Gs1128CcA,
    Gs1128CcC,
    QrCode,
    DataMatrix,
}

/// Output image format for the rendering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Bmp,
    Tif,
    Raw,
}

/// QR Code error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrEcLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

/// Read-only view of one extracted AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedAiView<'a> {
    pub ai: &'static str,
    pub value: &'a str,
    pub title: &'static str,
    pub fnc1_required: bool,
}

/// An encoder instance.
///
/// Each data-setting call is all-or-nothing: on failure the element-string
/// buffer is emptied, the extracted-AI index is cleared, and the error flag
/// and message are set.
#[derive(Debug)]
pub struct Gs1Encoder {
    sym: Symbology,
    pix_mult: u32,
    x_undercut: u32,
    y_undercut: u32,
    sep_ht: u32,
    seg_width: u32,
    lin_height: u32,
    dm_rows: u32,
    dm_cols: u32,
    qr_version: u32,
    qr_ec_level: QrEcLevel,
    format: ImageFormat,
    add_check_digit: bool,
    file_input: bool,
    data_file: String,
    out_file: String,
    data_str: Vec<u8>,
    err_flag: bool,
    err_msg: String,
    ai_data: Vec<ExtractedAi>,
}

impl Default for Gs1Encoder {
    fn default() -> Self {
        Self {
            sym: Symbology::None,
            pix_mult: 1,
            x_undercut: 0,
            y_undercut: 0,
            sep_ht: 1,
            seg_width: 22,
            lin_height: 25,
            dm_rows: 0,
            dm_cols: 0,
            qr_version: 0,
            qr_ec_level: QrEcLevel::Medium,
            format: ImageFormat::Bmp,
            add_check_digit: false,
            file_input: false,
            data_file: String::new(),
            out_file: String::new(),
            data_str: Vec::new(),
            err_flag: false,
            err_msg: String::new(),
            ai_data: Vec::new(),
        }
    }
}

impl Gs1Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    // Data ingestion

    /// Set raw barcode data.
    ///
    /// Input beginning with `#` is element-string data with `#` standing
    /// for FNC1; it is fully validated and its AIs extracted. Anything else
    /// is a symbology-specific plain payload and is stored verbatim.
    pub fn set_data_str(&mut self, data: &str) -> Result<(), GsError> {
        self.clear_parse_state();
        let res = self.ingest_raw(data);
        self.finish(res)
    }

    /// Set barcode data from bracketed AI syntax, inserting FNC1 where
    /// required. A single `|` separates the linear component from the 2D
    /// composite component.
    pub fn set_gs1_data_str(&mut self, ai_data: &str) -> Result<(), GsError> {
        self.clear_parse_state();
        let res = self.ingest_bracketed(ai_data);
        self.finish(res)
    }

    /// Set barcode data from a GS1 Digital Link URI and return the
    /// resulting element string.
    pub fn parse_dl_uri(&mut self, uri: &str) -> Result<&str, GsError> {
        self.clear_parse_state();
        let res = dl::parse_dl_uri(uri).and_then(|out| {
            self.data_str = out;
            self.extract_parts()
        });
        self.finish(res)?;
        Ok(self.data_str())
    }

    fn ingest_raw(&mut self, data: &str) -> Result<(), GsError> {
        if data.len() > MAX_DATA {
            return Err(GsError::new(
                GsErrorKind::Length,
                "Maximum data length exceeded",
            ));
        }
        self.data_str = data.as_bytes().to_vec();
        if data.starts_with('#') {
            self.extract_parts()?;
        }
        Ok(())
    }

    fn ingest_bracketed(&mut self, ai_data: &str) -> Result<(), GsError> {
        let mut parts = ai_data.splitn(3, '|');
        let linear = parts.next().unwrap_or("");
        let composite = parts.next();
        if parts.next().is_some() {
            return Err(GsError::new(
                GsErrorKind::Format,
                "Only one | component separator is permitted",
            ));
        }

        let mut out = bracketed::parse_ai_data(linear)?;
        if let Some(composite) = composite {
            let cc = bracketed::parse_ai_data(composite)?;
            if out.len() + 1 + cc.len() > MAX_DATA {
                return Err(GsError::new(
                    GsErrorKind::Length,
                    "Maximum data length exceeded",
                ));
            }
            out.push(b'|');
            out.extend_from_slice(&cc);
        }
        self.data_str = out;
        self.extract_parts()
    }

    // Validate the element string, part by part around an optional "|"
    // separator, and rebuild the extracted-AI index.
    fn extract_parts(&mut self) -> Result<(), GsError> {
        self.ai_data.clear();
        let split = self.data_str.iter().position(|&b| b == b'|');
        match split {
            None => elemstr::process_ai_data(&self.data_str, 0, &mut self.ai_data),
            Some(idx) => {
                if self.data_str[idx + 1..].contains(&b'|') {
                    return Err(GsError::new(
                        GsErrorKind::Format,
                        "Only one | component separator is permitted",
                    ));
                }
                elemstr::process_ai_data(&self.data_str[..idx], 0, &mut self.ai_data)?;
                elemstr::process_ai_data(&self.data_str[idx + 1..], idx + 1, &mut self.ai_data)
            }
        }
    }

    fn clear_parse_state(&mut self) {
        self.err_flag = false;
        self.err_msg.clear();
        self.ai_data.clear();
    }

    fn finish<T>(&mut self, res: Result<T, GsError>) -> Result<T, GsError> {
        res.map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: GsError) -> GsError {
        self.data_str.clear();
        self.ai_data.clear();
        self.err_flag = true;
        self.err_msg = err.message().to_string();
        err
    }

    // Introspection

    /// The element string as last ingested, or "" after a failure.
    pub fn data_str(&self) -> &str {
        std::str::from_utf8(&self.data_str).unwrap_or("")
    }

    /// The AIs extracted from the element string, in order of appearance.
    pub fn extracted_ais(&self) -> Vec<ExtractedAiView<'_>> {
        self.ai_data
            .iter()
            .map(|extracted| ExtractedAiView {
                ai: extracted.entry.ai,
                value: std::str::from_utf8(
                    &self.data_str[extracted.start..extracted.start + extracted.len as usize],
                )
                .unwrap_or(""),
                title: extracted.entry.title,
                fnc1_required: extracted.entry.fnc1,
            })
            .collect()
    }

    pub fn err_flag(&self) -> bool {
        self.err_flag
    }

    /// The last error message, or "" when the previous operation succeeded.
    pub fn err_msg(&self) -> &str {
        &self.err_msg
    }

    // Symbol configuration

    pub fn sym(&self) -> Symbology {
        self.sym
    }

    pub fn set_sym(&mut self, sym: Symbology) -> Result<(), GsError> {
        if sym == Symbology::None {
            let res = Err(GsError::new(GsErrorKind::Config, "No symbology selected"));
            return self.finish_config(res);
        }
        self.sym = sym;
        Ok(())
    }

    pub fn pix_mult(&self) -> u32 {
        self.pix_mult
    }

    /// Set the pixels per module ("X-dimension").
    ///
    /// Resets the X and Y undercut when the new X-dimension no longer
    /// accommodates them and clamps the separator height into range.
    pub fn set_pix_mult(&mut self, pix_mult: u32) -> Result<(), GsError> {
        if !(1..=MAX_PIX_MULT).contains(&pix_mult) {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                format!("Valid X-dimension range is 1 to {MAX_PIX_MULT}"),
            ));
            return self.finish_config(res);
        }
        self.pix_mult = pix_mult;
        if self.x_undercut * 2 >= pix_mult {
            self.x_undercut = 0;
        }
        if self.y_undercut * 2 >= pix_mult {
            self.y_undercut = 0;
        }
        self.sep_ht = self.sep_ht.clamp(pix_mult, pix_mult * 2);
        Ok(())
    }

    pub fn x_undercut(&self) -> u32 {
        self.x_undercut
    }

    /// Compensate for horizontal print growth. Must be less than half the
    /// X-dimension.
    pub fn set_x_undercut(&mut self, x_undercut: u32) -> Result<(), GsError> {
        if x_undercut * 2 >= self.pix_mult {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Undercut must be less than half the X-dimension",
            ));
            return self.finish_config(res);
        }
        self.x_undercut = x_undercut;
        Ok(())
    }

    pub fn y_undercut(&self) -> u32 {
        self.y_undercut
    }

    /// Compensate for vertical print growth. Must be less than half the
    /// X-dimension.
    pub fn set_y_undercut(&mut self, y_undercut: u32) -> Result<(), GsError> {
        if y_undercut * 2 >= self.pix_mult {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Undercut must be less than half the X-dimension",
            ));
            return self.finish_config(res);
        }
        self.y_undercut = y_undercut;
        Ok(())
    }

    pub fn sep_ht(&self) -> u32 {
        self.sep_ht
    }

    /// Separator row height between linear and 2D components, one to two
    /// times the X-dimension.
    pub fn set_sep_ht(&mut self, sep_ht: u32) -> Result<(), GsError> {
        if !(self.pix_mult..=self.pix_mult * 2).contains(&sep_ht) {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Separator height must be 1 to 2 times the X-dimension",
            ));
            return self.finish_config(res);
        }
        self.sep_ht = sep_ht;
        Ok(())
    }

    pub fn databar_exp_seg_width(&self) -> u32 {
        self.seg_width
    }

    /// Segments per row for DataBar Expanded Stacked; an even number from
    /// 2 to 22.
    pub fn set_databar_exp_seg_width(&mut self, seg_width: u32) -> Result<(), GsError> {
        if !(2..=22).contains(&seg_width) || seg_width % 2 != 0 {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Valid number of segments per row is even values from 2 to 22",
            ));
            return self.finish_config(res);
        }
        self.seg_width = seg_width;
        Ok(())
    }

    pub fn gs1_128_lin_height(&self) -> u32 {
        self.lin_height
    }

    pub fn set_gs1_128_lin_height(&mut self, lin_height: u32) -> Result<(), GsError> {
        if !(1..=MAX_UCC128_LIN_HEIGHT).contains(&lin_height) {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                format!("Valid linear height range is 1 to {MAX_UCC128_LIN_HEIGHT}"),
            ));
            return self.finish_config(res);
        }
        self.lin_height = lin_height;
        Ok(())
    }

    pub fn dm_rows(&self) -> u32 {
        self.dm_rows
    }

    /// Fixed Data Matrix row count, 8 to 144, or 0 for automatic.
    pub fn set_dm_rows(&mut self, rows: u32) -> Result<(), GsError> {
        if rows != 0 && !(8..=144).contains(&rows) {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Valid Data Matrix rows range is 8 to 144, or 0 for automatic",
            ));
            return self.finish_config(res);
        }
        self.dm_rows = rows;
        Ok(())
    }

    pub fn dm_cols(&self) -> u32 {
        self.dm_cols
    }

    /// Fixed Data Matrix column count, 10 to 144, or 0 for automatic.
    pub fn set_dm_cols(&mut self, cols: u32) -> Result<(), GsError> {
        if cols != 0 && !(10..=144).contains(&cols) {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Valid Data Matrix columns range is 10 to 144, or 0 for automatic",
            ));
            return self.finish_config(res);
        }
        self.dm_cols = cols;
        Ok(())
    }

    pub fn qr_version(&self) -> u32 {
        self.qr_version
    }

    /// Fixed QR Code version, 1 to 40, or 0 for automatic.
    pub fn set_qr_version(&mut self, version: u32) -> Result<(), GsError> {
        if version > 40 {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                "Valid QR Code version range is 1 to 40, or 0 for automatic",
            ));
            return self.finish_config(res);
        }
        self.qr_version = version;
        Ok(())
    }

    pub fn qr_ec_level(&self) -> QrEcLevel {
        self.qr_ec_level
    }

    pub fn set_qr_ec_level(&mut self, level: QrEcLevel) {
        self.qr_ec_level = level;
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ImageFormat) {
        self.format = format;
    }

    pub fn add_check_digit(&self) -> bool {
        self.add_check_digit
    }

    /// When enabled, plain fixed-length data is supplied without its check
    /// digit and the final digit is generated during encoding.
    pub fn set_add_check_digit(&mut self, add_check_digit: bool) {
        self.add_check_digit = add_check_digit;
    }

    pub fn file_input(&self) -> bool {
        self.file_input
    }

    /// Select whether barcode data comes from the data file or from the
    /// data buffer.
    pub fn set_file_input(&mut self, file_input: bool) {
        self.file_input = file_input;
    }

    pub fn data_file(&self) -> &str {
        &self.data_file
    }

    pub fn set_data_file(&mut self, data_file: &str) -> Result<(), GsError> {
        if data_file.is_empty() || data_file.len() > MAX_FNAME {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                format!("Input file name must be 1 to {MAX_FNAME} characters"),
            ));
            return self.finish_config(res);
        }
        self.data_file = data_file.to_string();
        Ok(())
    }

    pub fn out_file(&self) -> &str {
        &self.out_file
    }

    /// Output file for the rendered symbol; "" selects buffer output.
    pub fn set_out_file(&mut self, out_file: &str) -> Result<(), GsError> {
        if out_file.len() > MAX_FNAME {
            let res = Err(GsError::new(
                GsErrorKind::Config,
                format!("Output file name may be at most {MAX_FNAME} characters"),
            ));
            return self.finish_config(res);
        }
        self.out_file = out_file.to_string();
        Ok(())
    }

    fn finish_config(&mut self, res: Result<(), GsError>) -> Result<(), GsError> {
        res.map_err(|err| {
            self.err_flag = true;
            self.err_msg = err.message().to_string();
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ai_data_is_validated() {
        let mut enc = Gs1Encoder::new();
        enc.set_data_str("#0112345678901231").unwrap();
        assert_eq!(enc.data_str(), "#0112345678901231");
        assert!(!enc.err_flag());
        let ais = enc.extracted_ais();
        assert_eq!(ais.len(), 1);
        assert_eq!(ais[0].ai, "01");
        assert_eq!(ais[0].value, "12345678901231");
        assert_eq!(ais[0].title, "GTIN");
        assert!(!ais[0].fnc1_required);
    }

    #[test]
    fn plain_data_is_stored_verbatim() {
        let mut enc = Gs1Encoder::new();
        enc.set_data_str("2112345678900").unwrap();
        assert_eq!(enc.data_str(), "2112345678900");
        assert!(enc.extracted_ais().is_empty());
    }

    #[test]
    fn failure_clears_the_buffer_and_sets_the_flag() {
        let mut enc = Gs1Encoder::new();
        let err = enc.set_data_str("#0112345678901234").unwrap_err();
        assert!(enc.err_flag());
        assert_eq!(enc.err_msg(), err.message());
        assert_eq!(enc.data_str(), "");
        assert!(enc.extracted_ais().is_empty());

        // The next successful operation clears the error state.
        enc.set_data_str("#0112345678901231").unwrap();
        assert!(!enc.err_flag());
        assert_eq!(enc.err_msg(), "");
    }

    #[test]
    fn bracketed_ingestion() {
        let mut enc = Gs1Encoder::new();
        enc.set_gs1_data_str("(01)12345678901231(10)ABC123").unwrap();
        assert_eq!(enc.data_str(), "#011234567890123110ABC123");
        let ais = enc.extracted_ais();
        assert_eq!(ais.len(), 2);
        assert_eq!(ais[1].ai, "10");
        assert_eq!(ais[1].value, "ABC123");
        assert_eq!(ais[1].title, "BATCH/LOT");
        assert!(ais[1].fnc1_required);
    }

    #[test]
    fn composite_component_separator() {
        let mut enc = Gs1Encoder::new();
        enc.set_gs1_data_str("(01)12345678901231|(10)ABC123(11)210630")
            .unwrap();
        assert_eq!(enc.data_str(), "#0112345678901231|#10ABC123#11210630");
        let ais = enc.extracted_ais();
        assert_eq!(ais.len(), 3);
        assert_eq!(ais[0].ai, "01");
        assert_eq!(ais[1].ai, "10");
        assert_eq!(ais[2].ai, "11");
        assert_eq!(ais[2].value, "210630");

        assert!(enc.set_gs1_data_str("(01)12345678901231|(10)A|(21)B").is_err());
    }

    #[test]
    fn composite_raw_element_strings() {
        let mut enc = Gs1Encoder::new();
        enc.set_data_str("#0112345678901231|#10ABC123").unwrap();
        assert_eq!(enc.extracted_ais().len(), 2);

        // The 2D component must itself start with FNC1.
        assert!(enc.set_data_str("#0112345678901231|10ABC123").is_err());
    }

    #[test]
    fn dl_ingestion() {
        let mut enc = Gs1Encoder::new();
        let elemstr = enc
            .parse_dl_uri("https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426")
            .unwrap()
            .to_string();
        assert_eq!(elemstr, "#010952012345678810ABC1#2112345#17180426");
        assert_eq!(enc.data_str(), elemstr);
        let ais = enc.extracted_ais();
        assert_eq!(ais.len(), 4);
        assert_eq!(ais[3].ai, "17");
        assert_eq!(ais[3].value, "180426");
    }

    #[test]
    fn config_surface_bounds() {
        let mut enc = Gs1Encoder::new();

        assert!(enc.set_sym(Symbology::None).is_err());
        enc.set_sym(Symbology::DataBarExpanded).unwrap();
        assert_eq!(enc.sym(), Symbology::DataBarExpanded);

        assert!(enc.set_pix_mult(0).is_err());
        assert!(enc.set_pix_mult(MAX_PIX_MULT + 1).is_err());
        enc.set_pix_mult(4).unwrap();
        assert_eq!(enc.sep_ht(), 4); // clamped up from the default

        assert!(enc.set_x_undercut(2).is_err());
        enc.set_x_undercut(1).unwrap();
        enc.set_y_undercut(1).unwrap();

        assert!(enc.set_sep_ht(3).is_err());
        assert!(enc.set_sep_ht(9).is_err());
        enc.set_sep_ht(8).unwrap();

        // Shrinking the X-dimension resets what no longer fits.
        enc.set_pix_mult(2).unwrap();
        assert_eq!(enc.x_undercut(), 0);
        assert_eq!(enc.y_undercut(), 0);
        assert_eq!(enc.sep_ht(), 4); // clamped down to 2x

        assert!(enc.set_databar_exp_seg_width(7).is_err());
        assert!(enc.set_databar_exp_seg_width(24).is_err());
        enc.set_databar_exp_seg_width(8).unwrap();

        assert!(enc.set_gs1_128_lin_height(0).is_err());
        assert!(enc.set_gs1_128_lin_height(MAX_UCC128_LIN_HEIGHT + 1).is_err());
        enc.set_gs1_128_lin_height(40).unwrap();

        assert!(enc.set_dm_rows(7).is_err());
        assert!(enc.set_dm_rows(145).is_err());
        enc.set_dm_rows(0).unwrap();
        enc.set_dm_rows(32).unwrap();

        assert!(enc.set_dm_cols(9).is_err());
        enc.set_dm_cols(10).unwrap();

        assert!(enc.set_qr_version(41).is_err());
        enc.set_qr_version(0).unwrap();
        enc.set_qr_version(7).unwrap();
        enc.set_qr_ec_level(QrEcLevel::High);

        assert!(enc.set_data_file("").is_err());
        assert!(enc.set_data_file(&"f".repeat(MAX_FNAME + 1)).is_err());
        enc.set_data_file("data.txt").unwrap();

        assert!(enc.set_out_file(&"f".repeat(MAX_FNAME + 1)).is_err());
        enc.set_out_file("").unwrap();
        enc.set_out_file("symbol.bmp").unwrap();
    }

    #[test]
    fn config_errors_set_the_error_state() {
        let mut enc = Gs1Encoder::new();
        assert!(enc.set_pix_mult(0).is_err());
        assert!(enc.err_flag());
        assert!(!enc.err_msg().is_empty());
    }

    #[test]
    fn oversized_input_is_rejected() {
        let mut enc = Gs1Encoder::new();
        let big = "9".repeat(MAX_DATA + 1);
        assert!(enc.set_data_str(&big).is_err());
    }
}
