// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::error::{GsError, GsErrorKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "GS1 barcode data validator and element-string generator.

Accepts barcode message content as raw element-string data (with # standing
for FNC1), as bracketed AI syntax via --gs1, or as a GS1 Digital Link URI
via --dl. The input is validated against the GS1 Application Identifier
table and echoed back as the canonical element string, optionally with the
extracted AIs and their human-readable interpretation.

A single | character separates the linear component from the 2D composite
component in raw and bracketed input.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "gs1forge",
    version = VERSION,
    about = "GS1 AI data validator and element-string generator",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    /// Raw barcode data; "#..." is treated as AI element-string data.
    #[arg(value_name = "DATA")]
    pub data: Option<String>,
    #[arg(
        long = "gs1",
        value_name = "AIDATA",
        long_help = "Barcode data in bracketed AI syntax, e.g. (01)12345678901231(10)ABC123. \
                     FNC1 separators are inserted automatically."
    )]
    pub gs1: Option<String>,
    #[arg(
        long = "dl",
        value_name = "URI",
        long_help = "Barcode data as a GS1 Digital Link URI, e.g. \
                     https://id.gs1.org/01/09520123456788."
    )]
    pub dl: Option<String>,
    #[arg(
        long = "data-file",
        value_name = "FILE",
        long_help = "Read raw barcode data from FILE instead of the command line. \
                     A trailing newline is stripped."
    )]
    pub data_file: Option<PathBuf>,
    #[arg(
        long = "check-digit",
        value_name = "DIGITS",
        long_help = "Print DIGITS with its computed mod-10 check digit appended, then exit."
    )]
    pub check_digit: Option<String>,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format. text prints the element string; json adds the \
                     extracted AIs and HRI in machine-readable form."
    )]
    pub format: OutputFormat,
    #[arg(
        long = "hri",
        action = ArgAction::SetTrue,
        long_help = "Also print the human-readable interpretation, one (ai) value line per AI."
    )]
    pub hri: bool,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress output for successful runs; errors are still reported."
    )]
    pub quiet: bool,
}

/// The single input source selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Raw(String),
    Bracketed(String),
    DigitalLink(String),
    DataFile(PathBuf),
    CheckDigit(String),
}

pub fn validate_cli(cli: &Cli) -> Result<Request, GsError> {
    let mut requests = Vec::new();
    if let Some(data) = &cli.data {
        requests.push(Request::Raw(data.clone()));
    }
    if let Some(gs1) = &cli.gs1 {
        requests.push(Request::Bracketed(gs1.clone()));
    }
    if let Some(dl) = &cli.dl {
        requests.push(Request::DigitalLink(dl.clone()));
    }
    if let Some(file) = &cli.data_file {
        requests.push(Request::DataFile(file.clone()));
    }
    if let Some(digits) = &cli.check_digit {
        requests.push(Request::CheckDigit(digits.clone()));
    }

    match requests.len() {
        1 => Ok(requests.remove(0)),
        0 => Err(GsError::new(
            GsErrorKind::Cli,
            "No input given; supply DATA, --gs1, --dl, --data-file or --check-digit",
        )),
        _ => Err(GsError::new(
            GsErrorKind::Cli,
            "Only one of DATA, --gs1, --dl, --data-file and --check-digit may be given",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gs1forge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn single_input_sources() {
        assert_eq!(
            validate_cli(&parse(&["#1012345"])).unwrap(),
            Request::Raw("#1012345".into())
        );
        assert_eq!(
            validate_cli(&parse(&["--gs1", "(10)12345"])).unwrap(),
            Request::Bracketed("(10)12345".into())
        );
        assert_eq!(
            validate_cli(&parse(&["--dl", "https://a/01/12312312312333"])).unwrap(),
            Request::DigitalLink("https://a/01/12312312312333".into())
        );
        assert_eq!(
            validate_cli(&parse(&["--check-digit", "629104150021"])).unwrap(),
            Request::CheckDigit("629104150021".into())
        );
    }

    #[test]
    fn input_sources_are_exclusive() {
        let cli = parse(&["--gs1", "(10)1", "--dl", "https://a/01/12312312312333"]);
        assert_eq!(validate_cli(&cli).unwrap_err().kind(), GsErrorKind::Cli);
        let cli = parse(&["#101", "--gs1", "(10)1"]);
        assert_eq!(validate_cli(&cli).unwrap_err().kind(), GsErrorKind::Cli);
        let cli = parse(&["--hri"]);
        assert_eq!(validate_cli(&cli).unwrap_err().kind(), GsErrorKind::Cli);
    }
}
