// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for gs1forge.

use std::fs;
use std::process;

use clap::Parser;
use serde_json::json;

use gs1forge::ai::linters;
use gs1forge::cli::{validate_cli, Cli, OutputFormat, Request};
use gs1forge::error::{GsError, GsErrorKind};
use gs1forge::{hri, Gs1Encoder};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("gs1forge: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), GsError> {
    let request = validate_cli(cli)?;

    let mut encoder = Gs1Encoder::new();
    match request {
        Request::Raw(data) => {
            encoder.set_data_str(&data)?;
        }
        Request::Bracketed(ai_data) => {
            encoder.set_gs1_data_str(&ai_data)?;
        }
        Request::DigitalLink(uri) => {
            encoder.parse_dl_uri(&uri)?;
        }
        Request::DataFile(path) => {
            encoder.set_file_input(true);
            encoder.set_data_file(&path.to_string_lossy())?;
            let mut content = fs::read_to_string(&path)?;
            if content.ends_with('\n') {
                content.pop();
                if content.ends_with('\r') {
                    content.pop();
                }
            }
            encoder.set_data_str(&content)?;
        }
        Request::CheckDigit(digits) => {
            let completed = linters::with_check_digit(&digits).ok_or_else(|| {
                GsError::new(
                    GsErrorKind::Cli,
                    "Check digit input must be one or more digits",
                )
            })?;
            if !cli.quiet {
                println!("{completed}");
            }
            return Ok(());
        }
    }

    if cli.quiet {
        return Ok(());
    }

    match cli.format {
        OutputFormat::Text => {
            println!("{}", encoder.data_str());
            if cli.hri {
                for line in hri::hri_lines(&encoder) {
                    println!("{line}");
                }
            }
        }
        OutputFormat::Json => {
            let ais: Vec<serde_json::Value> = encoder
                .extracted_ais()
                .iter()
                .map(|extracted| {
                    json!({
                        "ai": extracted.ai,
                        "value": extracted.value,
                        "title": extracted.title,
                        "fnc1Required": extracted.fnc1_required,
                    })
                })
                .collect();
            let payload = json!({
                "dataStr": encoder.data_str(),
                "ais": ais,
                "hri": hri::hri_lines(&encoder),
            });
            println!("{payload:#}");
        }
    }

    Ok(())
}
