// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Call-data input: hex text from a flag, a file or stdin.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

/// Parse hex call data. Accepts an optional `0x` prefix and ignores whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = digits.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        bail!("hex data has an odd number of digits ({})", compact.len());
    }
    hex::decode(&compact).context("invalid hex data")
}

/// Read call data from `--data`, `--data-file`, or stdin when neither is given.
///
/// With `binary`, the file (or stdin) holds raw bytes instead of hex text.
pub fn load(data: Option<&str>, file: Option<&Path>, binary: bool) -> Result<Vec<u8>> {
    if let Some(text) = data {
        return parse_hex(text);
    }
    let raw = match file {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading call data from stdin")?;
            buf
        }
    };
    if binary {
        return Ok(raw);
    }
    let text = String::from_utf8(raw).context("call data file is not hex text (use --binary)")?;
    parse_hex(&text)
}
