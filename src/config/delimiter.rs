//! Line delimiter escape decoding.

use anyhow::Context;

/// Decode escape sequences in a delimiter given on the command line.
///
/// Recognizes `\n`, `\t`, `\r`, `\\` and `\xHH`. Any other backslash sequence
/// is kept as written.
pub fn decode_delimiter(raw: &str) -> anyhow::Result<String> {
    if raw.is_empty() {
        anyhow::bail!("Line delimiter must not be empty");
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('n') => {
                chars.next();
                decoded.push('\n');
            }
            Some('t') => {
                chars.next();
                decoded.push('\t');
            }
            Some('r') => {
                chars.next();
                decoded.push('\r');
            }
            Some('\\') => {
                chars.next();
                decoded.push('\\');
            }
            Some('x') => {
                chars.next();
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    anyhow::bail!("Incomplete hex escape '\\x{hex}' in delimiter '{raw}'");
                }
                let byte = u8::from_str_radix(&hex, 16)
                    .with_context(|| format!("Invalid hex escape '\\x{hex}' in delimiter '{raw}'"))?;
                if !byte.is_ascii() {
                    anyhow::bail!("Hex escape '\\x{hex}' in delimiter '{raw}' is not ASCII");
                }
                decoded.push(char::from(byte));
            }
            _ => decoded.push('\\'),
        }
    }
    Ok(decoded)
}
