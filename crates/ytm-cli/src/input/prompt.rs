use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Print `label`, then read one line and parse it as a decimal.
pub fn prompt_decimal<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    label: &str,
) -> Result<Decimal, Box<dyn std::error::Error>> {
    write!(writer, "{label}: ")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(format!("No value entered for '{label}'").into());
    }

    let trimmed = line.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format!("'{trimmed}' is not a number ({label})").into())
}
