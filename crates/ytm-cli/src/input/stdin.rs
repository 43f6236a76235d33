use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize piped JSON from stdin. Returns None when stdin is a
/// terminal or the pipe is empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytm_core::fixed_income::pricing::BondPriceInput;

    #[test]
    fn test_blank_pipe_is_none() {
        assert!(parse_piped::<BondPriceInput>("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_json_parses() {
        let input: BondPriceInput = parse_piped(
            r#"{"face_value":"100","coupon_rate":"0.04","years_to_maturity":"3","yield":"0.05"}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(input.years_to_maturity.to_string(), "3");
    }
}
