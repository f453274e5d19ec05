use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use std::path::Path;

pub fn detect_mime_type<P: AsRef<Path>>(path: P) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("image/jpeg")
        .to_string()
}

pub fn encode_bytes_to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .context("Base64 decoding failed")
}

/// Splits a `data:<mime>;base64,<payload>` URL into its MIME type and payload.
pub fn parse_data_url(data_url: &str) -> Result<(String, String)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("Invalid data URL"))?;
    let (header, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("Invalid data URL"))?;

    if header.is_empty() || payload.is_empty() {
        return Err(anyhow!("Invalid data URL"));
    }

    Ok((header.to_string(), payload.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_url() {
        let (mime, payload) = parse_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(payload, "aGVsbG8=");
    }

    #[test]
    fn rejects_malformed_data_urls() {
        assert!(parse_data_url("image/png;base64,aGVsbG8=").is_err());
        assert!(parse_data_url("data:image/png,aGVsbG8=").is_err());
        assert!(parse_data_url("data:;base64,").is_err());
    }

    #[test]
    fn base64_round_trip() {
        let encoded = encode_bytes_to_base64(b"dreamframe");
        assert_eq!(decode_base64(&encoded).unwrap(), b"dreamframe");
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        assert_eq!(decode_base64("  aGVsbG8=\n").unwrap(), b"hello");
    }
}
