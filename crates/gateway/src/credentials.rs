//! Credential and password derivation for provider requests.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// Builds the Basic authorization header value for the credential
/// request from the consumer key/secret pair.
pub fn basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{consumer_key}:{consumer_secret}"));
    format!("Basic {encoded}")
}

/// Formats a timestamp the way the provider expects it in push and
/// query payloads.
pub fn provider_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Derives the push password: base64 of short code + passkey +
/// timestamp. The same timestamp string must travel in the payload.
pub fn stk_password(short_code: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{short_code}{passkey}{timestamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_basic_auth_header_encodes_key_pair() {
        let header = basic_auth_header("key", "secret");
        assert_eq!(header, format!("Basic {}", STANDARD.encode("key:secret")));
        assert!(header.starts_with("Basic "));
    }

    #[test]
    fn test_provider_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 8, 26, 10, 15, 30).unwrap();
        assert_eq!(provider_timestamp(at), "20260826101530");
    }

    #[test]
    fn test_stk_password_is_base64_of_concatenation() {
        let password = stk_password("174379", "passkey", "20260826101530");
        let decoded = STANDARD.decode(password).unwrap();
        assert_eq!(decoded, b"174379passkey20260826101530");
    }
}
