//! Phone number normalization.

use serde::{Deserialize, Serialize};

use super::ContributionError;

/// A phone number in the canonical international format the payment
/// provider accepts: `254` followed by `1` or `7` and eight digits.
///
/// Accepted input forms, all normalizing to the same canonical value:
/// `0712345678`, `254712345678`, `+254712345678`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses and normalizes a phone number.
    pub fn parse(input: &str) -> Result<Self, ContributionError> {
        let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        // A leading + is only valid on the full international form.
        let (digits, international) = match cleaned.strip_prefix('+') {
            Some(rest) => (rest, true),
            None => (cleaned.as_str(), false),
        };

        if !digits.chars().all(|c| c.is_ascii_digit()) || (international && !digits.starts_with("254"))
        {
            return Err(ContributionError::InvalidPhone {
                input: input.to_string(),
            });
        }

        let canonical = if let Some(rest) = digits.strip_prefix('0') {
            // Local form: 0XXXXXXXXX
            if rest.len() != 9 {
                return Err(ContributionError::InvalidPhone {
                    input: input.to_string(),
                });
            }
            format!("254{rest}")
        } else if digits.starts_with("254") && digits.len() == 12 {
            digits.to_string()
        } else {
            return Err(ContributionError::InvalidPhone {
                input: input.to_string(),
            });
        };

        // Only Safaricom mobile ranges are valid push targets.
        if !matches!(canonical.as_bytes()[3], b'1' | b'7') {
            return Err(ContributionError::InvalidPhone {
                input: input.to_string(),
            });
        }

        Ok(Self(canonical))
    }

    /// Wraps an already-canonical value, e.g. when rehydrating a stored
    /// row. The caller guarantees the value came from [`PhoneNumber::parse`].
    pub fn from_canonical(value: String) -> Self {
        Self(value)
    }

    /// Returns the canonical number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_input_forms_normalize_identically() {
        let canonical = "254712345678";
        for input in ["0712345678", "254712345678", "+254712345678"] {
            let phone = PhoneNumber::parse(input).unwrap();
            assert_eq!(phone.as_str(), canonical, "input form {input}");
        }
    }

    #[test]
    fn test_landline_range_accepted() {
        let phone = PhoneNumber::parse("0110000000").unwrap();
        assert_eq!(phone.as_str(), "254110000000");
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let phone = PhoneNumber::parse(" 0712 345 678 ").unwrap();
        assert_eq!(phone.as_str(), "254712345678");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(PhoneNumber::parse("071234567").is_err());
        assert!(PhoneNumber::parse("07123456789").is_err());
        assert!(PhoneNumber::parse("2547123456789").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn test_rejects_non_mobile_prefix() {
        assert!(PhoneNumber::parse("0812345678").is_err());
        assert!(PhoneNumber::parse("254212345678").is_err());
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(PhoneNumber::parse("07123456ab").is_err());
        assert!(PhoneNumber::parse("+2547-12345678").is_err());
    }

    #[test]
    fn test_rejects_other_country_code() {
        assert!(PhoneNumber::parse("+255712345678").is_err());
    }

    #[test]
    fn test_rejects_plus_on_local_form() {
        assert!(PhoneNumber::parse("+0712345678").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let phone = PhoneNumber::parse("0712345678").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"254712345678\"");
    }
}
