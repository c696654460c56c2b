//! Synchronous checkout-form validation.
//!
//! Rules run in a fixed order and the first failure wins: the phone number is checked
//! before the required text fields.

use thiserror::Error;

use crate::domain::order::{DraftField, OrderDetails};
use crate::messages;

const PHONE_DIGITS_MIN: usize = 9;
const PHONE_DIGITS_MAX: usize = 15;

const REQUIRED_FIELDS: [DraftField; 3] = [DraftField::FullName, DraftField::Address, DraftField::City];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("phone number `{0}` does not match an optional `+` followed by 9 to 15 digits")]
    InvalidPhone(String),
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidPhone(_) => messages::INVALID_PHONE,
            Self::MissingRequiredFields(_) => messages::MISSING_REQUIRED_FIELDS,
        }
    }
}

/// `^\+?\d{9,15}$` over ASCII digits, applied to the value as typed.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits.len())
        && digits.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn validate(details: &OrderDetails) -> Result<(), ValidationError> {
    if !is_valid_phone(&details.phone) {
        return Err(ValidationError::InvalidPhone(details.phone.clone()));
    }

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| details.get(*field).trim().is_empty())
        .map(DraftField::key)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingRequiredFields(missing));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_phone, validate, ValidationError};
    use crate::domain::order::OrderDetails;
    use crate::messages;

    fn complete() -> OrderDetails {
        OrderDetails {
            full_name: "Salma B".to_string(),
            phone: "+212640987767".to_string(),
            address: "Rue d'Alger".to_string(),
            city: "Tetouan".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn accepts_international_digit_runs() {
        for phone in ["+212640987767", "0640987767", "123456789", "+123456789012345"] {
            assert!(is_valid_phone(phone), "`{phone}` should be accepted");
        }
    }

    #[test]
    fn rejects_anything_else() {
        for phone in [
            "",
            "+",
            "12345678",
            "1234567890123456",
            "++212640987767",
            "06 40 98 77 67",
            "0640-987-767",
            " 0640987767",
            "0640987767\n",
            "٠٦٤٠٩٨٧٧٦٧",
            "21264098776x",
        ] {
            assert!(!is_valid_phone(phone), "`{phone}` should be rejected");
        }
    }

    #[test]
    fn complete_details_pass() {
        assert_eq!(validate(&complete()), Ok(()));
    }

    #[test]
    fn phone_is_checked_before_required_fields() {
        let details = OrderDetails { phone: "123".to_string(), ..OrderDetails::default() };
        let error = validate(&details).expect_err("invalid phone");

        assert_eq!(error, ValidationError::InvalidPhone("123".to_string()));
        assert_eq!(error.user_message(), messages::INVALID_PHONE);
    }

    #[test]
    fn whitespace_only_required_fields_are_rejected() {
        let details = OrderDetails {
            full_name: "   ".to_string(),
            city: "\t".to_string(),
            ..complete()
        };
        let error = validate(&details).expect_err("missing fields");

        assert_eq!(error, ValidationError::MissingRequiredFields(vec!["fullName", "city"]));
        assert_eq!(error.user_message(), messages::MISSING_REQUIRED_FIELDS);
    }

    #[test]
    fn blank_address_alone_is_rejected() {
        let details = OrderDetails { address: " ".to_string(), ..complete() };

        assert_eq!(
            validate(&details),
            Err(ValidationError::MissingRequiredFields(vec!["address"]))
        );
    }

    #[test]
    fn notes_are_optional() {
        let details = OrderDetails { notes: "  ".to_string(), ..complete() };
        assert!(validate(&details).is_ok());
    }
}
