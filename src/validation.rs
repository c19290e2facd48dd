//! Registration input validation

/// Registration validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Code must be exactly {expected} characters")]
    CodeLength { expected: usize },

    #[error("Code is not valid")]
    UnknownCode,

    #[error("Name must be at least {min} characters")]
    NameTooShort { min: usize },

    #[error("Name is too long (maximum {max} characters)")]
    NameTooLong { max: usize },

    #[error("Name contains control characters")]
    NameControlChars,

    #[error("Invalid phone number format (08xxxxxxxxx)")]
    InvalidPhone,
}

pub const REGISTRATION_CODE_LEN: usize = 6;
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 60;
/// Digits allowed after the leading "08"
pub const PHONE_TAIL_DIGITS: std::ops::RangeInclusive<usize> = 8..=11;

/// Registration codes accepted when the configuration lists none
pub fn default_registration_codes() -> Vec<String> {
    ["TREAS1", "TREAS2", "TREAS3", "HUNT01", "HUNT02"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Shape raw input into a code: upper-case, alphanumerics only, at most 6 chars.
pub fn sanitize_registration_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(REGISTRATION_CODE_LEN)
        .collect()
}

pub fn validate_registration_code(
    code: &str,
    valid_codes: &[String],
) -> Result<String, RegistrationError> {
    let code = sanitize_registration_code(code);
    if code.len() != REGISTRATION_CODE_LEN {
        return Err(RegistrationError::CodeLength {
            expected: REGISTRATION_CODE_LEN,
        });
    }
    if !valid_codes.iter().any(|v| v.eq_ignore_ascii_case(&code)) {
        return Err(RegistrationError::UnknownCode);
    }
    Ok(code)
}

/// Validate a display name; returns the trimmed name.
pub fn validate_player_name(name: &str) -> Result<String, RegistrationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < NAME_MIN_LEN {
        return Err(RegistrationError::NameTooShort { min: NAME_MIN_LEN });
    }
    if len > NAME_MAX_LEN {
        return Err(RegistrationError::NameTooLong { max: NAME_MAX_LEN });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(RegistrationError::NameControlChars);
    }
    Ok(trimmed.to_string())
}

/// Mobile number: "08" followed by 8 to 11 digits.
pub fn validate_phone(phone: &str) -> Result<String, RegistrationError> {
    let trimmed = phone.trim();
    let tail = trimmed
        .strip_prefix("08")
        .ok_or(RegistrationError::InvalidPhone)?;
    if !tail.chars().all(|c| c.is_ascii_digit()) || !PHONE_TAIL_DIGITS.contains(&tail.len()) {
        return Err(RegistrationError::InvalidPhone);
    }
    Ok(trimmed.to_string())
}
