//! Input checks shared by the signup, profile and request flows.

use crate::error::{ AppError, Result };

pub const PHONE_DIGITS: usize = 10;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Accepts exactly ten ASCII digits.
pub fn validate_phone(phone: &str) -> Result<String> {
    let phone = phone.trim();

    if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidInput("Phone number must be exactly 10 digits".to_string()));
    }

    Ok(phone.to_string())
}

pub fn validate_password(password: &str, confirmation: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(
            AppError::InvalidInput(
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN)
            )
        );
    }

    if password != confirmation {
        return Err(AppError::InvalidInput("Passwords do not match".to_string()));
    }

    Ok(())
}

/// Lowercases and sanity-checks an email address.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::InvalidInput("Invalid email address".to_string())),
    }
}

/// Trims a required free-text field, rejecting blanks.
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }

    Ok(value.to_string())
}

/// Uppercases an optional referral code; blank input means no code.
pub fn normalize_referral_code(code: Option<&str>) -> Option<String> {
    code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_exactly_ten_digits() {
        assert_eq!(validate_phone("0712345678").unwrap(), "0712345678");
        assert_eq!(validate_phone(" 0712345678 ").unwrap(), "0712345678");
    }

    #[test]
    fn test_phone_rejects_other_lengths_and_characters() {
        for phone in ["071234567", "07123456789", "", "07123a5678", "+254712345", "071 234 567"] {
            assert!(validate_phone(phone).is_err(), "accepted {:?}", phone);
        }
        // Non-ASCII digits are not accepted either
        assert!(validate_phone("٠١٢٣٤٥٦٧٨٩").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret", "secret").is_ok());
        assert!(validate_password("short", "short").is_err());
        assert!(validate_password("secret1", "secret2").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Jane@Example.COM ").unwrap(), "jane@example.com");
        assert!(normalize_email("jane.example.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("jane@localhost").is_err());
    }

    #[test]
    fn test_referral_code_is_uppercased() {
        assert_eq!(normalize_referral_code(Some(" ab12cd34 ")), Some("AB12CD34".to_string()));
        assert_eq!(normalize_referral_code(Some("   ")), None);
        assert_eq!(normalize_referral_code(None), None);
    }
}
