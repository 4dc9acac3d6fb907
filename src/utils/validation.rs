use crate::error::{AppError, AppResult};
use regex::Regex;

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.len() < 3 || username.len() > 80 {
        return Err(AppError::ValidationError(
            "Username must be between 3 and 80 characters".to_string(),
        ));
    }

    let username_regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
    if !username_regex.is_match(username) {
        return Err(AppError::ValidationError(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    if email.len() > 120 || !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

/// Iranian mobile numbers: 09xxxxxxxxx.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^09\d{9}$").unwrap();

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid mobile number, expected format 09xxxxxxxxx".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_gender(gender: &str) -> AppResult<()> {
    match gender {
        "male" | "female" | "other" => Ok(()),
        _ => Err(AppError::ValidationError("Invalid gender".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ali.rezaei").is_ok());
        assert!(validate_username("user_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("student@seraj.ac.ir").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@signs.ir").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("09123456789").is_ok());
        assert!(validate_phone("9123456789").is_err());
        assert!(validate_phone("0912345678").is_err());
        assert!(validate_phone("0912345678a").is_err());
    }
}
