//! Input validation helpers
//!
//! Length limits and format checks for the registration and login bodies.

use crate::utils::AppError;

/// Usernames and nick names
pub const MAX_NAME_LEN: usize = 50;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} 不能为空")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} 过长 ({} 字符, 最多 {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate a registration password.
pub fn validate_password(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "password", MAX_PASSWORD_LEN)?;
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "密码不能少于 {MIN_PASSWORD_LEN} 位"
        )));
    }
    Ok(())
}

/// Validate an email address: one `@`, non-empty local part, dotted domain.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;

    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        Err(AppError::validation("不是合法的邮箱格式"))
    }
}
