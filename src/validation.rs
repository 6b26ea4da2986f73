//! Request payload validation. Each check returns `Ok(())` or a short error
//! string which handlers surface as a 400 response, keeping schema
//! validation a pre-condition gate in front of any store access.

pub const MAX_EMAIL_LEN: usize = 256;
pub const MAX_NAME_LEN: usize = 64;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 1024;

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err("Bad Request: invalid email length".to_string());
    }
    // Minimal shape check: something@something, no spaces
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return Err("Bad Request: invalid email".to_string());
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() || value.len() > MAX_NAME_LEN {
        return Err(format!("Bad Request: invalid {}", field));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err("Bad Request: invalid password length".to_string());
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err("Bad Request: invalid title".to_string());
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.is_empty() || description.len() > MAX_DESCRIPTION_LEN {
        return Err("Bad Request: invalid description".to_string());
    }
    Ok(())
}

pub fn validate_cost(cost: i32) -> Result<(), String> {
    if cost < 0 {
        return Err("Bad Request: cost must be non-negative".to_string());
    }
    Ok(())
}

/// Parse an optional numeric query parameter, mirroring the listing
/// endpoint's "Bad Request: Invalid number" contract.
pub fn parse_int_param(name: &str, value: Option<&str>) -> Result<Option<i64>, String> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Bad Request: invalid number for {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_local_and_domain() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("ab.com").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn cost_must_be_non_negative() {
        assert!(validate_cost(0).is_ok());
        assert!(validate_cost(10).is_ok());
        assert!(validate_cost(-1).is_err());
    }

    #[test]
    fn int_params_parse_or_report_the_field() {
        assert_eq!(parse_int_param("ownerId", None).unwrap(), None);
        assert_eq!(parse_int_param("ownerId", Some("42")).unwrap(), Some(42));
        let err = parse_int_param("ownerId", Some("forty-two")).unwrap_err();
        assert!(err.contains("ownerId"));
    }
}
