use super::ApiError;

pub fn validate_display_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    if trimmed.len() > 100 {
        return Err(ApiError::validation("Name must be 100 characters or less"));
    }

    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();

    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        && !trimmed.contains(char::is_whitespace);

    if !valid {
        return Err(ApiError::validation(format!(
            "Invalid email address: {}",
            trimmed
        )));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(password)
}

pub fn validate_area(area: f32) -> Result<f32, ApiError> {
    if !area.is_finite() || area <= 0.0 {
        return Err(ApiError::validation(format!(
            "Invalid area: {}. Area must be a positive number of acres",
            area
        )));
    }
    Ok(area)
}

pub fn validate_farm_size(farm_size: f32) -> Result<f32, ApiError> {
    if !farm_size.is_finite() || farm_size < 0.0 {
        return Err(ApiError::validation(format!(
            "Invalid farm size: {}",
            farm_size
        )));
    }
    Ok(farm_size)
}

pub fn validate_health_score(score: i32) -> Result<i32, ApiError> {
    if !(0..=100).contains(&score) {
        return Err(ApiError::validation(format!(
            "Invalid health score: {}. Score must be between 0 and 100",
            score
        )));
    }
    Ok(score)
}

/// Dates arrive as `YYYY-MM-DD` or full RFC 3339 timestamps and are stored
/// as given.
pub fn validate_date(field: &str, value: &str) -> Result<(), ApiError> {
    let is_date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(value).is_ok();

    if !is_date {
        return Err(ApiError::validation(format!(
            "Invalid {}: {}. Expected an ISO date (YYYY-MM-DD)",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name() {
        assert_eq!(validate_display_name("Mercy").unwrap(), "Mercy");
        assert_eq!(validate_display_name("  Mercy  ").unwrap(), "Mercy");
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name("a".repeat(101).as_str()).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("mercy@x.com").is_ok());
        assert!(validate_email("admin@coop.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@no-local.com").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
        assert!(validate_email("nodot@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("pw123").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_area() {
        assert!(validate_area(2.0).is_ok());
        assert!(validate_area(0.25).is_ok());
        assert!(validate_area(0.0).is_err());
        assert!(validate_area(-1.0).is_err());
        assert!(validate_area(f32::NAN).is_err());
    }

    #[test]
    fn test_validate_health_score() {
        assert!(validate_health_score(0).is_ok());
        assert!(validate_health_score(100).is_ok());
        assert!(validate_health_score(-1).is_err());
        assert!(validate_health_score(101).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("planting_date", "2024-01-01").is_ok());
        assert!(validate_date("planting_date", "2024-01-01T00:00:00Z").is_ok());
        assert!(validate_date("planting_date", "January 1st").is_err());
        assert!(validate_date("planting_date", "2024-13-01").is_err());
    }
}
