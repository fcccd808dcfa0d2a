use crate::server::error::{internal::InternalError, AppError};

/// Parses an i32 value from String
///
/// # Arguments
/// - `value` - The String to attempt to parse into `i32`
///
/// # Returns
/// - `Ok(i32)` - Successfully parsed String to `i32`
/// - `Err(AppError::InternalErr(ParseStringId))` - Failed to parse
///   the string as an i32
pub fn parse_i32_from_string(value: String) -> Result<i32, AppError> {
    let result = value
        .parse::<i32>()
        .map_err(|e| InternalError::ParseStringId { value, source: e })?;

    Ok(result)
}

/// Parses a string column into one of the application's enums.
///
/// # Arguments
/// - `column` - Column name, used for the error message
/// - `value` - Stored value
///
/// # Returns
/// - `Ok(T)` - Parsed value
/// - `Err(InternalError::UnknownColumnValue)` - Value not recognised
pub fn parse_column<T: std::str::FromStr>(
    column: &'static str,
    value: &str,
) -> Result<T, InternalError> {
    value
        .parse::<T>()
        .map_err(|_| InternalError::UnknownColumnValue {
            column,
            value: value.to_string(),
        })
}

/// Percentage of `passed` in `total`, rounded to one decimal place.
///
/// Returns 0 when `total` is 0.
pub fn pass_rate(passed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (passed as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Derives a URL slug from a display name.
///
/// Lowercases ASCII alphanumerics and collapses every other run of characters
/// into a single hyphen. Falls back to `"org"` when nothing usable remains.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "org".to_string()
    } else {
        slug.to_string()
    }
}

/// Normalizes and validates a hostname entered by a user.
///
/// # Returns
/// - `Some(name)` - Lowercased hostname without trailing dot
/// - `None` - Not a syntactically valid multi-label hostname
pub fn normalize_domain(input: &str) -> Option<String> {
    let name = input.trim().trim_end_matches('.').to_ascii_lowercase();
    if name.len() > 253 || !name.contains('.') {
        return None;
    }
    let valid = name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    valid.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: rounding to one decimal and 0 for empty totals
    #[test]
    fn computes_pass_rate() {
        assert_eq!(pass_rate(0, 0), 0.0);
        assert_eq!(pass_rate(1, 3), 33.3);
        assert_eq!(pass_rate(2, 3), 66.7);
        assert_eq!(pass_rate(10, 10), 100.0);
        assert_eq!(pass_rate(999, 1000), 99.9);
    }

    /// Expected: lowercase hyphenated slug without leading or trailing hyphens
    #[test]
    fn slugifies_names() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  Hello,  World!! "), "hello-world");
        assert_eq!(slugify("***"), "org");
    }

    /// Expected: valid hostnames normalized, invalid ones rejected
    #[test]
    fn normalizes_domains() {
        assert_eq!(normalize_domain("Example.COM."), Some("example.com".into()));
        assert_eq!(normalize_domain("mail.example.co.uk"), Some("mail.example.co.uk".into()));
        assert_eq!(normalize_domain("localhost"), None);
        assert_eq!(normalize_domain("-bad.example.com"), None);
        assert_eq!(normalize_domain("bad..example.com"), None);
        assert_eq!(normalize_domain("exa mple.com"), None);
    }
}
