//! Validation rules and custom validators

use reqwest::Url;
use std::borrow::Cow;
use validator::ValidationError;

fn url_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Parses a probe target, accepting only absolute http/https URLs with a host.
pub fn parse_endpoint_url(url: &str) -> Result<Url, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(url_error("required", "URL is required"));
    }

    let parsed = Url::parse(trimmed).map_err(|_| url_error("invalid_url", "URL is not valid"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(url_error("unsupported_scheme", "URL must use http or https"));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(url_error("missing_host", "URL must include a host"));
    }

    Ok(parsed)
}

pub fn validate_endpoint_url(url: &str) -> Result<(), ValidationError> {
    parse_endpoint_url(url).map(|_| ())
}
