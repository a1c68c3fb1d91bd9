use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("regex compiles")
});

pub fn is_valid_client_name(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Body constraint applied at the HTTP boundary, before the request reaches
/// the booking service.
pub fn client_name_length_ok(value: &str) -> bool {
    (2..=100).contains(&value.chars().count())
}
