//! Checks a candidate feed URL before anything touches the network.
//!
//! Validation is pure: it reads the current feed list and reports which rule
//! failed. Transitioning process state is left to the caller.

use thiserror::Error;
use url::Url;

use crate::domain::Feed;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed already exists: {0}")]
    DuplicateFeed(String),
}

impl ValidationError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::EmptyUrl => "errorsMessages.notEmpty",
            ValidationError::InvalidUrl(_) => "errorsMessages.invalidURL",
            ValidationError::DuplicateFeed(_) => "errorsMessages.duplicateRSS",
        }
    }
}

/// Validate `candidate` against URL syntax and the feeds already in state.
///
/// Surrounding whitespace is ignored; on success the trimmed URL is returned
/// exactly as typed, which is the form stored in [`Feed::url`].
pub fn validate<'a>(candidate: &'a str, feeds: &[Feed]) -> Result<&'a str, ValidationError> {
    let candidate = candidate.trim();

    if candidate.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    check_syntax(candidate)?;

    if feeds.iter().any(|feed| feed.url == candidate) {
        return Err(ValidationError::DuplicateFeed(candidate.to_string()));
    }

    Ok(candidate)
}

fn check_syntax(candidate: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidUrl(candidate.to_string());

    let url = Url::parse(candidate).map_err(|_| invalid())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(invalid()),
    }

    if candidate.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(url: &str) -> Feed {
        Feed::new(url, "title", "description")
    }

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(validate("https://example.com/rss", &[]), Ok("https://example.com/rss"));
        assert_eq!(validate("http://example.com/feed.xml", &[]), Ok("http://example.com/feed.xml"));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(validate("  https://example.com/rss\n", &[]), Ok("https://example.com/rss"));
    }

    #[test]
    fn test_empty_and_blank_are_empty_url() {
        assert_eq!(validate("", &[]), Err(ValidationError::EmptyUrl));
        assert_eq!(validate("   ", &[]), Err(ValidationError::EmptyUrl));
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for candidate in [
            "example",
            "example.com/rss",
            "ftp://example.com/rss",
            "mailto:someone@example.com",
            "https://",
            "https://exa mple.com/rss",
        ] {
            assert!(
                matches!(validate(candidate, &[]), Err(ValidationError::InvalidUrl(_))),
                "{} should be invalid",
                candidate
            );
        }
    }

    #[test]
    fn test_rejects_feed_already_in_state() {
        let feeds = vec![feed("https://a.io/rss"), feed("https://b.io/rss")];
        assert_eq!(
            validate("https://b.io/rss", &feeds),
            Err(ValidationError::DuplicateFeed("https://b.io/rss".into()))
        );
        assert_eq!(validate("https://c.io/rss", &feeds), Ok("https://c.io/rss"));
    }

    #[test]
    fn test_syntax_checked_before_duplicates() {
        let feeds = vec![feed("not a url")];
        assert!(matches!(
            validate("not a url", &feeds),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(ValidationError::EmptyUrl.message_key(), "errorsMessages.notEmpty");
        assert_eq!(
            ValidationError::InvalidUrl(String::new()).message_key(),
            "errorsMessages.invalidURL"
        );
        assert_eq!(
            ValidationError::DuplicateFeed(String::new()).message_key(),
            "errorsMessages.duplicateRSS"
        );
    }
}
